//! Role inheritance hierarchy
//!
//! A directed acyclic graph of `child -> parent` edges: a child role inherits
//! every permission of its parents, transitively.
//!
//! # Features
//!
//! - **Cycle Rejection**: each new edge is checked with a DFS from the parent
//!   back to the child before insertion, so a failed `add_edge` leaves the
//!   graph untouched
//! - **Freeze**: after [`RoleHierarchy::freeze`] the graph is immutable and
//!   every role's ancestor set is memoized (computed parents-first with Kahn's
//!   algorithm)
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use tetrix_rbac::{Namespace, RoleCatalog, RoleHierarchy};
//!
//! # fn example() -> tetrix_rbac::Result<()> {
//! let mut roles = RoleCatalog::new();
//! roles.register("junior_labeler", Namespace::DataAnnotator)?;
//! roles.register("senior_labeler", Namespace::DataAnnotator)?;
//! roles.freeze();
//!
//! let mut hierarchy = RoleHierarchy::new(Arc::new(roles));
//! hierarchy.add_edge("senior_labeler", "junior_labeler")?;
//! hierarchy.freeze()?;
//!
//! assert!(hierarchy.ancestors_of("senior_labeler")?.contains("junior_labeler"));
//! # Ok(())
//! # }
//! ```

mod graph;

#[cfg(test)]
mod tests;

use std::collections::{BTreeSet, HashMap, VecDeque};
use std::sync::Arc;
use tracing::{debug, info};

use crate::catalog::RoleCatalog;
use crate::error::{RbacError, Result};
use crate::types::RoleId;
use graph::ParentEdges;

/// Role inheritance graph over a role catalog
#[derive(Debug, Clone)]
pub struct RoleHierarchy {
    /// Catalog every edge endpoint must belong to
    roles: Arc<RoleCatalog>,

    /// Child -> direct parents, in insertion order
    parents: ParentEdges,

    edge_count: usize,

    frozen: bool,

    /// Memoized ancestor sets, filled by `freeze`
    ancestors: HashMap<RoleId, Arc<BTreeSet<RoleId>>>,
}

impl RoleHierarchy {
    pub fn new(roles: Arc<RoleCatalog>) -> Self {
        Self {
            roles,
            parents: ParentEdges::new(),
            edge_count: 0,
            frozen: false,
            ancestors: HashMap::new(),
        }
    }

    /// Make `child` inherit every permission of `parent`
    ///
    /// Adding an existing edge again is a no-op.
    ///
    /// # Errors
    ///
    /// - `HierarchyFrozen` after [`RoleHierarchy::freeze`]
    /// - `UnknownRole` if either role is not in the catalog
    /// - `CycleDetected` if `parent` already (transitively) inherits `child`
    pub fn add_edge(&mut self, child: &str, parent: &str) -> Result<()> {
        if self.frozen {
            return Err(RbacError::HierarchyFrozen);
        }

        for role in [child, parent] {
            if !self.roles.exists(role) {
                return Err(RbacError::UnknownRole(role.to_string()));
            }
        }

        if self.parents_of(child).iter().any(|p| p == parent) {
            return Ok(());
        }

        if let Some(path) = graph::find_path(&self.parents, parent, child) {
            let mut cycle = vec![child.to_string()];
            cycle.extend(path);
            return Err(RbacError::CycleDetected(cycle.join(" -> ")));
        }

        debug!("Role {} now inherits {}", child, parent);
        self.parents
            .entry(child.to_string())
            .or_default()
            .push(parent.to_string());
        self.edge_count += 1;
        Ok(())
    }

    /// Direct parents of a role, in insertion order
    pub fn parents_of(&self, role: &str) -> &[RoleId] {
        self.parents.get(role).map(Vec::as_slice).unwrap_or(&[])
    }

    /// All roles reachable through parent edges, excluding `role` itself
    ///
    /// # Errors
    ///
    /// `UnknownRole` if the role is not in the catalog.
    pub fn ancestors_of(&self, role: &str) -> Result<Arc<BTreeSet<RoleId>>> {
        if !self.roles.exists(role) {
            return Err(RbacError::UnknownRole(role.to_string()));
        }

        if let Some(memo) = self.ancestors.get(role) {
            return Ok(Arc::clone(memo));
        }

        Ok(Arc::new(self.collect_ancestors(role)))
    }

    /// Breadth-first walk over parent edges
    fn collect_ancestors(&self, role: &str) -> BTreeSet<RoleId> {
        let mut found = BTreeSet::new();
        let mut queue: VecDeque<&str> = VecDeque::from([role]);

        while let Some(current) = queue.pop_front() {
            for parent in self.parents_of(current) {
                if parent != role && found.insert(parent.clone()) {
                    queue.push_back(parent.as_str());
                }
            }
        }

        found
    }

    /// Make the hierarchy immutable and memoize every role's ancestors
    ///
    /// Calling `freeze` twice is a no-op.
    pub fn freeze(&mut self) -> Result<()> {
        if self.frozen {
            return Ok(());
        }

        let role_ids: Vec<RoleId> = self.roles.iter().map(|r| r.id.clone()).collect();
        let order = graph::topological_order(&role_ids, &self.parents)?;

        let mut memo: HashMap<RoleId, Arc<BTreeSet<RoleId>>> = HashMap::with_capacity(order.len());

        for role in order {
            let mut set = BTreeSet::new();
            for parent in self.parents_of(&role) {
                set.insert(parent.clone());
                if let Some(inherited) = memo.get(parent) {
                    set.extend(inherited.iter().cloned());
                }
            }
            memo.insert(role, Arc::new(set));
        }

        self.ancestors = memo;
        self.frozen = true;

        info!(
            "Role hierarchy frozen: {} roles, {} edges",
            self.roles.len(),
            self.edge_count
        );
        Ok(())
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// Catalog the hierarchy was built over
    pub fn role_catalog(&self) -> &Arc<RoleCatalog> {
        &self.roles
    }
}
