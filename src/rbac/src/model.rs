//! Static model definitions
//!
//! A [`ModelDefinition`] is the serializable form of the whole authorization
//! model. [`ModelDefinition::load`] populates and freezes every component in
//! dependency order:
//!
//! 1. permissions, then roles; both catalogs frozen
//! 2. hierarchy edges; hierarchy frozen
//! 3. grants, then superuser grants; bindings frozen
//!
//! Any error aborts the load.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

use crate::bindings::RolePermissionBindings;
use crate::catalog::{PermissionCatalog, RoleCatalog};
use crate::engine::AuthzModel;
use crate::error::Result;
use crate::hierarchy::RoleHierarchy;
use crate::types::{PermissionId, Role, RoleId};

/// Built-in TETRIX platform model
const BUILTIN_MODEL: &str = include_str!("../assets/tetrix_model.json");

/// Inheritance edge: `child` inherits every permission of `parent`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InheritanceEdge {
    pub child: RoleId,
    pub parent: RoleId,
}

/// Serializable authorization model
///
/// Unknown keys are rejected so a misspelled section cannot load as empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelDefinition {
    /// Permission identifiers
    #[serde(default)]
    pub permissions: Vec<PermissionId>,

    /// Roles with their namespaces
    #[serde(default)]
    pub roles: Vec<Role>,

    /// Hierarchy edges
    #[serde(default)]
    pub inherits: Vec<InheritanceEdge>,

    /// Direct grants per role
    #[serde(default)]
    pub grants: BTreeMap<RoleId, Vec<PermissionId>>,

    /// Roles granted every registered permission
    #[serde(default)]
    pub superusers: Vec<RoleId>,
}

impl ModelDefinition {
    /// Embedded platform model (core, data-annotator, academy, enterprise)
    pub fn builtin() -> Result<Self> {
        Self::from_json_str(BUILTIN_MODEL)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&contents)
    }

    /// Build and freeze the model
    pub fn load(&self) -> Result<AuthzModel> {
        let mut permissions = PermissionCatalog::new();
        for permission in &self.permissions {
            permissions.register(permission.clone())?;
        }
        permissions.freeze();

        let mut roles = RoleCatalog::new();
        for role in &self.roles {
            roles.register_role(role.clone())?;
        }
        roles.freeze();

        let permissions = Arc::new(permissions);
        let roles = Arc::new(roles);

        let mut hierarchy = RoleHierarchy::new(Arc::clone(&roles));
        for edge in &self.inherits {
            hierarchy.add_edge(&edge.child, &edge.parent)?;
        }
        hierarchy.freeze()?;

        let mut bindings = RolePermissionBindings::new(roles, permissions);
        for (role, granted) in &self.grants {
            for permission in granted {
                bindings.grant(role, permission)?;
            }
        }
        for role in &self.superusers {
            bindings.grant_all(role)?;
        }
        bindings.freeze();

        let model = AuthzModel::new(hierarchy, bindings)?;

        info!(
            "Authorization model loaded: {} permissions, {} roles, {} inheritance edges",
            model.permissions().len(),
            model.roles().len(),
            model.hierarchy().edge_count()
        );

        Ok(model)
    }
}
