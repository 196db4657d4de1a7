//! Authorization engine
//!
//! Resolves a role set into its effective permission set (direct grants of
//! every role plus those of all ancestors) and answers point-in-time
//! authorization queries with default-deny semantics.
//!
//! ```text
//! roles ─▶ normalize ─▶ [cache] ─▶ {role} ∪ ancestors ─▶ direct grants ─▶ union
//!                                                                         │
//!                         authorize(required) ◀── membership test ◀───────┘
//! ```

pub mod cache;
pub mod metrics;

pub use cache::{CacheConfig, CacheStats, PermissionCache, PermissionSet};
pub use metrics::{EngineMetrics, MetricsCollector};

use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::debug;

use crate::bindings::RolePermissionBindings;
use crate::catalog::{PermissionCatalog, RoleCatalog};
use crate::error::{RbacError, Result};
use crate::hierarchy::RoleHierarchy;
use crate::types::{Decision, RoleId};

/// Frozen permission catalog, role catalog, hierarchy and bindings
///
/// Construction verifies every component is frozen and that the hierarchy
/// and bindings were built over the same catalogs.
#[derive(Debug, Clone)]
pub struct AuthzModel {
    permissions: Arc<PermissionCatalog>,
    roles: Arc<RoleCatalog>,
    hierarchy: Arc<RoleHierarchy>,
    bindings: Arc<RolePermissionBindings>,
}

impl AuthzModel {
    pub fn new(hierarchy: RoleHierarchy, bindings: RolePermissionBindings) -> Result<Self> {
        let roles = Arc::clone(bindings.role_catalog());
        let permissions = Arc::clone(bindings.permission_catalog());

        if !Arc::ptr_eq(hierarchy.role_catalog(), &roles) {
            return Err(RbacError::InvalidModel(
                "hierarchy and bindings use different role catalogs".to_string(),
            ));
        }

        if !permissions.is_frozen() {
            return Err(RbacError::NotFrozen("permission catalog"));
        }
        if !roles.is_frozen() {
            return Err(RbacError::NotFrozen("role catalog"));
        }
        if !hierarchy.is_frozen() {
            return Err(RbacError::NotFrozen("role hierarchy"));
        }
        if !bindings.is_frozen() {
            return Err(RbacError::NotFrozen("role permission bindings"));
        }

        Ok(Self {
            permissions,
            roles,
            hierarchy: Arc::new(hierarchy),
            bindings: Arc::new(bindings),
        })
    }

    pub fn permissions(&self) -> &PermissionCatalog {
        &self.permissions
    }

    pub fn roles(&self) -> &RoleCatalog {
        &self.roles
    }

    pub fn hierarchy(&self) -> &RoleHierarchy {
        &self.hierarchy
    }

    pub fn bindings(&self) -> &RolePermissionBindings {
        &self.bindings
    }
}

/// Engine configuration
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Memoize effective permission sets per role set
    pub enable_cache: bool,

    /// Cache configuration
    pub cache: CacheConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            enable_cache: true,
            cache: CacheConfig::default(),
        }
    }
}

/// Authorization engine over a frozen [`AuthzModel`]
///
/// All queries are synchronous, in-memory and safe to call from any number of
/// threads through a shared reference.
pub struct AuthorizationEngine {
    model: AuthzModel,
    cache: Option<PermissionCache>,
    metrics: MetricsCollector,
}

impl AuthorizationEngine {
    pub fn new(model: AuthzModel) -> Self {
        Self::with_config(model, EngineConfig::default())
    }

    pub fn with_config(model: AuthzModel, config: EngineConfig) -> Self {
        let cache = config.enable_cache.then(|| PermissionCache::new(config.cache));

        Self {
            model,
            cache,
            metrics: MetricsCollector::new(),
        }
    }

    /// Union of direct and inherited permissions of every role in `roles`
    ///
    /// Duplicate roles collapse and order is irrelevant. An empty role set
    /// yields an empty permission set.
    ///
    /// # Errors
    ///
    /// `UnknownRole` if any role is missing from the catalog. Unknown roles
    /// are never skipped.
    pub fn effective_permissions<I, R>(&self, roles: I) -> Result<PermissionSet>
    where
        I: IntoIterator<Item = R>,
        R: AsRef<str>,
    {
        let key = self.normalize(roles)?;

        if key.is_empty() {
            return Ok(PermissionSet::default());
        }

        if let Some(cached) = self.cache.as_ref().and_then(|cache| cache.get(&key)) {
            return Ok(cached);
        }

        debug!("Resolving effective permissions for {:?}", key);
        let resolved = Arc::new(self.resolve(&key)?);

        Ok(match &self.cache {
            Some(cache) => cache.insert(key, resolved),
            None => resolved,
        })
    }

    /// Default-deny membership test against the effective permission set
    ///
    /// A required permission that is not registered is never granted.
    pub fn authorize<I, R>(&self, roles: I, required: &str) -> Result<Decision>
    where
        I: IntoIterator<Item = R>,
        R: AsRef<str>,
    {
        let effective = self.effective_permissions(roles)?;

        let decision = if effective.contains(required) {
            Decision::Allow
        } else {
            Decision::Deny
        };

        self.metrics.record_decision(decision.is_allowed());
        Ok(decision)
    }

    /// Sorted, deduplicated role tuple; rejects unknown roles
    fn normalize<I, R>(&self, roles: I) -> Result<Vec<RoleId>>
    where
        I: IntoIterator<Item = R>,
        R: AsRef<str>,
    {
        let mut key = BTreeSet::new();

        for role in roles {
            let role = role.as_ref();
            if !self.model.roles.exists(role) {
                self.metrics.record_unknown_role();
                return Err(RbacError::UnknownRole(role.to_string()));
            }
            key.insert(role.to_string());
        }

        Ok(key.into_iter().collect())
    }

    fn resolve(&self, roles: &[RoleId]) -> Result<BTreeSet<String>> {
        let mut effective = BTreeSet::new();

        for role in roles {
            let ancestors = self.model.hierarchy.ancestors_of(role)?;

            for member in std::iter::once(role).chain(ancestors.iter()) {
                if let Some(direct) = self.model.bindings.direct(member) {
                    effective.extend(direct.iter().cloned());
                }
            }
        }

        Ok(effective)
    }

    pub fn model(&self) -> &AuthzModel {
        &self.model
    }

    /// Drop every memoized role set
    pub fn invalidate_cache(&self) {
        if let Some(cache) = &self.cache {
            cache.clear();
        }
    }

    /// Cache statistics; all zero when caching is disabled
    pub fn cache_stats(&self) -> CacheStats {
        self.cache
            .as_ref()
            .map(PermissionCache::stats)
            .unwrap_or_default()
    }

    pub fn metrics(&self) -> EngineMetrics {
        self.metrics.snapshot()
    }

    pub fn export_prometheus(&self) -> String {
        self.metrics.export_prometheus(&self.cache_stats())
    }
}
