//! Request-time authorization contract for the HTTP layer
//!
//! The HTTP layer resolves a [`Principal`] from its session, then asks the
//! guard whether a route's required permission is granted. The guard never
//! reports which role or permission was missing.
//!
//! A session principal carrying a role that is no longer in the catalog is
//! denied and its session is revoked through the [`SessionRevoker`] seam,
//! forcing re-authentication. Evaluating a principal that does not come from
//! the current session ([`AccessGuard::evaluate`]) never revokes anything.

use dashmap::DashMap;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use crate::engine::AuthorizationEngine;
use crate::error::{RbacError, Result};
use crate::types::{Decision, PermissionId, Principal, RoleId};

/// How long a stale session stays revoked
pub const DEFAULT_REVOCATION_TTL: Duration = Duration::from_secs(15 * 60);

/// Outcome of a guarded request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardOutcome {
    Allow,
    Deny,
    /// Denied because the role set references roles missing from the catalog
    Reauthenticate,
}

impl GuardOutcome {
    /// `Reauthenticate` is a deny
    pub fn decision(&self) -> Decision {
        match self {
            GuardOutcome::Allow => Decision::Allow,
            GuardOutcome::Deny | GuardOutcome::Reauthenticate => Decision::Deny,
        }
    }
}

/// Session store hook used to force re-authentication
pub trait SessionRevoker: Send + Sync {
    /// Invalidate the session `principal` was resolved from
    fn revoke(&self, principal: &Principal);
}

/// Revoker for deployments without a session store
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopRevoker;

impl SessionRevoker for NoopRevoker {
    fn revoke(&self, _principal: &Principal) {}
}

#[derive(Debug)]
struct Revocation {
    /// Role set the session presented when it was found stale
    roles: BTreeSet<RoleId>,
    revoked_at: Instant,
}

/// In-memory revocation list keyed by principal id
///
/// An entry only matches the exact role set that was found stale: a principal
/// that re-authenticates with a valid role set is reinstated on its next
/// request. Entries expire after the configured TTL and expired entries are
/// purged on every revocation.
#[derive(Debug)]
pub struct RevocationList {
    revoked: DashMap<String, Revocation>,
    ttl: Duration,
}

impl Default for RevocationList {
    fn default() -> Self {
        Self::with_ttl(DEFAULT_REVOCATION_TTL)
    }
}

impl RevocationList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            revoked: DashMap::new(),
            ttl,
        }
    }

    /// Whether `principal` still presents the role set it was revoked with
    ///
    /// Expired entries and entries for another role set are dropped.
    pub fn is_revoked(&self, principal: &Principal) -> bool {
        let Some(live) = self.revoked.get(&principal.id).map(|entry| {
            entry.roles == principal.roles && entry.revoked_at.elapsed() < self.ttl
        }) else {
            return false;
        };

        if !live {
            debug!("Reinstating principal {}", principal.id);
            self.revoked.remove(&principal.id);
        }

        live
    }

    /// Lift a revocation explicitly
    pub fn reinstate(&self, principal_id: &str) -> bool {
        self.revoked.remove(principal_id).is_some()
    }

    /// Drop every expired entry
    pub fn purge_expired(&self) {
        self.revoked
            .retain(|_, entry| entry.revoked_at.elapsed() < self.ttl);
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn len(&self) -> usize {
        self.revoked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.revoked.is_empty()
    }
}

impl SessionRevoker for RevocationList {
    fn revoke(&self, principal: &Principal) {
        self.purge_expired();
        self.revoked.insert(
            principal.id.clone(),
            Revocation {
                roles: principal.roles.clone(),
                revoked_at: Instant::now(),
            },
        );
    }
}

/// Authorization guard shared by every request handler
#[derive(Clone)]
pub struct AccessGuard {
    engine: Arc<AuthorizationEngine>,
    revoker: Arc<dyn SessionRevoker>,
}

impl AccessGuard {
    pub fn new(engine: Arc<AuthorizationEngine>, revoker: Arc<dyn SessionRevoker>) -> Self {
        Self { engine, revoker }
    }

    /// Guard without a session store
    pub fn without_revocation(engine: Arc<AuthorizationEngine>) -> Self {
        Self::new(engine, Arc::new(NoopRevoker))
    }

    /// Decide whether `principal` holds `permission`, without side effects
    ///
    /// A role set referencing unknown roles yields `Reauthenticate`.
    pub fn evaluate(&self, principal: &Principal, permission: &str) -> GuardOutcome {
        match self.engine.authorize(&principal.roles, permission) {
            Ok(Decision::Allow) => GuardOutcome::Allow,
            Ok(Decision::Deny) => {
                debug!(
                    "Denied principal={} permission={}",
                    principal.id, permission
                );
                GuardOutcome::Deny
            }
            Err(e) => {
                debug_assert!(e.is_stale_session(), "unexpected query-time error: {}", e);
                debug!("Stale role set for principal {}: {}", principal.id, e);
                GuardOutcome::Reauthenticate
            }
        }
    }

    /// Decide for the principal of the current session
    ///
    /// A stale role set also revokes the session.
    pub fn require_permission(&self, principal: &Principal, permission: &str) -> GuardOutcome {
        let outcome = self.evaluate(principal, permission);

        if outcome == GuardOutcome::Reauthenticate {
            warn!(
                "Principal {} holds a stale role set; revoking session",
                principal.id
            );
            self.revoker.revoke(principal);
        }

        outcome
    }

    /// Validate a route's required permission when the route is mounted
    ///
    /// # Errors
    ///
    /// `UnknownPermission` if the permission is not registered.
    pub fn gate(&self, permission: impl Into<PermissionId>) -> Result<PermissionGate> {
        let permission = permission.into();

        if !self.engine.model().permissions().exists(&permission) {
            return Err(RbacError::UnknownPermission(permission));
        }

        Ok(PermissionGate {
            guard: self.clone(),
            permission: Arc::from(permission),
        })
    }

    pub fn engine(&self) -> &Arc<AuthorizationEngine> {
        &self.engine
    }
}

/// A guard bound to one validated permission
#[derive(Clone)]
pub struct PermissionGate {
    guard: AccessGuard,
    permission: Arc<str>,
}

impl PermissionGate {
    pub fn check(&self, principal: &Principal) -> GuardOutcome {
        self.guard.require_permission(principal, &self.permission)
    }

    pub fn permission(&self) -> &str {
        &self.permission
    }
}
