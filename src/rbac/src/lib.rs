//! # TETRIX Role-Permission Authorization
//!
//! Hierarchical role-based access control for the TETRIX platform.
//!
//! ## Features
//!
//! - **Catalogs** of permissions and namespaced roles, frozen after load
//! - **Role hierarchy** as a DAG with cycle rejection and memoized ancestors
//! - **Default-deny engine** resolving effective permissions per role set,
//!   cached per distinct role set in a `DashMap`
//! - **Access guard** for the HTTP layer, revoking stale sessions
//! - **axum router** exposing checks, introspection, health and metrics
//!
//! ## Example
//!
//! ```rust
//! use tetrix_rbac::{AuthorizationEngine, Decision, ModelDefinition};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let model = ModelDefinition::builtin()?.load()?;
//!     let engine = AuthorizationEngine::new(model);
//!
//!     let decision = engine.authorize(["senior_labeler"], "dataset:annotate")?;
//!     assert_eq!(decision, Decision::Allow);
//!
//!     Ok(())
//! }
//! ```

pub mod bindings;
pub mod catalog;
pub mod config;
pub mod engine;
pub mod error;
pub mod guard;
pub mod hierarchy;
pub mod http;
pub mod model;
pub mod types;

// Re-export commonly used types
pub use bindings::RolePermissionBindings;
pub use catalog::{PermissionCatalog, RoleCatalog};
pub use config::ServerConfig;
pub use engine::{AuthorizationEngine, AuthzModel, CacheConfig, CacheStats, EngineConfig};
pub use error::{DefinitionKind, RbacError, Result};
pub use guard::{AccessGuard, GuardOutcome, NoopRevoker, RevocationList, SessionRevoker};
pub use hierarchy::RoleHierarchy;
pub use model::{InheritanceEdge, ModelDefinition};
pub use types::{Decision, Namespace, PermissionId, Principal, Role, RoleId};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
