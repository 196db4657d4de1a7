//! Immutable registries of permissions and roles
//!
//! Both catalogs are populated once at startup and frozen before the engine
//! serves queries. After `freeze()` every registration fails.

mod permission;
mod role;

pub use permission::PermissionCatalog;
pub use role::RoleCatalog;
