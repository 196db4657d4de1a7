//! Error types for the authorization model

use std::fmt;
use thiserror::Error;

use crate::types::{PermissionId, RoleId};

/// Kind of definition that was registered twice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefinitionKind {
    Permission,
    Role,
}

impl fmt::Display for DefinitionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefinitionKind::Permission => write!(f, "permission"),
            DefinitionKind::Role => write!(f, "role"),
        }
    }
}

/// Authorization model errors
///
/// Everything except [`RbacError::UnknownRole`] is a load-time configuration
/// error and should stop the process from starting.
#[derive(Debug, Error)]
pub enum RbacError {
    /// Identifier registered more than once
    #[error("Duplicate {kind} definition: {id}")]
    DuplicateDefinition { kind: DefinitionKind, id: String },

    /// Role not present in the role catalog
    #[error("Unknown role: {0}")]
    UnknownRole(RoleId),

    /// Permission not present in the permission catalog
    #[error("Unknown permission: {0}")]
    UnknownPermission(PermissionId),

    /// Inheritance edge would close a cycle
    #[error("Cycle detected in role hierarchy: {0}")]
    CycleDetected(String),

    /// Edge added after the hierarchy was frozen
    #[error("Role hierarchy is frozen")]
    HierarchyFrozen,

    /// Mutation of a frozen catalog or binding table
    #[error("{0} is frozen")]
    Frozen(&'static str),

    /// Engine built over a component that was never frozen
    #[error("{0} must be frozen before serving queries")]
    NotFrozen(&'static str),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Components that do not belong together
    #[error("Invalid model: {0}")]
    InvalidModel(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Model file parse error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl RbacError {
    /// Whether this error can surface at query time for a live session.
    pub fn is_stale_session(&self) -> bool {
        matches!(self, RbacError::UnknownRole(_))
    }
}

/// Result type for authorization model operations
pub type Result<T> = std::result::Result<T, RbacError>;
