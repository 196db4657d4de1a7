//! Core authorization types

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::error::{RbacError, Result};

/// Unique role identifier (e.g. "senior_labeler")
pub type RoleId = String;

/// Unique permission identifier, namespaced like `resource:action`
pub type PermissionId = String;

/// Product area a role belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Namespace {
    Core,
    DataAnnotator,
    Academy,
    Enterprise,
}

impl Namespace {
    pub const ALL: [Namespace; 4] = [
        Namespace::Core,
        Namespace::DataAnnotator,
        Namespace::Academy,
        Namespace::Enterprise,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Namespace::Core => "core",
            Namespace::DataAnnotator => "data-annotator",
            Namespace::Academy => "academy",
            Namespace::Enterprise => "enterprise",
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Namespace {
    type Err = RbacError;

    fn from_str(s: &str) -> Result<Self> {
        Namespace::ALL
            .into_iter()
            .find(|ns| ns.as_str() == s)
            .ok_or_else(|| RbacError::InvalidInput(format!("Unknown namespace: {}", s)))
    }
}

/// Registered role
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Role {
    /// Role identifier
    pub id: RoleId,

    /// Namespace the role belongs to
    pub namespace: Namespace,

    /// Human readable description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Role {
    pub fn new(id: impl Into<RoleId>, namespace: Namespace) -> Self {
        Self {
            id: id.into(),
            namespace,
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Authenticated actor whose role set is evaluated
///
/// Roles have set semantics: duplicates collapse and order is irrelevant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// Principal identifier (e.g., "user:alice@example.com")
    pub id: String,

    /// Roles resolved by the session layer
    #[serde(default)]
    pub roles: BTreeSet<RoleId>,
}

impl Principal {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            roles: BTreeSet::new(),
        }
    }

    pub fn with_role(mut self, role: impl Into<RoleId>) -> Self {
        self.roles.insert(role.into());
        self
    }

    pub fn with_roles<I, R>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<RoleId>,
    {
        self.roles.extend(roles.into_iter().map(Into::into));
        self
    }
}

/// Authorization decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Allow,
    Deny,
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Decision::Allow => f.write_str("allow"),
            Decision::Deny => f.write_str("deny"),
        }
    }
}

/// Reject empty identifiers and identifiers containing whitespace.
pub(crate) fn validate_identifier(kind: &str, id: &str) -> Result<()> {
    if id.is_empty() {
        return Err(RbacError::InvalidInput(format!("{} identifier cannot be empty", kind)));
    }

    if id.chars().any(char::is_whitespace) {
        return Err(RbacError::InvalidInput(format!(
            "{} identifier '{}' cannot contain whitespace",
            kind, id
        )));
    }

    Ok(())
}
