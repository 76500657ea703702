use std::fmt;

use serde::{Deserialize, Serialize};

use crate::store::RepositoryError;

/// Identifier of an authenticated account (seeker or employer).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PrincipalId(pub String);

impl PrincipalId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PrincipalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Closed set of roles a verified credential can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Seeker,
    Employer,
}

impl Role {
    pub const fn label(self) -> &'static str {
        match self {
            Role::Seeker => "seeker",
            Role::Employer => "employer",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The actor performing an operation, as resolved by the credential verifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub id: PrincipalId,
    pub role: Role,
    pub display_name: String,
}

impl Principal {
    pub fn new(id: impl Into<String>, role: Role, display_name: impl Into<String>) -> Self {
        Self {
            id: PrincipalId::new(id),
            role,
            display_name: display_name.into(),
        }
    }

    pub fn seeker(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self::new(id, Role::Seeker, display_name)
    }

    pub fn employer(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self::new(id, Role::Employer, display_name)
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.role == role
    }
}

/// Lookup of known principals by id; used to resolve follow targets.
pub trait PrincipalDirectory: Send + Sync {
    fn lookup(&self, id: &PrincipalId) -> Result<Option<Principal>, RepositoryError>;
}
