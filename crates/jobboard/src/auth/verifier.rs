use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use axum::http::{header, HeaderMap};
use serde::Deserialize;

use super::guard::{require_principal, AuthError};
use super::principal::{Principal, PrincipalId, Role};

/// Turns an opaque bearer token into a verified principal.
pub trait CredentialVerifier: Send + Sync {
    fn verify(&self, token: &str) -> Result<Principal, AuthError>;
}

/// Extract the bearer token from request headers, if one was supplied.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

/// Resolve the caller from headers: no header is `Unauthenticated`, a bad token
/// `InvalidCredential`.
pub fn authenticate(
    verifier: &dyn CredentialVerifier,
    headers: &HeaderMap,
) -> Result<Principal, AuthError> {
    let principal = bearer_token(headers)
        .map(|token| verifier.verify(token))
        .transpose()?;
    require_principal(principal)
}

/// One entry of the accounts file.
#[derive(Debug, Clone, Deserialize)]
pub struct AccountRecord {
    pub token: String,
    pub id: String,
    pub role: Role,
    pub display_name: String,
}

impl AccountRecord {
    pub fn principal(&self) -> Principal {
        Principal {
            id: PrincipalId::new(self.id.clone()),
            role: self.role,
            display_name: self.display_name.clone(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AccountsError {
    #[error("unable to read accounts file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("accounts file {} is not valid JSON: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("token for account '{0}' is already assigned")]
    DuplicateToken(String),
}

/// Fixed token table, loaded once at startup.
#[derive(Debug, Clone, Default)]
pub struct StaticTokenVerifier {
    tokens: HashMap<String, Principal>,
}

impl StaticTokenVerifier {
    pub fn from_accounts(accounts: Vec<AccountRecord>) -> Result<Self, AccountsError> {
        let mut tokens = HashMap::with_capacity(accounts.len());
        for account in accounts {
            let principal = account.principal();
            if tokens.insert(account.token, principal).is_some() {
                return Err(AccountsError::DuplicateToken(account.id));
            }
        }
        Ok(Self { tokens })
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, AccountsError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| AccountsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let accounts: Vec<AccountRecord> =
            serde_json::from_str(&raw).map_err(|source| AccountsError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        Self::from_accounts(accounts)
    }

    pub fn principals(&self) -> impl Iterator<Item = &Principal> {
        self.tokens.values()
    }
}

impl CredentialVerifier for StaticTokenVerifier {
    fn verify(&self, token: &str) -> Result<Principal, AuthError> {
        self.tokens
            .get(token)
            .cloned()
            .ok_or(AuthError::InvalidCredential)
    }
}
