//! Caller identity and the role/ownership guards every workflow runs through.

pub mod guard;
pub mod principal;
pub mod verifier;

pub use guard::{assert_owner, require_principal, require_role, AuthError, Owned};
pub use principal::{Principal, PrincipalDirectory, PrincipalId, Role};
pub use verifier::{
    authenticate, bearer_token, AccountRecord, AccountsError, CredentialVerifier,
    StaticTokenVerifier,
};
