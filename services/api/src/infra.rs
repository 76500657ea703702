use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use jobboard::auth::{AccountRecord, AccountsError, Role, StaticTokenVerifier};
use jobboard::{MemoryStore, RepositoryError};
use metrics_exporter_prometheus::PrometheusHandle;
use tracing::warn;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) const DEMO_SEEKER_TOKEN: &str = "demo-seeker-token";
pub(crate) const DEMO_EMPLOYER_TOKEN: &str = "demo-employer-token";

/// Fallback accounts for local runs without an accounts file.
pub(crate) fn demo_accounts() -> Vec<AccountRecord> {
    vec![
        AccountRecord {
            token: DEMO_SEEKER_TOKEN.to_string(),
            id: "u1".to_string(),
            role: Role::Seeker,
            display_name: "Sam Seeker".to_string(),
        },
        AccountRecord {
            token: DEMO_EMPLOYER_TOKEN.to_string(),
            id: "u2".to_string(),
            role: Role::Employer,
            display_name: "Acme Hiring".to_string(),
        },
    ]
}

pub(crate) fn load_verifier(
    accounts_file: Option<&Path>,
) -> Result<StaticTokenVerifier, AccountsError> {
    match accounts_file {
        Some(path) => StaticTokenVerifier::from_path(path),
        None => {
            warn!("no accounts file configured; serving with demo bearer tokens");
            StaticTokenVerifier::from_accounts(demo_accounts())
        }
    }
}

/// Make every verifiable principal resolvable as a follow target.
pub(crate) fn register_principals(
    store: &MemoryStore,
    verifier: &StaticTokenVerifier,
) -> Result<usize, RepositoryError> {
    let mut registered = 0;
    for principal in verifier.principals() {
        store.register_principal(principal.clone())?;
        registered += 1;
    }
    Ok(registered)
}
