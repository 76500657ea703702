use std::sync::Arc;

use axum::http::HeaderMap;

use crate::auth::{authenticate, CredentialVerifier, Principal};
use crate::error::ServiceError;

/// Router state: one component service plus the verifier that resolves callers.
pub struct ApiState<T> {
    pub service: Arc<T>,
    pub verifier: Arc<dyn CredentialVerifier>,
}

impl<T> ApiState<T> {
    pub fn new(service: Arc<T>, verifier: Arc<dyn CredentialVerifier>) -> Self {
        Self { service, verifier }
    }

    pub fn principal(&self, headers: &HeaderMap) -> Result<Principal, ServiceError> {
        Ok(authenticate(self.verifier.as_ref(), headers)?)
    }
}

impl<T> Clone for ApiState<T> {
    fn clone(&self) -> Self {
        Self {
            service: self.service.clone(),
            verifier: self.verifier.clone(),
        }
    }
}
