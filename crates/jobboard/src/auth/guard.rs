use super::principal::{Principal, PrincipalId, Role};

/// Failure raised by the role and ownership guards.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("authentication required")]
    Unauthenticated,
    #[error("invalid or expired credential")]
    InvalidCredential,
    #[error("{0}")]
    Forbidden(String),
}

/// Entities that carry a persisted owner reference.
pub trait Owned {
    fn owner_id(&self) -> &PrincipalId;
}

/// Resolve the caller, failing when no principal accompanies the request.
pub fn require_principal(principal: Option<Principal>) -> Result<Principal, AuthError> {
    principal.ok_or(AuthError::Unauthenticated)
}

/// Gate an operation on the caller's verified role.
pub fn require_role<'a>(
    principal: Option<&'a Principal>,
    allowed: &[Role],
) -> Result<&'a Principal, AuthError> {
    let principal = principal.ok_or(AuthError::Unauthenticated)?;
    if allowed.contains(&principal.role) {
        return Ok(principal);
    }

    let required = allowed
        .iter()
        .map(|role| role.label())
        .collect::<Vec<_>>()
        .join(" or ");
    Err(AuthError::Forbidden(format!(
        "this action requires the {required} role; current role is {}",
        principal.role
    )))
}

/// Compare the stored owner of `entity` with the caller.
pub fn assert_owner<E: Owned + ?Sized>(
    entity: &E,
    principal: &Principal,
    action: &str,
) -> Result<(), AuthError> {
    if entity.owner_id() == &principal.id {
        Ok(())
    } else {
        Err(AuthError::Forbidden(format!("not authorized to {action}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Listing {
        owner: PrincipalId,
    }

    impl Owned for Listing {
        fn owner_id(&self) -> &PrincipalId {
            &self.owner
        }
    }

    #[test]
    fn require_role_distinguishes_missing_and_wrong_roles() {
        let seeker = Principal::seeker("u1", "Sam Seeker");

        assert_eq!(
            require_role(None, &[Role::Employer]),
            Err(AuthError::Unauthenticated)
        );
        match require_role(Some(&seeker), &[Role::Employer]) {
            Err(AuthError::Forbidden(message)) => {
                assert!(message.contains("employer"));
                assert!(message.contains("seeker"));
            }
            other => panic!("expected forbidden, got {other:?}"),
        }
        let allowed = require_role(Some(&seeker), &[Role::Seeker, Role::Employer])
            .expect("seeker allowed");
        assert_eq!(allowed.id, seeker.id);
    }

    #[test]
    fn require_principal_rejects_anonymous_callers() {
        assert_eq!(require_principal(None), Err(AuthError::Unauthenticated));
        let employer = Principal::employer("u2", "Acme");
        assert_eq!(require_principal(Some(employer.clone())), Ok(employer));
    }

    #[test]
    fn assert_owner_compares_persisted_owner() {
        let listing = Listing {
            owner: PrincipalId::new("u2"),
        };
        let owner = Principal::employer("u2", "Acme");
        let other = Principal::employer("u3", "Globex");

        assert!(assert_owner(&listing, &owner, "update this job").is_ok());
        assert_eq!(
            assert_owner(&listing, &other, "update this job"),
            Err(AuthError::Forbidden(
                "not authorized to update this job".to_string()
            ))
        );
    }
}
