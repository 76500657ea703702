use std::sync::Arc;

use tracing::info;

use super::domain::{Notification, NotificationFeed, NotificationId};
use super::repository::NotificationRepository;
use crate::auth::{assert_owner, Principal};
use crate::error::ServiceError;

/// Recipient-scoped read-state operations.
pub struct NotificationService<S> {
    store: Arc<S>,
}

impl<S> NotificationService<S>
where
    S: NotificationRepository + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn list(&self, principal: &Principal) -> Result<NotificationFeed, ServiceError> {
        let notifications = self.store.notifications_for(&principal.id)?;
        let unread_count = notifications
            .iter()
            .filter(|notification| !notification.read)
            .count();
        Ok(NotificationFeed {
            notifications,
            unread_count,
        })
    }

    pub fn mark_read(
        &self,
        principal: &Principal,
        id: &NotificationId,
    ) -> Result<Notification, ServiceError> {
        let notification = self.owned(principal, id, "read this notification")?;
        if notification.read {
            return Ok(notification);
        }
        Ok(self.store.mark_notification_read(&notification.id)?)
    }

    /// Idempotent: a second call finds nothing unread and reports zero.
    pub fn mark_all_read(&self, principal: &Principal) -> Result<usize, ServiceError> {
        let updated = self.store.mark_all_notifications_read(&principal.id)?;
        info!(recipient = %principal.id, updated, "notifications marked read");
        Ok(updated)
    }

    pub fn delete(&self, principal: &Principal, id: &NotificationId) -> Result<(), ServiceError> {
        let notification = self.owned(principal, id, "delete this notification")?;
        self.store.delete_notification(&notification.id)?;
        Ok(())
    }

    fn owned(
        &self,
        principal: &Principal,
        id: &NotificationId,
        action: &str,
    ) -> Result<Notification, ServiceError> {
        let notification = self
            .store
            .fetch_notification(id)?
            .ok_or(ServiceError::NotFound("notification"))?;
        assert_owner(&notification, principal, action)?;
        Ok(notification)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::PrincipalId;
    use crate::notifications::{deliver, WorkflowEvent};
    use crate::store::MemoryStore;
    use std::time::Duration;

    fn seeded() -> (NotificationService<MemoryStore>, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::default());
        for company in ["u1", "u1", "u3"] {
            deliver(
                store.as_ref(),
                &WorkflowEvent::CompanyFollowed {
                    company: PrincipalId::new(company),
                    seeker: PrincipalId::new("u9"),
                    seeker_name: "Robin".to_string(),
                },
                Duration::from_secs(1),
            );
        }
        (NotificationService::new(store.clone()), store)
    }

    #[test]
    fn list_reports_unread_count() {
        let (service, _) = seeded();
        let feed = service
            .list(&Principal::employer("u1", "Acme"))
            .expect("feed loads");
        assert_eq!(feed.notifications.len(), 2);
        assert_eq!(feed.unread_count, 2);
    }

    #[test]
    fn mark_read_is_recipient_only() {
        let (service, _) = seeded();
        let owner = Principal::employer("u1", "Acme");
        let stranger = Principal::employer("u3", "Globex");
        let id = service.list(&owner).unwrap().notifications[0].id.clone();

        assert!(matches!(
            service.mark_read(&stranger, &id),
            Err(ServiceError::Forbidden(_))
        ));
        let updated = service.mark_read(&owner, &id).expect("owner marks read");
        assert!(updated.read);
        assert_eq!(service.list(&owner).unwrap().unread_count, 1);
        assert!(matches!(
            service.mark_read(&owner, &NotificationId::new("ntf-missing")),
            Err(ServiceError::NotFound("notification"))
        ));
    }

    #[test]
    fn mark_all_read_is_idempotent() {
        let (service, _) = seeded();
        let owner = Principal::employer("u1", "Acme");

        assert_eq!(service.mark_all_read(&owner).unwrap(), 2);
        assert!(service
            .list(&owner)
            .unwrap()
            .notifications
            .iter()
            .all(|notification| notification.read));

        assert_eq!(service.mark_all_read(&owner).unwrap(), 0);
        let feed = service.list(&owner).unwrap();
        assert_eq!(feed.unread_count, 0);
        assert!(feed.notifications.iter().all(|notification| notification.read));

        let other = service
            .list(&Principal::employer("u3", "Globex"))
            .unwrap();
        assert_eq!(other.unread_count, 1);
    }

    #[test]
    fn delete_is_recipient_only() {
        let (service, store) = seeded();
        let owner = Principal::employer("u3", "Globex");
        let id = service.list(&owner).unwrap().notifications[0].id.clone();

        assert!(matches!(
            service.delete(&Principal::seeker("u9", "Robin"), &id),
            Err(ServiceError::Forbidden(_))
        ));
        service.delete(&owner, &id).expect("recipient deletes");
        assert!(store.fetch_notification(&id).unwrap().is_none());
    }
}
