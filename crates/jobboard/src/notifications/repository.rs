use super::domain::{Notification, NotificationId};
use crate::auth::PrincipalId;
use crate::store::RepositoryError;

/// Storage abstraction for notifications. Only the `read` flag is mutable.
pub trait NotificationRepository: Send + Sync {
    fn insert_notification(&self, notification: Notification)
        -> Result<Notification, RepositoryError>;
    fn fetch_notification(
        &self,
        id: &NotificationId,
    ) -> Result<Option<Notification>, RepositoryError>;
    fn mark_notification_read(&self, id: &NotificationId)
        -> Result<Notification, RepositoryError>;
    /// Flip every unread notification of `recipient`; returns how many changed.
    fn mark_all_notifications_read(&self, recipient: &PrincipalId)
        -> Result<usize, RepositoryError>;
    fn delete_notification(&self, id: &NotificationId) -> Result<Notification, RepositoryError>;
    /// Newest first.
    fn notifications_for(&self, recipient: &PrincipalId)
        -> Result<Vec<Notification>, RepositoryError>;
}
