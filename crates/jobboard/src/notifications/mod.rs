//! Notifications created as side effects of workflow events, plus the
//! recipient's read/unread operations.

pub mod dispatcher;
pub mod domain;
pub mod repository;
pub mod router;
pub mod service;

pub use dispatcher::{
    deliver, spawn_dispatcher, DeliveryReport, DispatchError, InlineNotifier, NotificationSink,
    QueuedNotifier,
};
pub use domain::{
    Notification, NotificationFeed, NotificationId, NotificationKind, WorkflowEvent,
};
pub use repository::NotificationRepository;
pub use router::notification_router;
pub use service::NotificationService;
