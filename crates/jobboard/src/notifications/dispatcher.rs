use std::ops::AddAssign;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::domain::WorkflowEvent;
use super::repository::NotificationRepository;
use crate::config::NotificationConfig;

/// Outbound hook the workflows hand their events to. Failures are reported to
/// the caller, which logs them; they never fail the triggering operation.
pub trait NotificationSink: Send + Sync {
    fn dispatch(&self, event: WorkflowEvent) -> Result<(), DispatchError>;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DispatchError {
    #[error("notification queue is full")]
    QueueFull,
    #[error("notification dispatcher has shut down")]
    Closed,
}

/// Outcome of delivering one event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    pub delivered: usize,
    pub failed: usize,
    pub dropped: usize,
}

impl AddAssign for DeliveryReport {
    fn add_assign(&mut self, other: Self) {
        self.delivered += other.delivered;
        self.failed += other.failed;
        self.dropped += other.dropped;
    }
}

/// Create one notification per recipient until `deadline` elapses; the rest
/// are dropped. Individual insert failures are logged and skipped.
pub fn deliver<R>(repository: &R, event: &WorkflowEvent, deadline: Duration) -> DeliveryReport
where
    R: NotificationRepository + ?Sized,
{
    let started = Instant::now();
    let recipients = event.recipients();
    let mut report = DeliveryReport::default();

    for (index, recipient) in recipients.iter().enumerate() {
        if started.elapsed() >= deadline {
            report.dropped = recipients.len() - index;
            warn!(
                kind = event.kind().label(),
                dropped = report.dropped,
                delivered = report.delivered,
                "notification fan-out deadline reached; dropping remaining recipients"
            );
            break;
        }

        let notification = event.notification_for(recipient, Utc::now());
        match repository.insert_notification(notification) {
            Ok(_) => report.delivered += 1,
            Err(err) => {
                report.failed += 1;
                warn!(
                    kind = event.kind().label(),
                    recipient = %recipient,
                    error = %err,
                    "failed to create notification"
                );
            }
        }
    }

    debug!(
        kind = event.kind().label(),
        delivered = report.delivered,
        failed = report.failed,
        dropped = report.dropped,
        "notification event delivered"
    );
    report
}

/// Delivers on the caller's thread.
pub struct InlineNotifier<R> {
    repository: Arc<R>,
    deadline: Duration,
}

impl<R> InlineNotifier<R>
where
    R: NotificationRepository + 'static,
{
    pub fn new(repository: Arc<R>, config: &NotificationConfig) -> Self {
        Self {
            repository,
            deadline: config.fanout_deadline,
        }
    }
}

impl<R> NotificationSink for InlineNotifier<R>
where
    R: NotificationRepository + 'static,
{
    fn dispatch(&self, event: WorkflowEvent) -> Result<(), DispatchError> {
        deliver(self.repository.as_ref(), &event, self.deadline);
        Ok(())
    }
}

/// Hands events to the background dispatcher without waiting.
#[derive(Clone)]
pub struct QueuedNotifier {
    sender: mpsc::Sender<WorkflowEvent>,
}

impl NotificationSink for QueuedNotifier {
    fn dispatch(&self, event: WorkflowEvent) -> Result<(), DispatchError> {
        self.sender.try_send(event).map_err(|err| match err {
            TrySendError::Full(_) => DispatchError::QueueFull,
            TrySendError::Closed(_) => DispatchError::Closed,
        })
    }
}

/// Start the background dispatcher. The task ends once every `QueuedNotifier`
/// clone is dropped and the queue is drained, yielding the running totals.
pub fn spawn_dispatcher<R>(
    repository: Arc<R>,
    config: &NotificationConfig,
) -> (QueuedNotifier, JoinHandle<DeliveryReport>)
where
    R: NotificationRepository + 'static,
{
    let (sender, mut receiver) = mpsc::channel::<WorkflowEvent>(config.queue_capacity.max(1));
    let deadline = config.fanout_deadline;

    let handle = tokio::spawn(async move {
        let mut totals = DeliveryReport::default();
        while let Some(event) = receiver.recv().await {
            let repository = repository.clone();
            let kind = event.kind();
            let outcome =
                tokio::task::spawn_blocking(move || deliver(repository.as_ref(), &event, deadline))
                    .await;
            match outcome {
                Ok(report) => totals += report,
                Err(err) => warn!(
                    kind = kind.label(),
                    error = %err,
                    "notification delivery task failed"
                ),
            }
        }
        debug!(
            delivered = totals.delivered,
            failed = totals.failed,
            dropped = totals.dropped,
            "notification dispatcher stopped"
        );
        totals
    });

    (QueuedNotifier { sender }, handle)
}
