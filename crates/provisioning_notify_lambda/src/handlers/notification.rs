use aws_lambda_events::event::sqs::SqsEvent;
use provisioning_notify_core::action::Action;
use provisioning_notify_core::contract::QueueMessage;
use provisioning_notify_core::notification::Notification;
use provisioning_notify_core::settings::DeliveryFailurePolicy;
use serde::{Deserialize, Serialize};

use crate::adapters::notification_sink::NotificationSink;
use crate::adapters::parameter_store::ParameterStore;
use crate::adapters::sqs_event::queue_messages_from_event;
use crate::config::NotificationHandlerConfig;
use crate::error::NotificationHandlerError;

const COMPONENT: &str = "notification_handler";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub received: usize,
    pub notified: usize,
    pub skipped: usize,
    pub delivery_failures: usize,
}

pub fn handle_sqs_event(
    event: SqsEvent,
    config: &NotificationHandlerConfig,
    parameter_store: &impl ParameterStore,
    sink: &dyn NotificationSink,
) -> Result<BatchSummary, NotificationHandlerError> {
    let messages = queue_messages_from_event(event);
    handle_queue_batch(&messages, config, parameter_store, sink)
}

/// Processes a batch sequentially, one notification per recognized action.
///
/// The recipient is looked up on the first recognized message and reused for
/// the rest of this batch only. Lookup failures abort the batch; delivery
/// failures follow `config.failure_policy`.
pub fn handle_queue_batch(
    messages: &[QueueMessage],
    config: &NotificationHandlerConfig,
    parameter_store: &impl ParameterStore,
    sink: &dyn NotificationSink,
) -> Result<BatchSummary, NotificationHandlerError> {
    tracing::info!(
        component = COMPONENT,
        event = "batch_received",
        records = messages.len(),
        channel = %sink.channel(),
        failure_policy = %config.failure_policy,
    );

    let mut summary = BatchSummary {
        received: messages.len(),
        ..BatchSummary::default()
    };
    let mut recipient_cache: Option<String> = None;

    for message in messages {
        let Some(action) = resolve_action(message, config.bound_action) else {
            tracing::info!(
                component = COMPONENT,
                event = "message_skipped",
                message_id = message.display_id(),
                action = message.raw_action().unwrap_or("<missing>"),
            );
            summary.skipped += 1;
            continue;
        };

        let recipient = match &recipient_cache {
            Some(value) => value.clone(),
            None => {
                let value = resolve_recipient(&config.recipient_parameter, parameter_store)?;
                recipient_cache = Some(value.clone());
                value
            }
        };

        let notification = Notification::new(action, recipient, message.user_id());
        match sink.deliver(&notification) {
            Ok(provider_message_id) => {
                tracing::info!(
                    component = COMPONENT,
                    event = "notification_sent",
                    message_id = message.display_id(),
                    action = %action,
                    user_id = ?notification.user_id,
                    subject = notification.subject(),
                    provider_message_id = provider_message_id.as_deref().unwrap_or("<none>"),
                );
                summary.notified += 1;
            }
            Err(error) => {
                tracing::error!(
                    component = COMPONENT,
                    event = "notification_failed",
                    message_id = message.display_id(),
                    action = %action,
                    channel = %sink.channel(),
                    error = %error,
                );
                summary.delivery_failures += 1;
                if config.failure_policy == DeliveryFailurePolicy::LogAndRaise {
                    return Err(NotificationHandlerError::Delivery {
                        message_id: message.display_id().to_string(),
                        action,
                        message: error,
                    });
                }
            }
        }
    }

    tracing::info!(
        component = COMPONENT,
        event = "batch_completed",
        received = summary.received,
        notified = summary.notified,
        skipped = summary.skipped,
        delivery_failures = summary.delivery_failures,
    );

    Ok(summary)
}

/// A present but unrecognized attribute is never replaced by the bound action.
fn resolve_action(message: &QueueMessage, bound_action: Option<Action>) -> Option<Action> {
    match message.raw_action() {
        Some(raw) => Action::parse(raw),
        None => bound_action,
    }
}

fn resolve_recipient(
    parameter: &str,
    parameter_store: &impl ParameterStore,
) -> Result<String, NotificationHandlerError> {
    let value = parameter_store
        .get_parameter(parameter)
        .map_err(|message| NotificationHandlerError::RecipientLookup {
            parameter: parameter.to_string(),
            message,
        })?;

    let recipient = value.trim();
    if recipient.is_empty() {
        return Err(NotificationHandlerError::EmptyRecipient {
            parameter: parameter.to_string(),
        });
    }

    tracing::debug!(
        component = COMPONENT,
        event = "recipient_resolved",
        parameter = parameter,
    );
    Ok(recipient.to_string())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use provisioning_notify_core::contract::{ACTION_ATTRIBUTE, USER_ID_ATTRIBUTE};
    use provisioning_notify_core::notification::{DEPROVISIONING_SUBJECT, PROVISIONING_SUBJECT};
    use provisioning_notify_core::settings::NotificationChannel;

    use super::*;

    const RECIPIENT: &str = "oncall@example.com";

    struct RecordingSink {
        delivered: Mutex<Vec<Notification>>,
    }

    impl RecordingSink {
        fn new() -> Self {
            Self {
                delivered: Mutex::new(Vec::new()),
            }
        }

        fn delivered(&self) -> Vec<Notification> {
            self.delivered.lock().expect("poisoned mutex").clone()
        }
    }

    impl NotificationSink for RecordingSink {
        fn channel(&self) -> NotificationChannel {
            NotificationChannel::Email
        }

        fn deliver(&self, notification: &Notification) -> Result<Option<String>, String> {
            let mut delivered = self.delivered.lock().expect("poisoned mutex");
            delivered.push(notification.clone());
            Ok(Some(format!("provider-{}", delivered.len())))
        }
    }

    /// Fails deliveries for the listed actions and records the rest.
    struct SelectiveFailSink {
        failing: Vec<Action>,
        inner: RecordingSink,
    }

    impl NotificationSink for SelectiveFailSink {
        fn channel(&self) -> NotificationChannel {
            NotificationChannel::Sns
        }

        fn deliver(&self, notification: &Notification) -> Result<Option<String>, String> {
            if self.failing.contains(&notification.action) {
                return Err("simulated throttling from notification service".to_string());
            }
            self.inner.deliver(notification)
        }
    }

    struct StaticParameterStore {
        values: HashMap<String, String>,
        lookups: Mutex<usize>,
    }

    impl StaticParameterStore {
        fn with_recipient(value: &str) -> Self {
            Self {
                values: HashMap::from([(
                    "/config/recipient_email".to_string(),
                    value.to_string(),
                )]),
                lookups: Mutex::new(0),
            }
        }

        fn lookups(&self) -> usize {
            *self.lookups.lock().expect("poisoned mutex")
        }
    }

    impl ParameterStore for StaticParameterStore {
        fn get_parameter(&self, name: &str) -> Result<String, String> {
            *self.lookups.lock().expect("poisoned mutex") += 1;
            self.values
                .get(name)
                .cloned()
                .ok_or_else(|| format!("ParameterNotFound: {name}"))
        }
    }

    fn message(id: &str, action: Option<&str>) -> QueueMessage {
        let message = QueueMessage {
            message_id: Some(id.to_string()),
            body: Some("{}".to_string()),
            attributes: Default::default(),
        };
        match action {
            Some(value) => message.with_attribute(ACTION_ATTRIBUTE, value),
            None => message,
        }
    }

    #[test]
    fn provision_sends_one_provisioning_notification() {
        let sink = RecordingSink::new();
        let store = StaticParameterStore::with_recipient(RECIPIENT);

        let summary = handle_queue_batch(
            &[message("m-1", Some("provision"))],
            &NotificationHandlerConfig::default(),
            &store,
            &sink,
        )
        .expect("batch should succeed");

        let delivered = sink.delivered();
        assert_eq!(delivered.len(), 1);
        assert_eq!(delivered[0].subject(), PROVISIONING_SUBJECT);
        assert_eq!(delivered[0].body_text(), "Resource has been provisioned.");
        assert_eq!(summary.notified, 1);
    }

    #[test]
    fn deprovision_sends_one_deprovisioning_notification() {
        let sink = RecordingSink::new();
        let store = StaticParameterStore::with_recipient(RECIPIENT);

        handle_queue_batch(
            &[message("m-1", Some("deprovision"))],
            &NotificationHandlerConfig::default(),
            &store,
            &sink,
        )
        .expect("batch should succeed");

        let delivered = sink.delivered();
        assert_eq!(delivered.len(), 1);
        assert_eq!(delivered[0].subject(), DEPROVISIONING_SUBJECT);
    }

    #[test]
    fn missing_or_unknown_actions_are_skipped_without_lookup() {
        let sink = RecordingSink::new();
        let store = StaticParameterStore::with_recipient(RECIPIENT);

        let summary = handle_queue_batch(
            &[
                message("m-1", None),
                message("m-2", Some("suspend")),
                message("m-3", Some("PROVISION")),
            ],
            &NotificationHandlerConfig::default(),
            &store,
            &sink,
        )
        .expect("unrecognized actions are not errors");

        assert!(sink.delivered().is_empty());
        assert_eq!(summary.skipped, 3);
        assert_eq!(store.lookups(), 0);
    }

    #[test]
    fn recipient_comes_from_parameter_store() {
        let sink = RecordingSink::new();
        let store = StaticParameterStore::with_recipient("  team-lead@example.com ");

        handle_queue_batch(
            &[message("m-1", Some("provision"))],
            &NotificationHandlerConfig::default(),
            &store,
            &sink,
        )
        .expect("batch should succeed");

        assert_eq!(sink.delivered()[0].recipient, "team-lead@example.com");
    }

    #[test]
    fn recipient_is_looked_up_once_per_batch() {
        let sink = RecordingSink::new();
        let store = StaticParameterStore::with_recipient(RECIPIENT);
        let config = NotificationHandlerConfig::default();
        let batch = [
            message("m-1", Some("provision")),
            message("m-2", Some("deprovision")),
            message("m-3", Some("provision")),
        ];

        handle_queue_batch(&batch, &config, &store, &sink).expect("first batch");
        assert_eq!(store.lookups(), 1);

        handle_queue_batch(&batch, &config, &store, &sink).expect("second batch");
        assert_eq!(store.lookups(), 2);
        assert_eq!(sink.delivered().len(), 6);
    }

    #[test]
    fn delivery_failure_is_swallowed_by_default() {
        let sink = SelectiveFailSink {
            failing: vec![Action::Provision],
            inner: RecordingSink::new(),
        };
        let store = StaticParameterStore::with_recipient(RECIPIENT);

        let summary = handle_queue_batch(
            &[
                message("m-1", Some("provision")),
                message("m-2", Some("deprovision")),
            ],
            &NotificationHandlerConfig::default(),
            &store,
            &sink,
        )
        .expect("delivery failure should not fail the batch");

        assert_eq!(summary.delivery_failures, 1);
        assert_eq!(summary.notified, 1);
        assert_eq!(sink.inner.delivered()[0].subject(), DEPROVISIONING_SUBJECT);
    }

    #[test]
    fn delivery_failure_raises_when_configured() {
        let sink = SelectiveFailSink {
            failing: vec![Action::Provision],
            inner: RecordingSink::new(),
        };
        let store = StaticParameterStore::with_recipient(RECIPIENT);
        let config = NotificationHandlerConfig {
            failure_policy: DeliveryFailurePolicy::LogAndRaise,
            ..NotificationHandlerConfig::default()
        };

        let error = handle_queue_batch(
            &[
                message("m-1", Some("provision")),
                message("m-2", Some("deprovision")),
            ],
            &config,
            &store,
            &sink,
        )
        .expect_err("delivery failure should surface");

        assert!(matches!(
            error,
            NotificationHandlerError::Delivery { ref message_id, action: Action::Provision, .. }
                if message_id == "m-1"
        ));
        assert!(sink.inner.delivered().is_empty());
    }

    #[test]
    fn recipient_lookup_failure_fails_the_batch() {
        let sink = RecordingSink::new();
        let store = StaticParameterStore::with_recipient(RECIPIENT);
        let config = NotificationHandlerConfig {
            recipient_parameter: "/config/missing".to_string(),
            ..NotificationHandlerConfig::default()
        };

        let error = handle_queue_batch(&[message("m-1", Some("provision"))], &config, &store, &sink)
            .expect_err("lookup failure should propagate");

        assert!(error.to_string().contains("/config/missing"));
        assert!(error.to_string().contains("ParameterNotFound"));
        assert!(sink.delivered().is_empty());
    }

    #[test]
    fn empty_recipient_is_rejected() {
        let sink = RecordingSink::new();
        let store = StaticParameterStore::with_recipient("   ");

        let error = handle_queue_batch(
            &[message("m-1", Some("deprovision"))],
            &NotificationHandlerConfig::default(),
            &store,
            &sink,
        )
        .expect_err("empty recipient should fail");

        assert!(matches!(error, NotificationHandlerError::EmptyRecipient { .. }));
    }

    #[test]
    fn bound_action_applies_only_when_attribute_is_absent() {
        let sink = RecordingSink::new();
        let store = StaticParameterStore::with_recipient(RECIPIENT);
        let config = NotificationHandlerConfig {
            bound_action: Some(Action::Deprovision),
            ..NotificationHandlerConfig::default()
        };

        let summary = handle_queue_batch(
            &[message("m-1", None), message("m-2", Some("suspend"))],
            &config,
            &store,
            &sink,
        )
        .expect("batch should succeed");

        assert_eq!(summary.notified, 1);
        assert_eq!(summary.skipped, 1);
        assert_eq!(sink.delivered()[0].action, Action::Deprovision);
    }

    #[test]
    fn user_id_attribute_is_attached() {
        let sink = RecordingSink::new();
        let store = StaticParameterStore::with_recipient(RECIPIENT);

        handle_queue_batch(
            &[message("m-1", Some("provision")).with_attribute(USER_ID_ATTRIBUTE, "808")],
            &NotificationHandlerConfig::default(),
            &store,
            &sink,
        )
        .expect("batch should succeed");

        assert_eq!(sink.delivered()[0].user_id, Some(808));
    }
}
