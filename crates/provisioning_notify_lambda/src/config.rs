use provisioning_notify_core::action::Action;
use provisioning_notify_core::contract::RECIPIENT_EMAIL_PARAMETER;
use provisioning_notify_core::settings::{DeliveryFailurePolicy, NotificationChannel};

use crate::error::ConfigError;

pub const NOTIFICATION_CHANNEL_VAR: &str = "NOTIFICATION_CHANNEL";
pub const SENDER_EMAIL_VAR: &str = "SENDER_EMAIL";
pub const TOPIC_ARN_VAR: &str = "TOPIC_ARN";
pub const REGION_VAR: &str = "CDK_DEFAULT_REGION";
pub const RECIPIENT_PARAMETER_VAR: &str = "RECIPIENT_PARAMETER_NAME";
pub const DELIVERY_FAILURE_POLICY_VAR: &str = "DELIVERY_FAILURE_POLICY";
pub const BOUND_ACTION_VAR: &str = "BOUND_ACTION";

/// Where delivered notifications go, with the settings that channel needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkTarget {
    Email { sender_email: String },
    Topic { topic_arn: String },
}

impl SinkTarget {
    pub fn channel(&self) -> NotificationChannel {
        match self {
            Self::Email { .. } => NotificationChannel::Email,
            Self::Topic { .. } => NotificationChannel::Sns,
        }
    }
}

/// Settings that shape how one batch is handled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationHandlerConfig {
    pub recipient_parameter: String,
    pub failure_policy: DeliveryFailurePolicy,
    /// Used only when a message has no `action` attribute at all.
    pub bound_action: Option<Action>,
}

impl Default for NotificationHandlerConfig {
    fn default() -> Self {
        Self {
            recipient_parameter: RECIPIENT_EMAIL_PARAMETER.to_string(),
            failure_policy: DeliveryFailurePolicy::default(),
            bound_action: None,
        }
    }
}

/// Everything the Lambda binary reads from its environment at cold start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    pub region: Option<String>,
    pub sink: SinkTarget,
    pub handler: NotificationHandlerConfig,
}

impl RuntimeConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup. Blank values
    /// count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let channel = match read(NOTIFICATION_CHANNEL_VAR) {
            Some(value) => value.parse::<NotificationChannel>()?,
            None => NotificationChannel::default(),
        };

        let sink = match channel {
            NotificationChannel::Email => SinkTarget::Email {
                sender_email: read(SENDER_EMAIL_VAR).ok_or(ConfigError::Missing {
                    variable: SENDER_EMAIL_VAR,
                    channel,
                })?,
            },
            NotificationChannel::Sns => SinkTarget::Topic {
                topic_arn: read(TOPIC_ARN_VAR).ok_or(ConfigError::Missing {
                    variable: TOPIC_ARN_VAR,
                    channel,
                })?,
            },
        };

        let failure_policy = match read(DELIVERY_FAILURE_POLICY_VAR) {
            Some(value) => value.parse::<DeliveryFailurePolicy>()?,
            None => DeliveryFailurePolicy::default(),
        };

        let bound_action = match read(BOUND_ACTION_VAR) {
            Some(value) => Some(
                Action::parse(&value).ok_or(ConfigError::InvalidBoundAction { value })?,
            ),
            None => None,
        };

        Ok(Self {
            region: read(REGION_VAR),
            sink,
            handler: NotificationHandlerConfig {
                recipient_parameter: read(RECIPIENT_PARAMETER_VAR)
                    .unwrap_or_else(|| RECIPIENT_EMAIL_PARAMETER.to_string()),
                failure_policy,
                bound_action,
            },
        })
    }
}
