use provisioning_notify_core::action::Action;
use provisioning_notify_core::settings::{NotificationChannel, ParseSettingError};
use thiserror::Error;

/// Cold-start configuration problems.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{variable} must be configured for the {channel} channel")]
    Missing {
        variable: &'static str,
        channel: NotificationChannel,
    },

    #[error(transparent)]
    InvalidSetting(#[from] ParseSettingError),

    #[error("invalid bound action '{value}', expected provision or deprovision")]
    InvalidBoundAction { value: String },
}

/// Failures that abort a batch invocation.
#[derive(Debug, Error)]
pub enum NotificationHandlerError {
    #[error("failed to resolve recipient from parameter '{parameter}': {message}")]
    RecipientLookup { parameter: String, message: String },

    #[error("parameter '{parameter}' holds an empty recipient address")]
    EmptyRecipient { parameter: String },

    #[error("failed to deliver {action} notification for message {message_id}: {message}")]
    Delivery {
        message_id: String,
        action: Action,
        message: String,
    },
}
