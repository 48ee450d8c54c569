use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {setting} value '{value}', expected one of: {expected}")]
pub struct ParseSettingError {
    pub setting: &'static str,
    pub value: String,
    pub expected: &'static str,
}

/// Delivery channel for notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationChannel {
    /// Direct email through SES.
    Email,
    /// Publish to a topic with an email subscription.
    #[default]
    Sns,
}

impl NotificationChannel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Sns => "sns",
        }
    }
}

impl FromStr for NotificationChannel {
    type Err = ParseSettingError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "email" | "ses" => Ok(Self::Email),
            "sns" => Ok(Self::Sns),
            _ => Err(ParseSettingError {
                setting: "notification channel",
                value: value.to_string(),
                expected: "email, sns",
            }),
        }
    }
}

impl fmt::Display for NotificationChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What happens when a notification cannot be delivered.
///
/// `LogAndDrop` keeps the queue message as processed; `LogAndRaise` fails the
/// invocation so the queue redelivers the batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeliveryFailurePolicy {
    #[default]
    LogAndDrop,
    LogAndRaise,
}

impl DeliveryFailurePolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::LogAndDrop => "log-and-drop",
            Self::LogAndRaise => "log-and-raise",
        }
    }
}

impl FromStr for DeliveryFailurePolicy {
    type Err = ParseSettingError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "log-and-drop" | "drop" => Ok(Self::LogAndDrop),
            "log-and-raise" | "raise" => Ok(Self::LogAndRaise),
            _ => Err(ParseSettingError {
                setting: "delivery failure policy",
                value: value.to_string(),
                expected: "log-and-drop, log-and-raise",
            }),
        }
    }
}

impl fmt::Display for DeliveryFailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
