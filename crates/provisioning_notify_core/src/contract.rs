use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::action::Action;

pub const ACTION_ATTRIBUTE: &str = "action";
pub const USER_ID_ATTRIBUTE: &str = "userID";
pub const RECIPIENT_EMAIL_PARAMETER: &str = "/config/recipient_email";

pub type MessageAttributes = BTreeMap<String, String>;

/// Transport-neutral view of one queued record.
///
/// Only string-valued attributes are kept; the action travels as an attribute
/// and the body is treated as opaque.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueMessage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(default)]
    pub attributes: MessageAttributes,
}

impl QueueMessage {
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn action(&self) -> Option<Action> {
        self.attribute(ACTION_ATTRIBUTE).and_then(Action::parse)
    }

    /// Raw `action` attribute, recognized or not.
    pub fn raw_action(&self) -> Option<&str> {
        self.attribute(ACTION_ATTRIBUTE)
    }

    pub fn user_id(&self) -> Option<u64> {
        self.attribute(USER_ID_ATTRIBUTE)
            .and_then(|value| value.trim().parse::<u64>().ok())
    }

    pub fn display_id(&self) -> &str {
        self.message_id.as_deref().unwrap_or("<unknown>")
    }
}
