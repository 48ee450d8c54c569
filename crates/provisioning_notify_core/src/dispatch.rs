//! Routing contract of the HTTP dispatcher that feeds the queue.
//!
//! The dispatcher itself is managed infrastructure; this module only records
//! which requests it accepts and which message attributes it attaches, so
//! consumers and tests agree on one shape.

use crate::action::Action;
use crate::contract::{QueueMessage, ACTION_ATTRIBUTE, USER_ID_ATTRIBUTE};

pub const CONTACT_CENTER_RESOURCE: &str = "contactcenter";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchRoute {
    pub action: Action,
    pub user_id: u64,
}

impl DispatchRoute {
    /// `PUT /contactcenter/{user_id}` provisions, `DELETE` deprovisions.
    /// The user id must be numeric.
    pub fn resolve(method: &str, path: &str) -> Option<Self> {
        let action = action_for_method(method)?;

        let mut segments = path.trim_matches('/').split('/');
        if segments.next()? != CONTACT_CENTER_RESOURCE {
            return None;
        }
        let user_segment = segments.next()?;
        if segments.next().is_some() {
            return None;
        }
        if user_segment.is_empty() || !user_segment.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let user_id = user_segment.parse::<u64>().ok()?;

        Some(Self { action, user_id })
    }

    pub fn method(&self) -> &'static str {
        match self.action {
            Action::Provision => "PUT",
            Action::Deprovision => "DELETE",
        }
    }

    pub fn path(&self) -> String {
        format!("/{CONTACT_CENTER_RESOURCE}/{}", self.user_id)
    }

    pub fn to_queue_message(&self, body: Option<String>) -> QueueMessage {
        QueueMessage {
            message_id: None,
            body,
            attributes: Default::default(),
        }
        .with_attribute(ACTION_ATTRIBUTE, self.action.as_str())
        .with_attribute(USER_ID_ATTRIBUTE, self.user_id.to_string())
    }
}

fn action_for_method(method: &str) -> Option<Action> {
    match method {
        "PUT" => Some(Action::Provision),
        "DELETE" => Some(Action::Deprovision),
        _ => None,
    }
}
