use serde::{Deserialize, Serialize};

use crate::action::Action;

pub const PROVISIONING_SUBJECT: &str = "Provisioning Notification";
pub const PROVISIONING_BODY: &str = "Resource has been provisioned.";
pub const DEPROVISIONING_SUBJECT: &str = "Deprovisioning Notification";
pub const DEPROVISIONING_BODY: &str = "Resource has been deprovisioned.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationRequest {
    pub subject: String,
    pub body_text: String,
}

impl NotificationRequest {
    pub fn for_action(action: Action) -> Self {
        let (subject, body_text) = match action {
            Action::Provision => (PROVISIONING_SUBJECT, PROVISIONING_BODY),
            Action::Deprovision => (DEPROVISIONING_SUBJECT, DEPROVISIONING_BODY),
        };
        Self {
            subject: subject.to_string(),
            body_text: body_text.to_string(),
        }
    }

    pub fn html_body(&self) -> String {
        format!(
            "<html><body><h1>{}</h1><p>{}</p></body></html>",
            escape_html(&self.subject),
            escape_html(&self.body_text)
        )
    }
}

/// A notification request addressed to a resolved recipient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub action: Action,
    pub recipient: String,
    pub request: NotificationRequest,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<u64>,
}

impl Notification {
    pub fn new(action: Action, recipient: impl Into<String>, user_id: Option<u64>) -> Self {
        Self {
            action,
            recipient: recipient.into(),
            request: NotificationRequest::for_action(action),
            user_id,
        }
    }

    pub fn subject(&self) -> &str {
        &self.request.subject
    }

    pub fn body_text(&self) -> &str {
        &self.request.body_text
    }
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}
