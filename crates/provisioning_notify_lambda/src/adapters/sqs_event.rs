use aws_lambda_events::event::sqs::{SqsEvent, SqsMessage, SqsMessageAttribute};
use provisioning_notify_core::contract::QueueMessage;

pub fn queue_messages_from_event(event: SqsEvent) -> Vec<QueueMessage> {
    event.records.into_iter().map(queue_message_from_sqs).collect()
}

/// Keeps only attributes that carry a string value (`String` and `Number`
/// data types, including custom suffixes such as `Number.int`).
pub fn queue_message_from_sqs(message: SqsMessage) -> QueueMessage {
    let attributes = message
        .message_attributes
        .into_iter()
        .filter_map(|(name, attribute)| textual_value(attribute).map(|value| (name, value)))
        .collect();

    QueueMessage {
        message_id: message.message_id,
        body: message.body,
        attributes,
    }
}

fn textual_value(attribute: SqsMessageAttribute) -> Option<String> {
    let is_textual = attribute
        .data_type
        .as_deref()
        .map(|data_type| data_type.starts_with("String") || data_type.starts_with("Number"))
        .unwrap_or(true);
    if is_textual {
        attribute.string_value
    } else {
        None
    }
}
