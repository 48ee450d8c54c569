pub mod notification_sink;
pub mod parameter_store;
pub mod sqs_event;
