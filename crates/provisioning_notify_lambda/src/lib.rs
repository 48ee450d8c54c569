//! AWS-oriented adapters and handler for provisioning notifications.
//!
//! This crate owns runtime integration details (the Lambda handler, SQS event
//! conversion, configuration and logging setup) on top of the transport-neutral
//! contracts in `provisioning_notify_core`.

pub mod adapters;
pub mod config;
pub mod error;
pub mod handlers;
pub mod telemetry;
