//! Shared provisioning notification primitives.
//!
//! This crate owns the action vocabulary, the queue message and dispatch
//! contracts, and the notification text. It intentionally excludes AWS SDK and
//! Lambda runtime concerns.

pub mod action;
pub mod contract;
pub mod dispatch;
pub mod notification;
pub mod settings;
