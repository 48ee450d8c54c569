use provisioning_notify_core::notification::Notification;
use provisioning_notify_core::settings::NotificationChannel;

/// Delivery channel for a single notification. Returns the provider's message
/// id when one is available.
pub trait NotificationSink {
    fn channel(&self) -> NotificationChannel;

    fn deliver(&self, notification: &Notification) -> Result<Option<String>, String>;
}
