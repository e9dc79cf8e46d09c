pub mod telegram;

pub use telegram::TelegramNotifier;

use anyhow::Result;

/// Delivery channel for a rendered digest. An `Err` means the message was not
/// delivered and the run must not be recorded as seen.
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, text: &str) -> Result<()>;
    fn name(&self) -> &str;
}
