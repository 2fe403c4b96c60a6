//! Telegram delivery: Bot API client, position notifiers and an error log forwarder.

mod bot;
mod layer;
mod notifier;

pub use bot::{ParseMode, SendMessage, TelegramBot, TELEGRAM_API_BASE};
pub use layer::{error_forwarding, ErrorForwarder, TelegramErrorLayer};
pub use notifier::TelegramNotifier;
