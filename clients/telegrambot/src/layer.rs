//! Tracing layer that copies error events to a Telegram chat.
//!
//! `on_event` runs synchronously inside the logging call, so the layer only
//! queues the rendered record. [`ErrorForwarder::run`] drains the queue and
//! performs the HTTP calls.

use std::fmt::{self, Write};
use std::future::Future;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::field::{Field, Visit};
use tracing::{warn, Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer};

use crate::bot::TelegramBot;

/// Creates the layer and the forwarder that delivers what it captures to `chat_id`.
pub fn error_forwarding(bot: TelegramBot, chat_id: i64) -> (TelegramErrorLayer, ErrorForwarder) {
    let (sender, receiver) = mpsc::unbounded_channel();
    (
        TelegramErrorLayer { sender },
        ErrorForwarder {
            bot,
            chat_id,
            receiver,
        },
    )
}

/// Captures `ERROR` level events; other levels pass through untouched.
pub struct TelegramErrorLayer {
    sender: UnboundedSender<String>,
}

impl<S: Subscriber> Layer<S> for TelegramErrorLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        if *metadata.level() != Level::ERROR {
            return;
        }

        let mut record = RecordText::default();
        event.record(&mut record);
        // The forwarder is gone during shutdown; dropping the record is fine then.
        let _ = self.sender.send(record.render(metadata.target()));
    }
}

/// Delivers captured error records one by one.
pub struct ErrorForwarder {
    bot: TelegramBot,
    chat_id: i64,
    receiver: UnboundedReceiver<String>,
}

impl ErrorForwarder {
    /// Runs until every [`TelegramErrorLayer`] feeding it has been dropped or
    /// `shutdown` resolves. Records queued before `shutdown` are still delivered.
    pub async fn run(mut self, shutdown: impl Future<Output = ()>) {
        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                biased;
                received = self.receiver.recv() => match received {
                    Some(text) => self.forward(&text).await,
                    None => return,
                },
                _ = &mut shutdown => break,
            }
        }

        while let Ok(text) = self.receiver.try_recv() {
            self.forward(&text).await;
        }
    }

    async fn forward(&self, text: &str) {
        if let Err(err) = self.bot.push_message(self.chat_id, text).await {
            // Must stay below ERROR, or the failure would be forwarded again.
            warn!(error = %err, "failed to forward error record to telegram");
        }
    }
}

#[derive(Default)]
struct RecordText {
    message: String,
    fields: String,
}

impl RecordText {
    fn render(self, target: &str) -> String {
        let mut text = format!("ERROR {target}: {}", self.message);
        if !self.fields.is_empty() {
            text.push_str(" |");
            text.push_str(&self.fields);
        }
        text
    }
}

impl Visit for RecordText {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message.push_str(value);
        } else {
            let _ = write!(self.fields, " {}={}", field.name(), value);
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            let _ = write!(self.message, "{value:?}");
        } else {
            let _ = write!(self.fields, " {}={:?}", field.name(), value);
        }
    }
}
