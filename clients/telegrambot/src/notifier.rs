//! Position notifications rendered as Telegram HTML messages.

use std::fmt::Write;

use anyhow::{Context, Result};
use async_trait::async_trait;

use domain::{LiquidityPoolPosition, Notifier, PositionNotifier, Subject};

use crate::bot::{ParseMode, SendMessage, TelegramBot};

const IN_RANGE: &str = "✅";
const OUT_OF_RANGE: &str = "❌";

/// Sends position reports to the subject's Telegram chat.
pub struct TelegramNotifier {
    bot: TelegramBot,
}

impl TelegramNotifier {
    pub fn new(bot: TelegramBot) -> Self {
        Self { bot }
    }

    async fn send_html(&self, chat_id: i64, text: String) -> Result<()> {
        let message = SendMessage {
            chat_id,
            text,
            parse_mode: Some(ParseMode::Html),
            disable_web_page_preview: true,
        };
        self.bot.send_message(&message).await.context("telegram sendMessage")
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn notify_positions(
        &self,
        subject: &Subject,
        positions: &[LiquidityPoolPosition],
    ) -> Result<()> {
        self.send_html(subject.telegram_user_id, render_report(positions))
            .await
    }
}

#[async_trait]
impl PositionNotifier for TelegramNotifier {
    async fn notify_in_range(&self, subject: &Subject, position: &LiquidityPoolPosition) -> Result<()> {
        self.send_html(subject.telegram_user_id, render_in_range(position))
            .await
    }

    async fn notify_out_of_range(
        &self,
        subject: &Subject,
        position: &LiquidityPoolPosition,
    ) -> Result<()> {
        self.send_html(subject.telegram_user_id, render_out_of_range(position))
            .await
    }
}

fn status(position: &LiquidityPoolPosition) -> &'static str {
    if position.is_in_range() {
        IN_RANGE
    } else {
        OUT_OF_RANGE
    }
}

/// One message covering every position: a status summary line followed by a block per position.
fn render_report(positions: &[LiquidityPoolPosition]) -> String {
    let statuses: Vec<&str> = positions.iter().map(status).collect();
    let mut text = format!("<b>Statuses:</b> {}", statuses.join(" "));
    for position in positions {
        text.push_str("\n\n");
        render_block(&mut text, position);
    }
    text
}

fn render_block(text: &mut String, position: &LiquidityPoolPosition) {
    let token0 = escape_html(&position.token0.symbol);
    let token1 = escape_html(&position.token1.symbol);
    let (share0, share1) = position.token_proportions();

    // Writing into a String cannot fail.
    let _ = write!(
        text,
        "<b>Status: {status}</b>\n\
         <b>Chain:</b> {chain}\n\
         <b>Dex:</b> {dex}\n\
         <b>Position:</b> <a href=\"{link}\">link</a>\n\
         <b>Proportion:</b> {token0} ({share0}%) : {token1} ({share1}%)\n\
         <b>Range low price:</b> 1 {token0} = {low} {token1}\n\
         <b>Range up price:</b> 1 {token0} = {up} {token1}\n\
         <b>Current price:</b> 1 {token0} = {current} {token1}",
        status = status(position),
        chain = position.chain,
        dex = position.dex,
        link = escape_html(&position.position_link),
        share0 = format_number(share0),
        share1 = format_number(share1),
        low = format_number(position.lower_price()),
        up = format_number(position.upper_price()),
        current = format_number(position.current_price()),
    );
}

fn render_in_range(position: &LiquidityPoolPosition) -> String {
    let (share0, share1) = position.token_proportions();
    format!(
        "{IN_RANGE} <a href=\"{}\">Position</a> in range. {} ({}%) : {} ({}%).",
        escape_html(&position.position_link),
        escape_html(&position.token0.symbol),
        format_number(share0),
        escape_html(&position.token1.symbol),
        format_number(share1),
    )
}

fn render_out_of_range(position: &LiquidityPoolPosition) -> String {
    format!(
        "{OUT_OF_RANGE} <a href=\"{}\">Position</a> {} : {} out of range",
        escape_html(&position.position_link),
        escape_html(&position.token0.symbol),
        escape_html(&position.token1.symbol),
    )
}

/// Two decimals with a comma separator, e.g. `4298,34`.
fn format_number(value: f64) -> String {
    format!("{value:.2}").replacen('.', ",", 1)
}

fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::{Chain, Dex, Token};
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{body_json, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn position(current_tick: i32) -> LiquidityPoolPosition {
        LiquidityPoolPosition {
            chain: Chain::Base,
            dex: Dex::UniswapV3,
            position_link: "https://google.com".to_string(),
            token0: Token::new("WETH", 18),
            token1: Token::new("USDC", 6),
            current_tick,
            tick_lower: -192660,
            tick_upper: -190940,
        }
    }

    const IN_RANGE_TEXT: &str = "<b>Statuses:</b> ✅

<b>Status: ✅</b>
<b>Chain:</b> Base
<b>Dex:</b> Uniswap V3
<b>Position:</b> <a href=\"https://google.com\">link</a>
<b>Proportion:</b> WETH (3,49%) : USDC (96,51%)
<b>Range low price:</b> 1 WETH = 4298,34 USDC
<b>Range up price:</b> 1 WETH = 5105,00 USDC
<b>Current price:</b> 1 WETH = 5074,46 USDC";

    const BELOW_RANGE_TEXT: &str = "<b>Statuses:</b> ❌

<b>Status: ❌</b>
<b>Chain:</b> Base
<b>Dex:</b> Uniswap V3
<b>Position:</b> <a href=\"https://google.com\">link</a>
<b>Proportion:</b> WETH (100,00%) : USDC (0,00%)
<b>Range low price:</b> 1 WETH = 4298,34 USDC
<b>Range up price:</b> 1 WETH = 5105,00 USDC
<b>Current price:</b> 1 WETH = 4297,91 USDC";

    const ABOVE_RANGE_TEXT: &str = "<b>Statuses:</b> ❌

<b>Status: ❌</b>
<b>Chain:</b> Base
<b>Dex:</b> Uniswap V3
<b>Position:</b> <a href=\"https://google.com\">link</a>
<b>Proportion:</b> WETH (0,00%) : USDC (100,00%)
<b>Range low price:</b> 1 WETH = 4298,34 USDC
<b>Range up price:</b> 1 WETH = 5105,00 USDC
<b>Current price:</b> 1 WETH = 5105,51 USDC";

    #[test]
    fn test_render_single_position() {
        assert_eq!(render_report(&[position(-191000)]), IN_RANGE_TEXT);
        assert_eq!(render_report(&[position(-192661)]), BELOW_RANGE_TEXT);
        assert_eq!(render_report(&[position(-190939)]), ABOVE_RANGE_TEXT);
    }

    #[test]
    fn test_render_several_positions() {
        let text = render_report(&[position(-191000), position(-190939)]);
        assert!(text.starts_with("<b>Statuses:</b> ✅ ❌\n\n<b>Status: ✅</b>"));
        assert!(text.contains("5074,46 USDC\n\n<b>Status: ❌</b>"));
    }

    #[test]
    fn test_render_single_messages() {
        assert_eq!(
            render_in_range(&position(-191000)),
            "✅ <a href=\"https://google.com\">Position</a> in range. WETH (3,49%) : USDC (96,51%)."
        );
        assert_eq!(
            render_out_of_range(&position(-190939)),
            "❌ <a href=\"https://google.com\">Position</a> WETH : USDC out of range"
        );
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("A&B <x> \"q\""), "A&amp;B &lt;x&gt; &quot;q&quot;");
    }

    #[tokio::test]
    async fn test_notify_positions_sends_html() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_json(json!({
                "chat_id": 555,
                "text": IN_RANGE_TEXT,
                "parse_mode": "HTML",
                "disable_web_page_preview": true
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
            .expect(1)
            .mount(&server)
            .await;

        let bot = TelegramBot::with_base_url(reqwest::Client::new(), "T".to_string(), server.uri());
        let notifier = TelegramNotifier::new(bot);
        let subject = Subject::new(555, vec!["0xabc".to_string()], Duration::from_secs(60)).unwrap();

        notifier
            .notify_positions(&subject, &[position(-191000)])
            .await
            .unwrap();
    }
}
