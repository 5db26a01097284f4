//! 텔레그램 알림 서비스.
//!
//! Telegram Bot API를 통해 진입/청산/시스템 오류 알림을 전송합니다.

use crate::types::{
    Notification, NotificationError, NotificationEvent, NotificationPriority, NotificationResult,
    NotificationSender,
};
use async_trait::async_trait;
use rust_decimal::Decimal;
use tracing::{debug, error, info, warn};

/// 텔레그램 알림 전송 설정.
#[derive(Debug, Clone)]
pub struct TelegramConfig {
    /// @BotFather에서 받은 봇 토큰
    pub bot_token: String,
    /// 메시지를 보낼 채팅 ID
    pub chat_id: String,
    /// 전송 활성화 여부
    pub enabled: bool,
    /// 파싱 모드 (HTML 또는 MarkdownV2)
    pub parse_mode: String,
    /// Bot API 베이스 URL (테스트에서 재정의)
    pub api_base: String,
}

impl TelegramConfig {
    /// 새 텔레그램 설정을 생성합니다.
    pub fn new(bot_token: String, chat_id: String) -> Self {
        Self {
            bot_token,
            chat_id,
            enabled: true,
            parse_mode: "HTML".to_string(),
            api_base: "https://api.telegram.org".to_string(),
        }
    }

    /// Bot API 베이스 URL을 재정의합니다.
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// 환경 변수에서 설정을 생성합니다.
    pub fn from_env() -> Option<Self> {
        let bot_token = std::env::var("TELEGRAM_BOT_TOKEN").ok()?;
        let chat_id = std::env::var("TELEGRAM_CHAT_ID").ok()?;
        let enabled = std::env::var("TELEGRAM_ENABLED")
            .map(|v| v.to_lowercase() == "true")
            .unwrap_or(true);

        Some(Self {
            bot_token,
            chat_id,
            enabled,
            parse_mode: "HTML".to_string(),
            api_base: "https://api.telegram.org".to_string(),
        })
    }
}

/// 텔레그램 알림 전송기.
pub struct TelegramSender {
    config: TelegramConfig,
    client: reqwest::Client,
}

impl TelegramSender {
    /// 새 텔레그램 전송기를 생성합니다.
    pub fn new(config: TelegramConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    /// 환경 변수에서 전송기를 생성합니다.
    pub fn from_env() -> Option<Self> {
        TelegramConfig::from_env().map(Self::new)
    }

    /// 알림을 텔레그램 메시지로 포맷합니다.
    fn format_message(&self, notification: &Notification) -> String {
        let priority_emoji = match notification.priority {
            NotificationPriority::Low => "ℹ️",
            NotificationPriority::Normal => "📊",
            NotificationPriority::High => "⚠️",
            NotificationPriority::Critical => "🚨",
        };

        let content = match &notification.event {
            NotificationEvent::PositionOpened {
                ticket,
                symbol,
                side,
                lot,
                entry_price,
                stop_loss,
                take_profit,
                ..
            } => {
                let side_emoji = if side == "BUY" { "🟢" } else { "🔴" };
                format!(
                    "{side_emoji} <b>포지션 진입</b>\n\n\
                     심볼: <code>{symbol}</code>\n\
                     방향: {side}\n\
                     수량: {lot} 랏\n\
                     진입가: {entry_price}\n\
                     손절가: {stop_loss}\n\
                     익절가: {take_profit}\n\
                     티켓: <code>{ticket}</code>"
                )
            }

            NotificationEvent::PositionClosed {
                ticket,
                symbol,
                side,
                lot,
                entry_price,
                exit_price,
                profit,
                ..
            } => {
                let pnl_emoji = match profit {
                    Some(p) if *p >= Decimal::ZERO => "💰",
                    Some(_) => "📉",
                    None => "❔",
                };
                let exit_text = exit_price
                    .map(|p| p.to_string())
                    .unwrap_or_else(|| "확인 불가".to_string());
                let profit_text = match profit {
                    Some(p) if *p >= Decimal::ZERO => format!("+{p}"),
                    Some(p) => p.to_string(),
                    None => "확인 불가".to_string(),
                };
                format!(
                    "{pnl_emoji} <b>포지션 청산</b>\n\n\
                     심볼: <code>{symbol}</code>\n\
                     방향: {side}\n\
                     수량: {lot} 랏\n\
                     진입가: {entry_price}\n\
                     청산가: {exit_text}\n\
                     손익: <b>{profit_text}</b>\n\
                     티켓: <code>{ticket}</code>"
                )
            }

            NotificationEvent::DailyLimitReached { user_id, limit } => {
                format!(
                    "⛔ <b>일일 거래 한도 도달</b>\n\n\
                     사용자: <code>{user_id}</code>\n\
                     한도: {limit}건\n\
                     자정(UTC)까지 신규 진입이 중단됩니다."
                )
            }

            NotificationEvent::SystemError { component, message } => {
                format!(
                    "🚨 <b>시스템 오류</b>\n\n\
                     구성요소: <code>{component}</code>\n\
                     메시지: {message}"
                )
            }

            NotificationEvent::Custom { title, message } => {
                format!("{priority_emoji} <b>{title}</b>\n\n{message}")
            }
        };

        let timestamp = notification.timestamp.format("%Y-%m-%d %H:%M:%S UTC");
        format!("{content}\n\n<i>🕐 {timestamp}</i>")
    }

    /// 텔레그램에 원시 메시지를 전송합니다.
    async fn send_message(&self, text: &str) -> NotificationResult<()> {
        let url = format!(
            "{}/bot{}/sendMessage",
            self.config.api_base, self.config.bot_token
        );

        let params = serde_json::json!({
            "chat_id": self.config.chat_id,
            "text": text,
            "parse_mode": self.config.parse_mode,
            "disable_web_page_preview": true,
        });

        debug!(
            "Sending Telegram message to chat_id: {}",
            self.config.chat_id
        );

        let response = self
            .client
            .post(&url)
            .json(&params)
            .send()
            .await
            .map_err(NotificationError::NetworkError)?;

        if response.status().is_success() {
            info!("Telegram notification sent successfully");
            Ok(())
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();

            // 요청 한도 제한 확인
            if status.as_u16() == 429 {
                warn!("Telegram rate limited");
                return Err(NotificationError::RateLimited(60));
            }

            error!("Failed to send Telegram message: {} - {}", status, body);
            Err(NotificationError::SendFailed(format!(
                "HTTP {}: {}",
                status, body
            )))
        }
    }
}

#[async_trait]
impl NotificationSender for TelegramSender {
    async fn send(&self, notification: &Notification) -> NotificationResult<()> {
        if !self.is_enabled() {
            debug!("Telegram notifications are disabled, skipping");
            return Ok(());
        }

        let message = self.format_message(notification);
        self.send_message(&message).await
    }

    fn is_enabled(&self) -> bool {
        self.config.enabled && !self.config.bot_token.is_empty() && !self.config.chat_id.is_empty()
    }

    fn name(&self) -> &str {
        "telegram"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sender() -> TelegramSender {
        TelegramSender::new(TelegramConfig::new(
            "test_token".to_string(),
            "123456".to_string(),
        ))
    }

    fn opened_event() -> NotificationEvent {
        NotificationEvent::PositionOpened {
            user_id: 7,
            ticket: 100001,
            symbol: "XAUUSD".to_string(),
            side: "BUY".to_string(),
            lot: dec!(0.10),
            entry_price: dec!(2000.5),
            stop_loss: dec!(2000.0),
            take_profit: dec!(2001.5),
        }
    }

    #[test]
    fn test_format_position_opened() {
        let message = sender().format_message(&Notification::new(opened_event()));
        assert!(message.contains("포지션 진입"));
        assert!(message.contains("XAUUSD"));
        assert!(message.contains("100001"));
        assert!(message.contains("🟢"));
    }

    #[test]
    fn test_format_position_closed_unconfirmed() {
        let notification = Notification::new(NotificationEvent::PositionClosed {
            user_id: 7,
            ticket: 100001,
            symbol: "XAUUSD".to_string(),
            side: "BUY".to_string(),
            lot: dec!(0.10),
            entry_price: dec!(2000.5),
            exit_price: None,
            profit: None,
        });
        let message = sender().format_message(&notification);
        assert!(message.contains("포지션 청산"));
        assert!(message.contains("확인 불가"));
    }

    #[test]
    fn test_format_position_closed_profit() {
        let notification = Notification::new(NotificationEvent::PositionClosed {
            user_id: 7,
            ticket: 100001,
            symbol: "XAUUSD".to_string(),
            side: "SELL".to_string(),
            lot: dec!(0.10),
            entry_price: dec!(2000.5),
            exit_price: Some(dec!(1999.5)),
            profit: Some(dec!(10.0)),
        });
        let message = sender().format_message(&notification);
        assert!(message.contains("💰"));
        assert!(message.contains("+10.0"));
    }

    #[test]
    fn test_format_daily_limit_reached() {
        let notification = Notification::new(NotificationEvent::DailyLimitReached {
            user_id: 7,
            limit: 5,
        });
        let message = sender().format_message(&notification);
        assert!(message.contains("일일 거래 한도 도달"));
        assert!(message.contains("5건"));
    }

    #[test]
    fn test_disabled_without_credentials() {
        let sender = TelegramSender::new(TelegramConfig::new(String::new(), String::new()));
        assert!(!sender.is_enabled());
    }

    #[tokio::test]
    async fn test_send_posts_to_bot_api() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/bottest_token/sendMessage")
            .with_status(200)
            .with_body(r#"{"ok":true}"#)
            .create_async()
            .await;

        let config = TelegramConfig::new("test_token".to_string(), "123456".to_string())
            .with_api_base(server.url());
        let sender = TelegramSender::new(config);

        sender
            .send(&Notification::new(opened_event()))
            .await
            .unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_send_surfaces_http_failure() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/bottest_token/sendMessage")
            .with_status(500)
            .create_async()
            .await;

        let config = TelegramConfig::new("test_token".to_string(), "123456".to_string())
            .with_api_base(server.url());
        let sender = TelegramSender::new(config);

        let result = sender.send(&Notification::new(opened_event())).await;
        assert!(matches!(result, Err(NotificationError::SendFailed(_))));
    }
}
