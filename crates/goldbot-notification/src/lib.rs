//! # Goldbot Notification
//!
//! 포지션 진입/청산 및 시스템 오류 알림을 텔레그램으로 전송합니다.
//! 알림 실패는 거래 흐름을 멈추지 않습니다 (로깅 후 계속).

pub mod telegram;
pub mod types;

pub use telegram::{TelegramConfig, TelegramSender};
pub use types::{
    Notification, NotificationError, NotificationEvent, NotificationPriority, NotificationResult,
    NotificationSender,
};
