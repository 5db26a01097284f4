//! 체결 기록 및 포지션 추적 타입.
//!
//! 이 모듈은 다음 타입을 정의합니다:
//! - `TradeStatus` - 영속 체결 레코드의 상태
//! - `TradeRecord` - trades 테이블을 반영하는 영속 체결 레코드
//! - `TrackedPosition` - 트래커가 메모리에 보관하는 미청산 티켓

use crate::domain::Side;
use crate::types::{Lots, Price};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 영속 체결 레코드의 상태.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TradeStatus {
    /// 미청산
    Open,
    /// 청산 완료
    Closed,
    /// 취소
    Cancelled,
}

impl TradeStatus {
    /// 문자열로 변환합니다.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "OPEN",
            Self::Closed => "CLOSED",
            Self::Cancelled => "CANCELLED",
        }
    }
}

impl std::str::FromStr for TradeStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "OPEN" => Ok(Self::Open),
            "CLOSED" => Ok(Self::Closed),
            "CANCELLED" => Ok(Self::Cancelled),
            _ => Err(format!("알 수 없는 체결 상태: {}", s)),
        }
    }
}

/// 영속 체결 레코드.
///
/// 주문 디스패치 성공 시 OPEN 상태로 생성되고, 포지션 생명주기 트래커가
/// 청산을 확인하면 CLOSED로 갱신됩니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeRecord {
    /// 소유 사용자 ID
    pub user_id: i64,
    /// 터미널 티켓 번호
    pub ticket: u64,
    /// 거래 심볼
    pub symbol: String,
    /// 방향
    pub side: Side,
    /// 랏 수량
    pub lot: Lots,
    /// 진입 가격
    pub open_price: Price,
    /// 청산 가격 (청산 전에는 None)
    pub close_price: Option<Price>,
    /// 손절 가격
    pub stop_loss: Option<Price>,
    /// 익절 가격
    pub take_profit: Option<Price>,
    /// 실현 손익
    pub profit: Option<Decimal>,
    /// 상태
    pub status: TradeStatus,
    /// 진입 시간
    pub open_time: DateTime<Utc>,
    /// 청산 시간
    pub close_time: Option<DateTime<Utc>>,
    /// 코멘트
    pub comment: String,
}

/// 트래커가 메모리에 보관하는 미청산 티켓.
///
/// 디스패처가 주문을 성공적으로 접수하면 생성되고, 트래커가 청산을
/// 확인하면 (조정 성공 여부와 무관하게) 제거됩니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedPosition {
    /// 소유 사용자 ID
    pub user_id: i64,
    /// 터미널 티켓 번호
    pub ticket: u64,
    /// 주문 접수 시점
    pub opened_at: DateTime<Utc>,
}

impl TrackedPosition {
    /// 새 추적 항목을 생성합니다.
    pub fn new(user_id: i64, ticket: u64, opened_at: DateTime<Utc>) -> Self {
        Self {
            user_id,
            ticket,
            opened_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trade_status_str() {
        assert_eq!(TradeStatus::Open.as_str(), "OPEN");
        assert_eq!(TradeStatus::Closed.as_str(), "CLOSED");
    }
}
