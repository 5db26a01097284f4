//! 매매 신호 타입.
//!
//! 이 모듈은 신호 생성기가 만들어내는 매매 신호 관련 타입을 정의합니다:
//! - `Side` - 매수/매도 방향
//! - `Signal` - 한 평가 사이클에서 도출된 신호

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 주문/포지션 방향.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Side {
    /// 매수
    Buy,
    /// 매도
    Sell,
}

impl Side {
    /// 반대 방향을 반환합니다.
    pub fn opposite(&self) -> Self {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }

    /// 문자열로 변환합니다.
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Buy => "BUY",
            Side::Sell => "SELL",
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Side {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "BUY" => Ok(Side::Buy),
            "SELL" => Ok(Side::Sell),
            _ => Err(format!("알 수 없는 방향: {}", s)),
        }
    }
}

/// 한 평가 사이클에서 도출된 매매 신호.
///
/// 신호는 매 사이클 지표에서 새로 계산되며 영속화되지 않습니다.
/// 사이클당 최대 하나의 신호만 생성됩니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Signal {
    /// 신호 방향
    pub side: Side,
    /// 거래 심볼
    pub symbol: String,
    /// 신호 생성 시점의 마지막 RSI 값
    pub rsi: f64,
    /// 신호 생성 타임스탬프
    pub timestamp: DateTime<Utc>,
}

impl Signal {
    /// 새 신호를 생성합니다.
    pub fn new(side: Side, symbol: impl Into<String>, rsi: f64) -> Self {
        Self {
            side,
            symbol: symbol.into(),
            rsi,
            timestamp: Utc::now(),
        }
    }
}
