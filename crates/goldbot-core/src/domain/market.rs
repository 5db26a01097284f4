//! 시장 데이터 타입 및 구조체.
//!
//! 이 모듈은 게이트웨이가 전달하는 시장 데이터 관련 타입을 정의합니다:
//! - `Candle` - OHLCV 캔들스틱 데이터
//! - `Tick` - 현재 매수/매도 호가
//! - `SymbolInfo` - 심볼 메타데이터 (포인트, 틱 가치, 랏 단위)
//! - `AccountSnapshot` - 계좌 스냅샷
//! - `OpenPosition` - 터미널 측 미청산 포지션
//! - `Deal` - 체결 내역 레코드

use crate::types::Price;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// OHLCV 캔들스틱 데이터.
///
/// 캔들 윈도우는 타임스탬프 오름차순으로 정렬되며, 새로 조회할 때마다
/// 전체 윈도우가 교체됩니다 (증분 추가를 보장하지 않음).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candle {
    /// 캔들 시작 시간
    pub open_time: DateTime<Utc>,
    /// 시가
    pub open: Price,
    /// 고가
    pub high: Price,
    /// 저가
    pub low: Price,
    /// 종가
    pub close: Price,
    /// 틱 거래량
    pub volume: Decimal,
}

impl Candle {
    /// 새 캔들을 생성합니다.
    pub fn new(
        open_time: DateTime<Utc>,
        open: Price,
        high: Price,
        low: Price,
        close: Price,
        volume: Decimal,
    ) -> Self {
        Self {
            open_time,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// 양봉(종가 > 시가)인지 확인합니다.
    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }

    /// 음봉(종가 < 시가)인지 확인합니다.
    pub fn is_bearish(&self) -> bool {
        self.close < self.open
    }

    /// 캔들 범위(고가 - 저가)를 반환합니다.
    pub fn range(&self) -> Decimal {
        self.high - self.low
    }
}

/// 현재 시세 틱.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tick {
    /// 거래 심볼
    pub symbol: String,
    /// 최우선 매수 호가
    pub bid: Price,
    /// 최우선 매도 호가
    pub ask: Price,
    /// 틱 시간
    pub time: DateTime<Utc>,
}

impl Tick {
    /// 호가 스프레드(ask - bid)를 반환합니다.
    pub fn spread(&self) -> Decimal {
        (self.ask - self.bid).abs()
    }
}

/// 심볼 메타데이터.
///
/// 포인트와 틱 가치는 브로커가 보고하는 값이며, 사용자 설정의
/// `custom_point`/`custom_tick_value`로 재정의될 수 있습니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymbolInfo {
    /// 거래 심볼
    pub symbol: String,
    /// 최소 가격 단위 (포인트)
    pub point: Decimal,
    /// 가격 소수점 자릿수
    pub digits: u32,
    /// 1 표준 랏 기준 1 포인트 변동의 화폐 가치
    pub tick_value: Decimal,
    /// 게이트웨이가 허용하는 최소 랏 증분
    pub lot_step: Decimal,
    /// 최소 랏
    pub min_lot: Decimal,
    /// 최대 랏
    pub max_lot: Decimal,
}

/// 계좌 스냅샷.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountSnapshot {
    /// 잔고
    pub balance: Decimal,
    /// 평가 자산
    pub equity: Decimal,
    /// 사용 증거금
    #[serde(default)]
    pub margin: Decimal,
    /// 가용 증거금
    #[serde(default)]
    pub free_margin: Decimal,
    /// 미실현 손익
    #[serde(default)]
    pub profit: Decimal,
    /// 계좌 통화
    pub currency: String,
    /// 레버리지
    #[serde(default)]
    pub leverage: u32,
}

/// 터미널 측 미청산 포지션.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenPosition {
    /// 포지션 티켓 번호
    pub ticket: u64,
    /// 거래 심볼
    pub symbol: String,
    /// 방향
    pub side: crate::domain::Side,
    /// 랏 수량
    pub volume: Decimal,
    /// 진입 가격
    pub price_open: Price,
    /// 현재 가격
    pub price_current: Price,
    /// 미실현 손익
    pub profit: Decimal,
    /// 진입 시간
    pub time: DateTime<Utc>,
}

/// 체결(딜) 진입 방향.
///
/// 포지션을 여는 딜은 `In`, 닫는 딜은 `Out`/`OutBy`입니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DealEntry {
    /// 포지션 진입
    In,
    /// 포지션 청산
    Out,
    /// 반대 포지션에 의한 청산
    OutBy,
}

impl DealEntry {
    /// 포지션을 닫는 딜인지 확인합니다.
    pub fn is_closing(&self) -> bool {
        matches!(self, DealEntry::Out | DealEntry::OutBy)
    }
}

/// 체결 내역 레코드.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Deal {
    /// 딜 티켓
    pub ticket: u64,
    /// 연관 주문 티켓
    pub order: u64,
    /// 연관 포지션 티켓
    #[serde(default)]
    pub position: u64,
    /// 거래 심볼
    pub symbol: String,
    /// 방향
    pub side: crate::domain::Side,
    /// 진입/청산 구분
    pub entry: DealEntry,
    /// 체결 가격
    pub price: Price,
    /// 랏 수량
    pub volume: Decimal,
    /// 실현 손익
    pub profit: Decimal,
    /// 체결 시간
    pub time: DateTime<Utc>,
    /// 체결 코멘트
    #[serde(default)]
    pub comment: String,
}

impl Deal {
    /// 이 딜이 주어진 포지션 티켓에 속하는지 확인합니다.
    pub fn matches_ticket(&self, ticket: u64) -> bool {
        self.order == ticket || self.position == ticket
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Side;
    use rust_decimal_macros::dec;

    #[test]
    fn test_candle_direction() {
        let candle = Candle::new(
            Utc::now(),
            dec!(2000),
            dec!(2010),
            dec!(1995),
            dec!(2005),
            dec!(100),
        );
        assert!(candle.is_bullish());
        assert!(!candle.is_bearish());
        assert_eq!(candle.range(), dec!(15));
    }

    #[test]
    fn test_tick_spread() {
        let tick = Tick {
            symbol: "XAUUSD".to_string(),
            bid: dec!(2000.0),
            ask: dec!(2000.5),
            time: Utc::now(),
        };
        assert_eq!(tick.spread(), dec!(0.5));
    }

    #[test]
    fn test_deal_ticket_match() {
        let deal = Deal {
            ticket: 555,
            order: 123,
            position: 456,
            symbol: "XAUUSD".to_string(),
            side: Side::Sell,
            entry: DealEntry::Out,
            price: dec!(2010),
            volume: dec!(0.04),
            profit: dec!(40),
            time: Utc::now(),
            comment: String::new(),
        };
        assert!(deal.matches_ticket(123));
        assert!(deal.matches_ticket(456));
        assert!(!deal.matches_ticket(999));
        assert!(deal.entry.is_closing());
    }
}
