//! 주문 의도 및 주문 결과 타입.

use crate::domain::Side;
use crate::types::{Lots, Price};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 리스크 사이저가 산출한 주문 의도.
///
/// 디스패치 시도 하나당 하나씩 생성되는 일회성 값입니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderIntent {
    /// 거래 심볼
    pub symbol: String,
    /// 주문 방향
    pub side: Side,
    /// 랏 수량
    pub lot: Lots,
    /// 지정 진입 가격 (None이면 시장가)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<Price>,
    /// 손절 가격
    pub stop_loss: Price,
    /// 익절 가격
    pub take_profit: Price,
    /// 주문 코멘트
    pub comment: String,
}

/// 게이트웨이가 반환한 주문 접수 결과.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderTicket {
    /// 접수된 주문/포지션 티켓
    pub ticket: u64,
    /// 체결 가격
    pub price: Price,
    /// 체결 랏 수량
    pub volume: Lots,
    /// 접수 시간
    pub time: DateTime<Utc>,
}
