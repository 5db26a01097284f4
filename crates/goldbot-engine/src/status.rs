//! 계좌 상태 이벤트.

use chrono::{DateTime, Utc};
use goldbot_core::{AccountSnapshot, Tick};
use serde::{Deserialize, Serialize};

/// 신호 사이클마다 발행되는 계좌 상태 이벤트.
///
/// 게이트웨이가 데이터를 주지 못하면 해당 필드는 `None`으로
/// 발행됩니다 (구독자가 연결 상태를 구분할 수 있도록).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountStatusEvent {
    /// 계좌 스냅샷
    pub account: Option<AccountSnapshot>,
    /// 현재 틱
    pub tick: Option<Tick>,
    /// 발행 시각
    pub timestamp: DateTime<Utc>,
}

/// 사용자별 엔진 상태 조회 결과.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserEngineStatus {
    /// 사용자 ID
    pub user_id: i64,
    /// 신호 평가 대상인지 여부
    pub is_active: bool,
    /// 계좌 스냅샷 (게이트웨이가 줄 수 있을 때)
    pub account: Option<AccountSnapshot>,
    /// 영속 계층 기준 미청산 거래 수
    pub open_trades: usize,
}
