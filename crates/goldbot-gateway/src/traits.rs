//! 게이트웨이 trait 정의.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use goldbot_core::{
    AccountSnapshot, Candle, Deal, OpenPosition, OrderIntent, OrderTicket, SymbolInfo, Tick,
    Timeframe,
};

use crate::GatewayResult;

/// 통합 시장 데이터 게이트웨이 인터페이스.
///
/// 데이터 출처는 명시되지 않은 신선도를 가지며, 모든 조회는
/// 데이터가 없을 때 `None` 또는 빈 목록을 반환합니다. 에러는
/// 게이트웨이 자체의 장애(파일 I/O, 파싱)에만 사용됩니다.
#[async_trait]
pub trait MarketDataGateway: Send + Sync {
    /// 게이트웨이 이름 반환.
    fn name(&self) -> &str;

    /// 계좌 스냅샷 조회.
    async fn account_info(&self) -> GatewayResult<Option<AccountSnapshot>>;

    /// 심볼 메타데이터 조회.
    async fn symbol_info(&self, symbol: &str) -> GatewayResult<Option<SymbolInfo>>;

    /// 현재 틱 조회.
    async fn market_tick(&self, symbol: &str) -> GatewayResult<Option<Tick>>;

    /// 과거 캔들 윈도우 조회 (타임스탬프 오름차순).
    async fn price_data(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        count: usize,
    ) -> GatewayResult<Option<Vec<Candle>>>;

    /// 주문 제출. 접수 결과를 얻지 못하면 `None`.
    async fn place_order(&self, intent: &OrderIntent) -> GatewayResult<Option<OrderTicket>>;

    /// 심볼의 미청산 포지션 집합 조회.
    async fn open_positions(&self, symbol: &str) -> GatewayResult<Vec<OpenPosition>>;

    /// 기간 내 체결 내역 조회.
    async fn trade_history(
        &self,
        symbol: &str,
        date_from: DateTime<Utc>,
        date_to: DateTime<Utc>,
    ) -> GatewayResult<Vec<Deal>>;
}
