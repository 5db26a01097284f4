//! 시뮬레이션 게이트웨이 구현.
//!
//! 테스트 및 명시적 모의 모드에서 사용하는 인메모리 게이트웨이입니다.
//! 상태(캔들/틱/계좌/포지션/체결)는 외부에서 스크립트할 수 있으며,
//! 랜덤 워크 캔들 생성기를 내장합니다.

use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use goldbot_core::{
    AccountSnapshot, Candle, Deal, OpenPosition, OrderIntent, OrderTicket, SymbolInfo, Tick,
    Timeframe,
};
use rand::Rng;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;
use tracing::debug;

use crate::traits::MarketDataGateway;
use crate::GatewayResult;

/// 내부 시뮬레이션 상태.
#[derive(Debug, Default)]
struct SimState {
    account: Option<AccountSnapshot>,
    symbols: HashMap<String, SymbolInfo>,
    ticks: HashMap<String, Tick>,
    rates: HashMap<(String, Timeframe), Vec<Candle>>,
    positions: Vec<OpenPosition>,
    deals: Vec<Deal>,
    /// true면 place_order가 접수 결과 없이 실패
    reject_orders: bool,
}

/// 인메모리 시뮬레이션 게이트웨이.
pub struct SimulatedGateway {
    state: RwLock<SimState>,
    next_ticket: AtomicU64,
}

impl Default for SimulatedGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedGateway {
    /// 빈 상태의 게이트웨이를 생성합니다.
    pub fn new() -> Self {
        Self {
            state: RwLock::new(SimState::default()),
            next_ticket: AtomicU64::new(100_000),
        }
    }

    /// XAUUSD 기본값이 채워진 게이트웨이를 생성합니다.
    ///
    /// 2000.0 부근의 랜덤 워크 캔들, 표준 심볼 메타데이터,
    /// 10,000 USD 잔고의 계좌를 포함합니다.
    pub async fn with_defaults(symbol: &str, timeframe: Timeframe, count: usize) -> Self {
        let gateway = Self::new();
        gateway
            .set_account(AccountSnapshot {
                balance: dec!(10000),
                equity: dec!(10000),
                margin: Decimal::ZERO,
                free_margin: dec!(10000),
                profit: Decimal::ZERO,
                currency: "USD".to_string(),
                leverage: 100,
            })
            .await;
        gateway
            .set_symbol_info(SymbolInfo {
                symbol: symbol.to_string(),
                point: dec!(0.01),
                digits: 2,
                tick_value: dec!(1.0),
                lot_step: dec!(0.01),
                min_lot: dec!(0.01),
                max_lot: dec!(100.0),
            })
            .await;
        gateway
            .set_tick(Tick {
                symbol: symbol.to_string(),
                bid: dec!(2000.0),
                ask: dec!(2000.03),
                time: Utc::now(),
            })
            .await;
        gateway
            .set_candles(symbol, timeframe, random_walk_candles(timeframe, count))
            .await;
        gateway
    }

    /// 계좌 스냅샷을 설정합니다.
    pub async fn set_account(&self, account: AccountSnapshot) {
        self.state.write().await.account = Some(account);
    }

    /// 계좌 스냅샷을 제거합니다 (데이터 없음 시나리오).
    pub async fn clear_account(&self) {
        self.state.write().await.account = None;
    }

    /// 심볼 메타데이터를 설정합니다.
    pub async fn set_symbol_info(&self, info: SymbolInfo) {
        let mut state = self.state.write().await;
        state.symbols.insert(info.symbol.clone(), info);
    }

    /// 현재 틱을 설정합니다.
    pub async fn set_tick(&self, tick: Tick) {
        let mut state = self.state.write().await;
        state.ticks.insert(tick.symbol.clone(), tick);
    }

    /// 캔들 윈도우를 설정합니다.
    pub async fn set_candles(&self, symbol: &str, timeframe: Timeframe, candles: Vec<Candle>) {
        let mut state = self.state.write().await;
        state.rates.insert((symbol.to_string(), timeframe), candles);
    }

    /// 미청산 포지션 집합을 설정합니다.
    pub async fn set_positions(&self, positions: Vec<OpenPosition>) {
        self.state.write().await.positions = positions;
    }

    /// 체결 내역을 설정합니다.
    pub async fn set_deals(&self, deals: Vec<Deal>) {
        self.state.write().await.deals = deals;
    }

    /// 주문 거부 모드를 설정합니다 (접수 결과 없음).
    pub async fn set_reject_orders(&self, reject: bool) {
        self.state.write().await.reject_orders = reject;
    }

    /// 접수된 주문 티켓을 미청산 포지션에서 제거합니다.
    pub async fn close_position(&self, ticket: u64) {
        let mut state = self.state.write().await;
        state.positions.retain(|p| p.ticket != ticket);
    }
}

#[async_trait]
impl MarketDataGateway for SimulatedGateway {
    fn name(&self) -> &str {
        "simulated"
    }

    async fn account_info(&self) -> GatewayResult<Option<AccountSnapshot>> {
        Ok(self.state.read().await.account.clone())
    }

    async fn symbol_info(&self, symbol: &str) -> GatewayResult<Option<SymbolInfo>> {
        Ok(self.state.read().await.symbols.get(symbol).cloned())
    }

    async fn market_tick(&self, symbol: &str) -> GatewayResult<Option<Tick>> {
        Ok(self.state.read().await.ticks.get(symbol).cloned())
    }

    async fn price_data(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        count: usize,
    ) -> GatewayResult<Option<Vec<Candle>>> {
        let state = self.state.read().await;
        match state.rates.get(&(symbol.to_string(), timeframe)) {
            Some(candles) if !candles.is_empty() => {
                let start = candles.len().saturating_sub(count);
                Ok(Some(candles[start..].to_vec()))
            }
            _ => Ok(None),
        }
    }

    async fn place_order(&self, intent: &OrderIntent) -> GatewayResult<Option<OrderTicket>> {
        let mut state = self.state.write().await;
        if state.reject_orders {
            debug!(symbol = %intent.symbol, "Simulated order rejected");
            return Ok(None);
        }

        let ticket = self.next_ticket.fetch_add(1, Ordering::SeqCst);
        let price = match intent.price {
            Some(price) => price,
            None => state
                .ticks
                .get(&intent.symbol)
                .map(|t| match intent.side {
                    goldbot_core::Side::Buy => t.ask,
                    goldbot_core::Side::Sell => t.bid,
                })
                .unwrap_or(dec!(2000.0)),
        };
        let now = Utc::now();

        state.positions.push(OpenPosition {
            ticket,
            symbol: intent.symbol.clone(),
            side: intent.side,
            volume: intent.lot,
            price_open: price,
            price_current: price,
            profit: Decimal::ZERO,
            time: now,
        });

        debug!(ticket, symbol = %intent.symbol, lot = %intent.lot, "Simulated order filled");
        Ok(Some(OrderTicket {
            ticket,
            price,
            volume: intent.lot,
            time: now,
        }))
    }

    async fn open_positions(&self, symbol: &str) -> GatewayResult<Vec<OpenPosition>> {
        Ok(self
            .state
            .read()
            .await
            .positions
            .iter()
            .filter(|p| p.symbol == symbol)
            .cloned()
            .collect())
    }

    async fn trade_history(
        &self,
        symbol: &str,
        date_from: DateTime<Utc>,
        date_to: DateTime<Utc>,
    ) -> GatewayResult<Vec<Deal>> {
        Ok(self
            .state
            .read()
            .await
            .deals
            .iter()
            .filter(|d| d.symbol == symbol && d.time >= date_from && d.time <= date_to)
            .cloned()
            .collect())
    }
}

/// 2000.0 부근의 랜덤 워크 캔들을 생성합니다.
pub fn random_walk_candles(timeframe: Timeframe, count: usize) -> Vec<Candle> {
    let mut rng = rand::thread_rng();
    let step = ChronoDuration::from_std(timeframe.duration()).unwrap_or(ChronoDuration::minutes(15));
    let end = Utc::now();
    let mut price = 2000.0_f64;
    let mut candles = Vec::with_capacity(count);

    for i in 0..count {
        let open_time = end - step * (count as i32 - i as i32);
        let open = price;
        price += rng.gen_range(-0.5..0.5);
        let close = price;
        let high = open.max(close) + rng.gen_range(0.0..2.0);
        let low = open.min(close) - rng.gen_range(0.0..2.0);

        candles.push(Candle::new(
            open_time,
            Decimal::from_f64(open).unwrap_or(dec!(2000)),
            Decimal::from_f64(high).unwrap_or(dec!(2002)),
            Decimal::from_f64(low).unwrap_or(dec!(1998)),
            Decimal::from_f64(close).unwrap_or(dec!(2000)),
            Decimal::from(rng.gen_range(100..1000)),
        ));
    }

    candles
}

#[cfg(test)]
mod tests {
    use super::*;
    use goldbot_core::Side;

    #[tokio::test]
    async fn test_place_order_registers_position() {
        let gateway = SimulatedGateway::with_defaults("XAUUSD", Timeframe::M15, 10).await;

        let intent = OrderIntent {
            symbol: "XAUUSD".to_string(),
            side: Side::Buy,
            lot: dec!(0.04),
            price: None,
            stop_loss: dec!(1999.5),
            take_profit: dec!(2001.5),
            comment: "test".to_string(),
        };

        let ticket = gateway.place_order(&intent).await.unwrap().unwrap();
        let positions = gateway.open_positions("XAUUSD").await.unwrap();
        assert_eq!(positions.len(), 1);
        assert_eq!(positions[0].ticket, ticket.ticket);

        gateway.close_position(ticket.ticket).await;
        assert!(gateway.open_positions("XAUUSD").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_reject_orders_mode() {
        let gateway = SimulatedGateway::with_defaults("XAUUSD", Timeframe::M15, 10).await;
        gateway.set_reject_orders(true).await;

        let intent = OrderIntent {
            symbol: "XAUUSD".to_string(),
            side: Side::Sell,
            lot: dec!(0.01),
            price: None,
            stop_loss: dec!(2001.0),
            take_profit: dec!(1999.0),
            comment: "test".to_string(),
        };

        assert!(gateway.place_order(&intent).await.unwrap().is_none());
        assert!(gateway.open_positions("XAUUSD").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_price_window_truncation() {
        let gateway = SimulatedGateway::with_defaults("XAUUSD", Timeframe::M15, 200).await;
        let window = gateway
            .price_data("XAUUSD", Timeframe::M15, 50)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(window.len(), 50);
        // 오름차순 확인
        assert!(window.windows(2).all(|w| w[0].open_time <= w[1].open_time));
    }
}
