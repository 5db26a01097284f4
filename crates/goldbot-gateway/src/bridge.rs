//! 브릿지 파일 게이트웨이.
//!
//! 외부 MT5 터미널(EA)이 주기적으로 갱신하는 JSON 스냅샷 파일을
//! 읽어 시장 데이터를 제공합니다. 스냅샷은 계좌/심볼/틱/캔들/포지션/
//! 체결 내역을 담으며, 주문은 아웃박스 파일에 커맨드를 기록한 뒤
//! 터미널이 스냅샷에 써 주는 접수 결과를 폴링하여 확인합니다.
//!
//! 신선도 검사(최대 나이)는 이 구현의 정책 파라미터이며, 기준을
//! 넘긴 스냅샷은 "데이터 없음"으로 취급합니다.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use goldbot_core::{
    AccountSnapshot, Candle, Deal, OpenPosition, OrderIntent, OrderTicket, Side, SymbolInfo, Tick,
    Timeframe,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::traits::MarketDataGateway;
use crate::{GatewayError, GatewayResult};

/// 터미널이 기록하는 스냅샷 파일의 레이아웃.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BridgeSnapshot {
    /// 스냅샷 생성 시각
    pub generated_at: Option<DateTime<Utc>>,
    /// 계좌 스냅샷
    #[serde(default)]
    pub account: Option<AccountSnapshot>,
    /// 심볼별 메타데이터
    #[serde(default)]
    pub symbols: HashMap<String, SymbolInfo>,
    /// 심볼별 현재 틱
    #[serde(default)]
    pub ticks: HashMap<String, Tick>,
    /// 심볼 -> 타임프레임 코드 -> 캔들 (오름차순)
    #[serde(default)]
    pub rates: HashMap<String, HashMap<String, Vec<Candle>>>,
    /// 미청산 포지션
    #[serde(default)]
    pub positions: Vec<OpenPosition>,
    /// 체결 내역
    #[serde(default)]
    pub deals: Vec<Deal>,
    /// 주문 요청 ID -> 접수 결과
    #[serde(default)]
    pub order_results: HashMap<String, OrderTicket>,
}

/// 아웃박스 파일에 기록되는 주문 커맨드 (JSON 한 줄).
#[derive(Debug, Clone, Serialize, Deserialize)]
struct OrderCommand {
    request_id: String,
    symbol: String,
    side: Side,
    lot: Decimal,
    price: Option<Decimal>,
    stop_loss: Decimal,
    take_profit: Decimal,
    comment: String,
    issued_at: DateTime<Utc>,
}

/// 브릿지 파일 기반 게이트웨이.
pub struct BridgeGateway {
    /// 스냅샷 파일 경로
    path: PathBuf,
    /// 주문 커맨드 아웃박스 경로
    outbox_path: PathBuf,
    /// 스냅샷 최대 허용 나이
    max_age: Duration,
    /// 주문 접수 결과 폴링 한도
    order_timeout: Duration,
    /// 접수 결과 폴링 간격
    poll_interval: Duration,
}

impl BridgeGateway {
    /// 새 브릿지 게이트웨이를 생성합니다.
    pub fn new(path: impl AsRef<Path>, max_age: Duration) -> Self {
        let path = path.as_ref().to_path_buf();
        let outbox_path = path.with_extension("orders.jsonl");
        Self {
            path,
            outbox_path,
            max_age,
            order_timeout: Duration::from_secs(10),
            poll_interval: Duration::from_millis(500),
        }
    }

    /// 주문 접수 결과 폴링 한도를 설정합니다.
    pub fn with_order_timeout(mut self, timeout: Duration) -> Self {
        self.order_timeout = timeout;
        self
    }

    /// 스냅샷을 읽고 신선도를 검사합니다.
    ///
    /// 파일이 없거나 기준보다 오래된 스냅샷은 `None`으로 취급합니다.
    async fn read_snapshot(&self) -> GatewayResult<Option<BridgeSnapshot>> {
        let raw = match tokio::fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "Bridge snapshot not found");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        let snapshot: BridgeSnapshot = serde_json::from_slice(&raw)?;

        match snapshot.generated_at {
            Some(generated_at) => {
                let age = Utc::now().signed_duration_since(generated_at);
                if age.num_seconds() < 0 || age.to_std().unwrap_or(Duration::MAX) > self.max_age {
                    warn!(
                        age_secs = age.num_seconds(),
                        max_age_secs = self.max_age.as_secs(),
                        "Bridge snapshot is stale"
                    );
                    return Ok(None);
                }
                Ok(Some(snapshot))
            }
            None => {
                warn!(path = %self.path.display(), "Bridge snapshot has no timestamp");
                Ok(None)
            }
        }
    }

    /// 주문 커맨드를 아웃박스에 추가합니다.
    async fn append_command(&self, command: &OrderCommand) -> GatewayResult<()> {
        let mut line = serde_json::to_string(command)?;
        line.push('\n');

        let mut existing = match tokio::fs::read_to_string(&self.outbox_path).await {
            Ok(s) => s,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
            Err(e) => return Err(e.into()),
        };
        existing.push_str(&line);
        tokio::fs::write(&self.outbox_path, existing).await?;
        Ok(())
    }
}

#[async_trait]
impl MarketDataGateway for BridgeGateway {
    fn name(&self) -> &str {
        "bridge"
    }

    async fn account_info(&self) -> GatewayResult<Option<AccountSnapshot>> {
        Ok(self.read_snapshot().await?.and_then(|s| s.account))
    }

    async fn symbol_info(&self, symbol: &str) -> GatewayResult<Option<SymbolInfo>> {
        Ok(self
            .read_snapshot()
            .await?
            .and_then(|s| s.symbols.get(symbol).cloned()))
    }

    async fn market_tick(&self, symbol: &str) -> GatewayResult<Option<Tick>> {
        Ok(self
            .read_snapshot()
            .await?
            .and_then(|s| s.ticks.get(symbol).cloned()))
    }

    async fn price_data(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        count: usize,
    ) -> GatewayResult<Option<Vec<Candle>>> {
        let snapshot = match self.read_snapshot().await? {
            Some(s) => s,
            None => return Ok(None),
        };

        let candles = snapshot
            .rates
            .get(symbol)
            .and_then(|by_tf| by_tf.get(timeframe.to_mt_code()));

        match candles {
            Some(candles) if !candles.is_empty() => {
                // 윈도우 끝에서 count개만 취한다
                let start = candles.len().saturating_sub(count);
                Ok(Some(candles[start..].to_vec()))
            }
            _ => Ok(None),
        }
    }

    async fn place_order(&self, intent: &OrderIntent) -> GatewayResult<Option<OrderTicket>> {
        if intent.lot <= Decimal::ZERO {
            return Err(GatewayError::InvalidOrder(format!(
                "non-positive lot: {}",
                intent.lot
            )));
        }

        let request_id = Uuid::new_v4().to_string();
        let command = OrderCommand {
            request_id: request_id.clone(),
            symbol: intent.symbol.clone(),
            side: intent.side,
            lot: intent.lot,
            price: intent.price,
            stop_loss: intent.stop_loss,
            take_profit: intent.take_profit,
            comment: intent.comment.clone(),
            issued_at: Utc::now(),
        };
        self.append_command(&command).await?;
        debug!(request_id = %request_id, side = %intent.side, lot = %intent.lot, "Order command queued");

        // 터미널이 스냅샷에 결과를 반영할 때까지 폴링
        let deadline = tokio::time::Instant::now() + self.order_timeout;
        loop {
            tokio::time::sleep(self.poll_interval).await;

            if let Some(snapshot) = self.read_snapshot().await? {
                if let Some(result) = snapshot.order_results.get(&request_id) {
                    return Ok(Some(result.clone()));
                }
            }

            if tokio::time::Instant::now() >= deadline {
                warn!(request_id = %request_id, "Order result not observed before timeout");
                return Ok(None);
            }
        }
    }

    async fn open_positions(&self, symbol: &str) -> GatewayResult<Vec<OpenPosition>> {
        let snapshot = match self.read_snapshot().await? {
            Some(s) => s,
            None => return Ok(vec![]),
        };
        Ok(snapshot
            .positions
            .into_iter()
            .filter(|p| p.symbol == symbol)
            .collect())
    }

    async fn trade_history(
        &self,
        symbol: &str,
        date_from: DateTime<Utc>,
        date_to: DateTime<Utc>,
    ) -> GatewayResult<Vec<Deal>> {
        let snapshot = match self.read_snapshot().await? {
            Some(s) => s,
            None => return Ok(vec![]),
        };
        Ok(snapshot
            .deals
            .into_iter()
            .filter(|d| d.symbol == symbol && d.time >= date_from && d.time <= date_to)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use goldbot_core::DealEntry;
    use rust_decimal_macros::dec;

    fn sample_snapshot(generated_at: DateTime<Utc>) -> BridgeSnapshot {
        let mut ticks = HashMap::new();
        ticks.insert(
            "XAUUSD".to_string(),
            Tick {
                symbol: "XAUUSD".to_string(),
                bid: dec!(2000.0),
                ask: dec!(2000.5),
                time: generated_at,
            },
        );

        BridgeSnapshot {
            generated_at: Some(generated_at),
            ticks,
            deals: vec![Deal {
                ticket: 1,
                order: 100,
                position: 100,
                symbol: "XAUUSD".to_string(),
                side: Side::Sell,
                entry: DealEntry::Out,
                price: dec!(2010),
                volume: dec!(0.04),
                profit: dec!(40),
                time: generated_at,
                comment: String::new(),
            }],
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_fresh_snapshot_served() {
        let dir = std::env::temp_dir().join(format!("goldbot-bridge-{}", Uuid::new_v4()));
        tokio::fs::create_dir_all(&dir).await.unwrap();
        let path = dir.join("bridge.json");

        let snapshot = sample_snapshot(Utc::now());
        tokio::fs::write(&path, serde_json::to_vec(&snapshot).unwrap())
            .await
            .unwrap();

        let gateway = BridgeGateway::new(&path, Duration::from_secs(120));
        let tick = gateway.market_tick("XAUUSD").await.unwrap();
        assert!(tick.is_some());
        assert_eq!(tick.unwrap().bid, dec!(2000.0));
    }

    #[tokio::test]
    async fn test_stale_snapshot_treated_as_unavailable() {
        let dir = std::env::temp_dir().join(format!("goldbot-bridge-{}", Uuid::new_v4()));
        tokio::fs::create_dir_all(&dir).await.unwrap();
        let path = dir.join("bridge.json");

        let old = Utc::now() - chrono::Duration::seconds(600);
        let snapshot = sample_snapshot(old);
        tokio::fs::write(&path, serde_json::to_vec(&snapshot).unwrap())
            .await
            .unwrap();

        let gateway = BridgeGateway::new(&path, Duration::from_secs(120));
        assert!(gateway.market_tick("XAUUSD").await.unwrap().is_none());
        assert!(gateway.account_info().await.unwrap().is_none());
        assert!(gateway
            .open_positions("XAUUSD")
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_missing_file_is_unavailable() {
        let path = std::env::temp_dir().join(format!("goldbot-none-{}.json", Uuid::new_v4()));
        let gateway = BridgeGateway::new(&path, Duration::from_secs(120));
        assert!(gateway.market_tick("XAUUSD").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_history_window_filter() {
        let dir = std::env::temp_dir().join(format!("goldbot-bridge-{}", Uuid::new_v4()));
        tokio::fs::create_dir_all(&dir).await.unwrap();
        let path = dir.join("bridge.json");

        let now = Utc::now();
        let snapshot = sample_snapshot(now);
        tokio::fs::write(&path, serde_json::to_vec(&snapshot).unwrap())
            .await
            .unwrap();

        let gateway = BridgeGateway::new(&path, Duration::from_secs(120));
        let hits = gateway
            .trade_history(
                "XAUUSD",
                now - chrono::Duration::hours(1),
                now + chrono::Duration::minutes(5),
            )
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);

        let misses = gateway
            .trade_history(
                "XAUUSD",
                now - chrono::Duration::hours(2),
                now - chrono::Duration::hours(1),
            )
            .await
            .unwrap();
        assert!(misses.is_empty());
    }
}
