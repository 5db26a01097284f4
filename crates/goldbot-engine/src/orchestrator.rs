//! 사용자별 오케스트레이터.
//!
//! 한 신호 사이클의 전체 흐름을 담당합니다:
//! 1. 기준 타임프레임 캔들 윈도우를 한 번 조회하고 지표/신호를 계산
//! 2. 계좌 상태 이벤트를 발행
//! 3. 신호가 있으면 활성 사용자 각각에 대해 설정 로드, 사용자
//!    타임프레임 윈도우 가용성 확인, 사이징, 디스패치
//!
//! 신호는 항상 기준 타임프레임에서 계산됩니다. 사용자 타임프레임이
//! 기준과 다르면 해당 윈도우는 가용성 확인에만 쓰이며, 신호를 그
//! 윈도우에서 다시 평가하지 않습니다.
//!
//! 한 사용자의 실패는 기록만 하고 다음 사용자로 넘어갑니다.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use goldbot_core::{EngineConfig, EngineError, EngineResult, Signal};
use goldbot_data::UserSettingsStore;
use goldbot_gateway::MarketDataGateway;
use goldbot_risk::SizingDecision;
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, error, info};

use crate::dispatcher::OrderDispatcher;
use crate::status::AccountStatusEvent;

/// 사용자별 오케스트레이터.
pub struct Orchestrator {
    config: EngineConfig,
    gateway: Arc<dyn MarketDataGateway>,
    settings: Arc<dyn UserSettingsStore>,
    dispatcher: Arc<OrderDispatcher>,
    active_users: Arc<RwLock<HashSet<i64>>>,
    status_tx: broadcast::Sender<AccountStatusEvent>,
}

impl Orchestrator {
    /// 새 오케스트레이터를 생성합니다.
    pub fn new(
        config: EngineConfig,
        gateway: Arc<dyn MarketDataGateway>,
        settings: Arc<dyn UserSettingsStore>,
        dispatcher: Arc<OrderDispatcher>,
        active_users: Arc<RwLock<HashSet<i64>>>,
        status_tx: broadcast::Sender<AccountStatusEvent>,
    ) -> Self {
        Self {
            config,
            gateway,
            settings,
            dispatcher,
            active_users,
            status_tx,
        }
    }

    /// 신호 사이클을 한 번 실행합니다.
    pub async fn run_cycle(&self) -> EngineResult<()> {
        self.publish_account_status().await;

        let users: Vec<i64> = {
            let active = self.active_users.read().await;
            active.iter().copied().collect()
        };
        if users.is_empty() {
            return Ok(());
        }

        // 기준 타임프레임 윈도우는 사이클당 한 번만 조회한다
        let Some(signal) = self.evaluate(self.config.reference_timeframe).await? else {
            debug!("No signal this cycle");
            return Ok(());
        };

        info!(
            side = %signal.side,
            rsi = signal.rsi,
            users = users.len(),
            "Signal detected, evaluating users"
        );

        for user_id in users {
            if let Err(e) = self.handle_user(user_id, &signal).await {
                if e.is_silent() {
                    debug!(user_id, reason = %e, "User skipped");
                } else {
                    error!(user_id, error = %e, "User cycle failed");
                }
            }
        }

        Ok(())
    }

    /// 기준 타임프레임의 윈도우에서 신호를 평가합니다.
    async fn evaluate(
        &self,
        timeframe: goldbot_core::Timeframe,
    ) -> EngineResult<Option<Signal>> {
        let bars = self.fetch_window(timeframe).await?;

        let Some(set) = goldbot_strategy::compute(&bars) else {
            return Err(EngineError::DataUnavailable("캔들 수 부족".to_string()));
        };
        Ok(goldbot_strategy::generate(&set, &self.config.symbol))
    }

    /// 지정 타임프레임의 캔들 윈도우를 조회합니다.
    async fn fetch_window(
        &self,
        timeframe: goldbot_core::Timeframe,
    ) -> EngineResult<Vec<goldbot_core::Candle>> {
        self.gateway
            .price_data(&self.config.symbol, timeframe, self.config.bar_window)
            .await
            .map_err(|e| EngineError::Gateway(e.to_string()))?
            .ok_or_else(|| {
                EngineError::DataUnavailable(format!(
                    "{} {} 캔들 없음",
                    self.config.symbol, timeframe
                ))
            })
    }

    /// 한 사용자에 대해 사이징과 디스패치를 수행합니다.
    async fn handle_user(&self, user_id: i64, signal: &Signal) -> EngineResult<()> {
        let settings = self
            .settings
            .load(user_id)
            .await
            .map_err(|e| EngineError::Persistence(e.to_string()))?;

        if !settings.enable_strategy {
            return Err(EngineError::RiskRejected("전략 비활성화".to_string()));
        }

        // 사용자 타임프레임이 기준과 다르면 해당 윈도우의 가용성만
        // 확인한다. 주문 방향은 기준 타임프레임 신호를 따른다.
        if settings.timeframe != self.config.reference_timeframe {
            self.fetch_window(settings.timeframe).await?;
        }

        let tick = self
            .gateway
            .market_tick(&self.config.symbol)
            .await
            .map_err(|e| EngineError::Gateway(e.to_string()))?
            .ok_or_else(|| EngineError::DataUnavailable("틱 없음".to_string()))?;

        let symbol_info = self
            .gateway
            .symbol_info(&self.config.symbol)
            .await
            .map_err(|e| EngineError::Gateway(e.to_string()))?
            .ok_or_else(|| EngineError::DataUnavailable("심볼 정보 없음".to_string()))?;

        let account = self
            .gateway
            .account_info()
            .await
            .map_err(|e| EngineError::Gateway(e.to_string()))?
            .ok_or_else(|| EngineError::DataUnavailable("계좌 정보 없음".to_string()))?;

        let intent = match goldbot_risk::size(signal, account.balance, &tick, &symbol_info, &settings)
        {
            SizingDecision::Order(intent) => intent,
            SizingDecision::Rejected(reason) => {
                return Err(EngineError::RiskRejected(format!("{:?}", reason)));
            }
        };

        self.dispatcher.dispatch(user_id, &settings, &intent).await?;
        Ok(())
    }

    /// 계좌 상태 이벤트를 발행합니다. 구독자가 없어도 실패가 아닙니다.
    async fn publish_account_status(&self) {
        let account = self.gateway.account_info().await.ok().flatten();
        let tick = self.gateway.market_tick(&self.config.symbol).await.ok().flatten();

        let event = AccountStatusEvent {
            account,
            tick,
            timestamp: Utc::now(),
        };
        let _ = self.status_tx.send(event);
    }
}
