//! 트레이딩 엔진.
//!
//! 두 개의 고정 간격 루프를 구동합니다:
//! - 신호 루프 (기본 60초): 지표 평가, 사이징, 디스패치
//! - 추적 루프 (기본 15초): 포지션 생명주기 조정
//!
//! 루프 반복 중의 에러는 기록하고 다음 반복을 계속합니다. 종료는
//! running 플래그를 내려 다음 대기 지점에서 협조적으로 이루어집니다.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use goldbot_core::{EngineConfig, EngineError, EngineResult};
use goldbot_data::{TradeStore, UserSettingsStore};
use goldbot_gateway::MarketDataGateway;
use goldbot_notification::NotificationSender;
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, error, info};

use crate::dispatcher::OrderDispatcher;
use crate::orchestrator::Orchestrator;
use crate::status::{AccountStatusEvent, UserEngineStatus};
use crate::tracker::PositionTracker;

/// 계좌 상태 브로드캐스트 채널 용량.
const STATUS_CHANNEL_CAPACITY: usize = 64;

/// 트레이딩 엔진.
pub struct TradingEngine {
    config: EngineConfig,
    gateway: Arc<dyn MarketDataGateway>,
    trades: Arc<dyn TradeStore>,
    orchestrator: Arc<Orchestrator>,
    tracker: Arc<PositionTracker>,
    dispatcher: Arc<OrderDispatcher>,
    active_users: Arc<RwLock<HashSet<i64>>>,
    status_tx: broadcast::Sender<AccountStatusEvent>,
    running: Arc<RwLock<bool>>,
}

impl TradingEngine {
    /// 협력자들을 배선하여 새 엔진을 생성합니다.
    pub fn new(
        config: EngineConfig,
        gateway: Arc<dyn MarketDataGateway>,
        settings: Arc<dyn UserSettingsStore>,
        trades: Arc<dyn TradeStore>,
        notifier: Arc<dyn NotificationSender>,
    ) -> Self {
        let (status_tx, _) = broadcast::channel(STATUS_CHANNEL_CAPACITY);
        let active_users = Arc::new(RwLock::new(HashSet::new()));

        let tracker = Arc::new(PositionTracker::new(
            gateway.clone(),
            trades.clone(),
            notifier.clone(),
        ));
        let dispatcher = Arc::new(OrderDispatcher::new(
            gateway.clone(),
            trades.clone(),
            notifier.clone(),
            tracker.clone(),
            config.max_daily_trades,
        ));
        let orchestrator = Arc::new(Orchestrator::new(
            config.clone(),
            gateway.clone(),
            settings,
            dispatcher.clone(),
            active_users.clone(),
            status_tx.clone(),
        ));

        Self {
            config,
            gateway,
            trades,
            orchestrator,
            tracker,
            dispatcher,
            active_users,
            status_tx,
            running: Arc::new(RwLock::new(false)),
        }
    }

    /// 엔진 메인 루프 시작. `shutdown()` 호출 시까지 블록됩니다.
    pub async fn run(&self) -> EngineResult<()> {
        {
            let mut running = self.running.write().await;
            if *running {
                return Err(EngineError::Internal("엔진이 이미 실행 중".to_string()));
            }
            *running = true;
        }

        info!(
            symbol = %self.config.symbol,
            signal_interval = self.config.signal_interval_secs,
            tracker_interval = self.config.tracker_interval_secs,
            "Trading engine started"
        );

        let signal_loop = {
            let orchestrator = self.orchestrator.clone();
            let running = self.running.clone();
            let interval = Duration::from_secs(self.config.signal_interval_secs);
            tokio::spawn(async move {
                loop {
                    tokio::select! {
                        _ = tokio::time::sleep(interval) => {
                            if let Err(e) = orchestrator.run_cycle().await {
                                if e.is_silent() {
                                    debug!(reason = %e, "Signal cycle skipped");
                                } else {
                                    error!(error = %e, "Signal cycle failed");
                                }
                            }
                        }
                        _ = wait_for_shutdown(&running) => break,
                    }
                }
            })
        };

        let tracker_loop = {
            let tracker = self.tracker.clone();
            let running = self.running.clone();
            let symbol = self.config.symbol.clone();
            let interval = Duration::from_secs(self.config.tracker_interval_secs);
            tokio::spawn(async move {
                loop {
                    tokio::select! {
                        _ = tokio::time::sleep(interval) => {
                            if let Err(e) = tracker.run_cycle(&symbol).await {
                                if e.is_silent() {
                                    debug!(reason = %e, "Tracker cycle skipped");
                                } else {
                                    error!(error = %e, "Tracker cycle failed");
                                }
                            }
                        }
                        _ = wait_for_shutdown(&running) => break,
                    }
                }
            })
        };

        let _ = tokio::join!(signal_loop, tracker_loop);

        {
            let mut running = self.running.write().await;
            *running = false;
        }

        info!("Trading engine stopped");
        Ok(())
    }

    /// 엔진 종료를 요청합니다.
    pub async fn shutdown(&self) {
        let mut running = self.running.write().await;
        *running = false;
    }

    /// 엔진이 실행 중인지 확인합니다.
    pub async fn is_running(&self) -> bool {
        *self.running.read().await
    }

    /// 사용자를 신호 평가 대상에 추가합니다.
    pub async fn start_for_user(&self, user_id: i64) {
        let mut users = self.active_users.write().await;
        if users.insert(user_id) {
            info!(user_id, "User activated");
        }
    }

    /// 사용자를 신호 평가 대상에서 제외합니다.
    ///
    /// 이미 추적 중인 포지션은 계속 추적됩니다.
    pub async fn stop_for_user(&self, user_id: i64) {
        let mut users = self.active_users.write().await;
        if users.remove(&user_id) {
            info!(user_id, "User deactivated");
        }
    }

    /// 사용자별 엔진 상태를 조회합니다.
    pub async fn status(&self, user_id: i64) -> UserEngineStatus {
        let is_active = self.active_users.read().await.contains(&user_id);
        let account = self.gateway.account_info().await.ok().flatten();
        let open_trades = self
            .trades
            .list_open(user_id)
            .await
            .map(|trades| trades.len())
            .unwrap_or(0);

        UserEngineStatus {
            user_id,
            is_active,
            account,
            open_trades,
        }
    }

    /// 계좌 상태 이벤트 스트림을 구독합니다.
    pub fn subscribe(&self) -> broadcast::Receiver<AccountStatusEvent> {
        self.status_tx.subscribe()
    }

    /// 오늘 접수된 거래 수를 반환합니다.
    pub async fn trades_today(&self) -> u32 {
        self.dispatcher.trades_today().await
    }

    /// 내부 협력자 접근 (테스트/바이너리 배선용).
    pub fn orchestrator(&self) -> Arc<Orchestrator> {
        self.orchestrator.clone()
    }

    /// 포지션 트래커 접근.
    pub fn tracker(&self) -> Arc<PositionTracker> {
        self.tracker.clone()
    }

    /// 주문 디스패처 접근.
    pub fn dispatcher(&self) -> Arc<OrderDispatcher> {
        self.dispatcher.clone()
    }
}

/// running 플래그가 내려갈 때까지 대기합니다.
async fn wait_for_shutdown(running: &RwLock<bool>) {
    loop {
        tokio::time::sleep(Duration::from_millis(100)).await;
        if !*running.read().await {
            break;
        }
    }
}
