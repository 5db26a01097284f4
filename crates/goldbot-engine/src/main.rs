//! 골드 트레이딩 봇 데몬.
//!
//! 설정을 로드하고 게이트웨이/저장소/알림을 배선한 뒤 트레이딩
//! 엔진을 시작합니다. Ctrl-C로 협조적으로 종료됩니다.

use std::sync::Arc;

use goldbot_core::logging::{init_logging, LogConfig, LogFormat};
use goldbot_core::{AppConfig, GatewayMode};
use goldbot_data::{MemorySettingsStore, MemoryTradeStore, PgSettingsStore, PgTradeStore};
use goldbot_engine::TradingEngine;
use goldbot_gateway::{BridgeGateway, MarketDataGateway, SimulatedGateway};
use goldbot_notification::{TelegramConfig, TelegramSender};
use sqlx::postgres::PgPoolOptions;
use std::time::Duration;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env 파일 로드 (있는 경우)
    let _ = dotenvy::dotenv();

    let config = AppConfig::load_default()?;

    let format = config
        .logging
        .format
        .parse::<LogFormat>()
        .unwrap_or_default();
    init_logging(LogConfig::new(&config.logging.level).with_format(format))
        .map_err(|e| anyhow::anyhow!("로깅 초기화 실패: {}", e))?;

    info!(symbol = %config.engine.symbol, "Starting gold trading bot");

    let gateway: Arc<dyn MarketDataGateway> = match config.gateway.mode {
        GatewayMode::Bridge => Arc::new(BridgeGateway::new(
            &config.gateway.bridge_path,
            Duration::from_secs(config.gateway.max_age_secs),
        )),
        GatewayMode::Simulated => {
            warn!("Simulated gateway enabled, orders will not reach a broker");
            Arc::new(
                SimulatedGateway::with_defaults(
                    &config.engine.symbol,
                    config.engine.reference_timeframe,
                    config.engine.bar_window,
                )
                .await,
            )
        }
    };

    // 데이터베이스가 준비되지 않은 개발 구동은 인메모리 저장소로 대체
    let (settings_store, trade_store): (
        Arc<dyn goldbot_data::UserSettingsStore>,
        Arc<dyn goldbot_data::TradeStore>,
    ) = match PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .acquire_timeout(Duration::from_secs(config.database.connection_timeout_secs))
        .connect(&config.database.url)
        .await
    {
        Ok(pool) => {
            info!("Connected to database");
            (
                Arc::new(PgSettingsStore::new(pool.clone())),
                Arc::new(PgTradeStore::new(pool)),
            )
        }
        Err(e) => {
            warn!(error = %e, "Database unavailable, falling back to in-memory stores");
            (
                Arc::new(MemorySettingsStore::new()),
                Arc::new(MemoryTradeStore::new()),
            )
        }
    };

    let notifier: Arc<dyn goldbot_notification::NotificationSender> =
        if config.notifications.telegram.enabled {
            Arc::new(TelegramSender::new(TelegramConfig::new(
                config.notifications.telegram.bot_token.clone(),
                config.notifications.telegram.chat_id.clone(),
            )))
        } else {
            match TelegramSender::from_env() {
                Some(sender) => Arc::new(sender),
                None => {
                    warn!("Telegram not configured, notifications disabled");
                    Arc::new(TelegramSender::new(TelegramConfig::new(
                        String::new(),
                        String::new(),
                    )))
                }
            }
        };

    let engine = Arc::new(TradingEngine::new(
        config.engine.clone(),
        gateway,
        settings_store,
        trade_store,
        notifier,
    ));

    let shutdown_engine = engine.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Shutdown signal received");
            shutdown_engine.shutdown().await;
        }
    });

    engine.run().await?;
    Ok(())
}
