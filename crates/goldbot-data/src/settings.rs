//! 사용자 설정 저장소.
//!
//! 사용자별 트레이딩 설정의 조회/저장을 담당합니다. 설정 레코드가
//! 없는 사용자에게는 기본값을 반환합니다 (에러 아님).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use goldbot_core::{Timeframe, UserTradingSettings};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool};
use tracing::debug;

use crate::error::DataResult;

/// 사용자 설정 저장소 인터페이스.
#[async_trait]
pub trait UserSettingsStore: Send + Sync {
    /// 사용자의 트레이딩 설정을 조회합니다.
    ///
    /// 레코드가 없으면 기본 설정을 반환합니다.
    async fn load(&self, user_id: i64) -> DataResult<UserTradingSettings>;

    /// 사용자의 트레이딩 설정을 저장합니다 (upsert).
    async fn save(&self, user_id: i64, settings: &UserTradingSettings) -> DataResult<()>;
}

/// bot_settings 테이블의 데이터베이스 표현.
#[derive(Debug, Clone, FromRow)]
struct SettingsRow {
    #[allow(dead_code)]
    user_id: i64,
    risk_percentage: f64,
    max_daily_trades: i32,
    stop_loss_pips: i32,
    take_profit_pips: i32,
    max_spread: f64,
    timeframe: String,
    enable_strategy: bool,
    custom_tick_value: Option<Decimal>,
    custom_point: Option<Decimal>,
    #[allow(dead_code)]
    updated_at: Option<DateTime<Utc>>,
}

impl SettingsRow {
    fn into_settings(self) -> UserTradingSettings {
        UserTradingSettings {
            risk_percentage: self.risk_percentage,
            max_daily_trades: self.max_daily_trades.max(0) as u32,
            stop_loss_pips: self.stop_loss_pips.max(0) as u32,
            take_profit_pips: self.take_profit_pips.max(0) as u32,
            max_spread: self.max_spread,
            timeframe: self.timeframe.parse().unwrap_or_default(),
            enable_strategy: self.enable_strategy,
            custom_tick_value: self.custom_tick_value,
            custom_point: self.custom_point,
        }
    }
}

/// PostgreSQL 기반 사용자 설정 저장소.
pub struct PgSettingsStore {
    pool: PgPool,
}

impl PgSettingsStore {
    /// 커넥션 풀로 새 저장소를 생성합니다.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserSettingsStore for PgSettingsStore {
    async fn load(&self, user_id: i64) -> DataResult<UserTradingSettings> {
        let row = sqlx::query_as::<_, SettingsRow>(
            r#"
            SELECT
                user_id, risk_percentage, max_daily_trades,
                stop_loss_pips, take_profit_pips, max_spread,
                timeframe, enable_strategy,
                custom_tick_value, custom_point, updated_at
            FROM bot_settings
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(row.into_settings()),
            None => {
                debug!(user_id, "No stored settings, using defaults");
                Ok(UserTradingSettings::default())
            }
        }
    }

    async fn save(&self, user_id: i64, settings: &UserTradingSettings) -> DataResult<()> {
        sqlx::query(
            r#"
            INSERT INTO bot_settings (
                user_id, risk_percentage, max_daily_trades,
                stop_loss_pips, take_profit_pips, max_spread,
                timeframe, enable_strategy,
                custom_tick_value, custom_point, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, NOW())
            ON CONFLICT (user_id) DO UPDATE SET
                risk_percentage = EXCLUDED.risk_percentage,
                max_daily_trades = EXCLUDED.max_daily_trades,
                stop_loss_pips = EXCLUDED.stop_loss_pips,
                take_profit_pips = EXCLUDED.take_profit_pips,
                max_spread = EXCLUDED.max_spread,
                timeframe = EXCLUDED.timeframe,
                enable_strategy = EXCLUDED.enable_strategy,
                custom_tick_value = EXCLUDED.custom_tick_value,
                custom_point = EXCLUDED.custom_point,
                updated_at = NOW()
            "#,
        )
        .bind(user_id)
        .bind(settings.risk_percentage)
        .bind(settings.max_daily_trades as i32)
        .bind(settings.stop_loss_pips as i32)
        .bind(settings.take_profit_pips as i32)
        .bind(settings.max_spread)
        .bind(settings.timeframe.to_string())
        .bind(settings.enable_strategy)
        .bind(settings.custom_tick_value)
        .bind(settings.custom_point)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_conversion_defaults_unknown_timeframe() {
        let row = SettingsRow {
            user_id: 1,
            risk_percentage: 1.5,
            max_daily_trades: 5,
            stop_loss_pips: 40,
            take_profit_pips: 80,
            max_spread: 3.0,
            timeframe: "junk".to_string(),
            enable_strategy: true,
            custom_tick_value: None,
            custom_point: None,
            updated_at: None,
        };
        let settings = row.into_settings();
        assert_eq!(settings.timeframe, Timeframe::M15);
        assert_eq!(settings.max_daily_trades, 5);
    }
}
