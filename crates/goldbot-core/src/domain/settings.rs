//! 사용자별 트레이딩 설정.
//!
//! 설정 레코드는 영속 계층이 소유하며 엔진은 읽기 전용으로 사용합니다.
//! 레코드가 없는 사용자에게는 기본값이 적용됩니다.

use crate::types::Timeframe;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// 사용자별 트레이딩 설정.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserTradingSettings {
    /// 거래당 리스크 비율 (%)
    pub risk_percentage: f64,
    /// 일일 최대 거래 수
    pub max_daily_trades: u32,
    /// 손절 거리 (핍)
    pub stop_loss_pips: u32,
    /// 익절 거리 (핍)
    pub take_profit_pips: u32,
    /// 허용 최대 스프레드 (핍)
    pub max_spread: f64,
    /// 진입/사이징에 사용할 타임프레임
    pub timeframe: Timeframe,
    /// 전략 활성화 여부
    pub enable_strategy: bool,
    /// 브로커 보고값 대신 사용할 틱 가치 재정의
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_tick_value: Option<Decimal>,
    /// 브로커 보고값 대신 사용할 포인트 재정의
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_point: Option<Decimal>,
}

impl Default for UserTradingSettings {
    fn default() -> Self {
        Self {
            risk_percentage: 2.0,
            max_daily_trades: 10,
            stop_loss_pips: 50,
            take_profit_pips: 100,
            max_spread: 5.0,
            timeframe: Timeframe::M15,
            enable_strategy: true,
            custom_tick_value: None,
            custom_point: None,
        }
    }
}

impl UserTradingSettings {
    /// 심볼 메타데이터와 재정의를 합성한 유효 틱 가치를 반환합니다.
    pub fn effective_tick_value(&self, reported: Decimal) -> Decimal {
        self.custom_tick_value.unwrap_or(reported)
    }

    /// 심볼 메타데이터와 재정의를 합성한 유효 포인트를 반환합니다.
    pub fn effective_point(&self, reported: Decimal) -> Decimal {
        let point = self.custom_point.unwrap_or(reported);
        if point <= Decimal::ZERO {
            dec!(0.01)
        } else {
            point
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = UserTradingSettings::default();
        assert_eq!(settings.risk_percentage, 2.0);
        assert_eq!(settings.stop_loss_pips, 50);
        assert_eq!(settings.take_profit_pips, 100);
        assert_eq!(settings.timeframe, Timeframe::M15);
        assert!(settings.enable_strategy);
    }

    #[test]
    fn test_effective_overrides() {
        let mut settings = UserTradingSettings::default();
        assert_eq!(settings.effective_point(dec!(0.1)), dec!(0.1));

        settings.custom_point = Some(dec!(0.001));
        settings.custom_tick_value = Some(dec!(2.5));
        assert_eq!(settings.effective_point(dec!(0.1)), dec!(0.001));
        assert_eq!(settings.effective_tick_value(dec!(1.0)), dec!(2.5));
    }

    #[test]
    fn test_effective_point_guards_zero() {
        let settings = UserTradingSettings::default();
        assert_eq!(settings.effective_point(Decimal::ZERO), dec!(0.01));
    }
}
