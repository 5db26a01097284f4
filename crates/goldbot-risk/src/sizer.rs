//! 리스크 기반 포지션 사이저.
//!
//! 신호/계좌/틱/심볼 메타데이터/사용자 설정에서 주문 의도를 산출합니다.
//! 제공 기능:
//! - 스프레드 게이트 (현재 스프레드가 허용치를 넘으면 거부)
//! - 손절/익절 가격 계산 (핍 거리 × 포인트, 방향별)
//! - 리스크 비율 기반 랏 크기 계산 및 lot_step 반올림

use goldbot_core::{
    DecimalExt, OrderIntent, Side, Signal, SymbolInfo, Tick, UserTradingSettings,
};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::debug;

/// 랏 크기 하한.
pub const MIN_LOT: Decimal = dec!(0.01);
/// 랏 크기 상한.
pub const MAX_LOT: Decimal = dec!(100.0);

/// 사이징이 주문을 거부한 사유.
#[derive(Debug, Clone, PartialEq)]
pub enum RejectReason {
    /// 사용자 설정에서 전략이 비활성화됨
    StrategyDisabled,
    /// 현재 스프레드가 허용치를 초과함
    SpreadTooWide {
        /// 현재 스프레드 (핍)
        spread_pips: Decimal,
        /// 허용 최대 스프레드 (핍)
        max_spread: Decimal,
    },
    /// 손절 거리와 핍 가치의 곱이 0 이하 (0 나눗셈 방지)
    ZeroRiskDenominator,
    /// 잔고가 0 이하
    NonPositiveBalance,
}

/// 사이징 결과.
#[derive(Debug, Clone)]
pub enum SizingDecision {
    /// 디스패치 가능한 주문 의도
    Order(OrderIntent),
    /// 주문 없음 (조용히 건너뜀)
    Rejected(RejectReason),
}

impl SizingDecision {
    /// 주문 의도를 반환합니다 (거부된 경우 None).
    pub fn into_order(self) -> Option<OrderIntent> {
        match self {
            SizingDecision::Order(intent) => Some(intent),
            SizingDecision::Rejected(_) => None,
        }
    }
}

/// 퍼센트를 금액으로 변환합니다 (정밀도를 위해 정수 스케일링 사용).
///
/// 예시: pct_to_amount(1000, 10.0) = 100 (1000의 10%)
fn pct_to_amount(amount: Decimal, pct: f64) -> Decimal {
    let scaled_pct = (pct * 10000.0).round() as i64;
    (amount * Decimal::from(scaled_pct)) / Decimal::from(1_000_000)
}

/// 신호를 한도 내의 주문 의도로 변환합니다.
///
/// 진입가는 매수면 ask, 매도면 bid입니다. 스프레드 초과, 전략
/// 비활성화, 0 리스크 분모의 경우 조용히 거부합니다 (주문 없음,
/// 알림 없음). 랏은 `[0.01, 100.0]`으로 제한한 뒤 `lot_step`의
/// 가장 가까운 배수(최소 한 스텝)로 반올림합니다.
pub fn size(
    signal: &Signal,
    balance: Decimal,
    tick: &Tick,
    symbol_info: &SymbolInfo,
    settings: &UserTradingSettings,
) -> SizingDecision {
    if !settings.enable_strategy {
        return SizingDecision::Rejected(RejectReason::StrategyDisabled);
    }
    if balance <= Decimal::ZERO {
        return SizingDecision::Rejected(RejectReason::NonPositiveBalance);
    }

    let point = settings.effective_point(symbol_info.point);
    let tick_value = settings.effective_tick_value(symbol_info.tick_value);

    // 스프레드 게이트
    let spread_pips = tick.spread() / point;
    let max_spread = Decimal::from_f64(settings.max_spread).unwrap_or(Decimal::ZERO);
    if spread_pips > max_spread {
        debug!(%spread_pips, %max_spread, "Spread gate rejected order");
        return SizingDecision::Rejected(RejectReason::SpreadTooWide {
            spread_pips,
            max_spread,
        });
    }

    let price = match signal.side {
        Side::Buy => tick.ask,
        Side::Sell => tick.bid,
    };

    let sl_offset = Decimal::from(settings.stop_loss_pips) * point;
    let tp_offset = Decimal::from(settings.take_profit_pips) * point;
    let (stop_loss, take_profit) = match signal.side {
        Side::Buy => (price - sl_offset, price + tp_offset),
        Side::Sell => (price + sl_offset, price - tp_offset),
    };

    // 1 랏 기준 1 핍 변동의 화폐 가치
    let per_pip_value_per_lot = tick_value / (point / dec!(0.01));
    let risk_amount = pct_to_amount(balance, settings.risk_percentage);
    let denominator = Decimal::from(settings.stop_loss_pips) * per_pip_value_per_lot;
    if denominator <= Decimal::ZERO {
        return SizingDecision::Rejected(RejectReason::ZeroRiskDenominator);
    }

    let raw_lot = risk_amount / denominator;
    let clamped = raw_lot.clamp(MIN_LOT, MAX_LOT);
    let lot = clamped.round_to_step(symbol_info.lot_step).max(symbol_info.lot_step);

    debug!(
        side = %signal.side,
        %price,
        %lot,
        %stop_loss,
        %take_profit,
        risk_pct = settings.risk_percentage,
        "Sized order intent"
    );

    SizingDecision::Order(OrderIntent {
        symbol: signal.symbol.clone(),
        side: signal.side,
        lot,
        price: None,
        stop_loss,
        take_profit,
        comment: "EMA12/26 + RSI14".to_string(),
    })
}
