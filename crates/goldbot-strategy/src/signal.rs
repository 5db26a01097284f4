//! 신호 생성기.
//!
//! 지표 상태를 이산적인 매매 신호로 변환합니다. 마지막 두 캔들의
//! EMA 크로스오버에 RSI 필터를 결합하며, 이전 신호를 기억하지
//! 않습니다 (재시작을 넘어 중복 신호가 생기는 버그를 피하기 위해
//! 매 사이클 처음부터 다시 계산).

use goldbot_core::{Side, Signal};
use tracing::debug;

use crate::indicators::IndicatorSet;

/// 매수 신호를 막는 과매수 임계값.
pub const RSI_OVERBOUGHT: f64 = 70.0;
/// 매도 신호를 막는 과매도 임계값.
pub const RSI_OVERSOLD: f64 = 30.0;

/// 지표 상태에서 매매 신호를 생성합니다.
///
/// - 빠른 EMA가 느린 EMA를 상향 돌파하고 RSI < 70이면 매수
/// - 빠른 EMA가 느린 EMA를 하향 돌파하고 RSI > 30이면 매도
/// - 그 외에는 신호 없음
///
/// 사이클당 최대 하나의 신호만 반환됩니다.
pub fn generate(set: &IndicatorSet, symbol: &str) -> Option<Signal> {
    if set.ema_fast.len() < 2 || set.ema_slow.len() < 2 {
        return None;
    }

    let cross_up =
        set.ema_fast_prev() <= set.ema_slow_prev() && set.ema_fast_last() > set.ema_slow_last();
    let cross_down =
        set.ema_fast_prev() >= set.ema_slow_prev() && set.ema_fast_last() < set.ema_slow_last();
    let rsi = set.rsi_last();

    if cross_up && rsi < RSI_OVERBOUGHT {
        debug!(symbol, rsi, "EMA cross up confirmed");
        return Some(Signal::new(Side::Buy, symbol, rsi));
    }
    if cross_down && rsi > RSI_OVERSOLD {
        debug!(symbol, rsi, "EMA cross down confirmed");
        return Some(Signal::new(Side::Sell, symbol, rsi));
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set_with(
        fast_prev: f64,
        fast_last: f64,
        slow_prev: f64,
        slow_last: f64,
        rsi: f64,
    ) -> IndicatorSet {
        IndicatorSet {
            ema_fast: vec![fast_prev, fast_last],
            ema_slow: vec![slow_prev, slow_last],
            rsi: vec![50.0, rsi],
        }
    }

    #[test]
    fn test_cross_up_emits_buy() {
        let set = set_with(1999.0, 2001.0, 2000.0, 2000.0, 55.0);
        let signal = generate(&set, "XAUUSD").unwrap();
        assert_eq!(signal.side, Side::Buy);
    }

    #[test]
    fn test_cross_up_blocked_when_overbought() {
        let set = set_with(1999.0, 2001.0, 2000.0, 2000.0, 75.0);
        assert!(generate(&set, "XAUUSD").is_none());
    }

    #[test]
    fn test_cross_down_emits_sell() {
        let set = set_with(2001.0, 1999.0, 2000.0, 2000.0, 45.0);
        let signal = generate(&set, "XAUUSD").unwrap();
        assert_eq!(signal.side, Side::Sell);
    }

    #[test]
    fn test_cross_down_blocked_when_oversold() {
        let set = set_with(2001.0, 1999.0, 2000.0, 2000.0, 25.0);
        assert!(generate(&set, "XAUUSD").is_none());
    }

    #[test]
    fn test_no_crossover_returns_none() {
        // 빠른 EMA가 계속 위에 있으면 크로스가 아니다
        let set = set_with(2001.0, 2002.0, 2000.0, 2000.0, 50.0);
        assert!(generate(&set, "XAUUSD").is_none());
    }

    #[test]
    fn test_short_series_returns_none() {
        let set = IndicatorSet {
            ema_fast: vec![2000.0],
            ema_slow: vec![2000.0],
            rsi: vec![50.0],
        };
        assert!(generate(&set, "XAUUSD").is_none());
    }
}
