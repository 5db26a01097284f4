//! 지표 계산 엔진.
//!
//! 캔들 윈도우의 종가에서 EMA(12/26)와 RSI(14)를 계산합니다.
//! 지표 상태는 매 평가 사이클마다 새로 계산되고 버려지는 일회성
//! 값이며, 어디에도 영속화되지 않습니다.

use goldbot_core::Candle;
use rust_decimal::prelude::ToPrimitive;

/// 빠른 EMA 스팬.
pub const EMA_FAST_SPAN: usize = 12;
/// 느린 EMA 스팬.
pub const EMA_SLOW_SPAN: usize = 26;
/// RSI 기간.
pub const RSI_PERIOD: usize = 14;

/// 한 평가 사이클의 지표 상태.
///
/// 각 시리즈는 입력 캔들과 같은 길이입니다 (RSI는 첫 캔들에 대해
/// 직전 종가가 없으므로 중립값 50으로 채워집니다).
#[derive(Debug, Clone)]
pub struct IndicatorSet {
    /// EMA(12) 시리즈
    pub ema_fast: Vec<f64>,
    /// EMA(26) 시리즈
    pub ema_slow: Vec<f64>,
    /// RSI(14) 시리즈
    pub rsi: Vec<f64>,
}

impl IndicatorSet {
    /// 마지막 캔들의 빠른 EMA.
    pub fn ema_fast_last(&self) -> f64 {
        *self.ema_fast.last().unwrap_or(&0.0)
    }

    /// 마지막에서 두 번째 캔들의 빠른 EMA.
    pub fn ema_fast_prev(&self) -> f64 {
        let n = self.ema_fast.len();
        self.ema_fast.get(n.wrapping_sub(2)).copied().unwrap_or(0.0)
    }

    /// 마지막 캔들의 느린 EMA.
    pub fn ema_slow_last(&self) -> f64 {
        *self.ema_slow.last().unwrap_or(&0.0)
    }

    /// 마지막에서 두 번째 캔들의 느린 EMA.
    pub fn ema_slow_prev(&self) -> f64 {
        let n = self.ema_slow.len();
        self.ema_slow.get(n.wrapping_sub(2)).copied().unwrap_or(0.0)
    }

    /// 마지막 캔들의 RSI.
    pub fn rsi_last(&self) -> f64 {
        *self.rsi.last().unwrap_or(&50.0)
    }
}

/// 지수 이동 평균 시리즈를 계산합니다.
///
/// 평활 계수 `α = 2/(span+1)`, 첫 값으로 시드합니다 (편향 보정 없음).
fn ema(values: &[f64], span: usize) -> Vec<f64> {
    let alpha = 2.0 / (span as f64 + 1.0);
    let mut out = Vec::with_capacity(values.len());
    let mut current = match values.first() {
        Some(v) => *v,
        None => return out,
    };
    out.push(current);
    for v in &values[1..] {
        current = alpha * v + (1.0 - alpha) * current;
        out.push(current);
    }
    out
}

/// RSI 시리즈를 계산합니다.
///
/// 종가 간 변화량의 상승/하락폭을 각각 0으로 바닥 처리한 뒤
/// `α = 1/period` 지수 평활로 평균합니다. 평균 하락폭이 0이면
/// 상대강도를 무한대로 취급하여 RSI를 100으로 밀어 올립니다.
fn rsi(closes: &[f64], period: usize) -> Vec<f64> {
    let alpha = 1.0 / period as f64;
    let mut out = Vec::with_capacity(closes.len());
    // 첫 캔들에는 직전 종가가 없으므로 중립값
    out.push(50.0);

    let mut avg_gain: Option<f64> = None;
    let mut avg_loss: Option<f64> = None;

    for pair in closes.windows(2) {
        let delta = pair[1] - pair[0];
        let gain = delta.max(0.0);
        let loss = (-delta).max(0.0);

        avg_gain = Some(match avg_gain {
            Some(prev) => alpha * gain + (1.0 - alpha) * prev,
            None => gain,
        });
        avg_loss = Some(match avg_loss {
            Some(prev) => alpha * loss + (1.0 - alpha) * prev,
            None => loss,
        });

        let g = avg_gain.unwrap_or(0.0);
        let l = avg_loss.unwrap_or(0.0);
        let value = if l <= f64::EPSILON {
            100.0
        } else {
            let rs = g / l;
            100.0 - (100.0 / (1.0 + rs))
        };
        out.push(value);
    }

    out
}

/// 캔들 윈도우에서 지표 상태를 계산합니다.
///
/// 최소 2개의 캔들이 필요하며, 그보다 적으면 `None`을 반환합니다
/// (신호를 도출해서는 안 되는 "데이터 부족" 상태).
pub fn compute(bars: &[Candle]) -> Option<IndicatorSet> {
    if bars.len() < 2 {
        return None;
    }

    let closes: Vec<f64> = bars
        .iter()
        .map(|c| c.close.to_f64().unwrap_or(0.0))
        .collect();

    Some(IndicatorSet {
        ema_fast: ema(&closes, EMA_FAST_SPAN),
        ema_slow: ema(&closes, EMA_SLOW_SPAN),
        rsi: rsi(&closes, RSI_PERIOD),
    })
}
