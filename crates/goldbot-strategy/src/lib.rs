//! # Goldbot Strategy
//!
//! EMA 크로스오버 + RSI 확인 전략의 지표 계산 및 신호 생성.
//!
//! 이 크레이트는 두 개의 순수 구성 요소를 제공합니다:
//! - `indicators` - 캔들 윈도우에서 EMA(12/26)와 RSI(14)를 계산
//! - `signal` - 지표 상태를 이산적인 매매 신호로 변환

pub mod indicators;
pub mod signal;

pub use indicators::*;
pub use signal::*;
