//! # Goldbot Risk
//!
//! 계좌 잔고, 사용자별 리스크 설정, 심볼의 틱 경제성을 결합하여
//! 한도 내의 포지션 크기와 보호 가격 수준을 산출합니다.

pub mod sizer;

pub use sizer::*;
