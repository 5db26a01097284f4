//! # Goldbot Core
//!
//! 골드(XAUUSD) 트레이딩 봇의 핵심 도메인 모델 및 타입을 제공합니다.
//!
//! 이 크레이트는 시스템 전반에서 사용되는 기본 타입을 제공합니다:
//! - 캔들/틱/심볼 메타데이터 등 시장 데이터 구조체
//! - 매매 신호 및 주문 의도
//! - 체결 기록 및 포지션 추적 타입
//! - 사용자별 트레이딩 설정
//! - 설정 관리
//! - 로깅 인프라

pub mod config;
pub mod domain;
pub mod error;
pub mod logging;
pub mod types;

pub use config::*;
pub use domain::*;
pub use error::*;
pub use logging::*;
pub use types::*;
