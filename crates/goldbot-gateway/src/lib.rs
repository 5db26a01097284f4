//! 시장 데이터 게이트웨이.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - `MarketDataGateway` trait: 통합 게이트웨이 인터페이스
//! - 브릿지 파일 게이트웨이 (외부 MT5 터미널이 갱신하는 스냅샷 파일)
//! - 시뮬레이션 게이트웨이 (테스트 및 명시적 모의 모드용)
//!
//! 모든 조회 작업은 데이터가 없거나 오래된 경우 `None`/빈 목록을
//! 반환할 수 있으며, 호출자는 이를 "데이터 없음"으로 취급합니다.

pub mod bridge;
pub mod error;
pub mod sim;
pub mod traits;

pub use bridge::{BridgeGateway, BridgeSnapshot};
pub use error::*;
pub use sim::SimulatedGateway;
pub use traits::*;
