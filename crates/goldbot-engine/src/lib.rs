//! # Goldbot Engine
//!
//! 신호 평가, 리스크 사이징, 주문 디스패치, 포지션 생명주기 추적을
//! 하나의 엔진으로 묶습니다. 두 개의 고정 간격 루프(신호 60초,
//! 추적 15초)를 구동하며 사용자별 시작/중지/상태 조회와 계좌 상태
//! 스트림을 제공합니다.

pub mod daily_limit;
pub mod dispatcher;
pub mod engine;
pub mod orchestrator;
pub mod status;
pub mod tracker;

pub use daily_limit::DailyTradeCounter;
pub use dispatcher::OrderDispatcher;
pub use engine::TradingEngine;
pub use orchestrator::Orchestrator;
pub use status::{AccountStatusEvent, UserEngineStatus};
pub use tracker::PositionTracker;
