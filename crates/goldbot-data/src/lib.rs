//! # Goldbot Data
//!
//! 사용자 설정과 체결 기록의 영속 계층입니다. PostgreSQL 구현과
//! 테스트/독립 실행용 인메모리 구현을 제공합니다.

pub mod error;
pub mod memory;
pub mod settings;
pub mod trades;

pub use error::{DataError, DataResult};
pub use memory::{MemorySettingsStore, MemoryTradeStore};
pub use settings::{PgSettingsStore, UserSettingsStore};
pub use trades::{PgTradeStore, TradeStore};
