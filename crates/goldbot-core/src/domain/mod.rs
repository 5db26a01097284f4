//! 도메인 모델.

pub mod market;
pub mod order;
pub mod settings;
pub mod signal;
pub mod trade;

pub use market::*;
pub use order::*;
pub use settings::*;
pub use signal::*;
pub use trade::*;
