//! 게이트웨이 에러 타입.

use thiserror::Error;

/// 게이트웨이 관련 에러.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// 브릿지 파일 입출력 에러
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// 스냅샷 파싱/역직렬화 에러
    #[error("Parse error: {0}")]
    Parse(String),

    /// 유효하지 않은 주문 요청
    #[error("Invalid order: {0}")]
    InvalidOrder(String),

    /// 내부 상태 에러
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<serde_json::Error> for GatewayError {
    fn from(err: serde_json::Error) -> Self {
        GatewayError::Parse(err.to_string())
    }
}

/// 게이트웨이 작업을 위한 Result 타입.
pub type GatewayResult<T> = Result<T, GatewayError>;
