//! 영속 계층 에러 타입.

use thiserror::Error;

/// 영속 계층 에러.
#[derive(Error, Debug)]
pub enum DataError {
    /// 데이터베이스 에러
    #[error("데이터베이스 에러: {0}")]
    Database(#[from] sqlx::Error),

    /// 레코드를 찾을 수 없음
    #[error("레코드를 찾을 수 없음: {0}")]
    NotFound(String),

    /// 저장된 값이 도메인 타입으로 변환되지 않음
    #[error("잘못된 레코드: {0}")]
    InvalidRecord(String),
}

/// 영속 계층 Result 타입.
pub type DataResult<T> = Result<T, DataError>;
