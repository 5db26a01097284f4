//! 트레이딩 시스템의 에러 타입.
//!
//! 이 모듈은 엔진 전반에서 사용되는 에러 분류를 정의합니다.
//! 분류별 처리 정책:
//! - 조용히 건너뜀: `DataUnavailable`, `RiskRejected`
//! - 운영자 채널 보고: `SubmissionFailed`, `Persistence`, `ReconciliationMiss`

use thiserror::Error;

/// 핵심 엔진 에러.
#[derive(Debug, Error)]
pub enum EngineError {
    /// 설정 에러
    #[error("설정 에러: {0}")]
    Config(String),

    /// 게이트웨이 에러
    #[error("게이트웨이 에러: {0}")]
    Gateway(String),

    /// 게이트웨이가 null/빈 데이터를 반환함 (사이클 건너뜀)
    #[error("데이터 없음: {0}")]
    DataUnavailable(String),

    /// 리스크 정책에 의한 거부 (스프레드/일일 한도/비활성화)
    #[error("리스크 거부: {0}")]
    RiskRejected(String),

    /// 게이트웨이가 호출을 받았으나 사용 가능한 결과를 반환하지 않음
    #[error("주문 접수 실패: {0}")]
    SubmissionFailed(String),

    /// 영속화 실패 (주문/청산 성공 이후의 기록 실패)
    #[error("영속화 에러: {0}")]
    Persistence(String),

    /// 청산된 티켓과 일치하는 체결 내역 없음
    #[error("청산 내역 조정 실패: {0}")]
    ReconciliationMiss(String),

    /// 알림 전송 에러
    #[error("알림 에러: {0}")]
    Notification(String),

    /// 내부 에러
    #[error("내부 에러: {0}")]
    Internal(String),
}

/// 엔진 작업을 위한 Result 타입.
pub type EngineResult<T> = Result<T, EngineError>;

impl EngineError {
    /// 알림 없이 조용히 건너뛰어야 하는 에러인지 확인합니다.
    pub fn is_silent(&self) -> bool {
        matches!(
            self,
            EngineError::DataUnavailable(_) | EngineError::RiskRejected(_)
        )
    }

    /// 운영자 채널로 보고해야 하는 에러인지 확인합니다.
    pub fn needs_operator_alert(&self) -> bool {
        matches!(
            self,
            EngineError::SubmissionFailed(_)
                | EngineError::Persistence(_)
                | EngineError::ReconciliationMiss(_)
        )
    }
}

impl From<serde_json::Error> for EngineError {
    fn from(err: serde_json::Error) -> Self {
        EngineError::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_silent_errors() {
        assert!(EngineError::DataUnavailable("no tick".to_string()).is_silent());
        assert!(EngineError::RiskRejected("spread".to_string()).is_silent());
        assert!(!EngineError::SubmissionFailed("no result".to_string()).is_silent());
    }

    #[test]
    fn test_operator_alerts() {
        assert!(EngineError::SubmissionFailed("no result".to_string()).needs_operator_alert());
        assert!(EngineError::Persistence("insert failed".to_string()).needs_operator_alert());
        assert!(!EngineError::DataUnavailable("stale".to_string()).needs_operator_alert());
    }
}
