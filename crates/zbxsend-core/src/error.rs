//! zbxsend 핵심 에러 타입.
//!
//! 어댑터 crate는 자체 에러 타입에서 `CoreError`를 source로 래핑한다.

use thiserror::Error;

/// 코어 레이어 에러.
/// 메트릭 생성, 프레임 인코딩/디코딩, 전송, 서버 응답 해석 단계의 에러를 정의한다.
#[derive(Debug, Error)]
pub enum CoreError {
    /// 메트릭 생성 시 필드 유효성 검증 실패 (숫자가 아닌 clock 등)
    #[error("메트릭 유효성 검증 실패 - {field}: {message}")]
    InvalidMetric {
        /// 검증 실패한 필드명
        field: String,
        /// 실패 사유
        message: String,
    },

    /// 요청 JSON 직렬화 실패
    #[error("인코딩 에러: {0}")]
    Encoding(String),

    /// 수신 프레임 헤더/본문 형식 오류
    #[error("프로토콜 에러: {0}")]
    Protocol(String),

    /// 연결 실패 또는 응답 수신 중 연결 종료
    #[error("연결 에러 ({endpoint}): {message}")]
    Connection {
        /// 대상 엔드포인트 ("host:port")
        endpoint: String,
        /// 실패 사유
        message: String,
    },

    /// connect/write/read 타임아웃 초과
    #[error("전송 타임아웃 ({endpoint}): {operation} {timeout_ms}ms 초과")]
    Timeout {
        /// 대상 엔드포인트 ("host:port")
        endpoint: String,
        /// 타임아웃이 발생한 단계 ("connect", "write", "read")
        operation: &'static str,
        /// 적용된 타임아웃 (밀리초)
        timeout_ms: u64,
    },

    /// 서버가 "success"가 아닌 응답을 반환
    #[error("서버 거부 ({endpoint}): {response}")]
    ServerRejected {
        /// 응답을 보낸 엔드포인트 ("host:port")
        endpoint: String,
        /// 디코딩된 원본 응답
        response: serde_json::Value,
    },

    /// info 문자열이 처리 통계 패턴과 일치하지 않음
    #[error("응답 통계 파싱 실패: {0}")]
    MalformedResponse(String),

    /// 설정값 오류
    #[error("설정 에러: {0}")]
    Config(String),

    /// JSON 직렬화/역직렬화 실패
    #[error("직렬화 에러: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O 에러
    #[error("I/O 에러: {0}")]
    Io(#[from] std::io::Error),
}

impl CoreError {
    /// 연결 실패 범주 여부 (타임아웃 포함)
    pub fn is_connection_failure(&self) -> bool {
        matches!(self, CoreError::Connection { .. } | CoreError::Timeout { .. })
    }

    /// 메트릭 유효성 에러 생성 헬퍼
    pub(crate) fn invalid_metric(field: &str, message: impl Into<String>) -> Self {
        CoreError::InvalidMetric {
            field: field.to_string(),
            message: message.into(),
        }
    }
}
