//! 서버 응답 및 처리 통계 모델.
//!
//! - [`ServerResponse`] - 수신 프레임 JSON 본문
//! - [`ChunkStats`] - 청크 하나의 `info` 문자열에서 추출한 통계
//! - [`AggregateResult`] - `send` 호출 전체에 걸친 누적 통계

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::CoreError;

/// 성공 응답 값
pub const SUCCESS_RESPONSE: &str = "success";

/// `{"response": "...", "info": "..."}` 본문
///
/// 알 수 없는 필드는 `extra`에 보존되어 원본 응답을 그대로 복원할 수 있다.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServerResponse {
    /// "success" 또는 실패 사유
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
    /// 처리 통계 문자열
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info: Option<String>,
    /// 기타 필드
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ServerResponse {
    /// 성공 응답 생성
    pub fn success(info: impl Into<String>) -> Self {
        Self {
            response: Some(SUCCESS_RESPONSE.to_string()),
            info: Some(info.into()),
            extra: serde_json::Map::new(),
        }
    }

    /// 서버가 요청을 수락했는지 여부
    pub fn is_success(&self) -> bool {
        self.response.as_deref() == Some(SUCCESS_RESPONSE)
    }

    /// 원본 JSON 값으로 변환 (에러 진단용)
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

/// 청크 하나의 처리 통계
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChunkStats {
    /// 처리된 아이템 수
    pub processed: u64,
    /// 실패한 아이템 수
    pub failed: u64,
    /// 전체 아이템 수
    pub total: u64,
    /// 서버 처리 시간 (초, 10진 정밀도)
    pub seconds_spent: Decimal,
}

/// `send` 호출 하나의 누적 결과
///
/// `total == processed + failed`는 검증하지 않는다 (서버가 보고한 값을 그대로 누적).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateResult {
    /// 누적 처리 수
    pub processed: u64,
    /// 누적 실패 수
    pub failed: u64,
    /// 누적 전체 수
    pub total: u64,
    /// 누적 처리 시간 (초)
    pub time: Decimal,
    /// 파싱에 성공한 청크 수
    #[serde(rename = "chunk")]
    pub chunk_count: u64,
}

impl AggregateResult {
    /// 빈 결과 (모든 카운터 0)
    pub fn new() -> Self {
        Self::default()
    }

    /// 청크 통계를 더한 새 상태 반환
    ///
    /// 시간은 `Decimal` 덧셈이므로 청크가 많아도 반올림 오차가 누적되지 않는다.
    /// 카운터나 시간이 표현 범위를 넘으면 `MalformedResponse`.
    pub fn accumulate(&self, chunk: &ChunkStats) -> Result<Self, CoreError> {
        let overflow = |field: &str| {
            CoreError::MalformedResponse(format!("누적 {field} 값이 표현 범위를 초과함"))
        };

        Ok(Self {
            processed: self
                .processed
                .checked_add(chunk.processed)
                .ok_or_else(|| overflow("processed"))?,
            failed: self
                .failed
                .checked_add(chunk.failed)
                .ok_or_else(|| overflow("failed"))?,
            total: self
                .total
                .checked_add(chunk.total)
                .ok_or_else(|| overflow("total"))?,
            time: self
                .time
                .checked_add(chunk.seconds_spent)
                .ok_or_else(|| overflow("seconds spent"))?,
            chunk_count: self
                .chunk_count
                .checked_add(1)
                .ok_or_else(|| overflow("chunk"))?,
        })
    }

    /// 서버 측 실패 아이템이 있는지 여부
    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }
}

impl fmt::Display for AggregateResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match serde_json::to_string(self) {
            Ok(json) => f.write_str(&json),
            Err(_) => Err(fmt::Error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn accumulate_two_chunks() {
        let first = ChunkStats {
            processed: 3,
            failed: 1,
            total: 4,
            seconds_spent: dec("0.001"),
        };
        let second = ChunkStats {
            processed: 2,
            failed: 0,
            total: 2,
            seconds_spent: dec("0.002"),
        };

        let result = AggregateResult::new()
            .accumulate(&first)
            .and_then(|acc| acc.accumulate(&second))
            .unwrap();
        assert_eq!(result.processed, 5);
        assert_eq!(result.failed, 1);
        assert_eq!(result.total, 6);
        assert_eq!(result.time, dec("0.003"));
        assert_eq!(result.chunk_count, 2);
    }

    #[test]
    fn decimal_time_has_no_float_drift() {
        let chunk = ChunkStats {
            seconds_spent: dec("0.1"),
            ..Default::default()
        };
        let result = (0..10).fold(AggregateResult::new(), |acc, _| acc.accumulate(&chunk).unwrap());
        assert_eq!(result.time, dec("1.0"));
        assert_eq!(result.chunk_count, 10);
    }

    #[test]
    fn totals_not_validated() {
        // 서버가 모순된 값을 보내도 그대로 누적
        let chunk = ChunkStats {
            processed: 1,
            failed: 1,
            total: 7,
            seconds_spent: Decimal::ZERO,
        };
        let result = AggregateResult::new().accumulate(&chunk).unwrap();
        assert_eq!(result.total, 7);
    }

    #[test]
    fn counter_overflow_is_malformed_response() {
        let huge = ChunkStats {
            processed: u64::MAX,
            total: u64::MAX,
            ..Default::default()
        };
        let first = AggregateResult::new().accumulate(&huge).unwrap();
        let err = first.accumulate(&huge).unwrap_err();
        assert!(matches!(err, CoreError::MalformedResponse(_)));
        // 실패해도 기존 상태는 그대로
        assert_eq!(first.processed, u64::MAX);
        assert_eq!(first.chunk_count, 1);
    }

    #[test]
    fn time_overflow_is_malformed_response() {
        let huge = ChunkStats {
            seconds_spent: Decimal::MAX,
            ..Default::default()
        };
        let first = AggregateResult::new().accumulate(&huge).unwrap();
        assert!(matches!(
            first.accumulate(&huge),
            Err(CoreError::MalformedResponse(_))
        ));
    }

    #[test]
    fn display_renders_summary_json() {
        let result = AggregateResult {
            processed: 5,
            failed: 1,
            total: 6,
            time: dec("0.003"),
            chunk_count: 2,
        };
        let parsed: serde_json::Value = serde_json::from_str(&result.to_string()).unwrap();
        assert_eq!(
            parsed,
            serde_json::json!({
                "processed": 5, "failed": 1, "total": 6, "time": "0.003", "chunk": 2
            })
        );
    }

    #[test]
    fn server_response_preserves_unknown_fields() {
        let raw = serde_json::json!({"response": "failed", "info": "x", "version": "7.0"});
        let parsed: ServerResponse = serde_json::from_value(raw.clone()).unwrap();
        assert!(!parsed.is_success());
        assert_eq!(parsed.to_value(), raw);
    }

    #[test]
    fn missing_response_field_is_not_success() {
        let parsed: ServerResponse = serde_json::from_str(r#"{"info": "x"}"#).unwrap();
        assert!(!parsed.is_success());
        assert_eq!(parsed.to_value(), serde_json::json!({"info": "x"}));
    }
}
