//! 서버 응답 통계 집계.
//!
//! 서버의 `info` 문자열 (`"processed: 3; failed: 1; total: 4; seconds spent: 0.001234"`)을
//! 파싱하고, 한 번의 `send` 호출 동안 청크별 통계를 누적한다.
//!
//! 레이블 대소문자, 콜론/세미콜론 유무, 공백 차이는 허용한다.

use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use std::str::FromStr;
use zbxsend_core::error::CoreError;
use zbxsend_core::models::response::{AggregateResult, ChunkStats};

/// 처리 통계 패턴 (프로세스당 한 번만 컴파일)
static STATS_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)processed:?\s*(\d+)[;,]?\s*failed:?\s*(\d+)[;,]?\s*total:?\s*(\d+)[;,]?\s*seconds\s+spent:?\s*(\d+(?:\.\d*)?|\.\d+)",
    )
    .expect("통계 패턴은 유효한 정규식")
});

/// `info` 문자열 하나를 청크 통계로 파싱
pub fn parse_chunk(info: &str) -> Result<ChunkStats, CoreError> {
    let caps = STATS_PATTERN
        .captures(info)
        .ok_or_else(|| CoreError::MalformedResponse(format!("통계 패턴 불일치: {info:?}")))?;

    let count = |idx: usize, label: &str| -> Result<u64, CoreError> {
        caps[idx].parse::<u64>().map_err(|e| {
            CoreError::MalformedResponse(format!("{label} 값 파싱 실패 ({info:?}): {e}"))
        })
    };

    let seconds_spent = Decimal::from_str(&caps[4]).map_err(|e| {
        CoreError::MalformedResponse(format!("seconds spent 값 파싱 실패 ({info:?}): {e}"))
    })?;

    Ok(ChunkStats {
        processed: count(1, "processed")?,
        failed: count(2, "failed")?,
        total: count(3, "total")?,
        seconds_spent,
    })
}

/// `send` 호출 하나의 응답 누적기
///
/// 청크는 제출 순서대로 들어온다.
#[derive(Debug, Clone, Default)]
pub struct ResponseAggregator {
    state: AggregateResult,
}

impl ResponseAggregator {
    /// 빈 누적기 생성
    pub fn new() -> Self {
        Self::default()
    }

    /// `info` 문자열을 파싱해 누적하고, 해당 청크 통계를 반환
    ///
    /// 파싱 또는 누적에 실패하면 상태는 바뀌지 않는다.
    pub fn parse(&mut self, info: &str) -> Result<ChunkStats, CoreError> {
        let stats = parse_chunk(info)?;
        self.accumulate(&stats)?;
        Ok(stats)
    }

    /// 파싱된 청크 통계 누적 (오버플로 시 `MalformedResponse`)
    pub fn accumulate(&mut self, stats: &ChunkStats) -> Result<(), CoreError> {
        self.state = self.state.accumulate(stats)?;
        Ok(())
    }

    /// 현재까지의 누적 결과
    pub fn current(&self) -> &AggregateResult {
        &self.state
    }

    /// 누적 결과 반환 (이후 불변)
    pub fn finish(self) -> AggregateResult {
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn parse_standard_info() {
        let stats = parse_chunk("processed: 3; failed: 1; total: 4; seconds spent: 0.001234").unwrap();
        assert_eq!(
            stats,
            ChunkStats {
                processed: 3,
                failed: 1,
                total: 4,
                seconds_spent: dec("0.001234"),
            }
        );
    }

    #[test]
    fn parse_legacy_capitalized_info() {
        // 구버전 서버 형식
        let stats = parse_chunk("Processed 2 Failed 0 Total 2 Seconds spent 0.000077").unwrap();
        assert_eq!(stats.processed, 2);
        assert_eq!(stats.total, 2);
        assert_eq!(stats.seconds_spent, dec("0.000077"));
    }

    #[test]
    fn parse_mixed_case_labels() {
        let stats = parse_chunk("PROCESSED: 10; Failed: 5; TOTAL: 15; Seconds Spent: 1.5").unwrap();
        assert_eq!(stats.processed, 10);
        assert_eq!(stats.failed, 5);
        assert_eq!(stats.total, 15);
        assert_eq!(stats.seconds_spent, dec("1.5"));
    }

    #[test]
    fn missing_seconds_spent_is_malformed() {
        assert_matches!(
            parse_chunk("processed: 3; failed: 1; total: 4"),
            Err(CoreError::MalformedResponse(_))
        );
    }

    #[test]
    fn non_numeric_value_is_malformed() {
        assert_matches!(
            parse_chunk("processed: x; failed: 1; total: 4; seconds spent: 0.1"),
            Err(CoreError::MalformedResponse(_))
        );
        assert_matches!(parse_chunk(""), Err(CoreError::MalformedResponse(_)));
    }

    #[test]
    fn overflowing_count_is_malformed() {
        assert_matches!(
            parse_chunk("processed: 99999999999999999999999; failed: 0; total: 1; seconds spent: 0.1"),
            Err(CoreError::MalformedResponse(_))
        );
    }

    #[test]
    fn aggregator_accumulates_in_order() {
        let mut agg = ResponseAggregator::new();
        agg.parse("processed: 3; failed: 1; total: 4; seconds spent: 0.001").unwrap();
        assert_eq!(agg.current().chunk_count, 1);
        agg.parse("processed: 2; failed: 0; total: 2; seconds spent: 0.002").unwrap();

        let result = agg.finish();
        assert_eq!(result.processed, 5);
        assert_eq!(result.failed, 1);
        assert_eq!(result.total, 6);
        assert_eq!(result.time, dec("0.003"));
        assert_eq!(result.chunk_count, 2);
    }

    #[test]
    fn failed_parse_does_not_touch_state() {
        let mut agg = ResponseAggregator::new();
        agg.parse("processed: 1; failed: 0; total: 1; seconds spent: 0.5").unwrap();
        assert!(agg.parse("garbage").is_err());
        assert_eq!(agg.current().chunk_count, 1);
        assert_eq!(agg.current().time, dec("0.5"));
    }

    #[test]
    fn count_overflow_across_chunks_is_malformed() {
        let info = "processed: 18446744073709551615; failed: 0; total: 1; seconds spent: 0.1";
        let mut agg = ResponseAggregator::new();
        agg.parse(info).unwrap();
        assert_matches!(agg.parse(info), Err(CoreError::MalformedResponse(_)));
        assert_eq!(agg.current().processed, u64::MAX);
        assert_eq!(agg.current().chunk_count, 1);
    }

    #[test]
    fn time_overflow_across_chunks_is_malformed() {
        let info = "processed: 1; failed: 0; total: 1; seconds spent: 79228162514264337593543950335";
        let mut agg = ResponseAggregator::new();
        agg.parse(info).unwrap();
        assert_matches!(agg.parse(info), Err(CoreError::MalformedResponse(_)));
        assert_eq!(agg.current().chunk_count, 1);
    }

    #[test]
    fn empty_aggregator_is_all_zero() {
        let result = ResponseAggregator::new().finish();
        assert_eq!(result, AggregateResult::default());
        assert_eq!(result.time, Decimal::ZERO);
    }
}
