//! 메트릭 모델.
//!
//! Zabbix 서버로 전송할 단일 데이터 포인트 (host, key, value, clock).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::CoreError;

/// 단일 데이터 포인트 - 생성 후 불변
///
/// `value`는 숫자든 문자열이든 텍스트로 저장되어 전송된다.
/// `clock`이 없으면 서버 수신 시각이 사용된다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metric {
    host: String,
    key: String,
    value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    clock: Option<u64>,
}

impl Metric {
    /// 새 메트릭 생성 (clock 없음)
    ///
    /// ```
    /// use zbxsend_core::models::metric::Metric;
    ///
    /// let m = Metric::new("localhost", "cpu[usage]", 20);
    /// assert_eq!(m.value(), "20");
    /// ```
    pub fn new(host: impl Into<String>, key: impl Into<String>, value: impl fmt::Display) -> Self {
        Self {
            host: host.into(),
            key: key.into(),
            value: value.to_string(),
            clock: None,
        }
    }

    /// Unix 타임스탬프(초) 지정
    pub fn with_clock(mut self, clock: u64) -> Self {
        self.clock = Some(clock);
        self
    }

    /// `DateTime<Utc>`로 clock 지정 (epoch 이전 시각은 거부)
    pub fn with_timestamp(self, timestamp: DateTime<Utc>) -> Result<Self, CoreError> {
        let secs = timestamp.timestamp();
        let clock = u64::try_from(secs).map_err(|_| {
            CoreError::invalid_metric("clock", format!("epoch 이전 시각: {timestamp}"))
        })?;
        Ok(self.with_clock(clock))
    }

    /// 부동소수점 타임스탬프로 clock 지정 (소수부 버림)
    pub fn with_clock_f64(self, clock: f64) -> Result<Self, CoreError> {
        if !clock.is_finite() || clock < 0.0 || clock > u64::MAX as f64 {
            return Err(CoreError::invalid_metric(
                "clock",
                format!("Unix 타임스탬프가 아님: {clock}"),
            ));
        }
        Ok(self.with_clock(clock.trunc() as u64))
    }

    /// 텍스트 타임스탬프로 clock 지정 (정수 또는 소수 표기만 허용)
    pub fn with_clock_str(self, clock: &str) -> Result<Self, CoreError> {
        let trimmed = clock.trim();
        if let Ok(secs) = trimmed.parse::<u64>() {
            return Ok(self.with_clock(secs));
        }

        let is_decimal = !trimmed.is_empty()
            && trimmed.chars().all(|c| c.is_ascii_digit() || c == '.')
            && trimmed.matches('.').count() == 1
            && trimmed != ".";
        if is_decimal {
            if let Ok(secs) = trimmed.parse::<f64>() {
                return self.with_clock_f64(secs);
            }
        }

        Err(CoreError::invalid_metric(
            "clock",
            format!("Unix 타임스탬프 형식이 아님: {clock:?}"),
        ))
    }

    /// 호스트 이름 (Zabbix 프론트엔드에 표시되는 이름)
    pub fn host(&self) -> &str {
        &self.host
    }

    /// 아이템 키
    pub fn key(&self) -> &str {
        &self.key
    }

    /// 텍스트로 저장된 값
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Unix 타임스탬프 (초)
    pub fn clock(&self) -> Option<u64> {
        self.clock
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.clock {
            Some(clock) => write!(f, "{} {} {} {}", self.host, self.key, clock, self.value),
            None => write!(f, "{} {} {}", self.host, self.key, self.value),
        }
    }
}
