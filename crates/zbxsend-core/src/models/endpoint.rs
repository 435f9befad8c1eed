//! 엔드포인트 모델.
//!
//! 메트릭을 전송할 Zabbix 서버/프록시 주소 (address, port).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// Zabbix trapper 기본 포트
pub const DEFAULT_TRAPPER_PORT: u16 = 10051;

/// 전송 대상 엔드포인트
///
/// 주소 문자열은 검증하지 않는다 (호스트명 또는 IP).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Endpoint {
    /// 호스트명 또는 IP
    pub address: String,
    /// 포트 (1-65535)
    pub port: u16,
}

impl Endpoint {
    /// 새 엔드포인트 생성
    pub fn new(address: impl Into<String>, port: u16) -> Self {
        Self {
            address: address.into(),
            port,
        }
    }

    /// `"host"`, `"host:port"`, `"[v6]:port"` 형식 파싱
    ///
    /// 포트가 없으면 `default_port`를 사용한다.
    pub fn parse_with_default_port(s: &str, default_port: u16) -> Result<Self, CoreError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(CoreError::Config("빈 서버 주소".to_string()));
        }

        let (address, port) = if let Some(rest) = s.strip_prefix('[') {
            // [::1]:10051 또는 [::1]
            let (addr, tail) = rest
                .split_once(']')
                .ok_or_else(|| CoreError::Config(format!("닫는 대괄호 누락: {s}")))?;
            let port = match tail {
                "" => None,
                t => Some(
                    t.strip_prefix(':')
                        .ok_or_else(|| CoreError::Config(format!("잘못된 서버 주소: {s}")))?,
                ),
            };
            (addr, port)
        } else if s.matches(':').count() > 1 {
            // 대괄호 없는 IPv6 - 포트 없음으로 간주
            (s, None)
        } else {
            match s.split_once(':') {
                Some((addr, port)) => (addr, Some(port)),
                None => (s, None),
            }
        };

        let address = address.trim();
        if address.is_empty() {
            return Err(CoreError::Config(format!("빈 호스트: {s}")));
        }

        let port = match port {
            Some(p) => parse_port(p.trim())?,
            None => default_port,
        };

        Ok(Self::new(address, port))
    }

    /// 포트 범위 검증 (0은 허용하지 않음)
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.port == 0 {
            return Err(CoreError::Config(format!(
                "포트 범위 초과 (1-65535): {}",
                self
            )));
        }
        if self.address.trim().is_empty() {
            return Err(CoreError::Config("빈 서버 주소".to_string()));
        }
        Ok(())
    }
}

fn parse_port(p: &str) -> Result<u16, CoreError> {
    match p.parse::<u16>() {
        Ok(0) | Err(_) => Err(CoreError::Config(format!(
            "포트는 1-65535 범위의 정수여야 함: {p:?}"
        ))),
        Ok(port) => Ok(port),
    }
}

impl Default for Endpoint {
    fn default() -> Self {
        Self::new("127.0.0.1", DEFAULT_TRAPPER_PORT)
    }
}

impl FromStr for Endpoint {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_with_default_port(s, DEFAULT_TRAPPER_PORT)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.address.contains(':') {
            write!(f, "[{}]:{}", self.address, self.port)
        } else {
            write!(f, "{}:{}", self.address, self.port)
        }
    }
}
