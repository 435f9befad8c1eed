//! 전송기 설정 구조체.
//!
//! 전송 대상 엔드포인트 목록, 청크 크기, 소켓 타임아웃을 정의한다.
//! JSON 파일에서 로드하거나 에이전트 설정([`crate::agent_config`])에서 엔드포인트를 얻는다.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

use crate::error::CoreError;
use crate::models::endpoint::Endpoint;

/// 기본 청크 크기 (한 프레임에 담는 최대 메트릭 수)
pub const DEFAULT_CHUNK_SIZE: usize = 250;

/// 전송기 설정
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SenderConfig {
    /// 전송 대상 엔드포인트 (설정 순서대로 전송)
    #[serde(default = "default_endpoints")]
    pub endpoints: Vec<Endpoint>,
    /// 청크당 최대 메트릭 수
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    /// connect/write/read 타임아웃 (밀리초)
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl SenderConfig {
    /// 기본 설정값 반환
    pub fn default_config() -> Self {
        Self {
            endpoints: default_endpoints(),
            chunk_size: default_chunk_size(),
            timeout_ms: default_timeout_ms(),
        }
    }

    /// 지정 엔드포인트로 설정 생성 (나머지는 기본값)
    pub fn with_endpoints(endpoints: Vec<Endpoint>) -> Self {
        Self {
            endpoints,
            ..Self::default_config()
        }
    }

    /// 소켓 타임아웃을 Duration으로 반환
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// 설정값 검증
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.endpoints.is_empty() {
            return Err(CoreError::Config("엔드포인트가 하나 이상 필요함".to_string()));
        }
        for endpoint in &self.endpoints {
            endpoint.validate()?;
        }
        if self.chunk_size == 0 {
            return Err(CoreError::Config("chunk_size는 1 이상이어야 함".to_string()));
        }
        if self.timeout_ms == 0 {
            return Err(CoreError::Config("timeout_ms는 1 이상이어야 함".to_string()));
        }
        Ok(())
    }

    /// JSON 파일에서 설정 로드 (검증 포함)
    pub fn load_from_file(path: &Path) -> Result<Self, CoreError> {
        let content = fs::read_to_string(path).map_err(|e| {
            CoreError::Config(format!("설정 파일 읽기 실패: {}: {}", path.display(), e))
        })?;

        let config: SenderConfig = serde_json::from_str(&content).map_err(|e| {
            CoreError::Config(format!("설정 파일 파싱 실패: {}: {}", path.display(), e))
        })?;
        config.validate()?;

        debug!("설정 파일 로드 완료: {}", path.display());
        Ok(config)
    }

    /// JSON 파일로 설정 저장
    pub fn save_to_file(&self, path: &Path) -> Result<(), CoreError> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| CoreError::Config(format!("설정 직렬화 실패: {}", e)))?;

        fs::write(path, content).map_err(|e| {
            CoreError::Config(format!("설정 파일 저장 실패: {}: {}", path.display(), e))
        })?;

        Ok(())
    }
}

impl Default for SenderConfig {
    fn default() -> Self {
        Self::default_config()
    }
}

// ============================================================
// 기본값 함수
// ============================================================

fn default_endpoints() -> Vec<Endpoint> {
    vec![Endpoint::default()]
}
fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}
fn default_timeout_ms() -> u64 {
    10_000
}
