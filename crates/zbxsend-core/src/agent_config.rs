//! Zabbix 에이전트 설정 파일 로더.
//!
//! `zabbix_agentd.conf`의 `ServerActive` 값에서 전송 대상 엔드포인트 목록을 얻는다.
//! 파일은 섹션 없는 `Key=value` 형식이며 `#`으로 시작하는 줄은 주석이다.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::CoreError;
use crate::models::endpoint::{Endpoint, DEFAULT_TRAPPER_PORT};

/// 엔드포인트 목록을 담은 설정 키
const SERVER_ACTIVE_KEY: &str = "ServerActive";

/// `ServerActive` 키가 없을 때 사용하는 값
const DEFAULT_SERVER_ACTIVE: &str = "127.0.0.1:10051";

/// 에이전트 설정 파일 탐색 경로 (뒤쪽이 우선)
pub const WELL_KNOWN_PATHS: &[&str] = &[
    "C:/Zabbix/zabbix_agentd.conf",
    "C:/Program Files/Zabbix Agent/zabbix_agentd.conf",
    "/etc/zabbix/zabbix_agentd.conf",
    "/etc/zabbix/zabbix_agent2.conf",
];

/// 잘 알려진 경로에서 에이전트 설정 파일 탐색
///
/// 여러 파일이 있으면 목록에서 마지막으로 존재하는 파일을 사용한다.
pub fn discover_agent_config() -> Option<PathBuf> {
    discover_in(WELL_KNOWN_PATHS.iter().map(PathBuf::from))
}

fn discover_in(candidates: impl IntoIterator<Item = PathBuf>) -> Option<PathBuf> {
    candidates.into_iter().filter(|p| p.is_file()).last()
}

/// 에이전트 설정 파일에서 엔드포인트 목록 로드
pub fn load_endpoints(path: &Path) -> Result<Vec<Endpoint>, CoreError> {
    let content = fs::read_to_string(path).map_err(|e| {
        CoreError::Config(format!(
            "에이전트 설정 파일 읽기 실패: {}: {}",
            path.display(),
            e
        ))
    })?;
    info!("에이전트 설정 사용: {}", path.display());

    let endpoints = parse_endpoints(&content)?;
    debug!(?endpoints, "에이전트 설정에서 엔드포인트 로드");
    Ok(endpoints)
}

/// 설정 파일 내용에서 엔드포인트 목록 파싱
///
/// `ServerActive`가 여러 번 나오면 마지막 값을 사용한다.
pub fn parse_endpoints(content: &str) -> Result<Vec<Endpoint>, CoreError> {
    let server_active = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .filter(|(key, _)| key.trim() == SERVER_ACTIVE_KEY)
        .map(|(_, value)| value.trim())
        .last()
        .unwrap_or(DEFAULT_SERVER_ACTIVE);

    let endpoints = server_active
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| Endpoint::parse_with_default_port(s, DEFAULT_TRAPPER_PORT))
        .collect::<Result<Vec<_>, _>>()?;

    if endpoints.is_empty() {
        return Err(CoreError::Config(format!(
            "{SERVER_ACTIVE_KEY}에 엔드포인트가 없음"
        )));
    }

    Ok(endpoints)
}
