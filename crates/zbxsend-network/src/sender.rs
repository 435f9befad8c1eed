//! 배치 전송기.
//!
//! 메트릭 컬렉션을 고정 크기 청크로 나누고, 청크마다 설정된 모든 엔드포인트로
//! 순서대로 전송한 뒤 서버 응답 통계를 누적한다.
//!
//! 누적 규칙: 청크마다 **마지막** 엔드포인트의 `info`만 집계한다.
//! 여러 엔드포인트(예: 프록시 + 서버)의 결과를 합산하지 않는다.
//!
//! 실패 정책: 재시도 없음, 첫 실패에서 즉시 중단 (fail-fast).
//! 이미 승인된 청크는 되돌리지 않으며 부분 결과는 반환하지 않는다.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};
use zbxsend_core::agent_config;
use zbxsend_core::config::{SenderConfig, DEFAULT_CHUNK_SIZE};
use zbxsend_core::error::CoreError;
use zbxsend_core::models::endpoint::Endpoint;
use zbxsend_core::models::metric::Metric;
use zbxsend_core::models::response::AggregateResult;
use zbxsend_core::ports::observer::{NoOpObserver, SendObserver};
use zbxsend_core::ports::transport::Transport;

use crate::codec;
use crate::response::ResponseAggregator;
use crate::transport::TcpTransport;

/// 배치 전송 실패 - 실패한 청크/엔드포인트 정보 포함
#[derive(Debug, Error)]
#[error("청크 {chunk_index} 전송 실패{}: {source}", endpoint_suffix(.endpoint))]
pub struct SendError {
    /// 실패한 청크 번호 (0부터)
    pub chunk_index: usize,
    /// 실패 시 통신 중이던 엔드포인트 (인코딩 실패 시 None)
    pub endpoint: Option<Endpoint>,
    /// 원인 에러
    #[source]
    pub source: CoreError,
}

impl SendError {
    /// 원인 에러 종류
    pub fn kind(&self) -> &CoreError {
        &self.source
    }

    /// 원인 에러로 변환
    pub fn into_kind(self) -> CoreError {
        self.source
    }
}

fn endpoint_suffix(endpoint: &Option<Endpoint>) -> String {
    endpoint
        .as_ref()
        .map(|ep| format!(" ({ep})"))
        .unwrap_or_default()
}

/// Zabbix trapper 배치 전송기
///
/// 엔드포인트 목록은 생성 후 읽기 전용이며, 같은 인스턴스로 여러 번 `send`할 수 있다.
pub struct ZabbixSender {
    endpoints: Arc<[Endpoint]>,
    chunk_size: usize,
    transport: Arc<dyn Transport>,
    observer: Arc<dyn SendObserver>,
}

impl std::fmt::Debug for ZabbixSender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ZabbixSender")
            .field("endpoints", &self.endpoints)
            .field("chunk_size", &self.chunk_size)
            .finish_non_exhaustive()
    }
}

impl ZabbixSender {
    /// 새 전송기 생성 (TCP 전송, 기본 타임아웃)
    pub fn new(endpoints: Vec<Endpoint>, chunk_size: usize) -> Result<Self, CoreError> {
        Self::with_transport(endpoints, chunk_size, Arc::new(TcpTransport::default()))
    }

    /// 전송 구현을 지정해 생성
    pub fn with_transport(
        endpoints: Vec<Endpoint>,
        chunk_size: usize,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, CoreError> {
        let config = SenderConfig {
            endpoints,
            chunk_size,
            ..SenderConfig::default_config()
        };
        config.validate()?;

        Ok(Self {
            endpoints: config.endpoints.into(),
            chunk_size,
            transport,
            observer: Arc::new(NoOpObserver),
        })
    }

    /// 설정에서 생성 (TCP 전송, 설정의 타임아웃 적용)
    pub fn from_config(config: &SenderConfig) -> Result<Self, CoreError> {
        config.validate()?;
        Self::with_transport(
            config.endpoints.clone(),
            config.chunk_size,
            Arc::new(TcpTransport::new(config.timeout())),
        )
    }

    /// Zabbix 에이전트 설정 파일의 `ServerActive`에서 엔드포인트를 읽어 생성
    pub fn from_agent_config(path: &Path, chunk_size: usize) -> Result<Self, CoreError> {
        let endpoints = agent_config::load_endpoints(path)?;
        Self::new(endpoints, chunk_size)
    }

    /// 기본 엔드포인트(127.0.0.1:10051), 기본 청크 크기로 생성
    pub fn localhost() -> Self {
        Self {
            endpoints: vec![Endpoint::default()].into(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            transport: Arc::new(TcpTransport::default()),
            observer: Arc::new(NoOpObserver),
        }
    }

    /// 관찰자 설정
    pub fn with_observer(mut self, observer: Arc<dyn SendObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// 소켓 타임아웃 설정 (TCP 전송으로 교체)
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.transport = Arc::new(TcpTransport::new(timeout));
        self
    }

    /// 설정된 엔드포인트 목록
    pub fn endpoints(&self) -> &[Endpoint] {
        &self.endpoints
    }

    /// 청크 크기
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// 메트릭 전송
    ///
    /// 메트릭이 없으면 네트워크 통신 없이 0으로 채운 결과를 반환한다.
    pub async fn send(&self, metrics: &[Metric]) -> Result<AggregateResult, SendError> {
        let mut aggregator = ResponseAggregator::new();

        for (chunk_index, chunk) in metrics.chunks(self.chunk_size).enumerate() {
            debug!(chunk_index, size = chunk.len(), "청크 전송 시작");
            // 마지막 엔드포인트의 응답만 집계
            let (endpoint, info) = self.send_chunk(chunk_index, chunk).await?;
            let stats = aggregator.parse(&info).map_err(|source| SendError {
                chunk_index,
                endpoint: Some(endpoint.clone()),
                source,
            })?;
            self.observer.response_parsed(chunk_index, &endpoint, &stats);
        }

        let result = aggregator.finish();
        info!(
            processed = result.processed,
            failed = result.failed,
            total = result.total,
            chunks = result.chunk_count,
            "전송 완료"
        );
        Ok(result)
    }

    /// 청크 하나를 모든 엔드포인트로 전송하고 마지막 엔드포인트의 `info` 반환
    async fn send_chunk(
        &self,
        chunk_index: usize,
        chunk: &[Metric],
    ) -> Result<(Endpoint, String), SendError> {
        let frame = codec::encode_request(chunk).map_err(|source| SendError {
            chunk_index,
            endpoint: None,
            source,
        })?;

        let mut last_info = None;
        for endpoint in self.endpoints.iter() {
            let info = self
                .exchange_with(chunk_index, endpoint, &frame)
                .await
                .map_err(|source| SendError {
                    chunk_index,
                    endpoint: Some(endpoint.clone()),
                    source,
                })?;
            last_info = Some((endpoint, info));
        }

        // 집계 대상인 마지막 엔드포인트만 info 필수
        match last_info {
            Some((endpoint, Some(info))) => Ok((endpoint.clone(), info)),
            Some((endpoint, None)) => Err(SendError {
                chunk_index,
                endpoint: Some(endpoint.clone()),
                source: CoreError::MalformedResponse("성공 응답에 info 필드가 없음".to_string()),
            }),
            // 엔드포인트 목록은 생성 시 비어 있지 않음이 검증됨
            None => Err(SendError {
                chunk_index,
                endpoint: None,
                source: CoreError::Config("엔드포인트가 없음".to_string()),
            }),
        }
    }

    /// 엔드포인트 하나와 프레임 교환 후 `info` 문자열 반환 (없으면 `None`)
    async fn exchange_with(
        &self,
        chunk_index: usize,
        endpoint: &Endpoint,
        frame: &[u8],
    ) -> Result<Option<String>, CoreError> {
        debug!(%endpoint, chunk_index, "데이터 전송");
        self.observer
            .endpoint_attempted(chunk_index, endpoint, frame.len());

        let raw = self.transport.exchange(endpoint, frame).await?;
        self.observer.frame_exchanged(endpoint, frame, &raw.body);

        let response = codec::decode_response(&raw.header, &raw.body)?;
        debug!(%endpoint, ?response, "서버 응답");

        if !response.is_success() {
            return Err(CoreError::ServerRejected {
                endpoint: endpoint.to_string(),
                response: response.to_value(),
            });
        }

        Ok(response.info)
    }
}
