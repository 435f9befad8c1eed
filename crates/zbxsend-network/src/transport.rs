//! TCP 전송 어댑터.
//!
//! `Transport` 포트 구현. 청크-엔드포인트 쌍마다 새 연결을 열고
//! 요청 프레임 전체를 쓴 뒤 응답 프레임 전체를 읽는다.
//!
//! 소켓은 한 번의 호출 안에서 열고 읽기/쓰기를 분할 처리한다.
//! read/write 1회 호출이 요청한 바이트 수보다 적게 처리할 수 있으므로
//! 목표 길이 또는 EOF까지 반복한다.

use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::{debug, trace, warn};
use zbxsend_core::error::CoreError;
use zbxsend_core::models::endpoint::Endpoint;
use zbxsend_core::ports::transport::{RawFrame, Transport};

use crate::codec::{self, HEADER_LEN};

/// 기본 소켓 타임아웃
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// 본문 수신 버퍼 초기 용량 상한
const READ_CHUNK_LEN: usize = 64 * 1024;

/// TCP 전송 - `Transport` 포트 구현
#[derive(Debug, Clone)]
pub struct TcpTransport {
    timeout: Duration,
}

impl TcpTransport {
    /// 새 TCP 전송 생성 (connect/write/read 각각에 `timeout` 적용)
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// 적용 중인 타임아웃
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl Default for TcpTransport {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT)
    }
}

#[async_trait]
impl Transport for TcpTransport {
    async fn exchange(&self, endpoint: &Endpoint, frame: &[u8]) -> Result<RawFrame, CoreError> {
        debug!(%endpoint, "연결 시도");

        let connect = TcpStream::connect((endpoint.address.as_str(), endpoint.port));
        let stream = with_timeout(endpoint, "connect", self.timeout, connect)
            .await?
            .map_err(|e| connection_error(endpoint, format!("연결 실패: {e}")))?;

        if let Err(e) = stream.set_nodelay(true) {
            warn!(%endpoint, "TCP_NODELAY 설정 실패: {e}");
        }

        exchange_stream(stream, endpoint, frame, self.timeout).await
    }
}

/// 이미 열린 스트림으로 프레임 교환
///
/// 스트림은 이 함수가 소유하며 성공/실패 모든 경로에서 반환 시 drop되어 닫힌다.
pub(crate) async fn exchange_stream<S>(
    mut stream: S,
    endpoint: &Endpoint,
    frame: &[u8],
    timeout: Duration,
) -> Result<RawFrame, CoreError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    with_timeout(endpoint, "write", timeout, write_frame(&mut stream, frame))
        .await?
        .map_err(|e| connection_error(endpoint, format!("프레임 전송 실패: {e}")))?;
    trace!(%endpoint, bytes = frame.len(), "요청 프레임 전송 완료");

    let header = with_timeout(endpoint, "read", timeout, read_up_to(&mut stream, HEADER_LEN))
        .await?
        .map_err(|e| connection_error(endpoint, format!("헤더 수신 실패: {e}")))?;

    match header.len() {
        0 => {
            return Err(connection_error(
                endpoint,
                "서버가 응답 없이 연결을 닫음".to_string(),
            ))
        }
        n if n < HEADER_LEN => {
            return Err(connection_error(
                endpoint,
                format!("헤더 수신 중 연결 종료 ({n}/{HEADER_LEN}바이트)"),
            ))
        }
        _ => {}
    }

    let body_len = codec::parse_header(&header)?;
    trace!(%endpoint, body_len, "응답 헤더 수신");

    let body = with_timeout(endpoint, "read", timeout, read_up_to(&mut stream, body_len))
        .await?
        .map_err(|e| connection_error(endpoint, format!("본문 수신 실패: {e}")))?;

    if body.len() < body_len {
        return Err(connection_error(
            endpoint,
            format!("본문 수신 중 연결 종료 ({}/{body_len}바이트)", body.len()),
        ));
    }

    debug!(%endpoint, bytes = HEADER_LEN + body.len(), "응답 프레임 수신 완료");
    Ok(RawFrame { header, body })
}

/// 프레임 전체를 쓴다 (부분 쓰기는 `write_all`이 반복 처리)
async fn write_frame<S>(stream: &mut S, frame: &[u8]) -> std::io::Result<()>
where
    S: AsyncWrite + Unpin,
{
    stream.write_all(frame).await?;
    stream.flush().await
}

/// `count` 바이트가 모이거나 EOF가 올 때까지 반복해서 읽는다
///
/// EOF로 끝나면 `count`보다 짧은 버퍼를 반환한다.
/// 버퍼는 수신한 만큼만 늘어난다 (선언된 길이를 미리 할당하지 않음).
async fn read_up_to<S>(stream: &mut S, count: usize) -> std::io::Result<Vec<u8>>
where
    S: AsyncRead + Unpin,
{
    let mut buf = Vec::with_capacity(count.min(READ_CHUNK_LEN));
    (&mut *stream).take(count as u64).read_to_end(&mut buf).await?;
    Ok(buf)
}

async fn with_timeout<F, T>(
    endpoint: &Endpoint,
    operation: &'static str,
    timeout: Duration,
    fut: F,
) -> Result<T, CoreError>
where
    F: Future<Output = T>,
{
    tokio::time::timeout(timeout, fut)
        .await
        .map_err(|_| CoreError::Timeout {
            endpoint: endpoint.to_string(),
            operation,
            timeout_ms: timeout.as_millis() as u64,
        })
}

fn connection_error(endpoint: &Endpoint, message: String) -> CoreError {
    CoreError::Connection {
        endpoint: endpoint.to_string(),
        message,
    }
}
