//! Mock trapper 서버 모듈
//!
//! 클라이언트 통합 테스트를 위한 경량 mock 서버.
//! tokio `TcpListener` 기반으로 Zabbix trapper 프레임을 주고받는다.

#![allow(dead_code)]

use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;
use zbxsend_core::models::endpoint::Endpoint;
use zbxsend_core::models::metric::Metric;
use zbxsend_core::models::response::ServerResponse;
use zbxsend_network::codec::{self, HEADER_LEN};

/// 연결마다의 서버 동작
#[derive(Debug, Clone)]
pub enum Behavior {
    /// 받은 아이템을 모두 처리한 것으로 응답
    Accept,
    /// 받은 아이템 중 `failed`개를 실패로 응답
    PartialFailure { failed: usize },
    /// `{"response": <reason>}` 거부 응답
    Reject(String),
    /// 요청을 읽은 뒤 응답 없이 연결 종료
    CloseWithoutResponse,
    /// 헤더 일부만 보내고 종료
    TruncatedHeader,
    /// 응답하지 않고 대기
    Silent,
    /// 임의 바이트 응답
    Raw(Vec<u8>),
}

/// Mock 서버 상태
#[derive(Debug, Default)]
pub struct MockServerState {
    /// 수락한 연결 수
    pub connection_count: AtomicU64,
    /// 수신한 요청 (도착 순서)
    pub requests: Mutex<Vec<Vec<Metric>>>,
}

/// Mock 서버 핸들
pub struct MockServer {
    pub port: u16,
    pub state: Arc<MockServerState>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockServer {
    /// 모든 요청을 수락하는 서버 시작
    pub async fn start() -> Self {
        Self::start_with(Behavior::Accept).await
    }

    /// 지정 동작으로 서버 시작
    pub async fn start_with(behavior: Behavior) -> Self {
        let state = Arc::new(MockServerState::default());
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("포트 바인딩 실패");
        let port = listener.local_addr().unwrap().port();
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel();

        let task_state = state.clone();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => break,
                    accepted = listener.accept() => {
                        let Ok((socket, _)) = accepted else { break };
                        task_state.connection_count.fetch_add(1, Ordering::SeqCst);
                        let state = task_state.clone();
                        let behavior = behavior.clone();
                        tokio::spawn(async move {
                            handle_connection(socket, behavior, state).await;
                        });
                    }
                }
            }
        });

        Self {
            port,
            state,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// 클라이언트용 엔드포인트
    pub fn endpoint(&self) -> Endpoint {
        Endpoint::new("127.0.0.1", self.port)
    }

    /// `host:port` 문자열
    pub fn address(&self) -> String {
        format!("127.0.0.1:{}", self.port)
    }

    /// 연결 수 조회
    pub fn connection_count(&self) -> u64 {
        self.state.connection_count.load(Ordering::SeqCst)
    }

    /// 수신한 요청 목록 (요청당 메트릭 목록)
    pub fn requests(&self) -> Vec<Vec<Metric>> {
        self.state.requests.lock().clone()
    }
}

impl Drop for MockServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

async fn handle_connection(mut socket: TcpStream, behavior: Behavior, state: Arc<MockServerState>) {
    let mut header = [0u8; HEADER_LEN];
    if socket.read_exact(&mut header).await.is_err() {
        return;
    }
    let Ok(len) = codec::parse_header(&header) else {
        return;
    };
    let mut body = vec![0u8; len];
    if socket.read_exact(&mut body).await.is_err() {
        return;
    }
    let metrics = codec::decode_request(&header, &body)
        .expect("요청 프레임 디코딩 실패")
        .data
        .into_owned();
    let count = metrics.len();
    state.requests.lock().push(metrics);

    let reply = match behavior {
        Behavior::Accept => stats_reply(count, 0),
        Behavior::PartialFailure { failed } => stats_reply(count, failed.min(count)),
        Behavior::Reject(reason) => codec::encode_response(&ServerResponse {
            response: Some(reason),
            ..Default::default()
        })
        .unwrap(),
        Behavior::CloseWithoutResponse => return,
        Behavior::TruncatedHeader => b"ZBXD\x01\x10".to_vec(),
        Behavior::Silent => {
            tokio::time::sleep(Duration::from_secs(30)).await;
            return;
        }
        Behavior::Raw(bytes) => bytes,
    };

    let _ = socket.write_all(&reply).await;
    let _ = socket.flush().await;
}

fn stats_reply(total: usize, failed: usize) -> Vec<u8> {
    codec::encode_response(&ServerResponse::success(format!(
        "processed: {}; failed: {failed}; total: {total}; seconds spent: 0.000100",
        total - failed
    )))
    .unwrap()
}
