//! tracing 기반 전송 관찰자.
//!
//! `debug` 레벨: 엔드포인트 시도, 청크 통계.
//! `trace` 레벨: 요청/응답 프레임 hex 덤프.

use tracing::{debug, enabled, trace, Level};
use zbxsend_core::models::endpoint::Endpoint;
use zbxsend_core::models::response::ChunkStats;
use zbxsend_core::ports::observer::SendObserver;

/// hex 덤프 최대 바이트 수 (초과분은 생략 표시)
const HEX_DUMP_LIMIT: usize = 512;

/// `SendObserver` 포트 구현 - tracing 이벤트로 기록
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl TracingObserver {
    pub fn new() -> Self {
        Self
    }
}

impl SendObserver for TracingObserver {
    fn endpoint_attempted(&self, chunk_index: usize, endpoint: &Endpoint, frame_len: usize) {
        debug!(chunk_index, %endpoint, frame_len, "엔드포인트 전송 시도");
    }

    fn frame_exchanged(&self, endpoint: &Endpoint, request: &[u8], response: &[u8]) {
        if !enabled!(Level::TRACE) {
            return;
        }
        trace!(%endpoint, bytes = request.len(), "요청 프레임: {}", hex_dump(request));
        trace!(%endpoint, bytes = response.len(), "응답 본문: {}", hex_dump(response));
    }

    fn response_parsed(&self, chunk_index: usize, endpoint: &Endpoint, stats: &ChunkStats) {
        debug!(
            chunk_index,
            %endpoint,
            processed = stats.processed,
            failed = stats.failed,
            total = stats.total,
            seconds_spent = %stats.seconds_spent,
            "청크 응답 파싱"
        );
    }
}

/// 바이트를 공백 구분 hex 문자열로 변환 (`HEX_DUMP_LIMIT` 까지)
pub fn hex_dump(bytes: &[u8]) -> String {
    let shown = &bytes[..bytes.len().min(HEX_DUMP_LIMIT)];
    let encoded = hex::encode(shown);

    let mut out = String::with_capacity(shown.len() * 3 + 16);
    for (i, pair) in encoded.as_bytes().chunks(2).enumerate() {
        if i > 0 {
            out.push(' ');
        }
        out.extend(pair.iter().map(|&b| b as char));
    }
    if bytes.len() > HEX_DUMP_LIMIT {
        out.push_str(&format!(" ... (+{}바이트)", bytes.len() - HEX_DUMP_LIMIT));
    }
    out
}
