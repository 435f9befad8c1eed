//! 전송 관찰자 포트.
//!
//! 배치 전송 중 발생하는 진단 이벤트를 외부로 전달한다.
//! 전역 로거 대신 생성자에서 주입하며, 기본값은 [`NoOpObserver`].
//!
//! 구현: `zbxsend-network` crate (`TracingObserver`)

use crate::models::endpoint::Endpoint;
use crate::models::response::ChunkStats;

/// 전송 진단 이벤트 수신 인터페이스
///
/// 구현체: `TracingObserver` (tracing 로그), `NoOpObserver` (기본값)
pub trait SendObserver: Send + Sync {
    /// 엔드포인트로 청크 전송 시도
    fn endpoint_attempted(&self, chunk_index: usize, endpoint: &Endpoint, frame_len: usize);

    /// 요청/응답 프레임 교환 완료
    fn frame_exchanged(&self, endpoint: &Endpoint, request: &[u8], response: &[u8]);

    /// 청크 응답 통계 파싱 완료
    fn response_parsed(&self, chunk_index: usize, endpoint: &Endpoint, stats: &ChunkStats);
}

/// 아무 동작도 하지 않는 관찰자
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpObserver;

impl SendObserver for NoOpObserver {
    fn endpoint_attempted(&self, _chunk_index: usize, _endpoint: &Endpoint, _frame_len: usize) {}

    fn frame_exchanged(&self, _endpoint: &Endpoint, _request: &[u8], _response: &[u8]) {}

    fn response_parsed(&self, _chunk_index: usize, _endpoint: &Endpoint, _stats: &ChunkStats) {}
}
