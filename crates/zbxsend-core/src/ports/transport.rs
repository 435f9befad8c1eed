//! 프레임 전송 포트.
//!
//! 구현: `zbxsend-network` crate (`TcpTransport`, tokio)

use async_trait::async_trait;

use crate::error::CoreError;
use crate::models::endpoint::Endpoint;

/// 서버로부터 수신한 원시 프레임 (헤더 13바이트 + 본문)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawFrame {
    /// 헤더 바이트 (magic + version + 길이)
    pub header: Vec<u8>,
    /// 본문 바이트 (UTF-8 JSON)
    pub body: Vec<u8>,
}

/// 연결 하나의 수명 주기를 담당하는 전송 인터페이스
///
/// 호출마다 새 연결을 열고, 프레임 전체를 쓰고, 응답 프레임 전체를 읽은 뒤 닫는다.
/// 연결은 호출 간에 재사용하지 않는다.
#[async_trait]
pub trait Transport: Send + Sync {
    /// 요청 프레임을 보내고 응답 프레임을 수신
    async fn exchange(&self, endpoint: &Endpoint, frame: &[u8]) -> Result<RawFrame, CoreError>;
}
