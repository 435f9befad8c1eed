//! trapper 프레임 코덱.
//!
//! 프레임 형식 (양방향 동일):
//!
//! ```text
//! offset 0..4   : "ZBXD" + 프로토콜 버전 0x01
//! offset 5..12  : 페이로드 길이 (u64, little-endian)
//! offset 13..   : UTF-8 JSON 페이로드
//! ```
//!
//! 청크 분할은 하지 않는다. 주어진 슬라이스를 그대로 한 프레임으로 만든다.

use serde::Serialize;
use zbxsend_core::error::CoreError;
use zbxsend_core::models::metric::Metric;
use zbxsend_core::models::request::SenderRequest;
use zbxsend_core::models::response::ServerResponse;

/// magic + 프로토콜 버전
pub const ZBX_MAGIC: &[u8; 5] = b"ZBXD\x01";

/// 헤더 길이 (magic 5 + 길이 8)
pub const HEADER_LEN: usize = 13;

/// 수신 페이로드 최대 길이 (128 MiB)
pub const MAX_PAYLOAD_LEN: usize = 128 * 1024 * 1024;

/// 페이로드 앞에 13바이트 헤더를 붙인다
pub fn encode_frame(payload: &[u8]) -> Vec<u8> {
    let mut frame = Vec::with_capacity(HEADER_LEN + payload.len());
    frame.extend_from_slice(ZBX_MAGIC);
    frame.extend_from_slice(&(payload.len() as u64).to_le_bytes());
    frame.extend_from_slice(payload);
    frame
}

/// 헤더 검증 후 페이로드 길이 반환
pub fn parse_header(header: &[u8]) -> Result<usize, CoreError> {
    if header.len() != HEADER_LEN {
        return Err(CoreError::Protocol(format!(
            "헤더 길이 오류: {}바이트 (기대값 {HEADER_LEN})",
            header.len()
        )));
    }
    if !header.starts_with(ZBX_MAGIC) {
        return Err(CoreError::Protocol(format!(
            "잘못된 magic/버전: {:02x?}",
            &header[..ZBX_MAGIC.len()]
        )));
    }

    let mut len_bytes = [0u8; 8];
    len_bytes.copy_from_slice(&header[ZBX_MAGIC.len()..]);
    let len = u64::from_le_bytes(len_bytes);

    usize::try_from(len)
        .ok()
        .filter(|len| *len <= MAX_PAYLOAD_LEN)
        .ok_or_else(|| {
            CoreError::Protocol(format!(
                "페이로드 길이 초과: {len}바이트 (최대 {MAX_PAYLOAD_LEN})"
            ))
        })
}

/// 메트릭 슬라이스를 요청 프레임으로 인코딩
pub fn encode_request(metrics: &[Metric]) -> Result<Vec<u8>, CoreError> {
    encode_json(&SenderRequest::new(metrics))
}

/// 응답 페이로드를 프레임으로 인코딩 (mock 서버, 라운드트립 검증용)
pub fn encode_response(response: &ServerResponse) -> Result<Vec<u8>, CoreError> {
    encode_json(response)
}

/// 수신 헤더/본문을 응답 페이로드로 디코딩
pub fn decode_response(header: &[u8], body: &[u8]) -> Result<ServerResponse, CoreError> {
    decode_json(header, body)
}

/// 요청 프레임 디코딩 (서버 측 검증, 라운드트립용)
pub fn decode_request(header: &[u8], body: &[u8]) -> Result<SenderRequest<'static>, CoreError> {
    decode_json(header, body)
}

/// 연속된 프레임 바이트를 헤더/본문으로 분리
pub fn split_frame(frame: &[u8]) -> Result<(&[u8], &[u8]), CoreError> {
    if frame.len() < HEADER_LEN {
        return Err(CoreError::Protocol(format!(
            "프레임이 헤더보다 짧음: {}바이트",
            frame.len()
        )));
    }
    Ok(frame.split_at(HEADER_LEN))
}

fn encode_json<T: Serialize + ?Sized>(payload: &T) -> Result<Vec<u8>, CoreError> {
    let body = serde_json::to_vec(payload)
        .map_err(|e| CoreError::Encoding(format!("JSON 직렬화 실패: {e}")))?;
    Ok(encode_frame(&body))
}

fn decode_json<T: serde::de::DeserializeOwned>(header: &[u8], body: &[u8]) -> Result<T, CoreError> {
    let expected = parse_header(header)?;
    if body.len() != expected {
        return Err(CoreError::Protocol(format!(
            "본문 길이 불일치: {}바이트 (헤더 {expected}바이트)",
            body.len()
        )));
    }

    let text = std::str::from_utf8(body)
        .map_err(|e| CoreError::Protocol(format!("UTF-8 디코딩 실패: {e}")))?;
    serde_json::from_str(text).map_err(|e| CoreError::Protocol(format!("JSON 파싱 실패: {e}")))
}
