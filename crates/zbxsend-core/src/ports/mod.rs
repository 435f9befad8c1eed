//! 포트 인터페이스 (trait).
//!
//! Hexagonal Architecture의 포트 레이어.
//! `zbxsend-network`가 이 trait들을 구현하며,
//! 배치 전송기는 `Arc<dyn T>`로 주입받는다.

pub mod observer;
pub mod transport;
