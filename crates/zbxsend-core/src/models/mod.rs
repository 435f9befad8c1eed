//! zbxsend 도메인 모델.
//!
//! trapper 프로토콜로 주고받는 데이터 구조체를 정의한다.
//! 와이어 페이로드 모델은 `serde` Serialize/Deserialize를 구현한다.

pub mod endpoint;
pub mod metric;
pub mod request;
pub mod response;
