//! # zbxsend-network
//!
//! Zabbix trapper 프로토콜 어댑터.
//! 프레임 인코딩/디코딩, TCP 전송, 청크 단위 배치 전송, 서버 응답 통계 집계를 담당한다.
//!
//! ## 사용 예시
//!
//! ```rust,ignore
//! use zbxsend_core::models::endpoint::Endpoint;
//! use zbxsend_core::models::metric::Metric;
//! use zbxsend_network::sender::ZabbixSender;
//!
//! let sender = ZabbixSender::new(vec![Endpoint::new("zabbix.local", 10051)], 250)?;
//! let result = sender.send(&[Metric::new("web01", "app.requests", 42)]).await?;
//! println!("{result}");
//! ```

pub mod codec;
pub mod observer;
pub mod response;
pub mod sender;
pub mod transport;
