//! # zbxsend-core
//!
//! zbxsend 도메인 모델, 포트(trait) 정의, 에러 타입, 설정.
//! 모든 크레이트가 공유하는 핵심 타입과 인터페이스를 제공한다.
//!
//! ## 구조
//!
//! - [`models`] - 메트릭, 엔드포인트, 요청/응답 페이로드, 누적 통계
//! - [`ports`] - Hexagonal Architecture 포트 인터페이스 (전송, 관찰자)
//! - [`error`] - 핵심 에러 타입 (thiserror)
//! - [`config`] - 전송기 설정 구조체
//! - [`agent_config`] - Zabbix 에이전트 설정 파일에서 엔드포인트 로드

pub mod agent_config;
pub mod config;
pub mod error;
pub mod models;
pub mod ports;
