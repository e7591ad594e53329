//! 밀 게임 서버 라이브러리
//!
//! 24칸 세 겹 링 보드에서 두 명이 겨루는 밀 계열 보드게임의 권위 서버입니다.
//! 보드 상태, 턴 순서, 규칙 판정은 모두 서버가 결정하며 클라이언트는 신뢰하지 않습니다.
//!
//! # 주요 기능
//!
//! - **방 관리**: 짧은 방 코드로 방 생성/입장, 연결 종료 시 방 정리
//! - **규칙 판정**: 배치 → 이동 단계, 밀 완성 시 잡기, 밀 보호 예외
//! - **상태 동기화**: 수락된 행동마다 전체 보드 스냅샷을 양쪽에 전송
//! - **전송 계층**: 웹소켓(텍스트 프레임)과 길이 헤더 TCP 프레임
//! - **에러 처리**: 클라이언트용 거절 사유와 서버 내부 에러를 분리
//!
//! # 아키텍처
//!
//! ```text
//! Mill Server
//! ├── Handler Layer (요청 처리)
//! │   ├── ConnectionHandler (웹소켓/TCP 읽기·쓰기 루프)
//! │   └── GameMessageHandler (해석, 멤버십 조회, 라우팅)
//! ├── Service Layer (상태 소유)
//! │   ├── ConnectionService (연결별 송신 채널, 통계)
//! │   └── RoomRegistry (방 코드 → 게임 세션)
//! ├── Game Layer (도메인)
//! │   ├── board (토폴로지)
//! │   ├── rules (규칙 엔진)
//! │   └── session (상태 기계)
//! ├── Tool Layer (유틸리티)
//! │   ├── Error (에러 분류 및 로깅)
//! │   ├── RoomCode (방 코드 생성)
//! │   └── ConnectionId (연결 식별자)
//! └── Protocol (메시지 정의, TCP 프레임)
//! ```
//!
//! # 사용 예시
//!
//! ```rust,no_run
//! use millserver::{MillServer, MillServerConfig};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let config = MillServerConfig::from_env()?;
//! let server = MillServer::bind(&config).await?;
//! server.run().await?;
//! # Ok(())
//! # }
//! ```

/// 환경 설정 관리
///
/// 서버 실행에 필요한 환경변수 및 설정을 관리합니다.
pub mod config;

/// 게임 도메인
///
/// 보드 토폴로지, 규칙 엔진, 게임 세션 상태 기계를 포함합니다.
pub mod game;

/// 메시지 프로토콜 정의
///
/// 클라이언트와 서버 간 통신을 위한 메시지 타입과 TCP 프레임을 정의합니다.
pub mod protocol;

/// 서비스 레이어
///
/// 연결 관리와 방 레지스트리를 포함합니다.
pub mod service;

/// 요청 처리 핸들러 레이어
pub mod handler;

/// 서버 부트스트랩
pub mod server;

/// 공통 유틸리티 도구들
///
/// 에러 처리, 방 코드, 연결 식별자를 포함합니다.
pub mod tool;

#[cfg(test)]
mod tests;

/// 환경 설정 타입들
pub use config::{validate_config, MillServerConfig};

/// 서버 진입점
pub use server::MillServer;

/// 메시지 타입
pub use protocol::{ClientMessage, ServerMessage};

/// 서비스 레이어 주요 타입들
pub use service::{ConnectionService, RoomRegistry, SessionMembership};

/// 에러 타입
pub use tool::{GameError, ServerError};
