//! 밀 서버 서비스 레이어
//!
//! 연결과 방의 상태를 소유하는 서비스들을 정의합니다.
//!
//! # 서비스 구조
//!
//! ```text
//! Service Layer
//! ├── ConnectionService (연결 관리)
//! │   ├── 연결 등록/제거
//! │   ├── 연결별 송신 채널
//! │   └── 연결 통계
//! └── RoomRegistry (방 관리)
//!     ├── 방 생성 (코드 충돌 재시도)
//!     ├── 입장 / 행동 전달
//!     └── 연결 종료 시 방 정리
//! ```

/// 연결 관리 서비스
///
/// 연결별 송신 채널과 통계를 관리하고 `Outbox`로 메시지를 전달합니다.
pub mod connection_service;

/// 방 레지스트리
///
/// 방 코드와 게임 세션의 매핑을 관리합니다.
pub mod room_registry;

pub use connection_service::{ClientConnection, ConnectionService, ConnectionStats, Outbox};
pub use room_registry::{RoomRegistry, SessionMembership};
