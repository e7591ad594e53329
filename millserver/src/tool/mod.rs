//! 밀 서버 공통 유틸리티 모듈
//!
//! 에러 분류, 방 코드 생성, 연결 식별자 등 공통 기능을 제공합니다.

pub mod error;
pub mod room_code;
pub mod connection_id;

pub use error::{ErrorHandler, ErrorSeverity, GameError, ProtocolError, RuleViolation, ServerError};
pub use room_code::RoomCode;
pub use connection_id::ConnectionId;
