//! 밀 서버 핸들러 레이어
//!
//! 전송 계층 연결을 받아 메시지를 해석하고 서비스 레이어로 전달합니다.

pub mod connection_handler;
pub mod message_handler;

pub use connection_handler::ConnectionHandler;
pub use message_handler::GameMessageHandler;
