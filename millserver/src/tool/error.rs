//! 공통 에러 처리 시스템
//!
//! 밀 서버에서 발생하는 에러를 두 갈래로 관리합니다.
//!
//! - **GameError**: 클라이언트에게 그대로 전달되는 거절 사유 (프로토콜 / 세션 / 규칙 위반)
//! - **ServerError**: 전송 계층과 인프라 에러. 클라이언트에게 보내지 않고 로그로만 남깁니다.

use thiserror::Error;
use tracing::{error, info, warn};

use crate::tool::{ConnectionId, RoomCode};

/// 수신 메시지 해석 실패
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// JSON이 아니거나 `type` 필드가 없는 경우
    #[error("Invalid message format.")]
    Malformed,

    /// 알 수 없는 메시지 타입
    #[error("Unknown message type: {0}")]
    UnknownType(String),

    /// 타입은 알지만 필드가 맞지 않는 경우
    #[error("Invalid {kind} payload: {reason}")]
    InvalidPayload { kind: String, reason: String },
}

/// 게임 규칙 위반
///
/// 위반이 발생하면 보드 상태는 변경되지 않으며 요청자에게만 에러가 전달됩니다.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleViolation {
    #[error("Waiting for an opponent to join.")]
    WaitingForOpponent,

    #[error("The game in this room has ended.")]
    GameEnded,

    #[error("Invalid action: currently awaiting opponent piece capture.")]
    AwaitingCapture,

    #[error("Not your turn.")]
    NotYourTurn,

    #[error("Not in placement phase.")]
    NotPlacementPhase,

    #[error("Still in placement phase.")]
    StillPlacementPhase,

    #[error("All pieces already placed.")]
    NoPiecesLeft,

    #[error("Invalid piece index.")]
    InvalidIndex,

    #[error("Spot already taken.")]
    SpotTaken,

    #[error("Invalid move indices.")]
    InvalidMoveIndices,

    #[error("Invalid move. Check piece ownership, target empty, and adjacency.")]
    IllegalMove,

    #[error("Not your turn to capture or game not in capture state.")]
    NotCaptureState,

    #[error("Invalid piece selected for capture.")]
    InvalidCaptureTarget,

    #[error("Cannot capture a piece that is part of an opponent's line.")]
    ProtectedPiece,
}

/// 클라이언트 요청 거절 사유
///
/// `Display` 결과가 그대로 `error` 메시지의 `message` 필드가 됩니다.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error("Room ID is required to join.")]
    RoomIdRequired,

    #[error("Room {0} not found.")]
    RoomNotFound(RoomCode),

    #[error("Room {0} is full.")]
    RoomFull(RoomCode),

    #[error("Not in a room.")]
    NotInRoom,

    #[error("Already seated in room {0}.")]
    AlreadySeated(RoomCode),

    #[error(transparent)]
    Rule(#[from] RuleViolation),
}

impl GameError {
    /// 에러 코드 (HTTP 상태 코드와 유사)
    pub fn code(&self) -> u16 {
        match self {
            Self::Protocol(_) | Self::RoomIdRequired => 400,
            Self::RoomNotFound(_) | Self::NotInRoom => 404,
            Self::RoomFull(_) | Self::AlreadySeated(_) => 409,
            Self::Rule(_) => 422,
        }
    }
}

/// 서버 인프라 에러 타입
#[derive(Error, Debug)]
pub enum ServerError {
    /// 연결 관련 에러
    #[error("연결 에러 [{}] [{}]: {message}", fmt_connection(.connection_id), .addr.as_deref().unwrap_or("-"))]
    Connection {
        connection_id: Option<ConnectionId>,
        addr: Option<String>,
        message: String,
    },

    /// 네트워크 관련 에러
    #[error("네트워크 에러 [{}] [작업: {operation}]: {message}", .addr.as_deref().unwrap_or("-"))]
    Network {
        addr: Option<String>,
        operation: String,
        message: String,
    },

    /// 프레임/웹소켓 프로토콜 에러
    #[error("프로토콜 에러: {message}")]
    Protocol { message: String },

    /// 직렬화/역직렬화 에러
    #[error("직렬화 에러: {0}")]
    Serialization(#[from] serde_json::Error),

    /// 최대 연결 수 초과
    #[error("서버가 가득 참: {current}/{max}")]
    Capacity { current: usize, max: usize },
}

fn fmt_connection(connection_id: &Option<ConnectionId>) -> String {
    connection_id
        .map(|id| id.to_string())
        .unwrap_or_else(|| "-".to_string())
}

impl ServerError {
    /// 연결 에러 생성
    pub fn connection_error(connection_id: Option<ConnectionId>, addr: Option<String>, message: &str) -> Self {
        Self::Connection {
            connection_id,
            addr,
            message: message.to_string(),
        }
    }

    /// 네트워크 에러 생성
    pub fn network_error(addr: Option<String>, operation: &str, message: &str) -> Self {
        Self::Network {
            addr,
            operation: operation.to_string(),
            message: message.to_string(),
        }
    }

    /// 프로토콜 에러 생성
    pub fn protocol_error(message: &str) -> Self {
        Self::Protocol {
            message: message.to_string(),
        }
    }
}

impl From<std::io::Error> for ServerError {
    fn from(err: std::io::Error) -> Self {
        Self::Network {
            addr: None,
            operation: "io_operation".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for ServerError {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        Self::Protocol {
            message: format!("websocket: {}", err),
        }
    }
}

/// 에러 심각도 레벨
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// 정보성 - 정상 동작 중 발생하는 예상 가능한 상황 (예: 클라이언트 종료)
    Info,
    /// 경고 - 해당 연결만 영향을 받음
    Warning,
    /// 에러 - 기능에 영향을 주지만 서버는 계속 동작
    Error,
    /// 치명적 - 리스너 중단 등 서비스 중단이 필요한 문제
    Critical,
}

/// 에러 핸들러
///
/// 인프라 에러를 컴포넌트/작업 정보와 함께 심각도에 맞는 로그 레벨로 남깁니다.
pub struct ErrorHandler;

impl ErrorHandler {
    /// 에러를 처리하고 로깅합니다.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use millserver::tool::{ErrorHandler, ErrorSeverity, ServerError};
    ///
    /// let error = ServerError::network_error(Some("127.0.0.1:5000".to_string()), "accept", "reset");
    /// ErrorHandler::handle_error(&error, ErrorSeverity::Warning, "MillServer", "accept_loop");
    /// ```
    pub fn handle_error(error: &ServerError, severity: ErrorSeverity, component: &str, operation: &str) {
        let log_message = format!("[{}] [{}] {}", component, operation, error);

        match severity {
            ErrorSeverity::Info => info!("{}", log_message),
            ErrorSeverity::Warning => warn!("{}", log_message),
            ErrorSeverity::Error => error!("{}", log_message),
            ErrorSeverity::Critical => {
                error!("🚨 CRITICAL: {}", log_message);
            }
        }
    }
}
