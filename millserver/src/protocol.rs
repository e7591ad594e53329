//! 밀 게임 프로토콜 정의
//!
//! 클라이언트와 서버가 주고받는 메시지를 닫힌 열거형으로 정의합니다.
//! 모든 메시지는 `type` 필드로 구분되는 JSON 객체입니다.
//!
//! # 전송 형식
//!
//! **WebSocket:** 텍스트 프레임 하나에 JSON 메시지 하나
//!
//! **TCP:**
//! ```text
//! [4바이트 빅엔디언 길이 헤더][UTF-8 JSON 메시지 데이터]
//! ```
//!
//! # 사용 예시
//!
//! ```rust
//! use millserver::protocol::{decode, ClientMessage};
//!
//! let message = decode(r#"{"type":"move_piece","fromIndex":0,"toIndex":8}"#).unwrap();
//! assert_eq!(message, ClientMessage::MovePiece { from_index: 0, to_index: 8 });
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::game::{Board, Seat};
use crate::tool::{GameError, ProtocolError, RoomCode, ServerError};

/// TCP 프레임 최대 크기 (64 KiB)
pub const MAX_FRAME_LEN: usize = 64 * 1024;

/// 클라이언트 → 서버 메시지
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// 새 방을 만들고 1번 좌석에 앉습니다.
    CreateRoom,

    /// 기존 방의 2번 좌석에 앉습니다. 코드는 대소문자를 구분하지 않습니다.
    JoinRoom {
        #[serde(rename = "roomId", default, skip_serializing_if = "Option::is_none")]
        room_id: Option<String>,
    },

    /// 배치 단계에서 빈 칸에 말을 놓습니다.
    PlacePiece { index: usize },

    /// 이동 단계에서 인접한 빈 칸으로 말을 옮깁니다.
    #[serde(rename_all = "camelCase")]
    MovePiece { from_index: usize, to_index: usize },

    /// 밀 완성 후 상대 말을 잡습니다.
    CapturePiece { index: usize },
}

impl ClientMessage {
    /// 인식하는 `type` 값 목록
    pub const TYPES: [&'static str; 5] = [
        "create_room",
        "join_room",
        "place_piece",
        "move_piece",
        "capture_piece",
    ];

    /// 로깅용 메시지 타입 이름
    pub fn kind(&self) -> &'static str {
        match self {
            Self::CreateRoom => "create_room",
            Self::JoinRoom { .. } => "join_room",
            Self::PlacePiece { .. } => "place_piece",
            Self::MovePiece { .. } => "move_piece",
            Self::CapturePiece { .. } => "capture_piece",
        }
    }
}

/// 수신한 텍스트를 클라이언트 메시지로 해석합니다.
///
/// JSON이 아니거나 `type`이 없으면 [`ProtocolError::Malformed`],
/// 모르는 `type`이면 [`ProtocolError::UnknownType`],
/// 필드가 맞지 않으면 [`ProtocolError::InvalidPayload`]를 돌려줍니다.
pub fn decode(raw: &str) -> Result<ClientMessage, ProtocolError> {
    let value: Value = serde_json::from_str(raw).map_err(|_| ProtocolError::Malformed)?;

    let kind = value
        .get("type")
        .and_then(Value::as_str)
        .ok_or(ProtocolError::Malformed)?
        .to_string();

    if !ClientMessage::TYPES.contains(&kind.as_str()) {
        return Err(ProtocolError::UnknownType(kind));
    }

    serde_json::from_value(value).map_err(|e| ProtocolError::InvalidPayload {
        kind,
        reason: e.to_string(),
    })
}

/// 와이어에 표시되는 게임 상태
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GameState {
    WaitingForOpponent,
    Playing,
    AwaitingCapture,
    Ended,
}

/// 상태를 담는 모든 메시지에 들어가는 전체 보드 스냅샷
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GameSnapshot {
    pub board: Board,
    pub current_player: Seat,
    pub placement_phase: bool,
    pub pieces_placed: [u8; 2],
    pub game_state: GameState,
}

/// 직전 행동 요약
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum LastMove {
    PlacePiece { player: Seat, index: usize },
    MovePiece { player: Seat, from: usize, to: usize },
    #[serde(rename_all = "camelCase")]
    Capture { player: Seat, captured_index: usize },
}

/// 서버 → 클라이언트 메시지
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// 방 생성 확인 (생성자에게만)
    #[serde(rename_all = "camelCase")]
    RoomCreated {
        room_id: RoomCode,
        player_id: Seat,
        #[serde(flatten)]
        snapshot: GameSnapshot,
    },

    /// 방 입장 확인 (입장한 사람에게만)
    #[serde(rename_all = "camelCase")]
    JoinedRoom {
        room_id: RoomCode,
        player_id: Seat,
        #[serde(flatten)]
        snapshot: GameSnapshot,
    },

    /// 두 좌석이 모두 찼을 때 양쪽에 전송
    #[serde(rename_all = "camelCase")]
    GameStart {
        room_id: RoomCode,
        message: String,
        #[serde(flatten)]
        snapshot: GameSnapshot,
    },

    /// 잡기 대기가 아닌 모든 수락된 행동 후 양쪽에 전송
    #[serde(rename_all = "camelCase")]
    Update {
        #[serde(flatten)]
        snapshot: GameSnapshot,
        last_move: LastMove,
    },

    /// 밀을 완성한 좌석에게 잡을 수 있는 말 목록과 함께 전송
    #[serde(rename_all = "camelCase")]
    LineFormedCapturePending {
        message: String,
        capturable_pieces: Vec<usize>,
        #[serde(flatten)]
        snapshot: GameSnapshot,
    },

    /// 상대가 잡을 말을 고르는 중임을 알림
    OpponentAwaitingCapture {
        message: String,
        #[serde(flatten)]
        snapshot: GameSnapshot,
    },

    /// 상대 연결이 끊겨 방이 닫힘
    #[serde(rename_all = "camelCase")]
    OpponentDisconnected { message: String, game_state: GameState },

    /// 거절 사유 (요청자에게만)
    Error { code: u16, message: String },
}

impl ServerMessage {
    /// 게임 에러를 `error` 메시지로 변환합니다.
    pub fn error(err: &GameError) -> Self {
        Self::Error {
            code: err.code(),
            message: err.to_string(),
        }
    }

    /// 로깅용 메시지 타입 이름
    pub fn kind(&self) -> &'static str {
        match self {
            Self::RoomCreated { .. } => "room_created",
            Self::JoinedRoom { .. } => "joined_room",
            Self::GameStart { .. } => "game_start",
            Self::Update { .. } => "update",
            Self::LineFormedCapturePending { .. } => "line_formed_capture_pending",
            Self::OpponentAwaitingCapture { .. } => "opponent_awaiting_capture",
            Self::OpponentDisconnected { .. } => "opponent_disconnected",
            Self::Error { .. } => "error",
        }
    }

    pub fn to_json(&self) -> Result<String, ServerError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// 메시지를 길이 헤더가 붙은 TCP 프레임으로 직렬화합니다.
pub fn encode_frame<T: Serialize>(message: &T) -> Result<Vec<u8>, ServerError> {
    let json = serde_json::to_vec(message)?;
    if json.len() > MAX_FRAME_LEN {
        return Err(ServerError::protocol_error(&format!(
            "프레임이 너무 큽니다: {}바이트",
            json.len()
        )));
    }

    let mut result = Vec::with_capacity(4 + json.len());
    result.extend_from_slice(&(json.len() as u32).to_be_bytes()); // 4바이트 길이 헤더
    result.extend_from_slice(&json);
    Ok(result)
}

/// 스트림에서 프레임 하나를 읽어 JSON 텍스트로 돌려줍니다.
///
/// 프레임 경계에서 스트림이 닫히면 `Ok(None)`입니다.
/// 길이가 [`MAX_FRAME_LEN`]을 넘거나 UTF-8이 아니면 프로토콜 에러입니다.
pub async fn read_frame<R>(reader: &mut R) -> Result<Option<String>, ServerError>
where
    R: AsyncRead + Unpin,
{
    let mut length_bytes = [0u8; 4];
    match reader.read_exact(&mut length_bytes).await {
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(None),
        Err(e) => return Err(e.into()),
    }

    let length = u32::from_be_bytes(length_bytes) as usize;
    if length > MAX_FRAME_LEN {
        return Err(ServerError::protocol_error(&format!(
            "프레임 길이 초과: {} > {}",
            length, MAX_FRAME_LEN
        )));
    }

    let mut buffer = vec![0u8; length];
    reader.read_exact(&mut buffer).await?;

    String::from_utf8(buffer)
        .map(Some)
        .map_err(|_| ServerError::protocol_error("프레임이 UTF-8이 아닙니다"))
}

/// 메시지를 프레임으로 스트림에 씁니다.
pub async fn write_frame<W, T>(writer: &mut W, message: &T) -> Result<(), ServerError>
where
    W: AsyncWrite + Unpin,
    T: Serialize,
{
    let data = encode_frame(message)?;
    writer.write_all(&data).await?;
    writer.flush().await?;
    Ok(())
}
