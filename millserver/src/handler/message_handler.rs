//! 게임 메시지 핸들러
//!
//! 수신 텍스트 해석 → 좌석 조회 → 방 레지스트리 전달을 담당합니다.
//! 어떤 방/좌석에 앉아 있는지는 연결 ID를 키로 하는 멤버십 테이블에서 찾습니다.

use dashmap::DashMap;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::game::{GameAction, Seat};
use crate::protocol::{self, ClientMessage, ServerMessage};
use crate::service::{ConnectionService, RoomRegistry, SessionMembership};
use crate::tool::{ConnectionId, GameError, RoomCode};

/// 게임 메시지 핸들러
pub struct GameMessageHandler {
    connection_service: Arc<ConnectionService>,
    room_registry: Arc<RoomRegistry>,
    /// 연결 → 방/좌석
    memberships: DashMap<ConnectionId, SessionMembership>,
}

impl GameMessageHandler {
    pub fn new(connection_service: Arc<ConnectionService>, room_registry: Arc<RoomRegistry>) -> Self {
        Self {
            connection_service,
            room_registry,
            memberships: DashMap::new(),
        }
    }

    /// 수신한 텍스트 메시지 하나를 처리합니다.
    ///
    /// 거절되면 요청자에게만 `error` 메시지를 보냅니다. 연결은 유지됩니다.
    pub fn handle_text(&self, connection: ConnectionId, raw: &str) {
        let result = protocol::decode(raw)
            .map_err(GameError::from)
            .and_then(|message| {
                debug!("클라이언트 {}에서 {} 수신", connection, message.kind());
                self.handle_message(connection, message)
            });

        if let Err(err) = result {
            self.reject(connection, &err);
        }
    }

    /// 해석된 메시지를 처리합니다.
    pub fn handle_message(&self, connection: ConnectionId, message: ClientMessage) -> Result<(), GameError> {
        match message {
            ClientMessage::CreateRoom => {
                self.ensure_not_seated(connection)?;
                let room_code = self
                    .room_registry
                    .create_room(connection, self.connection_service.as_ref());
                self.memberships.insert(
                    connection,
                    SessionMembership {
                        room_code,
                        seat: Seat::One,
                    },
                );
                Ok(())
            }
            ClientMessage::JoinRoom { room_id } => {
                let room_code = room_id
                    .as_deref()
                    .and_then(RoomCode::parse)
                    .ok_or(GameError::RoomIdRequired)?;
                self.ensure_not_seated(connection)?;

                let seat = self
                    .room_registry
                    .join_room(&room_code, connection, self.connection_service.as_ref())?;
                self.memberships
                    .insert(connection, SessionMembership { room_code, seat });
                Ok(())
            }
            ClientMessage::PlacePiece { index } => self.dispatch(connection, GameAction::Place { index }),
            ClientMessage::MovePiece { from_index, to_index } => self.dispatch(
                connection,
                GameAction::Move {
                    from: from_index,
                    to: to_index,
                },
            ),
            ClientMessage::CapturePiece { index } => self.dispatch(connection, GameAction::Capture { index }),
        }
    }

    /// 연결 종료 처리. 앉아 있던 방이 있으면 닫습니다.
    pub fn handle_disconnect(&self, connection: ConnectionId) {
        if let Some((_, membership)) = self.memberships.remove(&connection) {
            self.room_registry
                .remove_connection(connection, &membership, self.connection_service.as_ref());
        }
    }

    /// 거절 사유를 요청자에게 보냅니다.
    pub fn reject(&self, connection: ConnectionId, err: &GameError) {
        warn!("클라이언트 {} 요청 거절 [{}]: {}", connection, err.code(), err);
        self.connection_service.send_to(connection, ServerMessage::error(err));
    }

    /// 연결의 현재 멤버십
    pub fn membership(&self, connection: ConnectionId) -> Option<SessionMembership> {
        self.memberships.get(&connection).map(|entry| entry.value().clone())
    }

    fn dispatch(&self, connection: ConnectionId, action: GameAction) -> Result<(), GameError> {
        let membership = self.membership(connection).ok_or(GameError::NotInRoom)?;
        self.room_registry
            .dispatch(connection, &membership, action, self.connection_service.as_ref())
    }

    /// 살아 있는 방에 앉아 있으면 다른 방을 만들거나 들어갈 수 없음
    fn ensure_not_seated(&self, connection: ConnectionId) -> Result<(), GameError> {
        if let Some(membership) = self.membership(connection) {
            let seated = self
                .room_registry
                .with_session(&membership.room_code, |session| {
                    session.connection(membership.seat) == Some(connection)
                })
                .unwrap_or(false);

            if seated {
                return Err(GameError::AlreadySeated(membership.room_code));
            }
            debug!("클라이언트 {}의 지난 멤버십 {} 정리", connection, membership.room_code);
        }
        Ok(())
    }
}
