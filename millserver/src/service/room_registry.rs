//! 방 레지스트리
//!
//! 방 코드 → 게임 세션 매핑을 소유하는 프로세스 단위 서비스입니다.
//! 서버 시작 시 한 번 만들어 `Arc`로 연결 계층에 넘겨줍니다.
//!
//! 맵 자체는 코드 삽입/삭제에만 잠기고, 게임 진행은 세션별 `Mutex` 안에서 이루어집니다.
//! 한 세션의 전이와 그 결과 메시지의 송신 채널 적재는 같은 잠금 안에서 끝납니다.

use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, info};

use crate::game::{GameAction, GameSession, Outbound, Seat};
use crate::service::Outbox;
use crate::tool::{ConnectionId, GameError, RoomCode};

/// 연결이 앉아 있는 방과 좌석
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionMembership {
    pub room_code: RoomCode,
    pub seat: Seat,
}

type SharedSession = Arc<Mutex<GameSession>>;

/// 방 레지스트리
#[derive(Default)]
pub struct RoomRegistry {
    rooms: DashMap<RoomCode, SharedSession>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 새 방을 만들고 생성자에게 `room_created`를 보냅니다.
    ///
    /// 코드가 이미 쓰이고 있으면 새 코드로 다시 시도합니다.
    pub fn create_room(&self, creator: ConnectionId, outbox: &dyn Outbox) -> RoomCode {
        loop {
            let code = RoomCode::generate();
            match self.rooms.entry(code.clone()) {
                Entry::Occupied(_) => {
                    debug!("방 코드 충돌: {}, 재시도", code);
                }
                Entry::Vacant(slot) => {
                    let session = GameSession::new(code.clone(), creator);
                    let created = session.created_message();
                    slot.insert(Arc::new(Mutex::new(session)));

                    outbox.deliver(creator, created);
                    info!("🏠 방 {} 생성 ({}), 현재 방 {}개", code, creator, self.room_count());
                    return code;
                }
            }
        }
    }

    /// 방의 2번 좌석에 입장합니다.
    pub fn join_room(
        &self,
        code: &RoomCode,
        connection: ConnectionId,
        outbox: &dyn Outbox,
    ) -> Result<Seat, GameError> {
        let session = self
            .session(code)
            .ok_or_else(|| GameError::RoomNotFound(code.clone()))?;

        let mut guard = session.lock();
        let outbound = guard.join(connection)?;
        Self::deliver_all(&guard, outbound, outbox);
        Ok(Seat::Two)
    }

    /// 좌석의 게임 행동을 해당 세션에 전달합니다.
    ///
    /// 방이 사라졌거나 좌석이 더 이상 이 연결의 것이 아니면 `RoomNotFound`입니다.
    pub fn dispatch(
        &self,
        connection: ConnectionId,
        membership: &SessionMembership,
        action: GameAction,
        outbox: &dyn Outbox,
    ) -> Result<(), GameError> {
        let not_found = || GameError::RoomNotFound(membership.room_code.clone());
        let session = self.session(&membership.room_code).ok_or_else(not_found)?;

        let mut guard = session.lock();
        if guard.connection(membership.seat) != Some(connection) {
            return Err(not_found());
        }

        let outbound = guard.apply(membership.seat, action)?;
        Self::deliver_all(&guard, outbound, outbox);
        Ok(())
    }

    /// 연결 종료를 세션에 전달하고 방을 삭제합니다.
    ///
    /// 실제로 방을 닫았으면 `true`
    pub fn remove_connection(
        &self,
        connection: ConnectionId,
        membership: &SessionMembership,
        outbox: &dyn Outbox,
    ) -> bool {
        let session = match self.session(&membership.room_code) {
            Some(session) => session,
            None => return false,
        };

        let created_at = {
            let mut guard = session.lock();
            if guard.connection(membership.seat) != Some(connection) {
                return false;
            }
            let outbound = guard.disconnect(membership.seat);
            Self::deliver_all(&guard, outbound, outbox);
            guard.created_at()
        };

        // 같은 코드로 새 방이 생겼을 수 있으므로 같은 세션일 때만 지움
        self.rooms
            .remove_if(&membership.room_code, |_, current| Arc::ptr_eq(current, &session));

        info!(
            "🚪 방 {} 닫힘 ({} 종료, {}초 진행), 남은 방 {}개",
            membership.room_code,
            connection,
            (Utc::now() - created_at).num_seconds(),
            self.room_count()
        );
        true
    }

    /// 현재 방 수
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    pub fn contains(&self, code: &RoomCode) -> bool {
        self.rooms.contains_key(code)
    }

    /// 세션을 잠근 채 읽기 전용으로 살펴봅니다.
    pub fn with_session<R>(&self, code: &RoomCode, inspect: impl FnOnce(&GameSession) -> R) -> Option<R> {
        self.session(code).map(|session| inspect(&session.lock()))
    }

    /// 맵 잠금을 오래 쥐지 않도록 세션 핸들만 복제해 돌려줍니다.
    fn session(&self, code: &RoomCode) -> Option<SharedSession> {
        self.rooms.get(code).map(|entry| Arc::clone(entry.value()))
    }

    fn deliver_all(session: &GameSession, outbound: Vec<Outbound>, outbox: &dyn Outbox) {
        for Outbound { to, message } in outbound {
            match session.connection(to) {
                Some(connection) => outbox.deliver(connection, message),
                None => debug!("방 {} {} 좌석 비어 있음, {} 버림", session.code(), to, message.kind()),
            }
        }
    }
}
