//! 밀 서버 테스트 모듈
//!
//! 소켓 없이 서비스/핸들러 레이어를 시나리오 단위로 검증합니다.

mod test_room_registry;

use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::handler::GameMessageHandler;
use crate::protocol::ServerMessage;
use crate::service::{ConnectionService, Outbox, RoomRegistry};
use crate::tool::ConnectionId;

/// 전달된 메시지를 순서대로 기록하는 테스트용 Outbox
#[derive(Default)]
pub struct RecordingOutbox {
    delivered: Mutex<Vec<(ConnectionId, ServerMessage)>>,
}

impl RecordingOutbox {
    /// 특정 연결로 간 메시지를 꺼냅니다.
    pub fn take_for(&self, connection: ConnectionId) -> Vec<ServerMessage> {
        let mut delivered = self.delivered.lock();
        let (taken, rest): (Vec<_>, Vec<_>) = delivered.drain(..).partition(|(to, _)| *to == connection);
        *delivered = rest;
        taken.into_iter().map(|(_, message)| message).collect()
    }

    /// 특정 연결로 간 메시지 타입 목록을 꺼냅니다.
    pub fn kinds_for(&self, connection: ConnectionId) -> Vec<&'static str> {
        self.take_for(connection).iter().map(ServerMessage::kind).collect()
    }

    pub fn clear(&self) {
        self.delivered.lock().clear();
    }
}

impl Outbox for RecordingOutbox {
    fn deliver(&self, to: ConnectionId, message: ServerMessage) {
        self.delivered.lock().push((to, message));
    }
}

/// 테스트용 핸들러 묶음
pub struct TestServer {
    pub connections: Arc<ConnectionService>,
    pub registry: Arc<RoomRegistry>,
    pub handler: GameMessageHandler,
}

/// 테스트용 클라이언트 (연결 ID + 송신 채널 수신단)
pub struct TestClient {
    pub id: ConnectionId,
    pub receiver: mpsc::UnboundedReceiver<ServerMessage>,
}

impl TestClient {
    /// 지금까지 받은 메시지를 모두 꺼냅니다.
    pub fn drain(&mut self) -> Vec<ServerMessage> {
        let mut messages = Vec::new();
        while let Ok(message) = self.receiver.try_recv() {
            messages.push(message);
        }
        messages
    }

    pub fn drain_kinds(&mut self) -> Vec<&'static str> {
        self.drain().iter().map(ServerMessage::kind).collect()
    }
}

impl TestServer {
    pub fn new() -> Self {
        let connections = Arc::new(ConnectionService::new(100));
        let registry = Arc::new(RoomRegistry::new());
        let handler = GameMessageHandler::new(connections.clone(), registry.clone());
        Self {
            connections,
            registry,
            handler,
        }
    }

    pub fn connect(&self) -> TestClient {
        let (id, receiver) = self
            .connections
            .register("127.0.0.1:0".to_string())
            .expect("Test assertion failed");
        TestClient { id, receiver }
    }

    pub fn send(&self, client: &TestClient, raw: &str) {
        self.handler.handle_text(client.id, raw);
    }

    /// 방을 만들고 두 번째 클라이언트를 입장시킨 뒤 받은 메시지를 비웁니다.
    pub fn start_game(&self) -> (TestClient, TestClient, String) {
        let mut host = self.connect();
        let mut guest = self.connect();

        self.send(&host, r#"{"type":"create_room"}"#);
        let room_id = match host.drain().pop() {
            Some(ServerMessage::RoomCreated { room_id, .. }) => room_id.to_string(),
            other => panic!("❌ room_created가 아님: {:?}", other),
        };

        self.send(&guest, &format!(r#"{{"type":"join_room","roomId":"{}"}}"#, room_id));
        host.drain();
        guest.drain();
        (host, guest, room_id)
    }
}

/// 에러 메시지의 코드와 문구
pub fn error_of(message: &ServerMessage) -> (u16, String) {
    match message {
        ServerMessage::Error { code, message } => (*code, message.clone()),
        other => panic!("❌ error 메시지가 아님: {:?}", other),
    }
}

/// 배치 요청 JSON
pub fn place_json(index: usize) -> String {
    format!(r#"{{"type":"place_piece","index":{}}}"#, index)
}
