//! 연결 서비스
//!
//! 연결별 송신 채널 관리, 메시지 전달, 연결 통계를 담당합니다.
//!
//! 각 연결은 무제한 mpsc 채널 하나를 가지며 전송 계층의 쓰기 태스크가 이를 비웁니다.
//! 게임 세션은 잠금을 쥔 채로 채널에 넣기만 하므로 전달 순서가 전이 순서와 같습니다.

use dashmap::DashMap;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::protocol::ServerMessage;
use crate::tool::{ConnectionId, ServerError};

/// 연결로 메시지를 보내는 창구
///
/// 룸 레지스트리는 이 트레이트만 알고 실제 전송 방식은 모릅니다.
pub trait Outbox: Send + Sync {
    fn deliver(&self, to: ConnectionId, message: ServerMessage);
}

/// 개별 클라이언트 연결 정보
#[derive(Debug)]
pub struct ClientConnection {
    pub id: ConnectionId,
    pub addr: String,
    pub connected_at: Instant,
    sender: mpsc::UnboundedSender<ServerMessage>,
}

impl ClientConnection {
    /// 송신 채널에 메시지를 넣습니다. 쓰기 태스크가 이미 끝났으면 `false`
    pub fn send_message(&self, message: ServerMessage) -> bool {
        self.sender.send(message).is_ok()
    }
}

/// 연결 통계
#[derive(Debug, Clone, Default)]
pub struct ConnectionStats {
    pub total_connections: u64,
    pub current_connections: u32,
    pub peak_connections: u32,
    pub total_messages: u64,
    pub failed_connections: u64,
    pub dropped_messages: u64,
}

/// 연결 서비스
pub struct ConnectionService {
    connections: DashMap<ConnectionId, ClientConnection>,
    next_id: AtomicU64,
    max_connections: usize,
    server_start_time: Instant,
    connection_stats: Mutex<ConnectionStats>,
}

impl ConnectionService {
    /// 새로운 연결 서비스 생성
    pub fn new(max_connections: usize) -> Self {
        Self {
            connections: DashMap::new(),
            next_id: AtomicU64::new(1),
            max_connections,
            server_start_time: Instant::now(),
            connection_stats: Mutex::new(ConnectionStats::default()),
        }
    }

    /// 새 연결을 등록하고 ID와 송신 채널 수신단을 돌려줍니다.
    ///
    /// 최대 연결 수에 도달했으면 [`ServerError::Capacity`]를 돌려줍니다.
    pub fn register(
        &self,
        addr: String,
    ) -> Result<(ConnectionId, mpsc::UnboundedReceiver<ServerMessage>), ServerError> {
        let current = self.connections.len();
        if current >= self.max_connections {
            warn!("최대 연결 수 초과: {}/{} ({})", current, self.max_connections, addr);
            self.update_connection_stats(|stats| stats.failed_connections += 1);
            return Err(ServerError::Capacity {
                current,
                max: self.max_connections,
            });
        }

        let id = ConnectionId::new(self.next_id.fetch_add(1, Ordering::Relaxed));
        let (sender, receiver) = mpsc::unbounded_channel();
        self.connections.insert(
            id,
            ClientConnection {
                id,
                addr: addr.clone(),
                connected_at: Instant::now(),
                sender,
            },
        );

        self.update_connection_stats(|stats| {
            stats.total_connections += 1;
            stats.current_connections += 1;
            stats.peak_connections = stats.peak_connections.max(stats.current_connections);
        });

        info!("✅ 클라이언트 {} 연결 완료 ({})", id, addr);
        Ok((id, receiver))
    }

    /// 연결 제거
    pub fn remove_connection(&self, id: ConnectionId) -> bool {
        let removed = self.connections.remove(&id);

        if let Some((_, connection)) = &removed {
            self.update_connection_stats(|stats| {
                stats.current_connections = stats.current_connections.saturating_sub(1);
            });
            debug!(
                "클라이언트 {} 연결 제거됨 ({}초 유지)",
                id,
                connection.connected_at.elapsed().as_secs()
            );
        }

        removed.is_some()
    }

    /// 특정 클라이언트에게 메시지 전송
    pub fn send_to(&self, id: ConnectionId, message: ServerMessage) -> bool {
        let kind = message.kind();
        let sent = self
            .connections
            .get(&id)
            .map(|connection| connection.send_message(message))
            .unwrap_or(false);

        if sent {
            debug!("클라이언트 {}에게 {} 전송", id, kind);
            self.update_connection_stats(|stats| stats.total_messages += 1);
        } else {
            debug!("클라이언트 {} 없음, {} 버림", id, kind);
            self.update_connection_stats(|stats| stats.dropped_messages += 1);
        }
        sent
    }

    /// 연결 주소 조회
    pub fn addr_of(&self, id: ConnectionId) -> Option<String> {
        self.connections.get(&id).map(|connection| connection.addr.clone())
    }

    /// 연결 수 조회
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// 서버 업타임 (초)
    pub fn uptime_seconds(&self) -> u64 {
        self.server_start_time.elapsed().as_secs()
    }

    /// 연결 통계 업데이트
    fn update_connection_stats<F>(&self, update_fn: F)
    where
        F: FnOnce(&mut ConnectionStats),
    {
        update_fn(&mut self.connection_stats.lock());
    }

    /// 연결 통계 조회
    pub fn stats(&self) -> ConnectionStats {
        self.connection_stats.lock().clone()
    }
}

impl Outbox for ConnectionService {
    fn deliver(&self, to: ConnectionId, message: ServerMessage) {
        self.send_to(to, message);
    }
}
