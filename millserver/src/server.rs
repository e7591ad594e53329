//! 밀 서버 부트스트랩
//!
//! 리스너를 바인딩하고 서비스/핸들러를 한 번 조립한 뒤,
//! 연결마다 태스크를 띄워 `ConnectionHandler`에 넘깁니다.

use anyhow::{Context, Result};
use std::fmt;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tracing::info;

use crate::config::MillServerConfig;
use crate::handler::{ConnectionHandler, GameMessageHandler};
use crate::service::{ConnectionService, RoomRegistry};
use crate::tool::{ErrorHandler, ErrorSeverity, ServerError};

/// 연결이 들어온 전송 방식
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    WebSocket,
    Tcp,
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transport::WebSocket => write!(f, "websocket"),
            Transport::Tcp => write!(f, "tcp"),
        }
    }
}

/// 밀 게임 서버
pub struct MillServer {
    ws_listener: TcpListener,
    tcp_listener: Option<TcpListener>,
    connection_service: Arc<ConnectionService>,
    room_registry: Arc<RoomRegistry>,
    connection_handler: Arc<ConnectionHandler>,
}

impl MillServer {
    /// 설정대로 리스너를 바인딩합니다. 포트 0이면 임의 포트를 씁니다.
    pub async fn bind(config: &MillServerConfig) -> Result<Self> {
        let ws_listener = bind_listener(Transport::WebSocket, config.ws_address()).await?;

        let tcp_listener = if config.tcp_enabled {
            Some(bind_listener(Transport::Tcp, config.tcp_address()).await?)
        } else {
            None
        };

        let connection_service = Arc::new(ConnectionService::new(config.max_connections));
        let room_registry = Arc::new(RoomRegistry::new());
        let message_handler = Arc::new(GameMessageHandler::new(
            connection_service.clone(),
            room_registry.clone(),
        ));
        let connection_handler = Arc::new(ConnectionHandler::new(
            connection_service.clone(),
            message_handler,
        ));

        Ok(Self {
            ws_listener,
            tcp_listener,
            connection_service,
            room_registry,
            connection_handler,
        })
    }

    /// 웹소켓 리스너 주소
    pub fn ws_addr(&self) -> Result<SocketAddr> {
        Ok(self.ws_listener.local_addr()?)
    }

    /// TCP 리스너 주소. TCP가 꺼져 있으면 `None`
    pub fn tcp_addr(&self) -> Result<Option<SocketAddr>> {
        self.tcp_listener
            .as_ref()
            .map(|listener| listener.local_addr())
            .transpose()
            .map_err(Into::into)
    }

    pub fn registry(&self) -> Arc<RoomRegistry> {
        self.room_registry.clone()
    }

    pub fn connections(&self) -> Arc<ConnectionService> {
        self.connection_service.clone()
    }

    /// 연결 수락 루프. 리스너 에러는 로그만 남기고 계속합니다.
    pub async fn run(self) -> Result<()> {
        info!("🚀 밀 서버 실행 중 (웹소켓 {})", self.ws_addr()?);
        if let Some(addr) = self.tcp_addr()? {
            info!("🚀 TCP 리스너 실행 중 ({})", addr);
        }

        loop {
            tokio::select! {
                accepted = self.ws_listener.accept() => self.on_accept(Transport::WebSocket, accepted),
                accepted = accept_optional(self.tcp_listener.as_ref()) => self.on_accept(Transport::Tcp, accepted),
            }
        }
    }

    fn on_accept(&self, transport: Transport, accepted: std::io::Result<(TcpStream, SocketAddr)>) {
        match accepted {
            Ok((stream, addr)) => {
                info!("새 {} 연결: {}", transport, addr);
                self.spawn_connection(transport, stream, addr);
            }
            Err(e) => {
                let error = ServerError::network_error(None, "accept", &e.to_string());
                ErrorHandler::handle_error(&error, ErrorSeverity::Error, "MillServer", "accept_loop");
            }
        }
    }

    fn spawn_connection(&self, transport: Transport, stream: TcpStream, addr: SocketAddr) {
        let handler = self.connection_handler.clone();
        let connection_service = self.connection_service.clone();
        let room_registry = self.room_registry.clone();

        tokio::spawn(async move {
            let result = match transport {
                Transport::WebSocket => handler.handle_websocket(stream, addr).await,
                Transport::Tcp => handler.handle_tcp(stream, addr).await,
            };

            if let Err(e) = result {
                let severity = match e {
                    ServerError::Capacity { .. } => ErrorSeverity::Warning,
                    _ => ErrorSeverity::Info,
                };
                ErrorHandler::handle_error(&e, severity, "ConnectionHandler", &format!("{}_connection", transport));
            }

            let stats = connection_service.stats();
            info!(
                "📊 연결 {}/{} (최대 {}), 방 {}개, 가동 {}초",
                stats.current_connections,
                stats.total_connections,
                stats.peak_connections,
                room_registry.room_count(),
                connection_service.uptime_seconds()
            );
        });
    }
}

/// 리스너 바인딩. 실패는 치명적 에러로 기록합니다.
async fn bind_listener(transport: Transport, address: String) -> Result<TcpListener> {
    match TcpListener::bind(&address).await {
        Ok(listener) => Ok(listener),
        Err(e) => {
            let error = ServerError::network_error(Some(address.clone()), "bind", &e.to_string());
            ErrorHandler::handle_error(&error, ErrorSeverity::Critical, "MillServer", &format!("{}_bind", transport));
            Err(e).with_context(|| format!("{} 리스너 바인드 실패: {}", transport, address))
        }
    }
}

/// TCP 리스너가 없으면 영원히 대기
async fn accept_optional(listener: Option<&TcpListener>) -> std::io::Result<(TcpStream, SocketAddr)> {
    match listener {
        Some(listener) => listener.accept().await,
        None => std::future::pending().await,
    }
}
