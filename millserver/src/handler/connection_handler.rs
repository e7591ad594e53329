//! 연결 핸들러
//!
//! 전송 계층 연결 하나를 게임 메시지 핸들러에 묶습니다.
//!
//! - 연결 등록 후 송신 채널을 비우는 쓰기 태스크를 띄웁니다.
//! - 읽기 루프는 메시지를 하나씩 순서대로 처리합니다.
//! - 스트림이 닫히거나 에러가 나면 방을 정리하고 연결을 제거합니다.

use futures_util::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{BufReader, BufWriter};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info};

use crate::handler::GameMessageHandler;
use crate::protocol;
use crate::service::ConnectionService;
use crate::tool::{ConnectionId, ErrorHandler, ErrorSeverity, GameError, ProtocolError, ServerError};

/// 연결 핸들러
pub struct ConnectionHandler {
    connection_service: Arc<ConnectionService>,
    message_handler: Arc<GameMessageHandler>,
}

impl ConnectionHandler {
    pub fn new(connection_service: Arc<ConnectionService>, message_handler: Arc<GameMessageHandler>) -> Self {
        Self {
            connection_service,
            message_handler,
        }
    }

    /// 웹소켓 연결 처리
    ///
    /// 텍스트 프레임 하나가 메시지 하나입니다. UTF-8 바이너리 프레임도 받습니다.
    pub async fn handle_websocket(&self, stream: TcpStream, addr: SocketAddr) -> Result<(), ServerError> {
        let ws_stream = tokio_tungstenite::accept_async(stream).await.map_err(|e| {
            ServerError::connection_error(None, Some(addr.to_string()), &format!("웹소켓 핸드셰이크 실패: {}", e))
        })?;

        let (id, outbound) = self.connection_service.register(addr.to_string())?;
        let (mut sink, mut source) = ws_stream.split();

        let writer = tokio::spawn(async move {
            let mut outbound = outbound;
            while let Some(message) = outbound.recv().await {
                let text = match message.to_json() {
                    Ok(text) => text,
                    Err(e) => {
                        ErrorHandler::handle_error(&e, ErrorSeverity::Error, "ConnectionHandler", "ws_serialize");
                        continue;
                    }
                };
                if let Err(e) = sink.send(Message::Text(text)).await {
                    ErrorHandler::handle_error(&ServerError::from(e), ErrorSeverity::Info, "ConnectionHandler", "ws_write");
                    return;
                }
            }
            if let Err(e) = sink.close().await {
                debug!("웹소켓 종료 프레임 전송 실패: {}", e);
            }
        });

        let result = async {
            while let Some(frame) = source.next().await {
                match frame? {
                    Message::Text(text) => self.message_handler.handle_text(id, &text),
                    Message::Binary(data) => match String::from_utf8(data) {
                        Ok(text) => self.message_handler.handle_text(id, &text),
                        Err(_) => self
                            .message_handler
                            .reject(id, &GameError::from(ProtocolError::Malformed)),
                    },
                    Message::Close(_) => break,
                    // ping/pong은 라이브러리가 응답
                    _ => {}
                }
            }
            Ok::<(), ServerError>(())
        }
        .await;

        self.finish(id, addr, writer).await;
        result
    }

    /// 길이 헤더 프레임 TCP 연결 처리
    pub async fn handle_tcp(&self, stream: TcpStream, addr: SocketAddr) -> Result<(), ServerError> {
        if let Err(e) = stream.set_nodelay(true) {
            debug!("TCP_NODELAY 설정 실패 ({}): {}", addr, e);
        }

        let (id, outbound) = self.connection_service.register(addr.to_string())?;
        let (read_half, write_half) = stream.into_split();

        let writer = tokio::spawn(async move {
            let mut outbound = outbound;
            let mut writer = BufWriter::new(write_half);
            while let Some(message) = outbound.recv().await {
                if let Err(e) = protocol::write_frame(&mut writer, &message).await {
                    ErrorHandler::handle_error(&e, ErrorSeverity::Info, "ConnectionHandler", "tcp_write");
                    return;
                }
            }
        });

        let mut reader = BufReader::new(read_half);
        let result = loop {
            match protocol::read_frame(&mut reader).await {
                Ok(Some(text)) => self.message_handler.handle_text(id, &text),
                Ok(None) => break Ok(()),
                Err(e) => break Err(e),
            }
        };

        self.finish(id, addr, writer).await;
        result
    }

    /// 방 정리 → 연결 제거 → 남은 메시지 전송 대기
    async fn finish(&self, id: ConnectionId, addr: SocketAddr, writer: tokio::task::JoinHandle<()>) {
        self.message_handler.handle_disconnect(id);
        self.connection_service.remove_connection(id);

        // 송신 채널이 닫혔으므로 쓰기 태스크는 남은 메시지를 보내고 끝남
        if let Err(e) = writer.await {
            debug!("쓰기 태스크 종료 실패 ({}): {}", id, e);
        }
        info!("클라이언트 {} 연결 해제 완료 ({})", id, addr);
    }
}
