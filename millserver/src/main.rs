//! 밀 게임 서버
//!
//! 웹소켓(기본)과 길이 헤더 TCP로 두 명이 겨루는 밀 게임 방을 제공합니다.

use anyhow::Result;
use tracing::{error, info};

use millserver::{validate_config, MillServer, MillServerConfig};

/// 밀 서버 메인 진입점
///
/// 환경변수:
/// - mill_host: 바인딩 호스트 (기본값: "127.0.0.1")
/// - mill_ws_port: 웹소켓 포트, 없으면 PORT (기본값: "3000")
/// - mill_tcp_port: TCP 포트 (기본값: "4000")
/// - mill_tcp_enabled: TCP 리스너 사용 여부 (기본값: "true")
/// - mill_max_connections: 최대 동시 연결 수 (기본값: "1000")
#[tokio::main]
async fn main() -> Result<()> {
    // 로깅 설정
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // 환경 설정 로드
    let config = MillServerConfig::from_env()?;

    // 설정 검증
    validate_config(&config)?;

    info!("=== 밀 서버 설정 ===");
    info!("웹소켓: {}", config.ws_address());
    if config.tcp_enabled {
        info!("TCP: {}", config.tcp_address());
    }
    info!("최대 연결 수: {}", config.max_connections);
    info!("====================");

    let server = MillServer::bind(&config).await?;
    let server_handle = tokio::spawn(async move {
        if let Err(e) = server.run().await {
            error!("밀 서버 실행 오류: {:#}", e);
        }
    });

    // 종료 시그널 대기
    tokio::signal::ctrl_c().await?;
    info!("종료 시그널 수신, 서버를 중지합니다...");

    server_handle.abort();
    info!("✅ 밀 서버가 중지되었습니다");

    Ok(())
}
