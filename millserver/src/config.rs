//! 밀 서버 환경 설정 모듈
//!
//! .env 파일과 시스템 환경변수에서 설정을 로드하고 검증합니다.

use anyhow::Result;
use std::path::Path;
use tracing::{info, warn};

/// 밀 서버 설정 구조체
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MillServerConfig {
    /// 바인딩 호스트 주소
    pub host: String,
    /// 웹소켓 포트 번호
    pub ws_port: u16,
    /// 길이 헤더 TCP 포트 번호
    pub tcp_port: u16,
    /// TCP 리스너 사용 여부
    pub tcp_enabled: bool,
    /// 최대 동시 연결 수
    pub max_connections: usize,
}

impl Default for MillServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            ws_port: 3000,
            tcp_port: 4000,
            tcp_enabled: true,
            max_connections: 1000,
        }
    }
}

impl MillServerConfig {
    /// 환경변수에서 설정을 로드합니다.
    ///
    /// 로드 순서:
    /// 1. 상위 디렉토리의 .env 파일
    /// 2. 현재 디렉토리의 .env 파일
    /// 3. 상위의 상위 디렉토리의 .env 파일
    /// 4. 시스템 환경변수
    /// 5. 기본값
    pub fn from_env() -> Result<Self> {
        Self::load_env_file();

        let config = Self::from_lookup(|key| std::env::var(key).ok());
        info!("밀 서버 설정 로드 완료: {:?}", config);
        Ok(config)
    }

    /// 키 조회 함수로 설정을 만듭니다. 값이 없거나 해석할 수 없으면 기본값을 씁니다.
    ///
    /// 웹소켓 포트는 `mill_ws_port`가 없으면 `PORT`를 봅니다.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let parse_or = |key: &str, default: u16| {
            lookup(key)
                .and_then(|value| value.trim().parse().ok())
                .unwrap_or(default)
        };

        Self {
            host: lookup("mill_host").unwrap_or(defaults.host),
            ws_port: lookup("mill_ws_port")
                .and_then(|value| value.trim().parse().ok())
                .or_else(|| lookup("PORT").and_then(|value| value.trim().parse().ok()))
                .unwrap_or(defaults.ws_port),
            tcp_port: parse_or("mill_tcp_port", defaults.tcp_port),
            tcp_enabled: lookup("mill_tcp_enabled")
                .map(|value| !matches!(value.trim().to_ascii_lowercase().as_str(), "false" | "0" | "no" | "off"))
                .unwrap_or(defaults.tcp_enabled),
            max_connections: lookup("mill_max_connections")
                .and_then(|value| value.trim().parse().ok())
                .unwrap_or(defaults.max_connections),
        }
    }

    /// 웹소켓 바인딩 주소를 반환합니다.
    pub fn ws_address(&self) -> String {
        format!("{}:{}", self.host, self.ws_port)
    }

    /// TCP 바인딩 주소를 반환합니다.
    pub fn tcp_address(&self) -> String {
        format!("{}:{}", self.host, self.tcp_port)
    }

    /// .env 파일을 로드합니다.
    fn load_env_file() {
        let env_paths = ["../.env", ".env", "../../.env"];

        for path in env_paths {
            if Path::new(path).exists() && dotenv::from_filename(path).is_ok() {
                info!(".env 파일 로드 성공: {}", path);
                return;
            }
        }

        warn!(".env 파일을 찾을 수 없습니다. 기본값과 시스템 환경변수를 사용합니다.");
    }
}

/// 설정 검증 유틸리티
pub fn validate_config(config: &MillServerConfig) -> Result<()> {
    if config.ws_port == 0 {
        anyhow::bail!("유효하지 않은 웹소켓 포트 번호: {}", config.ws_port);
    }

    if config.tcp_enabled && config.tcp_port == 0 {
        anyhow::bail!("유효하지 않은 TCP 포트 번호: {}", config.tcp_port);
    }

    if config.tcp_enabled && config.tcp_port == config.ws_port {
        anyhow::bail!("웹소켓과 TCP 포트가 같습니다: {}", config.ws_port);
    }

    if config.host.trim().is_empty() {
        anyhow::bail!("호스트 주소가 비어있습니다");
    }

    if config.max_connections == 0 {
        anyhow::bail!("최대 연결 수는 0보다 커야 합니다");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = MillServerConfig::from_lookup(|_| None);
        assert_eq!(config, MillServerConfig::default());
        assert_eq!(config.ws_address(), "127.0.0.1:3000");
        assert_eq!(config.tcp_address(), "127.0.0.1:4000");
        assert!(validate_config(&config).is_ok());
    }

    /// 환경변수 값 적용 테스트
    #[test]
    fn test_overrides() {
        let config = MillServerConfig::from_lookup(lookup_from(&[
            ("mill_host", "0.0.0.0"),
            ("mill_ws_port", "8080"),
            ("PORT", "9999"),
            ("mill_tcp_port", "8081"),
            ("mill_tcp_enabled", "false"),
            ("mill_max_connections", "50"),
        ]));

        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.ws_port, 8080, "mill_ws_port가 PORT보다 우선");
        assert_eq!(config.tcp_port, 8081);
        assert!(!config.tcp_enabled);
        assert_eq!(config.max_connections, 50);
        println!("✅ 설정 적용 테스트 통과");
    }

    #[test]
    fn test_port_fallback_and_bad_values() {
        let config = MillServerConfig::from_lookup(lookup_from(&[
            ("PORT", "5000"),
            ("mill_tcp_port", "not-a-port"),
            ("mill_max_connections", "-3"),
        ]));

        assert_eq!(config.ws_port, 5000);
        assert_eq!(config.tcp_port, 4000);
        assert_eq!(config.max_connections, 1000);
    }

    /// 해석할 수 없는 mill_ws_port는 PORT로 넘어감
    #[test]
    fn test_bad_ws_port_falls_back_to_port() {
        let config = MillServerConfig::from_lookup(lookup_from(&[
            ("mill_ws_port", "abc"),
            ("PORT", "5000"),
        ]));
        assert_eq!(config.ws_port, 5000);

        let config = MillServerConfig::from_lookup(lookup_from(&[
            ("mill_ws_port", "abc"),
            ("PORT", "also-bad"),
        ]));
        assert_eq!(config.ws_port, 3000);
    }

    /// 설정 검증 실패 케이스
    #[test]
    fn test_validate_config() {
        let mut config = MillServerConfig::default();
        config.ws_port = 0;
        assert!(validate_config(&config).is_err());

        let mut config = MillServerConfig::default();
        config.host = "  ".to_string();
        assert!(validate_config(&config).is_err());

        let mut config = MillServerConfig::default();
        config.max_connections = 0;
        assert!(validate_config(&config).is_err());

        let mut config = MillServerConfig::default();
        config.tcp_port = config.ws_port;
        assert!(validate_config(&config).is_err());

        config.tcp_enabled = false;
        assert!(validate_config(&config).is_ok());
    }
}
