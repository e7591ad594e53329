//! 연결 식별자

use std::fmt;

/// 전송 계층 연결 하나를 가리키는 프로세스 내 고유 ID
///
/// `ConnectionService`가 연결 수락 시 단조 증가 값으로 발급합니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(u64);

impl ConnectionId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}
