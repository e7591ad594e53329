//! 방 코드 생성 유틸리티
//!
//! 사람이 직접 입력할 수 있는 짧은 영숫자 코드를 만듭니다.
//! 코드는 대소문자를 구분하지 않으며 내부적으로 항상 대문자로 저장됩니다.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 방 코드 길이
pub const ROOM_CODE_LEN: usize = 5;

/// 방 코드에 사용하는 문자 집합 (base36 대문자)
pub const ROOM_CODE_ALPHABET: &str = "0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// 정규화된 방 코드
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomCode(String);

impl RoomCode {
    /// 무작위 방 코드를 생성합니다.
    ///
    /// 충돌 여부는 확인하지 않습니다. 중복 검사는 `RoomRegistry`가 삽입 시점에 수행합니다.
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        let alphabet = ROOM_CODE_ALPHABET.as_bytes();
        let mut code = String::with_capacity(ROOM_CODE_LEN);
        for _ in 0..ROOM_CODE_LEN {
            let idx = rng.gen_range(0..alphabet.len());
            code.push(alphabet[idx] as char);
        }
        Self(code)
    }

    /// 클라이언트가 입력한 코드를 정규화합니다.
    ///
    /// 앞뒤 공백을 제거하고 대문자로 변환합니다. 비어 있으면 `None`을 반환합니다.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use millserver::tool::RoomCode;
    ///
    /// let code = RoomCode::parse(" ab12c ").unwrap();
    /// assert_eq!(code.as_str(), "AB12C");
    /// assert!(RoomCode::parse("   ").is_none());
    /// ```
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(Self(trimmed.to_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
