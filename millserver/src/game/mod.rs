//! 밀 게임 도메인 레이어
//!
//! 전송 계층과 무관한 게임 규칙과 세션 상태를 담당합니다.
//!
//! # 구조
//!
//! ```text
//! Game Layer
//! ├── board   (24칸 토폴로지, 인접 목록, 16개 밀 라인)
//! ├── rules   (배치/이동/밀/잡기 판정 순수 함수)
//! └── session (한 방의 상태 기계: 대기 → 진행 ⇄ 잡기 → 종료)
//! ```

pub mod board;
pub mod rules;
pub mod session;

pub use board::{Board, Cell, Seat, BOARD_SIZE, MAX_PIECES};
pub use session::{GameAction, GameSession, GameStatus, Outbound, Phase, SubPhase};
