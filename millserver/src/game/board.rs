//! 보드 토폴로지
//!
//! 세 겹의 사각 링으로 이루어진 24칸 보드의 고정 그래프를 정의합니다.
//!
//! # 인덱스 배치
//!
//! ```text
//!  0 ----------- 1 ----------- 2
//!  | \           |           / |
//!  |   8 ------- 9 ------ 10   |
//!  |   | \       |       / |   |
//!  |   |  16 -- 17 -- 18   |   |
//!  |   |   |         |     |   |
//!  7 - 15 - 23       19 - 11 - 3
//!  |   |   |         |     |   |
//!  |   |  22 -- 21 -- 20   |   |
//!  |   | /       |       \ |   |
//!  |  14 ------ 13 ------ 12   |
//!  | /           |           \ |
//!  6 ----------- 5 ----------- 4
//! ```
//!
//! 바깥 링 0..8, 중간 링 8..16, 안쪽 링 16..24 순서이며 각 링은 왼쪽 위 모서리에서
//! 시계 방향으로 진행합니다. 모든 칸은 이웃 링의 같은 위치(`i ± 8`)와 이어지므로
//! 모서리 칸도 대각선으로 링을 건너갈 수 있습니다. 밀 라인은 변의 중점만 링을 가로지릅니다.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// 보드 칸 수
pub const BOARD_SIZE: usize = 24;

/// 좌석당 배치할 수 있는 말 수
pub const MAX_PIECES: u8 = 9;

/// 한 줄(밀)을 이루는 16개의 세 칸 조합
pub const MILL_LINES: [[usize; 3]; 16] = [
    [0, 1, 2], [2, 3, 4], [4, 5, 6], [6, 7, 0],
    [8, 9, 10], [10, 11, 12], [12, 13, 14], [14, 15, 8],
    [16, 17, 18], [18, 19, 20], [20, 21, 22], [22, 23, 16],
    [1, 9, 17], [3, 11, 19], [5, 13, 21], [7, 15, 23],
];

/// 칸별 인접 칸 목록 (대칭, 자기 자신 없음)
pub const ADJACENCY: [&[usize]; BOARD_SIZE] = [
    &[1, 7, 8],       &[0, 2, 9],       &[1, 3, 10],      &[2, 4, 11],
    &[3, 5, 12],      &[4, 6, 13],      &[5, 7, 14],      &[6, 0, 15],
    &[0, 9, 15, 16],  &[1, 8, 10, 17],  &[2, 9, 11, 18],  &[3, 10, 12, 19],
    &[4, 11, 13, 20], &[5, 12, 14, 21], &[6, 13, 15, 22], &[7, 14, 8, 23],
    &[8, 17, 23],     &[9, 16, 18],     &[10, 17, 19],    &[11, 18, 20],
    &[12, 19, 21],    &[13, 20, 22],    &[14, 21, 23],    &[15, 22, 16],
];

/// 인덱스에 인접한 칸들. 범위를 벗어나면 빈 슬라이스를 돌려줍니다.
pub fn adjacent_to(index: usize) -> &'static [usize] {
    ADJACENCY.get(index).copied().unwrap_or(&[])
}

/// 두 칸이 한 변으로 이어져 있는지 확인합니다.
pub fn is_adjacent(from: usize, to: usize) -> bool {
    adjacent_to(from).contains(&to)
}

/// 인덱스를 지나는 밀 라인들
pub fn lines_through(index: usize) -> impl Iterator<Item = &'static [usize; 3]> {
    MILL_LINES.iter().filter(move |line| line.contains(&index))
}

/// 잘못된 좌석 번호
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("invalid seat number: {0}")]
pub struct InvalidSeat(pub u8);

/// 방 안의 플레이어 자리 (1번 또는 2번)
///
/// 와이어에서는 숫자 `1` / `2`로 표현됩니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Seat {
    One,
    Two,
}

impl Seat {
    pub fn opponent(self) -> Seat {
        match self {
            Seat::One => Seat::Two,
            Seat::Two => Seat::One,
        }
    }

    pub fn number(self) -> u8 {
        match self {
            Seat::One => 1,
            Seat::Two => 2,
        }
    }

    /// 좌석별 배열에 쓰는 0 기반 위치
    pub(crate) fn slot(self) -> usize {
        match self {
            Seat::One => 0,
            Seat::Two => 1,
        }
    }
}

impl From<Seat> for u8 {
    fn from(seat: Seat) -> u8 {
        seat.number()
    }
}

impl TryFrom<u8> for Seat {
    type Error = InvalidSeat;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Seat::One),
            2 => Ok(Seat::Two),
            other => Err(InvalidSeat(other)),
        }
    }
}

impl fmt::Display for Seat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Player {}", self.number())
    }
}

/// 보드 한 칸의 상태. 와이어에서는 `0`(빈 칸), `1`, `2`로 표현됩니다.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Cell {
    #[default]
    Empty,
    Occupied(Seat),
}

impl Cell {
    pub fn owner(self) -> Option<Seat> {
        match self {
            Cell::Empty => None,
            Cell::Occupied(seat) => Some(seat),
        }
    }
}

impl From<Cell> for u8 {
    fn from(cell: Cell) -> u8 {
        match cell {
            Cell::Empty => 0,
            Cell::Occupied(seat) => seat.number(),
        }
    }
}

impl TryFrom<u8> for Cell {
    type Error = InvalidSeat;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Cell::Empty),
            other => Seat::try_from(other).map(Cell::Occupied),
        }
    }
}

/// 24칸 보드
///
/// 칸의 주인은 배치/이동 도착 칸 쓰기로만 설정되고, 이동 출발 칸 비우기나
/// 잡기로만 지워집니다. 두 쓰기 연산은 게임 세션에서만 호출합니다.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Board {
    cells: [Cell; BOARD_SIZE],
}

impl Board {
    pub fn new() -> Self {
        Self::default()
    }

    /// 칸 상태. 범위를 벗어나면 `None`
    pub fn get(&self, index: usize) -> Option<Cell> {
        self.cells.get(index).copied()
    }

    /// 칸의 주인. 빈 칸이거나 범위를 벗어나면 `None`
    pub fn owner(&self, index: usize) -> Option<Seat> {
        self.get(index).and_then(Cell::owner)
    }

    /// 범위 안의 빈 칸인지 확인합니다.
    pub fn is_empty_at(&self, index: usize) -> bool {
        self.get(index) == Some(Cell::Empty)
    }

    pub fn cells(&self) -> &[Cell; BOARD_SIZE] {
        &self.cells
    }

    /// 좌석이 보드 위에 가진 말 수
    pub fn count(&self, seat: Seat) -> usize {
        self.cells.iter().filter(|cell| cell.owner() == Some(seat)).count()
    }

    pub(crate) fn place(&mut self, index: usize, seat: Seat) {
        self.cells[index] = Cell::Occupied(seat);
    }

    pub(crate) fn clear(&mut self, index: usize) {
        self.cells[index] = Cell::Empty;
    }

    /// 지정한 칸들에 말을 놓은 보드 (테스트용)
    #[cfg(test)]
    pub(crate) fn with_pieces(pieces: &[(usize, Seat)]) -> Self {
        let mut board = Self::new();
        for &(index, seat) in pieces {
            board.place(index, seat);
        }
        board
    }
}
