//! 규칙 엔진
//!
//! 보드 스냅샷과 좌석만 보고 판단하는 순수 함수 모음입니다.
//! 세션 상태를 건드리지 않으며 실패는 `false` 또는 빈 목록으로만 표현합니다.
//! 밀 여부는 캐시하지 않고 호출할 때마다 현재 보드에서 다시 계산합니다.

use super::board::{is_adjacent, lines_through, Board, Seat, BOARD_SIZE};

/// 배치 가능 여부: 범위 안의 빈 칸이면 `true`
pub fn is_legal_placement(board: &Board, index: usize) -> bool {
    index < BOARD_SIZE && board.is_empty_at(index)
}

/// 이동 가능 여부
///
/// 출발 칸이 좌석 소유이고, 도착 칸이 비어 있으며, 두 칸이 인접해야 합니다.
pub fn is_legal_move(board: &Board, seat: Seat, from: usize, to: usize) -> bool {
    board.owner(from) == Some(seat) && board.is_empty_at(to) && is_adjacent(from, to)
}

/// 방금 바뀐 칸을 지나는 라인 중 좌석이 세 칸을 모두 가진 라인이 있는지 확인합니다.
pub fn forms_mill(board: &Board, seat: Seat, changed: usize) -> bool {
    lines_through(changed).any(|line| owns_line(board, seat, line))
}

/// 좌석 소유 칸이 완성된 밀에 속해 있으면 `true`
pub fn is_protected_by_mill(board: &Board, seat: Seat, index: usize) -> bool {
    board.owner(index) == Some(seat) && forms_mill(board, seat, index)
}

/// 잡을 수 있는 상대 말 목록 (오름차순)
///
/// 밀로 보호되지 않은 상대 말만 포함합니다. 모든 상대 말이 보호 중이면 빈 목록입니다.
pub fn capturable_targets(board: &Board, opponent: Seat) -> Vec<usize> {
    (0..BOARD_SIZE)
        .filter(|&index| board.owner(index) == Some(opponent))
        .filter(|&index| !is_protected_by_mill(board, opponent, index))
        .collect()
}

fn owns_line(board: &Board, seat: Seat, line: &[usize; 3]) -> bool {
    line.iter().all(|&index| board.owner(index) == Some(seat))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::board::{Cell, MILL_LINES};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    /// 시드 고정 무작위 보드
    fn random_board(rng: &mut StdRng) -> Board {
        let mut pieces = Vec::new();
        for index in 0..BOARD_SIZE {
            match rng.gen_range(0..3) {
                1 => pieces.push((index, Seat::One)),
                2 => pieces.push((index, Seat::Two)),
                _ => {}
            }
        }
        Board::with_pieces(&pieces)
    }

    #[test]
    fn test_legal_placement() {
        let board = Board::with_pieces(&[(4, Seat::Two)]);

        assert!(is_legal_placement(&board, 0));
        assert!(!is_legal_placement(&board, 4));
        assert!(!is_legal_placement(&board, BOARD_SIZE));
        println!("✅ 배치 규칙 테스트 통과");
    }

    /// 소유권, 빈 칸, 인접성 세 조건을 각각 확인
    #[test]
    fn test_legal_move() {
        let board = Board::with_pieces(&[(0, Seat::One), (1, Seat::Two), (7, Seat::One)]);

        assert!(is_legal_move(&board, Seat::One, 0, 8));
        assert!(!is_legal_move(&board, Seat::One, 0, 1), "도착 칸이 차 있음");
        assert!(!is_legal_move(&board, Seat::One, 0, 7), "도착 칸에 내 말");
        assert!(!is_legal_move(&board, Seat::Two, 0, 8), "내 말이 아님");
        assert!(!is_legal_move(&board, Seat::One, 0, 4), "인접하지 않음");
        assert!(!is_legal_move(&board, Seat::One, 0, BOARD_SIZE));
        assert!(!is_legal_move(&board, Seat::One, BOARD_SIZE, 0));
        println!("✅ 이동 규칙 테스트 통과");
    }

    #[test]
    fn test_forms_mill() {
        let board = Board::with_pieces(&[(2, Seat::One), (3, Seat::One), (4, Seat::One), (5, Seat::Two)]);

        assert!(forms_mill(&board, Seat::One, 4));
        assert!(forms_mill(&board, Seat::One, 2));
        assert!(!forms_mill(&board, Seat::Two, 4));
        assert!(!forms_mill(&board, Seat::One, 5));

        // 중간 링을 가로지르는 라인
        let cross = Board::with_pieces(&[(1, Seat::Two), (9, Seat::Two), (17, Seat::Two)]);
        assert!(forms_mill(&cross, Seat::Two, 9));
    }

    /// 같은 보드에서 반복 호출해도 결과가 같아야 함
    #[test]
    fn test_forms_mill_is_pure() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let board = random_board(&mut rng);
            for index in 0..BOARD_SIZE {
                let first = forms_mill(&board, Seat::One, index);
                assert_eq!(first, forms_mill(&board, Seat::One, index));
            }
        }
    }

    #[test]
    fn test_protected_piece() {
        let board = Board::with_pieces(&[
            (16, Seat::Two), (17, Seat::Two), (18, Seat::Two),
            (20, Seat::Two),
            (0, Seat::One),
        ]);

        assert!(is_protected_by_mill(&board, Seat::Two, 17));
        assert!(!is_protected_by_mill(&board, Seat::Two, 20));
        assert!(!is_protected_by_mill(&board, Seat::One, 17), "상대 좌석 기준으로는 보호 아님");
        assert!(!is_protected_by_mill(&board, Seat::Two, 19), "빈 칸");
    }

    #[test]
    fn test_capturable_targets_sorted() {
        let board = Board::with_pieces(&[
            (21, Seat::Two), (5, Seat::Two), (16, Seat::Two), (17, Seat::Two), (18, Seat::Two),
            (0, Seat::One),
        ]);

        assert_eq!(capturable_targets(&board, Seat::Two), vec![5, 21]);
        assert_eq!(capturable_targets(&board, Seat::One), vec![0]);
    }

    /// 상대 말이 모두 밀 안에 있으면 잡을 대상이 없음
    #[test]
    fn test_capturable_targets_empty_when_all_protected() {
        let board = Board::with_pieces(&[
            (8, Seat::Two), (9, Seat::Two), (10, Seat::Two),
            (2, Seat::One), (3, Seat::One), (4, Seat::One),
        ]);

        assert!(capturable_targets(&board, Seat::Two).is_empty());
        assert!(capturable_targets(&Board::new(), Seat::One).is_empty());
    }

    /// 무작위 보드에서 잡기 대상은 항상 상대 소유이고 보호되지 않은 칸이어야 함
    #[test]
    fn test_capturable_targets_property() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..200 {
            let board = random_board(&mut rng);
            for opponent in [Seat::One, Seat::Two] {
                let targets = capturable_targets(&board, opponent);
                assert!(targets.windows(2).all(|pair| pair[0] < pair[1]));
                for &index in &targets {
                    assert_eq!(board.get(index), Some(Cell::Occupied(opponent)));
                    assert!(!is_protected_by_mill(&board, opponent, index));
                }
                let unprotected = board
                    .cells()
                    .iter()
                    .enumerate()
                    .filter(|(index, cell)| {
                        cell.owner() == Some(opponent) && !MILL_LINES.iter().any(|line| {
                            line.contains(index) && line.iter().all(|&i| board.owner(i) == Some(opponent))
                        })
                    })
                    .count();
                assert_eq!(targets.len(), unprotected);
            }
        }
        println!("✅ 잡기 대상 속성 테스트 통과");
    }
}
