//! 게임 세션 (방)
//!
//! 두 좌석의 보드, 턴, 단계, 배치 수를 소유하고 규칙 엔진으로 검증한 행동만 반영합니다.
//! 모든 전이는 검증을 끝낸 뒤에만 보드를 바꾸므로 거절된 행동은 상태를 남기지 않습니다.
//!
//! 전이 결과는 `Outbound` 목록(받을 좌석 + 메시지)으로 돌려주며,
//! 실제 연결로 보내는 일은 호출자(`RoomRegistry`)가 맡습니다.

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use super::board::{Board, Seat, BOARD_SIZE, MAX_PIECES};
use super::rules;
use crate::protocol::{GameSnapshot, GameState, LastMove, ServerMessage};
use crate::tool::{ConnectionId, GameError, RoomCode, RuleViolation};

/// 게임 진행 단계
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// 어느 한쪽이라도 놓을 말이 남아 있는 동안
    Placement,
    /// 양쪽 모두 9개를 놓은 뒤. 되돌아가지 않음
    Movement,
}

/// 턴 내부의 보조 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubPhase {
    Normal,
    /// 밀을 완성한 좌석이 잡을 말을 고르는 중 (턴 유지)
    AwaitingCapture,
}

/// 방 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    WaitingForOpponent,
    Playing,
    Ended,
}

/// 좌석이 요청한 게임 행동
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameAction {
    Place { index: usize },
    Move { from: usize, to: usize },
    Capture { index: usize },
}

/// 전이 후 보낼 메시지와 받을 좌석
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outbound {
    pub to: Seat,
    pub message: ServerMessage,
}

impl Outbound {
    fn new(to: Seat, message: ServerMessage) -> Self {
        Self { to, message }
    }

    fn both(message: ServerMessage) -> Vec<Self> {
        vec![Self::new(Seat::One, message.clone()), Self::new(Seat::Two, message)]
    }
}

const GAME_START_MESSAGE: &str = "Both players connected. Game starts!";
const LINE_FORMED_MESSAGE: &str = "You formed a line! Select an opponent piece to capture.";
const OPPONENT_DISCONNECTED_MESSAGE: &str = "Opponent disconnected. The game in this room has ended.";

/// 방 하나의 게임 상태
#[derive(Debug, Clone)]
pub struct GameSession {
    code: RoomCode,
    board: Board,
    seats: [Option<ConnectionId>; 2],
    turn: Seat,
    phase: Phase,
    subphase: SubPhase,
    placed: [u8; 2],
    status: GameStatus,
    created_at: DateTime<Utc>,
}

impl GameSession {
    /// 생성자를 1번 좌석에 앉힌 빈 세션
    pub fn new(code: RoomCode, creator: ConnectionId) -> Self {
        Self {
            code,
            board: Board::new(),
            seats: [Some(creator), None],
            turn: Seat::One,
            phase: Phase::Placement,
            subphase: SubPhase::Normal,
            placed: [0, 0],
            status: GameStatus::WaitingForOpponent,
            created_at: Utc::now(),
        }
    }

    pub fn code(&self) -> &RoomCode {
        &self.code
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn turn(&self) -> Seat {
        self.turn
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn subphase(&self) -> SubPhase {
        self.subphase
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn placed(&self, seat: Seat) -> u8 {
        self.placed[seat.slot()]
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// 좌석에 앉은 연결
    pub fn connection(&self, seat: Seat) -> Option<ConnectionId> {
        self.seats[seat.slot()]
    }

    /// 연결이 앉은 좌석
    pub fn seat_of(&self, connection: ConnectionId) -> Option<Seat> {
        [Seat::One, Seat::Two]
            .into_iter()
            .find(|&seat| self.connection(seat) == Some(connection))
    }

    /// 앉아 있는 좌석 수
    pub fn player_count(&self) -> usize {
        self.seats.iter().filter(|seat| seat.is_some()).count()
    }

    /// 와이어용 게임 상태
    pub fn game_state(&self) -> GameState {
        match (self.status, self.subphase) {
            (GameStatus::WaitingForOpponent, _) => GameState::WaitingForOpponent,
            (GameStatus::Ended, _) => GameState::Ended,
            (GameStatus::Playing, SubPhase::AwaitingCapture) => GameState::AwaitingCapture,
            (GameStatus::Playing, SubPhase::Normal) => GameState::Playing,
        }
    }

    /// 현재 보드 전체 스냅샷
    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            board: self.board.clone(),
            current_player: self.turn,
            placement_phase: self.phase == Phase::Placement,
            pieces_placed: self.placed,
            game_state: self.game_state(),
        }
    }

    /// 생성자에게 보낼 `room_created`
    pub fn created_message(&self) -> ServerMessage {
        ServerMessage::RoomCreated {
            room_id: self.code.clone(),
            player_id: Seat::One,
            snapshot: self.snapshot(),
        }
    }

    /// 2번 좌석 입장
    ///
    /// 성공하면 `Playing`으로 바뀌고 입장한 좌석에 `joined_room`,
    /// 양쪽에 `game_start`를 보냅니다.
    pub fn join(&mut self, connection: ConnectionId) -> Result<Vec<Outbound>, GameError> {
        if self.status == GameStatus::Ended {
            return Err(GameError::RoomNotFound(self.code.clone()));
        }
        if self.status != GameStatus::WaitingForOpponent || self.seats[Seat::Two.slot()].is_some() {
            return Err(GameError::RoomFull(self.code.clone()));
        }

        self.seats[Seat::Two.slot()] = Some(connection);
        self.status = GameStatus::Playing;
        self.turn = Seat::One;

        info!("🎮 방 {} 게임 시작 ({} 입장)", self.code, connection);

        let snapshot = self.snapshot();
        let mut out = vec![Outbound::new(
            Seat::Two,
            ServerMessage::JoinedRoom {
                room_id: self.code.clone(),
                player_id: Seat::Two,
                snapshot: snapshot.clone(),
            },
        )];
        out.extend(Outbound::both(ServerMessage::GameStart {
            room_id: self.code.clone(),
            message: GAME_START_MESSAGE.to_string(),
            snapshot,
        }));
        Ok(out)
    }

    /// 좌석의 행동을 검증하고 반영합니다.
    ///
    /// 거절되면 상태는 그대로이고 에러만 돌려줍니다.
    pub fn apply(&mut self, seat: Seat, action: GameAction) -> Result<Vec<Outbound>, GameError> {
        match self.status {
            GameStatus::WaitingForOpponent => return Err(RuleViolation::WaitingForOpponent.into()),
            GameStatus::Ended => return Err(RuleViolation::GameEnded.into()),
            GameStatus::Playing => {}
        }

        match action {
            GameAction::Place { index } => self.place(seat, index),
            GameAction::Move { from, to } => self.move_piece(seat, from, to),
            GameAction::Capture { index } => self.capture(seat, index),
        }
    }

    /// 좌석 연결 종료
    ///
    /// 진행 중인 방은 즉시 `Ended`가 되고 남은 좌석에 `opponent_disconnected`를 보냅니다.
    /// 이미 끝난 방에서는 아무 일도 하지 않습니다.
    pub fn disconnect(&mut self, seat: Seat) -> Vec<Outbound> {
        if self.status == GameStatus::Ended {
            return Vec::new();
        }

        self.status = GameStatus::Ended;
        self.seats[seat.slot()] = None;
        info!("🔌 방 {} {} 연결 종료, 게임 종료", self.code, seat);

        let remaining = seat.opponent();
        if self.connection(remaining).is_none() {
            return Vec::new();
        }
        vec![Outbound::new(
            remaining,
            ServerMessage::OpponentDisconnected {
                message: OPPONENT_DISCONNECTED_MESSAGE.to_string(),
                game_state: GameState::Ended,
            },
        )]
    }

    fn ensure_can_act(&self, seat: Seat) -> Result<(), RuleViolation> {
        if self.subphase == SubPhase::AwaitingCapture {
            return Err(RuleViolation::AwaitingCapture);
        }
        if seat != self.turn {
            return Err(RuleViolation::NotYourTurn);
        }
        Ok(())
    }

    fn place(&mut self, seat: Seat, index: usize) -> Result<Vec<Outbound>, GameError> {
        self.ensure_can_act(seat)?;
        if self.phase != Phase::Placement {
            return Err(RuleViolation::NotPlacementPhase.into());
        }
        if self.placed[seat.slot()] >= MAX_PIECES {
            return Err(RuleViolation::NoPiecesLeft.into());
        }
        if index >= BOARD_SIZE {
            return Err(RuleViolation::InvalidIndex.into());
        }
        if !rules::is_legal_placement(&self.board, index) {
            return Err(RuleViolation::SpotTaken.into());
        }

        self.board.place(index, seat);
        self.placed[seat.slot()] += 1;
        debug!("방 {} {} 배치: {}", self.code, seat, index);

        Ok(self.resolve_action(seat, index, LastMove::PlacePiece { player: seat, index }))
    }

    fn move_piece(&mut self, seat: Seat, from: usize, to: usize) -> Result<Vec<Outbound>, GameError> {
        self.ensure_can_act(seat)?;
        if self.phase == Phase::Placement {
            return Err(RuleViolation::StillPlacementPhase.into());
        }
        if from >= BOARD_SIZE || to >= BOARD_SIZE {
            return Err(RuleViolation::InvalidMoveIndices.into());
        }
        if !rules::is_legal_move(&self.board, seat, from, to) {
            return Err(RuleViolation::IllegalMove.into());
        }

        self.board.clear(from);
        self.board.place(to, seat);
        debug!("방 {} {} 이동: {} -> {}", self.code, seat, from, to);

        Ok(self.resolve_action(seat, to, LastMove::MovePiece { player: seat, from, to }))
    }

    fn capture(&mut self, seat: Seat, index: usize) -> Result<Vec<Outbound>, GameError> {
        if self.subphase != SubPhase::AwaitingCapture || seat != self.turn {
            return Err(RuleViolation::NotCaptureState.into());
        }
        let opponent = seat.opponent();
        if self.board.owner(index) != Some(opponent) {
            return Err(RuleViolation::InvalidCaptureTarget.into());
        }
        if rules::is_protected_by_mill(&self.board, opponent, index) {
            return Err(RuleViolation::ProtectedPiece.into());
        }

        self.board.clear(index);
        self.subphase = SubPhase::Normal;
        info!("⚔️ 방 {} {} 가 {}번 말을 잡음", self.code, seat, index);
        self.advance_turn();

        Ok(Outbound::both(ServerMessage::Update {
            snapshot: self.snapshot(),
            last_move: LastMove::Capture { player: seat, captured_index: index },
        }))
    }

    /// 배치/이동 직후의 밀 검사와 턴 진행
    fn resolve_action(&mut self, seat: Seat, changed: usize, last_move: LastMove) -> Vec<Outbound> {
        if rules::forms_mill(&self.board, seat, changed) {
            let targets = rules::capturable_targets(&self.board, seat.opponent());
            if !targets.is_empty() {
                self.subphase = SubPhase::AwaitingCapture;
                info!("🎯 방 {} {} 밀 완성 ({}번), 잡기 대상 {}개", self.code, seat, changed, targets.len());

                let snapshot = self.snapshot();
                return vec![
                    Outbound::new(
                        seat,
                        ServerMessage::LineFormedCapturePending {
                            message: LINE_FORMED_MESSAGE.to_string(),
                            capturable_pieces: targets,
                            snapshot: snapshot.clone(),
                        },
                    ),
                    Outbound::new(
                        seat.opponent(),
                        ServerMessage::OpponentAwaitingCapture {
                            message: format!(
                                "Opponent ({}) formed a line and is selecting a piece to capture.",
                                seat
                            ),
                            snapshot,
                        },
                    ),
                ];
            }
            info!("방 {} {} 밀 완성, 잡을 수 있는 말 없음", self.code, seat);
        }

        self.advance_turn();
        Outbound::both(ServerMessage::Update {
            snapshot: self.snapshot(),
            last_move,
        })
    }

    /// 턴을 넘기고 배치 단계 종료 여부를 확인합니다.
    fn advance_turn(&mut self) {
        self.turn = self.turn.opponent();
        if self.phase == Phase::Placement && self.placed.iter().all(|&count| count >= MAX_PIECES) {
            self.phase = Phase::Movement;
            info!("🔄 방 {} 배치 단계 종료, 이동 단계 시작", self.code);
        }
    }
}
