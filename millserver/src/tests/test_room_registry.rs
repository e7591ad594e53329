//! 방 레지스트리 테스트
//!
//! 방 생성/입장/행동 전달/연결 종료 흐름을 기록용 Outbox로 검증합니다.

use std::collections::HashSet;
use std::sync::Arc;

use super::RecordingOutbox;
use crate::game::{GameAction, GameStatus, Seat};
use crate::protocol::ServerMessage;
use crate::service::{RoomRegistry, SessionMembership};
use crate::tool::{ConnectionId, GameError, RoomCode, RuleViolation};

const HOST: ConnectionId = ConnectionId::new(1);
const GUEST: ConnectionId = ConnectionId::new(2);

fn membership(room_code: &RoomCode, seat: Seat) -> SessionMembership {
    SessionMembership {
        room_code: room_code.clone(),
        seat,
    }
}

/// 방을 만들고 GUEST를 입장시킨 레지스트리
fn started_room(outbox: &RecordingOutbox) -> (RoomRegistry, RoomCode) {
    let registry = RoomRegistry::new();
    let code = registry.create_room(HOST, outbox);
    registry.join_room(&code, GUEST, outbox).expect("Test assertion failed");
    outbox.clear();
    (registry, code)
}

/// 방 생성 테스트
#[test]
fn test_create_room() {
    let outbox = RecordingOutbox::default();
    let registry = RoomRegistry::new();

    let code = registry.create_room(HOST, &outbox);

    assert_eq!(registry.room_count(), 1);
    assert!(registry.contains(&code));
    assert_eq!(code.as_str().len(), 5);

    let messages = outbox.take_for(HOST);
    assert_eq!(messages.len(), 1);
    match &messages[0] {
        ServerMessage::RoomCreated { room_id, player_id, snapshot } => {
            assert_eq!(room_id, &code);
            assert_eq!(*player_id, Seat::One);
            assert!(snapshot.placement_phase);
        }
        other => panic!("❌ 잘못된 메시지: {:?}", other),
    }
    println!("✅ 방 생성 테스트 통과");
}

/// 동시에 많은 방을 만들어도 코드가 겹치지 않음
#[test]
fn test_concurrent_create_unique_codes() {
    let outbox = Arc::new(RecordingOutbox::default());
    let registry = Arc::new(RoomRegistry::new());

    let handles: Vec<_> = (0..8)
        .map(|thread| {
            let outbox = outbox.clone();
            let registry = registry.clone();
            std::thread::spawn(move || {
                (0..50)
                    .map(|i| registry.create_room(ConnectionId::new(thread * 100 + i), outbox.as_ref()))
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let mut codes = HashSet::new();
    for handle in handles {
        for code in handle.join().expect("Test assertion failed") {
            assert!(codes.insert(code), "중복 방 코드");
        }
    }
    assert_eq!(codes.len(), 400);
    assert_eq!(registry.room_count(), 400);
}

/// 입장 테스트: 대소문자 무시, 꽉 찬 방, 없는 방
#[test]
fn test_join_room() {
    let outbox = RecordingOutbox::default();
    let registry = RoomRegistry::new();
    let code = registry.create_room(HOST, &outbox);
    outbox.clear();

    let lowercase = RoomCode::parse(&code.as_str().to_lowercase()).expect("Test assertion failed");
    let seat = registry.join_room(&lowercase, GUEST, &outbox).expect("Test assertion failed");
    assert_eq!(seat, Seat::Two);

    assert_eq!(outbox.kinds_for(GUEST), vec!["joined_room", "game_start"]);
    assert_eq!(outbox.kinds_for(HOST), vec!["game_start"]);

    let third = ConnectionId::new(3);
    assert_eq!(
        registry.join_room(&code, third, &outbox),
        Err(GameError::RoomFull(code.clone()))
    );

    let missing = RoomCode::parse("NOPE0").expect("Test assertion failed");
    assert_eq!(
        registry.join_room(&missing, third, &outbox),
        Err(GameError::RoomNotFound(missing))
    );
    assert!(outbox.take_for(third).is_empty(), "실패한 입장은 레지스트리가 메시지를 보내지 않음");
}

/// 시나리오: 1번이 1, 2번이 9에 배치
#[test]
fn test_dispatch_simple_placements() {
    let outbox = RecordingOutbox::default();
    let (registry, code) = started_room(&outbox);

    registry
        .dispatch(HOST, &membership(&code, Seat::One), GameAction::Place { index: 1 }, &outbox)
        .expect("Test assertion failed");
    registry
        .dispatch(GUEST, &membership(&code, Seat::Two), GameAction::Place { index: 9 }, &outbox)
        .expect("Test assertion failed");

    assert_eq!(outbox.kinds_for(HOST), vec!["update", "update"]);
    assert_eq!(outbox.kinds_for(GUEST), vec!["update", "update"]);

    let (turn, placed) = registry
        .with_session(&code, |session| {
            (session.turn(), [session.placed(Seat::One), session.placed(Seat::Two)])
        })
        .expect("Test assertion failed");
    assert_eq!(turn, Seat::One);
    assert_eq!(placed, [1, 1]);
}

/// 거절은 요청자에게 에러만 돌려주고 아무것도 보내지 않음
#[test]
fn test_dispatch_rejection_sends_nothing() {
    let outbox = RecordingOutbox::default();
    let (registry, code) = started_room(&outbox);

    let result = registry.dispatch(
        GUEST,
        &membership(&code, Seat::Two),
        GameAction::Place { index: 0 },
        &outbox,
    );
    assert_eq!(result, Err(RuleViolation::NotYourTurn.into()));
    assert!(outbox.take_for(HOST).is_empty());
    assert!(outbox.take_for(GUEST).is_empty());
}

/// 좌석 주인이 아닌 연결의 요청은 방을 찾지 못한 것으로 처리
#[test]
fn test_dispatch_with_foreign_membership() {
    let outbox = RecordingOutbox::default();
    let (registry, code) = started_room(&outbox);
    let intruder = ConnectionId::new(99);

    assert_eq!(
        registry.dispatch(intruder, &membership(&code, Seat::One), GameAction::Place { index: 0 }, &outbox),
        Err(GameError::RoomNotFound(code.clone()))
    );
    assert!(!registry.remove_connection(intruder, &membership(&code, Seat::One), &outbox));
    assert!(registry.contains(&code));
}

/// 시나리오: 2번이 게임 중 연결 종료
#[test]
fn test_remove_connection_closes_room() {
    let outbox = RecordingOutbox::default();
    let (registry, code) = started_room(&outbox);

    registry
        .dispatch(HOST, &membership(&code, Seat::One), GameAction::Place { index: 0 }, &outbox)
        .expect("Test assertion failed");
    outbox.clear();

    assert!(registry.remove_connection(GUEST, &membership(&code, Seat::Two), &outbox));

    let host_messages = outbox.take_for(HOST);
    assert_eq!(host_messages.len(), 1);
    match &host_messages[0] {
        ServerMessage::OpponentDisconnected { message, game_state } => {
            assert_eq!(message, "Opponent disconnected. The game in this room has ended.");
            assert_eq!(*game_state, crate::protocol::GameState::Ended);
        }
        other => panic!("❌ 잘못된 메시지: {:?}", other),
    }

    assert!(!registry.contains(&code));
    assert_eq!(registry.room_count(), 0);
    assert_eq!(registry.with_session(&code, |session| session.status()), None::<GameStatus>);

    // 이후 요청은 모두 방 없음
    assert_eq!(
        registry.dispatch(HOST, &membership(&code, Seat::One), GameAction::Place { index: 1 }, &outbox),
        Err(GameError::RoomNotFound(code.clone()))
    );
    assert_eq!(
        registry.join_room(&code, ConnectionId::new(3), &outbox),
        Err(GameError::RoomNotFound(code.clone()))
    );
    assert!(!registry.remove_connection(HOST, &membership(&code, Seat::One), &outbox));
    assert!(outbox.take_for(HOST).is_empty());
    println!("✅ 연결 종료 시 방 정리 테스트 통과");
}

/// 대기 중인 방의 생성자가 나가면 방만 사라짐
#[test]
fn test_remove_creator_while_waiting() {
    let outbox = RecordingOutbox::default();
    let registry = RoomRegistry::new();
    let code = registry.create_room(HOST, &outbox);
    outbox.clear();

    assert!(registry.remove_connection(HOST, &membership(&code, Seat::One), &outbox));
    assert_eq!(registry.room_count(), 0);
    assert!(outbox.take_for(HOST).is_empty());
}
