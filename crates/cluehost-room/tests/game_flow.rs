//! Integration tests for the room system: full join/claim/mutate/teardown
//! flows driven straight through the engine.

use cluehost_protocol::{
    ChatMessage, ClientRequest, Role, RoomKey, ServerEvent,
};
use cluehost_room::{GameEngine, HOST_NAME, NO_QUESTION, SYSTEM_NAME};
use cluehost_transport::ConnectionId;
use tokio::sync::mpsc::{self, UnboundedReceiver};

// =========================================================================
// Helpers
// =========================================================================

struct Client {
    conn: ConnectionId,
    rx: UnboundedReceiver<ServerEvent>,
}

impl Client {
    /// Pops the next pending event, panicking if there is none.
    fn next(&mut self) -> ServerEvent {
        self.rx.try_recv().expect("expected a pending event")
    }

    fn drain(&mut self) {
        while self.rx.try_recv().is_ok() {}
    }

    fn assert_idle(&mut self) {
        assert!(
            self.rx.try_recv().is_err(),
            "expected no pending events"
        );
    }
}

fn attach(engine: &mut GameEngine, id: u64) -> Client {
    let conn = ConnectionId::new(id);
    let (tx, rx) = mpsc::unbounded_channel();
    engine.connect(conn, tx);
    Client { conn, rx }
}

fn key(code: &str) -> RoomKey {
    RoomKey::from(code)
}

fn join(engine: &mut GameEngine, client: &Client, code: &str) {
    engine.handle(
        client.conn,
        ClientRequest::JoinRoom {
            room_key: key(code),
        },
    );
}

fn select(
    engine: &mut GameEngine,
    client: &Client,
    code: &str,
    role: Role,
) {
    engine.handle(
        client.conn,
        ClientRequest::SelectRole {
            room_key: key(code),
            role,
        },
    );
}

/// Joins a client and claims the host seat, draining all setup events.
fn become_host(
    engine: &mut GameEngine,
    client: &mut Client,
    code: &str,
) {
    join(engine, client, code);
    select(engine, client, code, Role::Host);
    client.drain();
}

/// Joins a client as a player and returns the assigned display name.
fn become_player(
    engine: &mut GameEngine,
    client: &mut Client,
    code: &str,
) -> String {
    join(engine, client, code);
    select(engine, client, code, Role::Player);
    let mut name = None;
    while let Ok(event) = client.rx.try_recv() {
        if let ServerEvent::GameStateSync { my_name, .. } = event {
            name = Some(my_name);
        }
    }
    name.expect("player should receive a state sync")
}

fn chat(text: &str) -> ChatMessage {
    ChatMessage {
        text: text.into(),
        sender: String::new(),
        role: Role::Player,
    }
}

// =========================================================================
// Host election
// =========================================================================

#[test]
fn test_first_host_claim_wins() {
    let mut engine = GameEngine::new();
    let mut host = attach(&mut engine, 1);

    join(&mut engine, &host, "ABC123");
    assert_eq!(host.next(), ServerEvent::JoinSuccess { has_host: false });

    select(&mut engine, &host, "ABC123", Role::Host);
    assert_eq!(
        host.next(),
        ServerEvent::RoleConfirmed { role: Role::Host }
    );
    match host.next() {
        ServerEvent::GameStateSync {
            question, my_name, ..
        } => {
            assert_eq!(question, NO_QUESTION);
            assert_eq!(my_name, HOST_NAME);
        }
        other => panic!("expected GameStateSync, got {other:?}"),
    }
    assert_eq!(host.next(), ServerEvent::HostUpdate { connected: true });
    match host.next() {
        ServerEvent::NewMessage { message } => {
            assert_eq!(message.sender, SYSTEM_NAME);
            assert_eq!(message.role, Role::System);
            assert_eq!(message.text, "Host joined the room");
        }
        other => panic!("expected NewMessage, got {other:?}"),
    }
    host.assert_idle();
}

#[test]
fn test_second_host_claim_rejected_without_state_change() {
    let mut engine = GameEngine::new();
    let mut host = attach(&mut engine, 1);
    let mut rival = attach(&mut engine, 2);

    become_host(&mut engine, &mut host, "ABC123");

    join(&mut engine, &rival, "ABC123");
    assert_eq!(
        rival.next(),
        ServerEvent::JoinSuccess { has_host: true }
    );
    select(&mut engine, &rival, "ABC123", Role::Host);

    assert_eq!(
        rival.next(),
        ServerEvent::RoleRejected { role: Role::Host }
    );
    rival.assert_idle();
    // The sitting host heard nothing — no broadcast, no state change.
    host.assert_idle();
}

#[test]
fn test_system_role_request_is_silently_dropped() {
    let mut engine = GameEngine::new();
    let mut sneak = attach(&mut engine, 1);

    join(&mut engine, &sneak, "ABC123");
    sneak.drain();
    select(&mut engine, &sneak, "ABC123", Role::System);

    sneak.assert_idle();
}

// =========================================================================
// Clue lifecycle
// =========================================================================

#[test]
fn test_clue_lifecycle_ids_never_reused() {
    let mut engine = GameEngine::new();
    let mut host = attach(&mut engine, 1);
    become_host(&mut engine, &mut host, "ABC123");

    // add "knife" → clue-1, not highlighted
    engine.handle(
        host.conn,
        ClientRequest::AddClue {
            room_key: key("ABC123"),
            clue_text: "knife".into(),
        },
    );
    match host.next() {
        ServerEvent::CluesUpdated { clues } => {
            assert_eq!(clues.len(), 1);
            assert_eq!(clues[0].id, "clue-1");
            assert_eq!(clues[0].text, "knife");
            assert!(!clues[0].highlighted);
        }
        other => panic!("expected CluesUpdated, got {other:?}"),
    }

    // toggle clue-1 → highlighted in the full-list payload
    engine.handle(
        host.conn,
        ClientRequest::ToggleHighlightClue {
            room_key: key("ABC123"),
            clue_id: "clue-1".into(),
        },
    );
    match host.next() {
        ServerEvent::CluesUpdated { clues } => {
            assert!(clues[0].highlighted);
        }
        other => panic!("expected CluesUpdated, got {other:?}"),
    }

    // delete clue-1 → empty list
    engine.handle(
        host.conn,
        ClientRequest::DeleteClue {
            room_key: key("ABC123"),
            clue_id: "clue-1".into(),
        },
    );
    match host.next() {
        ServerEvent::CluesUpdated { clues } => {
            assert!(clues.is_empty());
        }
        other => panic!("expected CluesUpdated, got {other:?}"),
    }

    // add "rope" → clue-2, never clue-1 again
    engine.handle(
        host.conn,
        ClientRequest::AddClue {
            room_key: key("ABC123"),
            clue_text: "rope".into(),
        },
    );
    match host.next() {
        ServerEvent::CluesUpdated { clues } => {
            assert_eq!(clues.len(), 1);
            assert_eq!(clues[0].id, "clue-2");
        }
        other => panic!("expected CluesUpdated, got {other:?}"),
    }
}

#[test]
fn test_clue_operation_on_missing_clue_is_silent() {
    let mut engine = GameEngine::new();
    let mut host = attach(&mut engine, 1);
    become_host(&mut engine, &mut host, "ABC123");

    engine.handle(
        host.conn,
        ClientRequest::DeleteClue {
            room_key: key("ABC123"),
            clue_id: "clue-7".into(),
        },
    );

    host.assert_idle();
}

// =========================================================================
// Chat
// =========================================================================

#[test]
fn test_chat_sender_and_role_are_server_assigned() {
    let mut engine = GameEngine::new();
    let mut host = attach(&mut engine, 1);
    let mut player = attach(&mut engine, 2);

    become_host(&mut engine, &mut host, "ABC123");
    let name = become_player(&mut engine, &mut player, "ABC123");
    host.drain();

    // The client claims to be the host; the server must not believe it.
    engine.handle(
        player.conn,
        ClientRequest::SendMessage {
            room_key: key("ABC123"),
            message_data: ChatMessage {
                text: "I am the host".into(),
                sender: "Host".into(),
                role: Role::Host,
            },
        },
    );

    for client in [&mut host, &mut player] {
        match client.next() {
            ServerEvent::NewMessage { message } => {
                assert_eq!(message.text, "I am the host");
                assert_eq!(message.sender, name);
                assert_eq!(message.role, Role::Player);
            }
            other => panic!("expected NewMessage, got {other:?}"),
        }
    }
}

#[test]
fn test_chat_from_unseated_connection_is_silent() {
    let mut engine = GameEngine::new();
    let mut host = attach(&mut engine, 1);
    let mut lurker = attach(&mut engine, 2);

    become_host(&mut engine, &mut host, "ABC123");
    // The lurker joined the topic but never selected a role.
    join(&mut engine, &lurker, "ABC123");
    lurker.drain();

    engine.handle(
        lurker.conn,
        ClientRequest::SendMessage {
            room_key: key("ABC123"),
            message_data: chat("psst"),
        },
    );

    host.assert_idle();
    lurker.assert_idle();
}

// =========================================================================
// Replay on join
// =========================================================================

#[test]
fn test_late_joiner_receives_full_history_once() {
    let mut engine = GameEngine::new();
    let mut host = attach(&mut engine, 1);
    become_host(&mut engine, &mut host, "ABC123");

    engine.handle(
        host.conn,
        ClientRequest::UpdateQuestion {
            room_key: key("ABC123"),
            question_text: "Why was the window open?".into(),
        },
    );
    engine.handle(
        host.conn,
        ClientRequest::AddClue {
            room_key: key("ABC123"),
            clue_text: "knife".into(),
        },
    );
    engine.handle(
        host.conn,
        ClientRequest::SendMessage {
            room_key: key("ABC123"),
            message_data: chat("anyone there?"),
        },
    );
    host.drain();

    let mut late = attach(&mut engine, 2);
    join(&mut engine, &late, "ABC123");
    assert_eq!(late.next(), ServerEvent::JoinSuccess { has_host: true });

    select(&mut engine, &late, "ABC123", Role::Player);
    assert_eq!(
        late.next(),
        ServerEvent::RoleConfirmed { role: Role::Player }
    );
    let my_name = match late.next() {
        ServerEvent::GameStateSync {
            question,
            clues,
            chat_history,
            my_name,
        } => {
            assert_eq!(question, "Why was the window open?");
            assert_eq!(clues.len(), 1);
            assert_eq!(clues[0].id, "clue-1");
            // History: host's system join notice + host's chat line. The
            // late joiner's own join notice is NOT in the replay.
            assert_eq!(chat_history.len(), 2);
            assert_eq!(chat_history[0].role, Role::System);
            assert_eq!(chat_history[1].text, "anyone there?");
            my_name
        }
        other => panic!("expected GameStateSync, got {other:?}"),
    };

    // The join announcement arrives as a broadcast, after the sync.
    match late.next() {
        ServerEvent::NewMessage { message } => {
            assert_eq!(message.text, format!("{my_name} joined the room"));
        }
        other => panic!("expected NewMessage, got {other:?}"),
    }
    late.assert_idle();
}

// =========================================================================
// Authorization: silent no-ops
// =========================================================================

#[test]
fn test_non_host_mutations_are_silent_no_ops() {
    let mut engine = GameEngine::new();
    let mut host = attach(&mut engine, 1);
    let mut player = attach(&mut engine, 2);

    become_host(&mut engine, &mut host, "ABC123");
    become_player(&mut engine, &mut player, "ABC123");
    host.drain();

    let room_key = key("ABC123");
    let attempts = vec![
        ClientRequest::UpdateQuestion {
            room_key: room_key.clone(),
            question_text: "hijacked".into(),
        },
        ClientRequest::AddClue {
            room_key: room_key.clone(),
            clue_text: "fake".into(),
        },
        ClientRequest::DeleteClue {
            room_key: room_key.clone(),
            clue_id: "clue-1".into(),
        },
        ClientRequest::ToggleHighlightClue {
            room_key: room_key.clone(),
            clue_id: "clue-1".into(),
        },
        ClientRequest::AnnounceResult {
            room_key: room_key.clone(),
            result: serde_json::json!("wrong"),
        },
        ClientRequest::ResetGame {
            room_key: room_key.clone(),
        },
    ];
    for request in attempts {
        engine.handle(player.conn, request);
    }

    host.assert_idle();
    player.assert_idle();
    assert_eq!(engine.room_count(), 1, "room must survive");

    // A fresh joiner still sees untouched state.
    let mut witness = attach(&mut engine, 3);
    join(&mut engine, &witness, "ABC123");
    witness.drain();
    select(&mut engine, &witness, "ABC123", Role::Player);
    witness.next(); // RoleConfirmed
    match witness.next() {
        ServerEvent::GameStateSync { question, clues, .. } => {
            assert_eq!(question, NO_QUESTION);
            assert!(clues.is_empty());
        }
        other => panic!("expected GameStateSync, got {other:?}"),
    }
}

#[test]
fn test_result_announcement_reaches_the_room() {
    let mut engine = GameEngine::new();
    let mut host = attach(&mut engine, 1);
    let mut player = attach(&mut engine, 2);

    become_host(&mut engine, &mut host, "ABC123");
    become_player(&mut engine, &mut player, "ABC123");
    host.drain();

    let result = serde_json::json!({ "answer": "the gardener" });
    engine.handle(
        host.conn,
        ClientRequest::AnnounceResult {
            room_key: key("ABC123"),
            result: result.clone(),
        },
    );

    assert_eq!(
        player.next(),
        ServerEvent::ResultAnnounced { result }
    );
}

// =========================================================================
// Teardown
// =========================================================================

#[test]
fn test_host_reset_destroys_the_room() {
    let mut engine = GameEngine::new();
    let mut host = attach(&mut engine, 1);
    let mut player = attach(&mut engine, 2);

    become_host(&mut engine, &mut host, "ABC123");
    become_player(&mut engine, &mut player, "ABC123");
    host.drain();
    player.drain();

    engine.handle(
        host.conn,
        ClientRequest::ResetGame {
            room_key: key("ABC123"),
        },
    );

    assert_eq!(player.next(), ServerEvent::GameReset);
    assert_eq!(host.next(), ServerEvent::GameReset);
    assert_eq!(engine.room_count(), 0);
}

#[test]
fn test_host_disconnect_tears_down_room() {
    let mut engine = GameEngine::new();
    let mut host = attach(&mut engine, 1);
    let mut p1 = attach(&mut engine, 2);
    let mut p2 = attach(&mut engine, 3);

    become_host(&mut engine, &mut host, "ABC123");
    become_player(&mut engine, &mut p1, "ABC123");
    become_player(&mut engine, &mut p2, "ABC123");
    p1.drain();
    p2.drain();

    engine.disconnect(host.conn);

    for player in [&mut p1, &mut p2] {
        match player.next() {
            ServerEvent::NewMessage { message } => {
                assert_eq!(message.role, Role::System);
                assert_eq!(message.text, "Host left the room");
            }
            other => panic!("expected leave notice, got {other:?}"),
        }
        assert_eq!(player.next(), ServerEvent::GameReset);
        player.assert_idle();
    }
    assert_eq!(engine.room_count(), 0);

    // The key reverts to Empty on the next reference: fresh room,
    // sentinel question, no clues, no history.
    join(&mut engine, &p1, "ABC123");
    assert_eq!(p1.next(), ServerEvent::JoinSuccess { has_host: false });
    select(&mut engine, &p1, "ABC123", Role::Player);
    p1.next(); // RoleConfirmed
    match p1.next() {
        ServerEvent::GameStateSync {
            question,
            clues,
            chat_history,
            ..
        } => {
            assert_eq!(question, NO_QUESTION);
            assert!(clues.is_empty());
            assert!(chat_history.is_empty());
        }
        other => panic!("expected GameStateSync, got {other:?}"),
    }
}

#[test]
fn test_player_disconnect_announces_leave_and_keeps_room() {
    let mut engine = GameEngine::new();
    let mut host = attach(&mut engine, 1);
    let mut player = attach(&mut engine, 2);

    become_host(&mut engine, &mut host, "ABC123");
    let name = become_player(&mut engine, &mut player, "ABC123");
    host.drain();

    engine.disconnect(player.conn);

    match host.next() {
        ServerEvent::NewMessage { message } => {
            assert_eq!(message.role, Role::System);
            assert_eq!(message.text, format!("{name} left the room"));
        }
        other => panic!("expected leave notice, got {other:?}"),
    }
    host.assert_idle();
    assert_eq!(engine.room_count(), 1);
}

#[test]
fn test_joining_a_second_room_departs_the_first() {
    let mut engine = GameEngine::new();
    let mut host = attach(&mut engine, 1);
    let mut wanderer = attach(&mut engine, 2);

    become_host(&mut engine, &mut host, "AAA");
    let name = become_player(&mut engine, &mut wanderer, "AAA");
    host.drain();

    join(&mut engine, &wanderer, "BBB");

    // The first room hears the departure...
    match host.next() {
        ServerEvent::NewMessage { message } => {
            assert_eq!(message.text, format!("{name} left the room"));
        }
        other => panic!("expected leave notice, got {other:?}"),
    }
    // ...and the wanderer no longer hears the first room's broadcasts.
    engine.handle(
        host.conn,
        ClientRequest::AddClue {
            room_key: key("AAA"),
            clue_text: "knife".into(),
        },
    );
    assert_eq!(
        wanderer.next(),
        ServerEvent::JoinSuccess { has_host: false }
    );
    wanderer.assert_idle();
}

#[test]
fn test_disconnect_of_unjoined_connection_is_harmless() {
    let mut engine = GameEngine::new();
    let client = attach(&mut engine, 1);
    engine.disconnect(client.conn);
    assert_eq!(engine.room_count(), 0);
}
