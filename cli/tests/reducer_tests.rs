// SPDX-License-Identifier: MIT OR Apache-2.0

mod common;

use common::*;
use kgsgo_cli::state::{ChatKind, LoginError, SessionNotice};
use kgsgo_cli::{reduce, reduce_batch, reduce_local, AppState, ClientError, LocalAction, Navigation};
use kgsgo_core::{Color, Coord, CoreError, Location, Mark, NodeId};
use kgsgo_network::{ServerMessage, User};
use std::sync::Arc;

fn apply(state: AppState, messages: Vec<ServerMessage>) -> AppState {
    reduce_batch(&state, &batch(messages, at(0))).unwrap()
}

fn room_join() -> ServerMessage {
    ServerMessage::RoomJoin {
        channel_id: 3,
        users: vec![User::named("alice"), User::named("bob")],
        games: vec![summary(40, "bob", "alice")],
    }
}

fn logged_in_with_game() -> AppState {
    apply(AppState::default(), vec![login_success("alice"), game_join(40)])
}

#[test]
fn room_join_twice_matches_once() {
    let once = apply(AppState::default(), vec![room_join()]);
    let twice = apply(once.clone(), vec![room_join()]);
    assert_eq!(once, twice);

    let room = twice.room(3).unwrap();
    assert_eq!(room.users.len(), 2);
    assert_eq!(room.games.len(), 1);
}

#[test]
fn user_presence_is_keyed_by_name() {
    let state = apply(AppState::default(), vec![room_join()]);
    let carol = User::named("carol");
    let state = apply(
        state,
        vec![
            ServerMessage::UserAdded {
                channel_id: 3,
                user: carol.clone(),
            },
            ServerMessage::UserAdded {
                channel_id: 3,
                user: carol.clone(),
            },
        ],
    );
    assert_eq!(state.room(3).unwrap().users.len(), 3);

    let ranked = User {
        rank: Some("2d".into()),
        ..carol.clone()
    };
    let state = apply(state, vec![ServerMessage::UserUpdate { user: ranked }]);
    assert_eq!(
        state.room(3).unwrap().users["carol"].rank.as_deref(),
        Some("2d")
    );

    let state = apply(
        state,
        vec![ServerMessage::UserRemoved {
            channel_id: 3,
            user: carol,
        }],
    );
    assert!(!state.room(3).unwrap().users.contains_key("carol"));
}

#[test]
fn chat_redelivery_is_dropped() {
    let line = ServerMessage::Chat {
        channel_id: 3,
        user: User::named("bob"),
        text: "hi".into(),
    };
    let state = reduce_batch(&AppState::default(), &batch(vec![line.clone()], at(1))).unwrap();
    let state = reduce_batch(&state, &batch(vec![line.clone()], at(1))).unwrap();
    assert_eq!(state.chat(3).len(), 1);

    // same words later are a new line
    let state = reduce_batch(&state, &batch(vec![line], at(2))).unwrap();
    let chat = state.chat(3);
    assert_eq!(chat.len(), 2);
    assert_eq!(chat[0].kind, ChatKind::Chat);
    assert!(chat[0].id < chat[1].id);
}

#[test]
fn repeated_lines_in_one_batch_are_kept() {
    let line = ServerMessage::Chat {
        channel_id: 3,
        user: User::named("bob"),
        text: "lol".into(),
    };
    let notice = ServerMessage::Announcement {
        text: "restart soon".into(),
    };
    let delivery = batch(
        vec![line.clone(), line, notice.clone(), notice],
        at(1),
    );
    let state = reduce_batch(&AppState::default(), &delivery).unwrap();
    assert_eq!(state.chat(3).len(), 2);
    assert_eq!(state.announcements.len(), 2);

    let again = reduce_batch(&state, &delivery).unwrap();
    assert_eq!(again.chat(3).len(), 2);
    assert_eq!(again.announcements.len(), 2);
}

#[test]
fn game_join_builds_the_record() {
    let state = logged_in_with_game();
    let game = state.game(40).unwrap();

    assert_eq!(game.tree.active(), NodeId(1));
    assert_eq!(game.tree.current(), NodeId(1));
    assert_eq!(game.color_of("alice"), Some(Color::White));
    let node = game.tree.state(NodeId(1)).unwrap();
    assert_eq!(node.board.get(Coord::new(2, 2)), Some(Color::Black));
}

#[test]
fn rejoin_keeps_record_id() {
    let state = logged_in_with_game();
    let id = state.game(40).unwrap().id;
    let state = apply(state, vec![game_join(40)]);
    assert_eq!(state.game(40).unwrap().id, id);

    let state = apply(state, vec![game_join(41)]);
    assert_ne!(state.game(41).unwrap().id, id);
}

#[test]
fn game_update_follows_live_play() {
    let state = logged_in_with_game();
    let state = apply(
        state,
        vec![ServerMessage::GameUpdate {
            channel_id: 40,
            sgf_events: vec![child(1, 2), add(2, mv(Color::White, 3, 2)), activate(2)],
        }],
    );
    let tree = &state.game(40).unwrap().tree;
    assert_eq!(tree.current(), NodeId(2));
    assert_eq!(
        tree.state(NodeId(2)).unwrap().board.get(Coord::new(3, 2)),
        Some(Color::White)
    );
}

#[test]
fn update_for_unjoined_game_is_ignored() {
    let state = logged_in_with_game();
    let after = apply(
        state.clone(),
        vec![ServerMessage::GameUpdate {
            channel_id: 99,
            sgf_events: vec![child(0, 1)],
        }],
    );
    assert_eq!(after, state);
}

#[test]
fn pending_move_lives_until_the_server_answers() {
    let state = logged_in_with_game();
    let state = reduce_local(
        state,
        &LocalAction::PendingMove {
            channel_id: 40,
            color: Color::White,
            loc: Location::point(5, 5),
        },
    )
    .unwrap();

    let tree = &state.game(40).unwrap().tree;
    let pending = tree.pending().unwrap();
    assert_eq!(pending.node_id, NodeId(1));
    let markup = &tree.state(NodeId(1)).unwrap().markup;
    assert!(markup
        .at(Coord::new(5, 5))
        .any(|m| *m == Mark::Pending { color: Color::White }));

    // a comment on the node does not settle it
    let state = apply(
        state,
        vec![ServerMessage::GameUpdate {
            channel_id: 40,
            sgf_events: vec![add(
                1,
                kgsgo_core::Prop::Comment {
                    text: "bob [3k]: hmm".into(),
                },
            )],
        }],
    );
    assert!(state.game(40).unwrap().tree.pending().is_some());

    let state = apply(
        state,
        vec![ServerMessage::GameUpdate {
            channel_id: 40,
            sgf_events: vec![child(1, 2), add(2, mv(Color::White, 5, 5)), activate(2)],
        }],
    );
    let tree = &state.game(40).unwrap().tree;
    assert!(tree.pending().is_none());
    assert!(tree
        .state(NodeId(1))
        .unwrap()
        .markup
        .at(Coord::new(5, 5))
        .next()
        .is_none());
}

#[test]
fn failed_send_clears_pending() {
    let state = reduce_local(
        logged_in_with_game(),
        &LocalAction::PendingMove {
            channel_id: 40,
            color: Color::White,
            loc: Location::Pass,
        },
    )
    .unwrap();
    let state = reduce_local(state, &LocalAction::ClearPending { channel_id: 40 }).unwrap();
    assert!(state.game(40).unwrap().tree.pending().is_none());
}

#[test]
fn navigation_moves_only_the_viewer() {
    let state = logged_in_with_game();
    let state = reduce_local(
        state,
        &LocalAction::Navigate {
            channel_id: 40,
            to: Navigation::Prev,
        },
    )
    .unwrap();
    let tree = &state.game(40).unwrap().tree;
    assert_eq!(tree.current(), NodeId(0));
    assert_eq!(tree.active(), NodeId(1));

    // unknown node ids are ignored
    let state = reduce_local(
        state,
        &LocalAction::Navigate {
            channel_id: 40,
            to: Navigation::Jump(NodeId(77)),
        },
    )
    .unwrap();
    assert_eq!(state.game(40).unwrap().tree.current(), NodeId(0));

    let state = reduce_local(
        state,
        &LocalAction::Navigate {
            channel_id: 40,
            to: Navigation::Live,
        },
    )
    .unwrap();
    assert!(state.game(40).unwrap().tree.is_following_active());
}

#[test]
fn game_state_and_undo() {
    let state = logged_in_with_game();
    let state = apply(
        state,
        vec![
            serde_json::from_value(serde_json::json!({
                "type": "GAME_STATE",
                "channelId": 40,
                "actions": [{"action": "MOVE", "user": {"name": "alice"}}],
                "clocks": {"white": {"time": 290.0, "running": true}},
                "over": false
            }))
            .unwrap(),
            ServerMessage::GameUndoRequest { channel_id: 40 },
        ],
    );
    let game = state.game(40).unwrap();
    assert_eq!(game.actions.len(), 1);
    assert_eq!(game.clocks.white.map(|c| c.time), Some(290.0));
    assert!(game.undo_requested);

    let state = reduce_local(state, &LocalAction::UndoAnswered { channel_id: 40 }).unwrap();
    assert!(!state.game(40).unwrap().undo_requested);
}

#[test]
fn login_failure_is_recorded_and_cleared() {
    let state = apply(
        AppState::default(),
        vec![ServerMessage::LoginFailedBadPassword],
    );
    assert_eq!(state.login_error, Some(LoginError::BadPassword));

    let state = apply(state, vec![login_success("alice")]);
    assert_eq!(state.login_error, None);
    assert_eq!(state.user, Some(User::named("alice")));
}

#[test]
fn logout_clears_channels_but_not_ids() {
    let state = apply(logged_in_with_game(), vec![room_join()]);
    let ids = state.ids;
    let state = apply(
        state,
        vec![
            ServerMessage::Logout { text: None },
            ServerMessage::SessionExpired,
        ],
    );
    assert!(state.rooms.is_empty());
    assert!(state.games.is_empty());
    assert_eq!(state.ids, ids);
    assert_eq!(state.notice, Some(SessionNotice::SessionExpired));
    assert!(state.user.is_some());
}

#[test]
fn unjoin_drops_game_and_chat() {
    let state = apply(
        logged_in_with_game(),
        vec![ServerMessage::Chat {
            channel_id: 40,
            user: User::named("bob"),
            text: "gl".into(),
        }],
    );
    let state = apply(state, vec![ServerMessage::Unjoin { channel_id: 40 }]);
    assert!(state.game(40).is_none());
    assert!(state.chat(40).is_empty());
}

#[test]
fn challenge_flow() {
    let proposal: kgsgo_network::messages::Proposal = serde_json::from_value(serde_json::json!({
        "gameType": "free",
        "rules": {"size": 9, "komi": 6.5},
        "players": [{"role": "white", "name": "alice"}, {"role": "black"}]
    }))
    .unwrap();
    let submit = ServerMessage::ChallengeSubmit {
        channel_id: 50,
        proposal: proposal.clone(),
    };
    let state = apply(
        AppState::default(),
        vec![
            ServerMessage::ChallengeJoin {
                channel_id: 50,
                game_summary: None,
                users: vec![User::named("alice")],
            },
            ServerMessage::ChallengeProposal {
                channel_id: 50,
                proposal,
            },
            submit.clone(),
            submit,
            ServerMessage::ChallengeFinal {
                channel_id: 50,
                game_channel_id: 51,
            },
        ],
    );
    let challenge = &state.challenges[&50];
    assert_eq!(challenge.submissions.len(), 1);
    assert_eq!(challenge.game_channel_id, Some(51));
    assert!(challenge.proposal.is_some());
}

#[test]
fn unknown_messages_change_nothing() {
    let state = logged_in_with_game();
    let after = reduce(state.clone(), &ServerMessage::Unknown, at(5)).unwrap();
    assert_eq!(after, state);
    let after = reduce(after, &ServerMessage::Hello, at(5)).unwrap();
    assert_eq!(after, state);
}

#[test]
fn published_snapshot_is_never_mutated() {
    let published = Arc::new(logged_in_with_game());
    let frozen = (*published).clone();
    let tree_before = Arc::clone(&published.game(40).unwrap().tree);

    let next = reduce_batch(
        &published,
        &batch(
            vec![ServerMessage::GameUpdate {
                channel_id: 40,
                sgf_events: vec![child(1, 2), add(2, mv(Color::White, 3, 3)), activate(2)],
            }],
            at(9),
        ),
    )
    .unwrap();

    assert_eq!(*published, frozen);
    assert_eq!(published.game(40).unwrap().tree.active(), NodeId(1));
    assert!(Arc::ptr_eq(&published.game(40).unwrap().tree, &tree_before));
    assert_eq!(next.game(40).unwrap().tree.active(), NodeId(2));
}

#[test]
fn broken_record_is_an_invariant_error() {
    let message = ServerMessage::GameJoin {
        channel_id: 40,
        game_summary: summary(40, "bob", "alice"),
        users: vec![],
        sgf_events: vec![add(0, rules(40))],
    };
    let result = reduce(AppState::default(), &message, at(0));
    assert_eq!(
        result,
        Err(ClientError::Invariant(CoreError::InvalidBoardSize(40)))
    );
}
