// SPDX-License-Identifier: MIT OR Apache-2.0

use chrono::Utc;
use kgsgo_core::{
    Color, Coord, CoreError, GameRules, GameTree, Location, Mark, NodeId, PendingMove, Prop,
    SgfEvent, TimeSystem,
};

fn child(parent: u32, child: u32) -> SgfEvent {
    SgfEvent::ChildAdded {
        node_id: NodeId(parent),
        child_node_id: NodeId(child),
        position: None,
    }
}

fn add(node: u32, prop: Prop) -> SgfEvent {
    SgfEvent::PropAdded {
        node_id: NodeId(node),
        prop,
    }
}

fn activate(node: u32) -> SgfEvent {
    SgfEvent::Activated {
        node_id: NodeId(node),
        prev_node_id: None,
    }
}

fn mv(color: Color, x: u8, y: u8) -> Prop {
    Prop::Move {
        color,
        loc: Location::point(x, y),
    }
}

fn nine_by_nine() -> Prop {
    Prop::Rules(GameRules {
        size: 9,
        ..GameRules::default()
    })
}

/// Root with 9x9 rules and a main line of black (2,2), white (2,3)
fn two_move_tree() -> GameTree {
    let events = [
        add(0, nine_by_nine()),
        child(0, 1),
        add(1, mv(Color::Black, 2, 2)),
        activate(1),
        child(1, 2),
        add(2, mv(Color::White, 2, 3)),
        activate(2),
    ];
    GameTree::from_events(&events, Utc::now()).unwrap()
}

#[test]
fn new_tree_holds_only_root() {
    let tree = GameTree::new();
    assert_eq!(tree.len(), 1);
    assert_eq!(tree.root(), GameTree::ROOT);
    assert_eq!(tree.active(), GameTree::ROOT);
    assert_eq!(tree.current(), GameTree::ROOT);
    assert_eq!(tree.current_line(), &[GameTree::ROOT]);
}

#[test]
fn viewer_follows_live_play() {
    let tree = two_move_tree();
    assert_eq!(tree.active(), NodeId(2));
    assert_eq!(tree.current(), NodeId(2));
    assert!(tree.is_following_active());
    assert_eq!(tree.current_line(), &[NodeId(0), NodeId(1), NodeId(2)]);

    let state = tree.state(NodeId(2)).unwrap();
    assert_eq!(state.board.size(), 9);
    assert_eq!(state.board.get(Coord::new(2, 2)), Some(Color::Black));
    assert_eq!(state.board.get(Coord::new(2, 3)), Some(Color::White));
    assert!(state
        .markup
        .at(Coord::new(2, 3))
        .any(|m| *m == Mark::LastMove { color: Color::White }));
}

#[test]
fn viewer_stays_put_when_browsing() {
    let mut tree = two_move_tree();
    tree.set_current(NodeId(1)).unwrap();

    let now = Utc::now();
    tree.apply_events(&[child(2, 3), add(3, mv(Color::Black, 5, 5)), activate(3)], now)
        .unwrap();

    assert_eq!(tree.active(), NodeId(3));
    assert_eq!(tree.current(), NodeId(1));
    assert!(!tree.is_following_active());

    tree.follow_active().unwrap();
    assert_eq!(tree.current(), NodeId(3));
    assert!(tree.state(NodeId(3)).is_some());
}

#[test]
fn stepping_along_the_line() {
    let mut tree = two_move_tree();
    assert!(tree.prev().unwrap());
    assert_eq!(tree.current(), NodeId(1));
    assert!(tree.prev().unwrap());
    assert!(!tree.prev().unwrap());
    assert_eq!(tree.current(), NodeId(0));
    assert!(tree.next().unwrap());
    assert!(tree.next().unwrap());
    assert!(!tree.next().unwrap());
    assert_eq!(tree.current(), NodeId(2));
}

#[test]
fn growing_comment_adds_only_new_chat() {
    let now = Utc::now();
    let mut tree = two_move_tree();
    tree.apply_event(
        &add(
            2,
            Prop::Comment {
                text: "alice [3k]: hi\n".into(),
            },
        ),
        now,
    )
    .unwrap();
    assert_eq!(tree.messages(NodeId(2)).len(), 1);

    let changed = SgfEvent::PropChanged {
        node_id: NodeId(2),
        prop: Prop::Comment {
            text: "alice [3k]: hi\nbob [2d]: good luck\n".into(),
        },
    };
    tree.apply_event(&changed, now).unwrap();

    let lines = tree.messages(NodeId(2));
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[1].sender.as_deref(), Some("bob"));
    assert_eq!(lines[1].rank.as_deref(), Some("2d"));
    assert_eq!(lines[1].text, "good luck");

    // resending the same text adds nothing
    tree.apply_event(&changed, now).unwrap();
    assert_eq!(tree.messages(NodeId(2)).len(), 2);
}

#[test]
fn removing_a_move_updates_later_nodes() {
    let mut tree = two_move_tree();
    let removed = SgfEvent::PropRemoved {
        node_id: NodeId(1),
        prop: mv(Color::Black, 2, 2),
    };
    tree.apply_event(&removed, Utc::now()).unwrap();

    let state = tree.state(NodeId(2)).unwrap();
    assert_eq!(state.board.get(Coord::new(2, 2)), None);
    assert_eq!(state.board.get(Coord::new(2, 3)), Some(Color::White));
}

#[test]
fn changing_rules_rebuilds_the_board() {
    let mut tree = two_move_tree();
    let changed = SgfEvent::PropChanged {
        node_id: NodeId(0),
        prop: Prop::Rules(GameRules {
            size: 13,
            ..GameRules::default()
        }),
    };
    tree.apply_event(&changed, Utc::now()).unwrap();
    assert_eq!(tree.rules().map(|r| r.size), Some(13));
    assert_eq!(tree.state(NodeId(2)).unwrap().board.size(), 13);
}

#[test]
fn props_before_parent_link_use_the_game_rules() {
    let events = [
        add(
            0,
            Prop::Rules(GameRules {
                size: 25,
                ..GameRules::default()
            }),
        ),
        add(1, mv(Color::Black, 22, 22)),
        child(0, 1),
        activate(1),
    ];
    let tree = GameTree::from_events(&events, Utc::now()).unwrap();

    let state = tree.state(NodeId(1)).unwrap();
    assert_eq!(state.board.size(), 25);
    assert_eq!(state.board.get(Coord::new(22, 22)), Some(Color::Black));
}

#[test]
fn compute_is_idempotent() {
    let mut tree = two_move_tree();
    let first = tree.compute_states(NodeId(2)).unwrap().clone();
    let second = tree.compute_states(NodeId(2)).unwrap().clone();
    assert_eq!(first, second);
    assert_eq!(first.len(), 3);
}

#[test]
fn reorder_switches_the_viewed_line() {
    let now = Utc::now();
    let mut tree = GameTree::from_events(
        &[
            add(0, nine_by_nine()),
            child(0, 1),
            child(0, 2),
            add(1, mv(Color::Black, 0, 0)),
            add(2, mv(Color::Black, 8, 8)),
        ],
        now,
    )
    .unwrap();
    assert_eq!(tree.current_line(), &[NodeId(0), NodeId(1)]);

    let reorder = SgfEvent::ChildrenReordered {
        node_id: NodeId(0),
        children: vec![NodeId(2), NodeId(1)],
    };
    tree.apply_event(&reorder, now).unwrap();
    assert_eq!(tree.current_line(), &[NodeId(0), NodeId(2)]);
    assert_eq!(tree.node(NodeId(0)).unwrap().children, vec![NodeId(2), NodeId(1)]);
}

#[test]
fn child_position_is_honored() {
    let now = Utc::now();
    let mut tree = GameTree::from_events(&[child(0, 1), child(0, 2)], now).unwrap();
    tree.apply_event(
        &SgfEvent::ChildAdded {
            node_id: NodeId(0),
            child_node_id: NodeId(3),
            position: Some(0),
        },
        now,
    )
    .unwrap();
    assert_eq!(
        tree.node(NodeId(0)).unwrap().children,
        vec![NodeId(3), NodeId(1), NodeId(2)]
    );
}

#[test]
fn cyclic_links_are_refused() {
    let mut tree = two_move_tree();
    tree.apply_event(&child(2, 0), Utc::now()).unwrap();
    assert_eq!(tree.node(NodeId(0)).unwrap().parent, None);
    assert!(tree.node(NodeId(2)).unwrap().children.is_empty());
}

#[test]
fn missing_nodes_are_errors() {
    let mut tree = two_move_tree();
    assert_eq!(
        tree.set_current(NodeId(99)),
        Err(CoreError::MissingNode(NodeId(99)))
    );
    assert!(matches!(
        tree.compute_states(NodeId(42)),
        Err(CoreError::MissingNode(NodeId(42)))
    ));
    let pending = PendingMove {
        node_id: NodeId(7),
        color: Color::Black,
        loc: Location::Pass,
    };
    assert!(tree.set_pending(Some(pending)).is_err());
}

#[test]
fn clocks_follow_timeleft_props() {
    let rules = Prop::Rules(GameRules {
        size: 9,
        time_system: TimeSystem::Absolute,
        main_time: Some(300.0),
        ..GameRules::default()
    });
    let events = [
        add(0, rules),
        child(0, 1),
        SgfEvent::PropGroupAdded {
            node_id: NodeId(1),
            props: vec![
                mv(Color::Black, 4, 4),
                Prop::TimeLeft {
                    color: Color::Black,
                    seconds: 290.0,
                    periods: 0,
                },
            ],
        },
    ];
    let tree = GameTree::from_events(&events, Utc::now()).unwrap();

    let root = tree.state(NodeId(0)).unwrap();
    assert_eq!(root.time_left.get(Color::Black).map(|c| c.seconds), Some(300.0));

    let after = tree.state(NodeId(1)).unwrap();
    assert_eq!(after.time_left.get(Color::Black).map(|c| c.seconds), Some(290.0));
    assert_eq!(after.time_left.get(Color::White).map(|c| c.seconds), Some(300.0));
}

#[test]
fn captures_accumulate_down_the_line() {
    let events = [
        add(0, nine_by_nine()),
        child(0, 1),
        add(1, mv(Color::White, 1, 1)),
        child(1, 2),
        SgfEvent::PropGroupAdded {
            node_id: NodeId(2),
            props: vec![
                Prop::AddStone {
                    color: Some(Color::Black),
                    loc: Location::point(0, 1),
                },
                Prop::AddStone {
                    color: Some(Color::Black),
                    loc: Location::point(2, 1),
                },
                Prop::AddStone {
                    color: Some(Color::Black),
                    loc: Location::point(1, 0),
                },
            ],
        },
        child(2, 3),
        add(3, mv(Color::Black, 1, 2)),
        activate(3),
    ];
    let tree = GameTree::from_events(&events, Utc::now()).unwrap();
    assert_eq!(tree.state(NodeId(2)).unwrap().captures.black, 0);
    let last = tree.state(NodeId(3)).unwrap();
    assert_eq!(last.captures.black, 1);
    assert_eq!(last.board.get(Coord::new(1, 1)), None);
}

#[test]
fn pending_move_is_marked_then_cleared() {
    let mut tree = two_move_tree();
    let pending = PendingMove {
        node_id: NodeId(2),
        color: Color::Black,
        loc: Location::point(6, 6),
    };
    tree.set_pending(Some(pending)).unwrap();
    assert_eq!(tree.pending(), Some(&pending));
    let marked = |tree: &GameTree| {
        tree.state(NodeId(2))
            .unwrap()
            .markup
            .at(Coord::new(6, 6))
            .any(|m| *m == Mark::Pending { color: Color::Black })
    };
    assert!(marked(&tree));

    tree.set_pending(None).unwrap();
    assert!(!marked(&tree));
}

#[test]
fn decodes_server_events() {
    let json = r#"[
        {"type":"PROP_GROUP_ADDED","nodeId":0,"props":[
            {"name":"RULES","size":9,"rules":"japanese","komi":6.5},
            {"name":"PLAYERNAME","color":"white","text":"alice"}]},
        {"type":"CHILD_ADDED","nodeId":0,"childNodeId":1},
        {"type":"PROP_ADDED","nodeId":1,"prop":{"name":"MOVE","color":"black","loc":{"x":4,"y":4}}},
        {"type":"ACTIVATED","nodeId":1,"prevNodeId":0},
        {"type":"PROP_ADDED","nodeId":1,"prop":{"name":"VISIBLE_TO","text":"x"}},
        {"type":"SOMETHING_NEW","nodeId":1}
    ]"#;
    let events: Vec<SgfEvent> = serde_json::from_str(json).unwrap();
    assert_eq!(events.last(), Some(&SgfEvent::Unsupported));

    let tree = GameTree::from_events(&events, Utc::now()).unwrap();
    assert_eq!(tree.active(), NodeId(1));
    assert_eq!(tree.rules().map(|r| r.komi), Some(6.5));
    assert_eq!(
        tree.node(NodeId(1)).unwrap().played_move(),
        Some((Color::Black, Location::point(4, 4)))
    );
}
