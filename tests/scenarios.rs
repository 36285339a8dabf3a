//! Whole-turn scenarios driven through the session API, one per game
//! family of rules: tilts, encirclement, staircases, light and leap chains.

use wonders::board::{CellId, Counts, Direction, Event, Garden, Move, Player};
use wonders::error::Rejection;
use wonders::games::colossus::Colossus;
use wonders::games::gardens::Gardens;
use wonders::games::mausoleum::Mausoleum;
use wonders::games::pharos::Pharos;
use wonders::games::pyramid::Pyramid;
use wonders::games::temple::Temple;
use wonders::games::Content;
use wonders::outcome::Reason;
use wonders::session::Session;
use wonders::turn::TurnPhase;

const W: Player = Player::White;
const B: Player = Player::Black;

fn cell(session: &Session, label: &str) -> CellId {
    session
        .topology()
        .find(label)
        .unwrap_or_else(|| panic!("no cell {label}"))
}

/// Selects `from` and returns the offered move landing on `to`.
fn offered(session: &mut Session, from: &str, to: &str) -> Move {
    let target = cell(session, to);
    let moves = session.select_label(from).unwrap();
    moves
        .into_iter()
        .find(|m| m.destination() == target)
        .unwrap_or_else(|| panic!("no move {from} -> {to}"))
}

fn content(session: &Session, label: &str) -> Content {
    let label = label.to_string();
    session
        .snapshot()
        .cells
        .into_iter()
        .find(|c| c.label == label)
        .map(|c| c.content)
        .unwrap()
}

#[test]
fn colossus_arrow_tilts_every_stone_up() {
    let game = Colossus::from_stones(
        &["1,5", "9,9", "9,8", "9,7"],
        &["5,3", "4,4", "7,4", "6,1"],
        W,
    )
    .unwrap();
    let mut session = Session::from(game);
    let mv = offered(&mut session, "1,5", "0,5");
    assert!(matches!(mv, Move::Run { .. }));

    let events = session.apply_move(&mv).unwrap();
    assert!(events.contains(&Event::Tilted {
        direction: Direction::Up,
        shifted: 7
    }));
    assert_eq!(content(&session, "0,5"), Content::Stone { owner: W });
    assert_eq!(content(&session, "0,4"), Content::Stone { owner: B });
    assert_eq!(content(&session, "9,9"), Content::Empty);
    assert_eq!(session.to_move(), B);
    assert_eq!(session.phase(), TurnPhase::SelectOrigin);
}

/// Plays the push `from` -> `victim` -> `beyond`, then selects the pushed
/// stone for the reply and returns what it is offered.
fn push_then_reply(session: &mut Session, from: &str, victim: &str, beyond: &str) -> Vec<Move> {
    let push = Move::Push {
        from: cell(session, from),
        to: cell(session, victim),
        pushed_to: cell(session, beyond),
    };
    let moves = session.select_label(from).unwrap();
    assert!(moves.contains(&push), "push {from} -> {victim} not offered");
    session.apply_move(&push).unwrap();
    session.select_label(beyond).unwrap()
}

fn pushes_onto(session: &Session, moves: &[Move], label: &str) -> bool {
    let target = cell(session, label);
    moves
        .iter()
        .any(|m| matches!(m, Move::Push { to, .. } if *to == target))
}

#[test]
fn colossus_pushed_stone_cannot_push_straight_back() {
    let game = Colossus::from_stones(
        &["5,3", "4,5", "9,9", "9,8"],
        &["5,4", "1,1", "1,2", "1,3"],
        W,
    )
    .unwrap();
    let mut session = Session::from(game);
    let replies = push_then_reply(&mut session, "5,3", "5,4", "5,5");
    assert_eq!(session.to_move(), B);
    assert!(!pushes_onto(&session, &replies, "5,4"));
    assert!(replies.contains(&Move::Push {
        from: cell(&session, "5,5"),
        to: cell(&session, "4,5"),
        pushed_to: cell(&session, "3,5"),
    }));
}

#[test]
fn pyramid_pushed_stone_cannot_push_straight_back() {
    let game = Pyramid::from_stones(
        &["0,6,4", "0,5,6", "0,0,0", "0,0,1"],
        &["0,6,5", "0,0,5", "0,0,6", "0,3,0"],
        W,
    )
    .unwrap();
    let mut session = Session::from(game);
    let replies = push_then_reply(&mut session, "0,6,4", "0,6,5", "0,6,6");
    assert_eq!(session.to_move(), B);
    assert!(!pushes_onto(&session, &replies, "0,6,5"));
    assert!(replies.contains(&Move::Push {
        from: cell(&session, "0,6,6"),
        to: cell(&session, "0,5,6"),
        pushed_to: cell(&session, "0,4,6"),
    }));
}

#[test]
fn mausoleum_encirclement_ends_in_attrition() {
    let game = Mausoleum::from_stones(
        &["4,2", "4,4", "3,2", "3,3", "5,2", "5,6"],
        &["4,3", "8,0", "8,1", "8,3"],
        W,
    )
    .unwrap();
    let mut session = Session::from(game);
    let mv = offered(&mut session, "5,6", "5,3");
    session.apply_move(&mv).unwrap();

    let outcome = *session.outcome().unwrap();
    assert_eq!(outcome.winner(), Some(W));
    assert_eq!(outcome.reason.to_string(), "fewer than four stones");
    assert_eq!(session.phase(), TurnPhase::GameOver);
    assert_eq!(session.snapshot().counts, Counts { white: 6, black: 3 });
    assert_eq!(session.select_label("4,2"), Err(Rejection::GameOver));
    assert!(session.selectable_cells().is_empty());
}

#[test]
fn gardens_majority_climbs_the_staircase() {
    let mut bl = vec![W; 4];
    bl.extend([B; 6]);
    let game = Gardens::from_stacks(
        &[("bl", bl.as_slice()), ("bottom:1,2", &[W]), ("br", &[B])],
        W,
    )
    .unwrap();
    let mut session = Session::from(game);
    let mv = offered(&mut session, "bottom:1,2", "bottom:1,3");
    let events = session.apply_move(&mv).unwrap();

    assert!(events.contains(&Event::Staircase {
        player: B,
        from: Garden::BottomLeft,
        to: Garden::TopLeft,
        count: 6
    }));
    assert_eq!(content(&session, "bl"), Content::Stack { discs: vec![W; 4] });
    assert_eq!(content(&session, "tl"), Content::Stack { discs: vec![B; 6] });
    assert_eq!(session.to_move(), B);
}

#[test]
fn pharos_chain_burns_own_light_then_the_beacon() {
    let mut game = Pharos::from_stones(&["4,1"], &["8,8"], W).unwrap();
    let beacon = wonders::games::pharos::topology().find("4,4").unwrap();
    game.light_beacon(beacon, W);
    let mut session = Session::from(game);

    let here = cell(&session, "4,1");
    let moves = session.select_label("4,1").unwrap();
    // Four neighbours, each reachable with the stone's own light or the
    // beacon's.
    assert_eq!(moves.len(), 8);
    let own = moves
        .iter()
        .copied()
        .find(|m| {
            matches!(m, Move::Walk { light: Some(s), .. } if *s == here)
                && m.destination() == cell(&session, "4,2")
        })
        .unwrap();
    session.apply_move(&own).unwrap();
    assert_eq!(session.phase(), TurnPhase::Chain);
    assert_eq!(session.selectable_cells(), vec![cell(&session, "4,2")]);

    let rest = session.legal_moves();
    assert!(!rest.is_empty());
    assert!(rest
        .iter()
        .all(|m| matches!(m, Move::Walk { light: Some(s), .. } if *s == beacon)));

    let step = rest
        .into_iter()
        .find(|m| m.destination() == cell(&session, "4,3"))
        .unwrap();
    let events = session.apply_move(&step).unwrap();
    assert_eq!(events.last(), Some(&Event::TurnEnded { next: B }));
    assert_eq!(session.snapshot().cells[beacon.index()].lit, Some(W));
}

#[test]
fn pharos_exhausted_stone_offers_nothing() {
    // The lone white stone spends its light, and nothing else can reach it.
    let game = Pharos::from_stones(&["4,1"], &["8,8"], W).unwrap();
    let mut session = Session::from(game);
    let mv = offered(&mut session, "4,1", "4,2");
    let events = session.apply_move(&mv).unwrap();
    assert_eq!(events.last(), Some(&Event::TurnEnded { next: B }));
    assert_eq!(session.to_move(), B);
}

#[test]
fn temple_leap_chain_captures_twice() {
    let game = Temple::from_stones(&["6,2", "8,0"], &["5,2", "3,2", "1,0", "3,0"], W).unwrap();
    let mut session = Session::from(game);
    let first = offered(&mut session, "6,2", "4,2");
    assert!(matches!(first, Move::Leap { capture: true, .. }));

    session.apply_move(&first).unwrap();
    assert_eq!(session.phase(), TurnPhase::Chain);
    assert_eq!(session.to_move(), W);
    assert_eq!(session.cancel_selection(), Err(Rejection::AlreadyCommitted));

    let second = session.legal_moves();
    assert_eq!(second.len(), 1);
    let events = session.apply_move(&second[0]).unwrap();
    assert!(events.contains(&Event::Captured {
        player: B,
        at: "3,2".to_string()
    }));
    assert_eq!(content(&session, "5,2"), Content::Empty);
    assert_eq!(content(&session, "3,2"), Content::Empty);
    assert_eq!(session.snapshot().counts, Counts { white: 2, black: 2 });
    assert_eq!(session.to_move(), B);
}

#[test]
fn temple_chain_can_be_stopped_early() {
    let game = Temple::from_stones(&["6,2", "8,0"], &["5,2", "3,2", "1,0"], W).unwrap();
    let mut session = Session::from(game);
    assert_eq!(session.end_turn(), Err(Rejection::NoChain));
    let first = offered(&mut session, "6,2", "4,2");
    session.apply_move(&first).unwrap();

    let events = session.end_turn().unwrap();
    assert_eq!(events, vec![Event::TurnEnded { next: B }]);
    assert_eq!(content(&session, "3,2"), Content::Stone { owner: B });
}

#[test]
fn reasons_read_like_the_rules() {
    assert_eq!(
        Reason::Attrition {
            minimum: 3,
            unit: "dice"
        }
        .to_string(),
        "fewer than three dice"
    );
}
