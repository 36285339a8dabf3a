//! Response lines.
//!
//! Every response is one line: a keyword, a space, and a JSON payload.

use serde::Serialize;

use super::parser::ProtocolError;
use crate::board::{Event, Move, Topology};
use crate::error::Rejection;
use crate::outcome::Outcome;
use crate::session::Snapshot;

#[derive(Serialize)]
struct OfferedMove<'a> {
    index: usize,
    notation: String,
    #[serde(rename = "move")]
    mv: &'a Move,
}

#[derive(Serialize)]
struct DescribedEvent<'a> {
    text: String,
    #[serde(flatten)]
    event: &'a Event,
}

#[derive(Serialize)]
struct RejectedPayload {
    reason: String,
}

#[derive(Serialize)]
struct OutcomePayload<'a> {
    #[serde(flatten)]
    outcome: &'a Outcome,
    text: String,
}

fn keyed<T: Serialize + ?Sized>(keyword: &str, payload: &T) -> Result<String, ProtocolError> {
    Ok(format!("{keyword} {}", serde_json::to_string(payload)?))
}

/// `moves [{"index":0,"notation":"run 5,4 -> 5,1","move":{...}}, ...]`
pub fn format_moves(topology: &Topology, moves: &[Move]) -> Result<String, ProtocolError> {
    let offered: Vec<OfferedMove> = moves
        .iter()
        .enumerate()
        .map(|(index, mv)| OfferedMove {
            index,
            notation: mv.describe(topology),
            mv,
        })
        .collect();
    keyed("moves", &offered)
}

/// `events [{"text":"...","event":"moved",...}, ...]`
pub fn format_events(events: &[Event]) -> Result<String, ProtocolError> {
    let described: Vec<DescribedEvent> = events
        .iter()
        .map(|event| DescribedEvent {
            text: event.to_string(),
            event,
        })
        .collect();
    keyed("events", &described)
}

pub fn format_board(snapshot: &Snapshot) -> Result<String, ProtocolError> {
    keyed("board", snapshot)
}

/// `outcome null` while the game is running.
pub fn format_outcome(outcome: Option<&Outcome>) -> Result<String, ProtocolError> {
    let payload = outcome.map(|outcome| OutcomePayload {
        outcome,
        text: outcome.to_string(),
    });
    keyed("outcome", &payload)
}

pub fn format_rejection(rejection: &Rejection) -> Result<String, ProtocolError> {
    keyed(
        "rejected",
        &RejectedPayload {
            reason: rejection.to_string(),
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{CellId, Player};
    use crate::games::GameKind;
    use crate::outcome::Reason;
    use crate::session::Session;

    #[test]
    fn moves_carry_index_and_notation() {
        let topology = crate::games::statue::topology();
        let to = topology.find("0,0").unwrap();
        let line = format_moves(topology, &[Move::Place { to }]).unwrap();
        let json: serde_json::Value = serde_json::from_str(line.strip_prefix("moves ").unwrap()).unwrap();
        assert_eq!(json[0]["index"], 0);
        assert_eq!(json[0]["notation"], "place 0,0");
        assert_eq!(json[0]["move"]["kind"], "place");
        assert_eq!(json[0]["move"]["to"], to.0);
    }

    #[test]
    fn events_are_tagged_and_described() {
        let line = format_events(&[Event::TurnEnded { next: Player::Black }]).unwrap();
        assert!(line.starts_with("events "));
        let json: serde_json::Value = serde_json::from_str(&line["events ".len()..]).unwrap();
        assert_eq!(json[0]["event"], "turn_ended");
        assert_eq!(json[0]["next"], "black");
        assert!(json[0]["text"].as_str().is_some());
    }

    #[test]
    fn outcome_null_until_decided() {
        assert_eq!(format_outcome(None).unwrap(), "outcome null");
        let outcome = Outcome::win(Player::White, Reason::ReachedArtemis);
        let line = format_outcome(Some(&outcome)).unwrap();
        assert!(line.contains("\"text\":\"White wins, reached Artemis\""));
    }

    #[test]
    fn rejection_and_board_lines() {
        let line = format_rejection(&Rejection::UnknownCell(CellId(999))).unwrap();
        assert_eq!(line, r#"rejected {"reason":"cell #999 is not on this board"}"#);
        let board = format_board(&Session::new(GameKind::Gardens).snapshot()).unwrap();
        assert!(board.starts_with("board {\"game\":\"gardens\""));
    }
}
