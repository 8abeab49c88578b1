//! CSV and JSON export of a session's recorded rounds.

use std::io;

use crate::model::history::RoundHistoryEntry;
use crate::model::matchup::FullRoundHistoryEntry;
use crate::model::player::Roster;
use serde::Serialize;

pub const FULL_HISTORY_FILE_NAME: &str = "magic_chess_history.csv";

/// Writes one `Round,Player 1,Player 2` row per matchup.
pub fn write_full_history_csv<W: io::Write>(
    writer: W,
    history: &[FullRoundHistoryEntry],
    roster: &Roster,
) -> csv::Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(["Round", "Player 1", "Player 2"])?;
    for entry in history {
        for matchup in &entry.matchups {
            csv.write_record([
                entry.round.to_string(),
                roster.label(matchup.player1),
                roster.label(matchup.player2),
            ])?;
        }
    }
    csv.flush()?;
    Ok(())
}

/// Writes one row per simple-mode round; key columns stay empty when no key matchup was taken.
pub fn write_simple_history_csv<W: io::Write>(
    writer: W,
    history: &[RoundHistoryEntry],
    roster: &Roster,
) -> csv::Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(["Round", "Opponent", "Key Player", "Key Opponent"])?;
    for entry in history {
        let (key_player, key_opponent) = entry
            .key_matchup
            .map(|key| (roster.label(key.key_player), roster.label(key.opponent)))
            .unwrap_or_default();
        csv.write_record([
            entry.round.to_string(),
            roster.label(entry.my_opponent),
            key_player,
            key_opponent,
        ])?;
    }
    csv.flush()?;
    Ok(())
}

#[derive(Debug, Serialize)]
struct HistoryDocument<'a, T> {
    players: &'a Roster,
    rounds: &'a [T],
}

/// Pretty JSON document holding the roster and the given rounds.
pub fn history_to_json<T: Serialize>(roster: &Roster, rounds: &[T]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&HistoryDocument {
        players: roster,
        rounds,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::matchup::Matchup;
    use crate::model::player::PlayerId;

    fn roster() -> Roster {
        Roster::with_opponents(["Ann", "Smith, Jo", "Cat"])
    }

    #[test]
    fn full_history_rows_follow_matchups() {
        let history = vec![FullRoundHistoryEntry::new(
            3,
            vec![
                Matchup::new(PlayerId(1), PlayerId(3)),
                Matchup::new(PlayerId(2), PlayerId(9)),
            ],
        )];
        let mut out = Vec::new();
        write_full_history_csv(&mut out, &history, &roster()).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec!["Round,Player 1,Player 2", "3,You,\"Smith, Jo\"", "3,Ann,ID: 9"]
        );
    }

    #[test]
    fn simple_history_leaves_key_columns_blank() {
        let history = vec![
            RoundHistoryEntry::new(1, PlayerId(2)),
            RoundHistoryEntry::new(2, PlayerId(4)).with_key_matchup(PlayerId(2), PlayerId(3)),
        ];
        let mut out = Vec::new();
        write_simple_history_csv(&mut out, &history, &roster()).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Round,Opponent,Key Player,Key Opponent");
        assert_eq!(lines[1], "1,Ann,,");
        assert_eq!(lines[2], "2,Cat,Ann,\"Smith, Jo\"");
    }

    #[test]
    fn json_document_lists_players_and_rounds() {
        let history = vec![RoundHistoryEntry::new(1, PlayerId(2))];
        let json = history_to_json(&roster(), &history).unwrap();
        assert!(json.contains("\"name\": \"Ann\""));
        assert!(json.contains("\"my_opponent\": 2"));
    }
}
