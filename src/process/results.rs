// src/process/results.rs
//
// Reshape the athlete results table into one row per actual result.
//
// The site interleaves two kinds of rows. A row with a Games value opens a
// context (edition, NOC, sport) and is followed by rows without a Games value,
// each being one event result under that context:
//
//   Games                 | Discipline (Sport) / Event | NOC / Team | Pos | Medal | As
//   1912 Summer Olympics  | Tennis (Tennis)            | FRA        |     |       | Jean Blanchy
//                         | Singles, Men (Olympic)     | FRA        | =17 |       |
//                         | Doubles, Men (Olympic)     | Blanchy/…  | 5   |       |
//
// Output rows carry the context forward-filled from the latest context row.

use serde::Serialize;

use super::raw_table::{RawRow, RawTable};
use crate::config::SingleEntryPolicy;
use crate::AthleteId;

pub const GAMES: &[&str] = &["Games"];
pub const DISCIPLINE_EVENT: &[&str] = &["Discipline (Sport) / Event", "Event", "Discipline"];
pub const NOC_TEAM: &[&str] = &["NOC / Team", "NOC", "Team"];
pub const POSITION: &[&str] = &["Pos", "Position"];
pub const MEDAL: &[&str] = &["Medal"];
pub const ROLE: &[&str] = &["As", "Role"];

/// A single competition result of one athlete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultRow {
    pub athlete_id: AthleteId,
    /// Carried from the latest context row.
    pub games: Option<String>,
    /// Carried: the NOC / Team cell of the latest context row.
    pub noc: Option<String>,
    /// Carried: the Discipline (Sport) / Event cell of the latest context row.
    pub discipline_event: Option<String>,
    /// Forward-filled over every row.
    pub role: Option<String>,
    /// The row's own Discipline (Sport) / Event cell.
    pub event: Option<String>,
    /// The row's own NOC / Team cell.
    pub team: Option<String>,
    pub position: Option<String>,
    pub medal: Option<String>,
}

/// Running state while scanning the table top to bottom.
#[derive(Debug, Default)]
struct Context {
    games: Option<String>,
    noc: Option<String>,
    discipline_event: Option<String>,
    role: Option<String>,
}

impl Context {
    fn absorb_context_row(&mut self, games: &str, row: &RawRow) {
        self.games = Some(games.to_string());
        if let Some(noc) = row.get_any(NOC_TEAM) {
            self.noc = Some(noc.to_string());
        }
        if let Some(d) = row.get_any(DISCIPLINE_EVENT) {
            self.discipline_event = Some(d.to_string());
        }
    }

    fn absorb_role(&mut self, row: &RawRow) {
        if let Some(role) = row.get_any(ROLE) {
            self.role = Some(role.to_string());
        }
    }

    fn emit(&self, athlete_id: AthleteId, row: &RawRow) -> ResultRow {
        let own = |cols: &[&str]| row.get_any(cols).map(str::to_string);
        ResultRow {
            athlete_id,
            games: self.games.clone(),
            noc: self.noc.clone(),
            discipline_event: self.discipline_event.clone(),
            role: self.role.clone(),
            event: own(DISCIPLINE_EVENT),
            team: own(NOC_TEAM),
            position: own(POSITION),
            medal: own(MEDAL),
        }
    }
}

fn carries_result(row: &RawRow) -> bool {
    row.get_any(POSITION).is_some() || row.get_any(MEDAL).is_some()
}

/// Reshape the results table of `athlete_id`.
///
/// Rows without a Games value are emitted with the carried context; rows with
/// one only update the context, unless they carry a position or medal and the
/// policy is [`SingleEntryPolicy::Retain`]. Missing columns read as null.
pub fn extract_results(
    table: &RawTable,
    athlete_id: AthleteId,
    policy: SingleEntryPolicy,
) -> Vec<ResultRow> {
    let mut ctx = Context::default();
    let mut out = Vec::new();

    for row in &table.rows {
        ctx.absorb_role(row);
        match row.get_any(GAMES) {
            Some(games) => {
                ctx.absorb_context_row(games, row);
                if policy == SingleEntryPolicy::Retain && carries_result(row) {
                    out.push(ctx.emit(athlete_id, row));
                }
            }
            None => out.push(ctx.emit(athlete_id, row)),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(v: &str) -> Option<String> {
        Some(v.to_string())
    }

    fn two_games_table() -> RawTable {
        RawTable::from_rows(&[
            &[("Games", "2000"), ("NOC", "USA"), ("Event", "100m"), ("As", "Competitor")],
            &[("Games", ""), ("Pos", "1"), ("Medal", "Gold")],
            &[("Games", "2004"), ("NOC", "USA"), ("Event", "200m")],
            &[("Games", ""), ("Pos", "5"), ("Medal", "")],
        ])
    }

    #[test]
    fn test_two_games_scenario() {
        let rows = extract_results(&two_games_table(), 7, SingleEntryPolicy::Retain);
        assert_eq!(
            rows,
            vec![
                ResultRow {
                    athlete_id: 7,
                    games: s("2000"),
                    noc: s("USA"),
                    discipline_event: s("100m"),
                    role: s("Competitor"),
                    event: None,
                    team: None,
                    position: s("1"),
                    medal: s("Gold"),
                },
                ResultRow {
                    athlete_id: 7,
                    games: s("2004"),
                    noc: s("USA"),
                    discipline_event: s("200m"),
                    role: s("Competitor"),
                    event: None,
                    team: None,
                    position: s("5"),
                    medal: None,
                },
            ]
        );
    }

    #[test]
    fn test_site_columns_keep_own_event_and_team() {
        let table = RawTable::from_rows(&[
            &[
                ("Games", "1912 Summer Olympics"),
                ("Discipline (Sport) / Event", "Tennis (Tennis)"),
                ("NOC / Team", "FRA"),
                ("As", "Jean Blanchy"),
                ("Unnamed: 6", ""),
            ],
            &[
                ("Games", ""),
                ("Discipline (Sport) / Event", "Singles, Men (Olympic)"),
                ("NOC / Team", "FRA"),
                ("Pos", "=17"),
            ],
            &[
                ("Games", ""),
                ("Discipline (Sport) / Event", "Doubles, Men (Olympic)"),
                ("NOC / Team", "Blanchy/Decugis"),
                ("Pos", "5"),
            ],
        ]);
        let rows = extract_results(&table, 11, SingleEntryPolicy::Retain);

        assert_eq!(rows.len(), 2);
        let doubles = &rows[1];
        assert_eq!(doubles.games, s("1912 Summer Olympics"));
        assert_eq!(doubles.discipline_event, s("Tennis (Tennis)"));
        assert_eq!(doubles.noc, s("FRA"));
        assert_eq!(doubles.event, s("Doubles, Men (Olympic)"));
        assert_eq!(doubles.team, s("Blanchy/Decugis"));
        assert_eq!(doubles.role, s("Jean Blanchy"));
        assert_eq!(doubles.position, s("5"));
        assert_eq!(doubles.medal, None);
    }

    #[test]
    fn test_context_never_looks_ahead() {
        let table = RawTable::from_rows(&[
            &[("Games", ""), ("Pos", "4")],
            &[("Games", "1996"), ("NOC", "CAN"), ("Event", "Rowing"), ("As", "Competitor")],
            &[("Games", ""), ("Pos", "2"), ("Medal", "Silver")],
        ]);
        let rows = extract_results(&table, 3, SingleEntryPolicy::Retain);

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].games, None);
        assert_eq!(rows[0].noc, None);
        assert_eq!(rows[0].discipline_event, None);
        assert_eq!(rows[0].role, None);
        assert_eq!(rows[1].games, s("1996"));
        assert_eq!(rows[1].role, s("Competitor"));
    }

    #[test]
    fn test_context_row_keeps_previous_values_it_does_not_supply() {
        let table = RawTable::from_rows(&[
            &[("Games", "1988"), ("NOC", "GDR"), ("Event", "Swimming")],
            &[("Games", ""), ("Pos", "1")],
            &[("Games", "1992"), ("Event", "Swimming")],
            &[("Games", ""), ("Pos", "3")],
        ]);
        let rows = extract_results(&table, 5, SingleEntryPolicy::Retain);
        assert_eq!(rows[1].games, s("1992"));
        assert_eq!(rows[1].noc, s("GDR"));
    }

    #[test]
    fn test_role_changes_on_detail_rows() {
        let table = RawTable::from_rows(&[
            &[("Games", "1924"), ("As", "Competitor")],
            &[("Games", ""), ("Pos", "1")],
            &[("Games", ""), ("Pos", "AC"), ("As", "Coach")],
            &[("Games", ""), ("Pos", "2")],
        ]);
        let roles: Vec<_> = extract_results(&table, 8, SingleEntryPolicy::Retain)
            .into_iter()
            .map(|r| r.role)
            .collect();
        assert_eq!(roles, vec![s("Competitor"), s("Coach"), s("Coach")]);
    }

    #[test]
    fn test_context_only_table_yields_nothing() {
        let table = RawTable::from_rows(&[
            &[("Games", "2008"), ("NOC", "CHN"), ("Event", "Diving")],
            &[("Games", "2012"), ("NOC", "CHN"), ("Event", "Diving")],
        ]);
        assert!(extract_results(&table, 2, SingleEntryPolicy::Retain).is_empty());
        assert!(extract_results(&RawTable::default(), 2, SingleEntryPolicy::Retain).is_empty());
    }

    #[test]
    fn test_single_entry_first_row_policy() {
        let table = RawTable::from_rows(&[
            &[("Games", "1896"), ("NOC", "GRE"), ("Event", "Marathon"), ("Pos", "1"), ("Medal", "Gold")],
            &[("Games", "1900"), ("NOC", "GRE"), ("Event", "Marathon")],
            &[("Games", ""), ("Pos", "DNF")],
        ]);

        let kept = extract_results(&table, 4, SingleEntryPolicy::Retain);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].games, s("1896"));
        assert_eq!(kept[0].discipline_event, s("Marathon"));
        assert_eq!(kept[0].event, s("Marathon"));
        assert_eq!(kept[0].medal, s("Gold"));
        assert_eq!(kept[1].games, s("1900"));
        assert_eq!(kept[1].position, s("DNF"));

        let dropped = extract_results(&table, 4, SingleEntryPolicy::Drop);
        assert_eq!(dropped.len(), 1);
        assert_eq!(dropped[0].games, s("1900"));
    }

    #[test]
    fn test_missing_columns_pass_through_as_null() {
        let table = RawTable::from_rows(&[&[("Games", "1960")], &[("Pos", "7")]]);
        let rows = extract_results(&table, 6, SingleEntryPolicy::Retain);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].games, s("1960"));
        assert_eq!(rows[0].noc, None);
        assert_eq!(rows[0].medal, None);
        assert_eq!(rows[0].position, s("7"));
    }

    #[test]
    fn test_extraction_is_idempotent() {
        let table = two_games_table();
        let first = extract_results(&table, 7, SingleEntryPolicy::Retain);
        let second = extract_results(&table, 7, SingleEntryPolicy::Retain);
        assert_eq!(first, second);
    }
}
