// src/schema/types.rs

use serde::{Deserialize, Serialize};

use crate::process::{BioRecord, ResultRow};
use crate::AthleteId;

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone, Copy, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    AthleteId,
    Text,
}

/// A single output column.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone, Eq, Hash)]
pub struct Column {
    pub name: String,
    pub ty: ColumnType,
}

impl Column {
    pub fn text(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: ColumnType::Text,
        }
    }

    pub fn athlete_id() -> Self {
        Self {
            name: super::ATHLETE_ID.to_string(),
            ty: ColumnType::AthleteId,
        }
    }
}

/// A record that can be laid out as one row of an output table.
pub trait TabularRecord {
    fn athlete_id(&self) -> AthleteId;
    /// Text of a named column; `None` both for null cells and unknown columns.
    fn text(&self, column: &str) -> Option<&str>;
}

impl TabularRecord for BioRecord {
    fn athlete_id(&self) -> AthleteId {
        self.athlete_id
    }

    fn text(&self, column: &str) -> Option<&str> {
        self.get(column)
    }
}

impl TabularRecord for ResultRow {
    fn athlete_id(&self) -> AthleteId {
        self.athlete_id
    }

    fn text(&self, column: &str) -> Option<&str> {
        let v = match column {
            "Games" => &self.games,
            "Event" => &self.event,
            "Team" => &self.team,
            "Pos" => &self.position,
            "Medal" => &self.medal,
            "As" => &self.role,
            "NOC" => &self.noc,
            "Discipline" => &self.discipline_event,
            _ => return None,
        };
        v.as_deref()
    }
}
