// src/process/mod.rs

pub mod bio;
pub mod html;
pub mod raw_table;
pub mod results;

pub use bio::{extract_bio, BioRecord};
pub use html::{parse_table, parse_table_in};
pub use raw_table::{RawRow, RawTable};
pub use results::{extract_results, ResultRow};

use scraper::Html;
use serde::Serialize;
use std::fmt;
use tracing::debug;

use crate::config::SingleEntryPolicy;
use crate::error::ExtractionError;
use crate::AthleteId;

/// The tables we read from an athlete page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableKind {
    Biography,
    Results,
}

impl TableKind {
    pub fn selector(&self) -> &'static str {
        match self {
            TableKind::Biography => "table.biodata",
            TableKind::Results => "table.table",
        }
    }
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableKind::Biography => f.write_str("biography"),
            TableKind::Results => f.write_str("results"),
        }
    }
}

/// Everything extracted from one athlete page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AthletePage {
    pub bio: BioRecord,
    pub results: Vec<ResultRow>,
}

/// Run both extractors over one fetched page.
///
/// Either both tables are extracted or the page fails as a whole, so an
/// athlete never contributes a biography without its results.
pub fn process_page(
    page: &str,
    athlete_id: AthleteId,
    policy: SingleEntryPolicy,
) -> Result<AthletePage, ExtractionError> {
    let doc = Html::parse_document(page);

    let bio_table = parse_table_in(&doc, TableKind::Biography)?;
    let bio = extract_bio(&bio_table, athlete_id)?;

    let results_table = parse_table_in(&doc, TableKind::Results)?;
    let results = extract_results(&results_table, athlete_id, policy);

    debug!(
        athlete_id,
        results = results.len(),
        raw_rows = results_table.rows.len(),
        "extracted page"
    );
    Ok(AthletePage { bio, results })
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_process_full_page() {
        let page = process_page(fixtures::ATHLETE_PAGE, 70, SingleEntryPolicy::Retain).unwrap();

        assert_eq!(page.bio.athlete_id, 70);
        assert_eq!(page.bio.get("Sex"), Some("Male"));
        assert_eq!(page.bio.get("NOC"), Some("United States"));
        assert_eq!(page.bio.get("Died"), None);

        assert_eq!(page.results.len(), 3);
        assert!(page.results.iter().all(|r| r.athlete_id == 70));
        let last = &page.results[2];
        assert_eq!(last.games.as_deref(), Some("1988 Summer Olympics"));
        assert_eq!(last.discipline_event.as_deref(), Some("Athletics (Athletics)"));
        assert_eq!(last.event.as_deref(), Some("200 metres, Men (Olympic)"));
        assert_eq!(last.medal.as_deref(), Some("Silver"));
        assert_eq!(last.role.as_deref(), Some("Carl Lewis"));
    }

    #[test]
    fn test_missing_results_table_fails_whole_page() {
        let err = process_page(fixtures::BIO_ONLY_PAGE, 1, SingleEntryPolicy::Retain).unwrap_err();
        assert!(matches!(err, ExtractionError::TableNotFound(TableKind::Results)));
    }

    #[test]
    fn test_missing_bio_table() {
        let err = process_page("<html><body></body></html>", 1, SingleEntryPolicy::Retain)
            .unwrap_err();
        assert!(matches!(err, ExtractionError::TableNotFound(TableKind::Biography)));
    }

    #[test]
    fn test_unlabeled_bio_row_keeps_athlete() {
        let page = fixtures::ATHLETE_PAGE.replace(
            "<tr><th>Sex</th><td>Male</td></tr>",
            "<tr><th></th><td>stray note</td></tr>\n  <tr><th>Sex</th><td>Male</td></tr>",
        );
        let page = process_page(&page, 71, SingleEntryPolicy::Retain).unwrap();
        assert_eq!(page.bio.get("Sex"), Some("Male"));
        assert_eq!(page.results.len(), 3);
    }

    #[test]
    fn test_table_kind_selectors() {
        assert_eq!(TableKind::Biography.selector(), "table.biodata");
        assert_eq!(TableKind::Results.to_string(), "results");
    }
}
