// src/process/html.rs
//
// Turn the athlete page's HTML tables into `RawTable`s.

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::sync::OnceLock;
use tracing::trace;

use super::raw_table::{RawRow, RawTable};
use super::TableKind;
use crate::error::ExtractionError;

fn whitespace() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("whitespace regex should compile"))
}

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static CSS selector should parse")
}

/// Visible text of a cell with whitespace collapsed.
fn cell_text(cell: ElementRef<'_>) -> String {
    let joined: String = cell.text().collect();
    whitespace().replace_all(joined.trim(), " ").into_owned()
}

/// `th`/`td` children of a row, each repeated `colspan` times.
fn row_cells(tr: ElementRef<'_>) -> Vec<String> {
    let mut out = Vec::new();
    for cell in tr.children().filter_map(ElementRef::wrap) {
        let name = cell.value().name();
        if name != "td" && name != "th" {
            continue;
        }
        let span = cell
            .value()
            .attr("colspan")
            .and_then(|v| v.trim().parse::<usize>().ok())
            .filter(|n| *n > 0)
            .unwrap_or(1);
        let text = cell_text(cell);
        out.extend(std::iter::repeat(text).take(span));
    }
    out
}

/// Locate the first table matching `kind` in an already parsed document.
pub fn parse_table_in(doc: &Html, kind: TableKind) -> Result<RawTable, ExtractionError> {
    let table = doc
        .select(&selector(kind.selector()))
        .next()
        .ok_or(ExtractionError::TableNotFound(kind))?;

    let header_cells = table
        .select(&selector("thead tr"))
        .next()
        .map(row_cells)
        .unwrap_or_default();

    let body: Vec<Vec<String>> = table
        .select(&selector("tbody > tr"))
        .map(row_cells)
        .filter(|cells| !cells.is_empty())
        .collect();

    let width = body
        .iter()
        .map(Vec::len)
        .chain(std::iter::once(header_cells.len()))
        .max()
        .unwrap_or(0);

    let headers: Vec<String> = if header_cells.is_empty() {
        (0..width).map(|i| i.to_string()).collect()
    } else {
        (0..width)
            .map(|i| match header_cells.get(i) {
                Some(h) if !h.is_empty() => h.clone(),
                _ => format!("Unnamed: {}", i),
            })
            .collect()
    };

    let rows: Vec<RawRow> = body
        .into_iter()
        .map(|cells| headers.iter().cloned().zip(cells).collect())
        .collect();

    trace!(table = %kind, columns = headers.len(), rows = rows.len(), "parsed table");
    Ok(RawTable::new(headers, rows))
}

/// Parse `html` and extract the table identified by `kind`.
pub fn parse_table(html: &str, kind: TableKind) -> Result<RawTable, ExtractionError> {
    let doc = Html::parse_document(html);
    parse_table_in(&doc, kind)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
<html><body>
<table class="biodata">
  <tr><th>Roles</th><td>Competed in Olympic Games</td></tr>
  <tr><th>Sex</th><td>Male</td></tr>
  <tr><th>Full name</th><td>Jean-François   Blanchy</td></tr>
</table>
<table class="table">
  <thead>
    <tr><th>Games</th><th>Discipline (Sport) / Event</th><th>NOC / Team</th><th>Pos</th><th>Medal</th><th>As</th><th></th></tr>
  </thead>
  <tbody>
    <tr><td><a href="/editions/5">1912 Summer Olympics</a></td><td>Tennis (Tennis)</td><td>FRA</td><td></td><td></td><td>Jean-François Blanchy</td><td></td></tr>
    <tr><td></td><td>Singles, Men (Olympic)</td><td>FRA</td><td>=17</td><td></td><td></td><td></td></tr>
    <tr><td colspan="2">spanned</td><td>X</td></tr>
  </tbody>
</table>
</body></html>"#;

    #[test]
    fn test_biodata_has_positional_columns() {
        let table = parse_table(PAGE, TableKind::Biography).unwrap();
        assert_eq!(table.headers, vec!["0", "1"]);
        assert_eq!(table.rows.len(), 3);
        assert_eq!(table.rows[0].get("0"), Some("Roles"));
        assert_eq!(table.rows[2].get("1"), Some("Jean-François Blanchy"));
    }

    #[test]
    fn test_results_headers_and_unnamed_column() {
        let table = parse_table(PAGE, TableKind::Results).unwrap();
        assert_eq!(
            table.headers,
            vec![
                "Games",
                "Discipline (Sport) / Event",
                "NOC / Team",
                "Pos",
                "Medal",
                "As",
                "Unnamed: 6"
            ]
        );
        assert_eq!(table.rows.len(), 3);
        assert_eq!(table.rows[0].get("Games"), Some("1912 Summer Olympics"));
        assert_eq!(table.rows[1].get("Games"), None);
        assert_eq!(table.rows[1].get("Pos"), Some("=17"));
    }

    #[test]
    fn test_colspan_repeats_cell() {
        let table = parse_table(PAGE, TableKind::Results).unwrap();
        let row = &table.rows[2];
        assert_eq!(row.get("Games"), Some("spanned"));
        assert_eq!(row.get("Discipline (Sport) / Event"), Some("spanned"));
        assert_eq!(row.get("NOC / Team"), Some("X"));
        assert_eq!(row.get("Medal"), None);
    }

    #[test]
    fn test_missing_table_is_not_found() {
        let err = parse_table("<html><body><p>nothing</p></body></html>", TableKind::Results)
            .unwrap_err();
        assert!(matches!(
            err,
            ExtractionError::TableNotFound(TableKind::Results)
        ));
    }
}
