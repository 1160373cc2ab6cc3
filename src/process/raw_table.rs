use std::collections::HashMap;

/// One `<tr>` of a scraped table, keyed by column name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRow {
    cells: HashMap<String, String>,
}

impl RawRow {
    pub fn insert(&mut self, column: impl Into<String>, text: impl Into<String>) {
        self.cells.insert(column.into(), text.into());
    }

    /// Cell text, or `None` when the column is missing or the cell is blank.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.cells
            .get(column)
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
    }

    /// First non-blank cell among `columns`, for headers that changed name over time.
    pub fn get_any(&self, columns: &[&str]) -> Option<&str> {
        columns.iter().find_map(|c| self.get(c))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RawRow {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut row = RawRow::default();
        for (k, v) in iter {
            row.insert(k, v);
        }
        row
    }
}

/// A table as the site renders it: header names in page order plus body rows.
/// Column sets differ between athletes, so nothing here assumes a fixed layout.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    /// Column names from the `<thead>`, or positional names (`"0"`, `"1"`, …) when there is none.
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
}

impl RawTable {
    pub fn new(headers: Vec<String>, rows: Vec<RawRow>) -> Self {
        Self { headers, rows }
    }

    /// Build a table from literal rows; headers are collected in first-seen order.
    pub fn from_rows(rows: &[&[(&str, &str)]]) -> Self {
        let mut headers: Vec<String> = Vec::new();
        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            for (col, _) in row.iter() {
                if !headers.iter().any(|h| h == col) {
                    headers.push(col.to_string());
                }
            }
            out.push(row.iter().copied().collect());
        }
        Self::new(headers, out)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.headers.iter().any(|h| h == column)
    }
}
