// src/harvest/table.rs
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};

static HEADER_CELLS: Lazy<Selector> =
    Lazy::new(|| Selector::parse("thead th").expect("header cell selector should parse"));
static BODY_ROWS: Lazy<Selector> =
    Lazy::new(|| Selector::parse("tbody tr").expect("body row selector should parse"));
static ROW_CELLS: Lazy<Selector> =
    Lazy::new(|| Selector::parse("td").expect("row cell selector should parse"));

/// One rendered page of the registry table.
///
/// Header and row cell counts come straight from the markup; a short row is
/// kept short rather than padded out to the header width.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSnapshot {
    /// `thead th` texts, trimmed, in document order.
    pub headers: Vec<String>,
    /// One entry per `tbody tr`, each the trimmed `td` texts in order.
    pub rows: Vec<Vec<String>>,
}

/// Parse a table's outer HTML into a snapshot.
///
/// Rows with no cells at all come back as empty vectors, not dropped.
pub fn parse_table(markup: &str) -> TableSnapshot {
    let fragment = Html::parse_fragment(markup);

    let headers = fragment.select(&HEADER_CELLS).map(cell_text).collect();
    let rows = fragment
        .select(&BODY_ROWS)
        .map(|row| row.select(&ROW_CELLS).map(cell_text).collect())
        .collect();

    TableSnapshot { headers, rows }
}

fn cell_text(cell: ElementRef) -> String {
    cell.text().collect::<String>().trim().to_string()
}
