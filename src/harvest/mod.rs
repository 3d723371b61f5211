// src/harvest/mod.rs
//
// The pagination loop: render a page of the registry table, pull its rows,
// click through to the next page, repeat until the last page or the first
// failure. One category in, one accumulated result out.

pub mod pagination;
pub mod table;

pub use table::TableSnapshot;

use crate::browse::Session;
use fantoccini::error::CmdError;
use std::time::Duration;
use thiserror::Error;
use tokio::time::sleep;
use tracing::{debug, info, warn};
use url::Url;

const TABLE_SELECTOR: &str = "table.table";
const PAGINATION_SELECTOR: &str = "ul.pagination";
const PAGE_ITEM_SELECTOR: &str = "ul.pagination li.page-item";

const TABLE_WAIT: Duration = Duration::from_secs(20);
const PAGINATION_WAIT: Duration = Duration::from_secs(10);
const PAGE_LINK_WAIT: Duration = Duration::from_secs(10);
/// Pause after a table appears or a page-advance click lands, covering the
/// registry's client-side re-render.
const SETTLE_DELAY: Duration = Duration::from_secs(2);

#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("table did not appear within {0:?}")]
    TableNotFound(Duration),
    #[error("pagination control unreadable: {0}")]
    PaginationUnreadable(String),
    #[error("pagination link for page {page} was not clickable")]
    NextPageUnclickable {
        page: u32,
        #[source]
        source: CmdError,
    },
    #[error("webdriver command failed: {0}")]
    Session(#[from] CmdError),
}

/// Rows harvested from one category, all pages concatenated in page order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct HarvestResult {
    /// Headers adopted from the first successfully parsed page.
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pages: usize,
}

impl HarvestResult {
    /// Fold one page into the result. The first page donates the headers;
    /// later pages only contribute rows.
    pub fn push_page(&mut self, page: TableSnapshot) {
        if self.pages == 0 {
            self.headers = page.headers;
        }
        self.pages += 1;
        self.rows.extend(page.rows);
    }

    /// Whether this category earned a sheet: headers plus at least one row.
    pub fn has_data(&self) -> bool {
        !self.headers.is_empty() && !self.rows.is_empty()
    }
}

/// Wait for the registry table to render on the current page, then parse it.
///
/// On timeout the rendered markup is logged for diagnostics and the page is
/// reported as `TableNotFound`.
pub async fn extract_page(session: &mut Session) -> Result<TableSnapshot, HarvestError> {
    let table = match session.wait_for_css(TABLE_SELECTOR, TABLE_WAIT).await {
        Ok(element) => element,
        Err(CmdError::WaitTimeout) => {
            match session.page_source().await {
                Ok(source) => debug!(%source, "table never appeared; rendered markup follows"),
                Err(err) => debug!(%err, "table never appeared; markup unavailable"),
            }
            return Err(HarvestError::TableNotFound(TABLE_WAIT));
        }
        Err(err) => return Err(err.into()),
    };

    // The element exists before its rows finish populating.
    sleep(SETTLE_DELAY).await;

    let markup = table.html(false).await?;
    Ok(table::parse_table(&markup))
}

/// Highest page number advertised by the pagination control, defaulting to a
/// single page when the control is missing or unreadable.
pub async fn max_page(session: &mut Session) -> u32 {
    match read_max_page(session).await {
        Ok(n) => n,
        Err(err) => {
            warn!(%err, "could not read pagination control, assuming a single page");
            1
        }
    }
}

async fn read_max_page(session: &mut Session) -> Result<u32, HarvestError> {
    session
        .wait_for_css(PAGINATION_SELECTOR, PAGINATION_WAIT)
        .await
        .map_err(|err| match err {
            CmdError::WaitTimeout => {
                HarvestError::PaginationUnreadable("control never appeared".to_string())
            }
            other => HarvestError::Session(other),
        })?;

    let labels = session.texts_of_all(PAGE_ITEM_SELECTOR).await?;
    pagination::max_page_from_labels(&labels).ok_or_else(|| {
        HarvestError::PaginationUnreadable(format!("unusable item labels: {:?}", labels))
    })
}

/// Harvest every page of one category URL.
///
/// A page that fails to render or a link that fails to click truncates the
/// harvest there; whatever was collected so far is still returned. Only a
/// failure to navigate to the category at all comes back as an error.
pub async fn harvest_category(
    session: &mut Session,
    url: &Url,
) -> Result<HarvestResult, HarvestError> {
    session.goto(url).await?;

    let max_page = max_page(session).await;
    let mut result = HarvestResult::default();

    for page in 1..=max_page {
        info!(page, max_page, "extracting table");
        match extract_page(session).await {
            Ok(snapshot) => {
                debug!(rows = snapshot.rows.len(), "page parsed");
                result.push_page(snapshot);
            }
            Err(err) => {
                warn!(page, %err, "no table data on this page, stopping category");
                break;
            }
        }

        if page < max_page {
            if let Err(err) = advance_to(session, page + 1).await {
                warn!(%err, "stopping category");
                break;
            }
        }
    }

    Ok(result)
}

/// Click through to `page` and give the new content a moment to render.
async fn advance_to(session: &mut Session, page: u32) -> Result<(), HarvestError> {
    let xpath = pagination::page_link_xpath(page);
    session
        .click_when_ready(&xpath, PAGE_LINK_WAIT)
        .await
        .map_err(|source| HarvestError::NextPageUnclickable { page, source })?;
    sleep(SETTLE_DELAY).await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(headers: &[&str], rows: &[&[&str]]) -> TableSnapshot {
        TableSnapshot {
            headers: headers.iter().map(|s| s.to_string()).collect(),
            rows: rows
                .iter()
                .map(|row| row.iter().map(|s| s.to_string()).collect())
                .collect(),
        }
    }

    #[test]
    fn pages_concatenate_in_page_order() {
        let mut result = HarvestResult::default();
        result.push_page(snapshot(&["h"], &[&["A"], &["B"]]));
        result.push_page(snapshot(&["h"], &[&["C"]]));

        assert_eq!(result.rows, vec![vec!["A"], vec!["B"], vec!["C"]]);
    }

    #[test]
    fn headers_come_from_the_first_page() {
        let mut result = HarvestResult::default();
        result.push_page(snapshot(&["first"], &[&["1"]]));
        result.push_page(snapshot(&["second"], &[&["2"]]));

        assert_eq!(result.headers, vec!["first"]);
        assert_eq!(result.rows.len(), 2);
    }

    #[test]
    fn a_truncated_harvest_keeps_earlier_pages() {
        // Page 2 failing means push_page is simply never called again; the
        // result still carries page 1.
        let mut result = HarvestResult::default();
        result.push_page(snapshot(&["h"], &[&["A"]]));

        assert!(result.has_data());
        assert_eq!(result.rows, vec![vec!["A"]]);
    }

    #[test]
    fn headerless_or_rowless_results_carry_no_data() {
        let mut empty = HarvestResult::default();
        assert!(!empty.has_data());

        let mut headers_only = HarvestResult::default();
        headers_only.push_page(snapshot(&["h"], &[]));
        assert!(!headers_only.has_data());

        let mut rows_only = HarvestResult::default();
        rows_only.push_page(snapshot(&[], &[&["A"]]));
        assert!(!rows_only.has_data());
    }
}
