// src/harvest/pagination.rs

/// Read the highest page number out of the pagination item labels.
///
/// The registry renders its control as `[prev][1][2]...[N][next]`, so the
/// last page number sits one position before the trailing "next" item.
/// Returns `None` when the labels don't fit that shape; the caller decides
/// what a missing page count degrades to.
pub fn max_page_from_labels(labels: &[String]) -> Option<u32> {
    if labels.len() < 2 {
        return None;
    }
    labels[labels.len() - 2].trim().parse().ok()
}

/// XPath for the pagination link whose visible label is `page`.
pub fn page_link_xpath(page: u32) -> String {
    format!(
        "//ul[contains(@class, 'pagination')]//li[contains(@class, 'page-item')]/a[text()='{}']",
        page
    )
}
