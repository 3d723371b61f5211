// src/export.rs
use anyhow::{Context, Result};
use rust_xlsxwriter::{Format, Workbook};
use std::path::Path;
use tracing::info;

use crate::harvest::HarvestResult;

/// xlsx sheet names cap out at 31 characters.
const MAX_SHEET_NAME: usize = 31;

/// Write one worksheet per category that produced data: header row first
/// (bold), then the harvested rows in harvest order.
///
/// Workbooks need at least one visible sheet, so when nothing was harvested a
/// single empty `"Empty"` sheet is written instead. Returns the sheet names
/// actually written.
pub fn write_workbook(
    path: impl AsRef<Path>,
    categories: &[(String, HarvestResult)],
) -> Result<Vec<String>> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();
    let mut written = Vec::new();

    for (label, result) in categories {
        if !result.has_data() {
            info!(category = %label, "no data harvested, skipping sheet");
            continue;
        }

        let name = sheet_name(label);
        let sheet = workbook.add_worksheet();
        sheet.set_name(name.as_str())?;

        for (col, header) in result.headers.iter().enumerate() {
            sheet.write_string_with_format(0, col as u16, header.as_str(), &header_format)?;
        }
        for (row_idx, row) in result.rows.iter().enumerate() {
            for (col, cell) in row.iter().enumerate() {
                sheet.write_string(row_idx as u32 + 1, col as u16, cell.as_str())?;
            }
        }

        info!(category = %label, rows = result.rows.len(), "sheet written");
        written.push(name);
    }

    if written.is_empty() {
        workbook.add_worksheet().set_name("Empty")?;
        written.push("Empty".to_string());
    }

    workbook
        .save(path.as_ref())
        .with_context(|| format!("saving workbook to {}", path.as_ref().display()))?;

    Ok(written)
}

/// Squeeze a category label into a legal sheet name: strip the characters
/// xlsx forbids and stay under the length cap.
fn sheet_name(label: &str) -> String {
    let cleaned: String = label
        .chars()
        .map(|c| match c {
            '[' | ']' | ':' | '*' | '?' | '/' | '\\' => '-',
            other => other,
        })
        .take(MAX_SHEET_NAME)
        .collect();

    if cleaned.trim().is_empty() {
        "Sheet1".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::harvest::TableSnapshot;
    use tempfile::tempdir;

    fn result_with_rows(rows: usize) -> HarvestResult {
        let mut result = HarvestResult::default();
        result.push_page(TableSnapshot {
            headers: vec!["Account Name".to_string(), "Status".to_string()],
            rows: (0..rows)
                .map(|i| vec![format!("account-{i}"), "Active".to_string()])
                .collect(),
        });
        result
    }

    #[test]
    fn writes_one_sheet_per_category_with_data() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("out.xlsx");

        let categories = vec![
            ("REC Generator".to_string(), result_with_rows(3)),
            ("Retired".to_string(), HarvestResult::default()),
        ];

        let sheets = write_workbook(&path, &categories).unwrap();
        assert_eq!(sheets, vec!["REC Generator"]);
        assert!(path.metadata().unwrap().len() > 0);
    }

    #[test]
    fn empty_run_still_produces_a_workbook() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("out.xlsx");

        let sheets = write_workbook(&path, &[]).unwrap();
        assert_eq!(sheets, vec!["Empty"]);
        assert!(path.exists());
    }

    #[test]
    fn all_empty_categories_degrade_to_the_placeholder() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("out.xlsx");

        let categories = vec![("REC Generator".to_string(), HarvestResult::default())];
        let sheets = write_workbook(&path, &categories).unwrap();
        assert_eq!(sheets, vec!["Empty"]);
    }

    #[test]
    fn sheet_names_obey_xlsx_rules() {
        assert_eq!(sheet_name("REC Generator"), "REC Generator");
        assert_eq!(sheet_name("a/b:c*d"), "a-b-c-d");
        assert_eq!(sheet_name(&"x".repeat(40)).len(), MAX_SHEET_NAME);
        assert_eq!(sheet_name("   "), "Sheet1");
    }
}
