//! Per-document-type sheet fillers.
//!
//! Every filler follows the same state machine: locate anchors, reconcile
//! row capacity per section, replicate styles onto inserted rows, write
//! account names and values (zero-filled where no balance exists), then
//! rebuild total-row formulas. Layout constants per document type are the
//! external contract of the templates; changing them misaligns existing
//! workbooks.

pub mod analysis;
pub mod auxiliary;
pub mod balance;
pub mod centralizing;
pub mod materiality;
pub mod opening;
pub mod ratios;

use crate::error::{FillError, Result};
use crate::formula::{build_sum_formula, column_letter, shift_formula_rows};
use crate::key::Section;
use crate::locator::ResolvedAnchor;
use crate::rows::ensure_capacity;
use crate::style::replicate_row_style;
use crate::worksheet::{CellValue, Worksheet};
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// First account row in every block-structured template.
pub const ACCOUNTS_START_ROW: u32 = 13;
/// Account-name column (B).
pub const NAME_COL: u32 = 2;
/// Columns checked for template formulas on a relocated total row.
const TOTAL_ROW_FORMULA_COLS: u32 = 12;

/// What one fill call did to a sheet. Inferred anchors are reported so
/// callers can tell when placement ran on hardcoded defaults.
#[derive(Debug, Clone, Default)]
pub struct FillReport {
    pub rows_inserted: u32,
    pub accounts_written: usize,
    pub accounts_dropped: usize,
    pub inferred_anchors: Vec<String>,
}

impl FillReport {
    pub(crate) fn note_anchor(&mut self, label: &str, anchor: ResolvedAnchor) {
        if anchor.inferred {
            self.inferred_anchors.push(label.to_string());
        }
    }
}

/// One value column of a section block: a target column and the
/// account-to-value mapping written into it.
pub(crate) struct ValueColumn<'a> {
    pub col: u32,
    pub values: &'a BTreeMap<String, f64>,
}

/// Writes one section block: grows the row range if the account list does
/// not fit, copies the first account row's style onto inserted rows, writes
/// names and zero-filled values, and rebuilds each value column's sum
/// formula on the (possibly moved) total row.
///
/// Returns the total row after reconciliation, which is the reference point
/// for locating the next section below.
pub(crate) fn write_section_block(
    sheet: &mut dyn Worksheet,
    names: &[String],
    start_row: u32,
    total_row: u32,
    columns: &[ValueColumn<'_>],
    report: &mut FillReport,
) -> u32 {
    let inserted = ensure_capacity(sheet, start_row, total_row, names.len());
    let total_row = total_row + inserted;

    if inserted > 0 {
        let last_col = columns.iter().map(|c| c.col).max().unwrap_or(NAME_COL);
        for new_row in total_row - inserted..total_row {
            replicate_row_style(sheet, start_row, new_row, NAME_COL..=last_col);
        }
        // Template formulas that rode along with the total row still
        // reference their pre-insertion rows; relocate them. The value
        // columns get fresh sums below either way.
        for col in 1..=TOTAL_ROW_FORMULA_COLS {
            if let Some(value @ CellValue::Formula(_)) = sheet.read(total_row, col) {
                sheet.write(
                    total_row,
                    col,
                    shift_formula_rows(&value, total_row - inserted, total_row),
                );
            }
        }
        report.rows_inserted += inserted;
    }

    for (offset, name) in names.iter().enumerate() {
        let row = start_row + offset as u32;
        sheet.write(row, NAME_COL, CellValue::Text(name.clone()));
        for column in columns {
            let value = column.values.get(name).copied().unwrap_or(0.0);
            sheet.write(row, column.col, CellValue::Number(value));
        }
    }
    report.accounts_written += names.len();

    for column in columns {
        if let Some(formula) = build_sum_formula(&column_letter(column.col), start_row, total_row - 1)
        {
            sheet.write(total_row, column.col, CellValue::Formula(formula));
        }
    }

    total_row
}

/// A block's total row must sit at or below its first account row. A total
/// anchor resolving above the accounts means the template has drifted too
/// far from the expected layout for best-effort placement.
pub(crate) fn check_block_order(
    sheet_name: &str,
    label: &str,
    start_row: u32,
    total_row: u32,
) -> Result<()> {
    if total_row < start_row {
        return Err(FillError::LayoutMismatch {
            sheet: sheet_name.to_string(),
            details: format!(
                "total row '{label}' resolved to row {total_row}, above the account rows starting at {start_row}"
            ),
        });
    }
    Ok(())
}

/// Merges every section's accounts for one date into a single
/// name-to-value map. Used by the single-column sheets (materiality,
/// opening balances, auxiliary comparison).
pub(crate) fn merged_values_at(
    by_section: &BTreeMap<Section, BTreeMap<NaiveDate, BTreeMap<String, f64>>>,
    date: NaiveDate,
) -> BTreeMap<String, f64> {
    let mut merged = BTreeMap::new();
    for dates in by_section.values() {
        if let Some(accounts) = dates.get(&date) {
            for (name, value) in accounts {
                merged.insert(name.clone(), *value);
            }
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::worksheet::MemoryWorksheet;

    #[test]
    fn test_write_section_block_zero_fill() {
        let mut sheet = MemoryWorksheet::new("Balance").with_text(20, 2, "TOTAL ACTIVO");
        let mut values = BTreeMap::new();
        values.insert("Caja".to_string(), 150.0);

        let names = vec!["Bancos".to_string(), "Caja".to_string()];
        let mut report = FillReport::default();
        let total = write_section_block(
            &mut sheet,
            &names,
            13,
            20,
            &[ValueColumn { col: 4, values: &values }],
            &mut report,
        );

        assert_eq!(total, 20);
        assert_eq!(sheet.read(13, 2), Some(CellValue::Text("Bancos".to_string())));
        // No balance for Bancos at this date: a literal zero, never a blank.
        assert_eq!(sheet.read(13, 4), Some(CellValue::Number(0.0)));
        assert_eq!(sheet.read(14, 4), Some(CellValue::Number(150.0)));
        assert_eq!(
            sheet.read(20, 4),
            Some(CellValue::Formula("=SUM(D13:D19)".to_string()))
        );
    }

    #[test]
    fn test_write_section_block_expands_and_reports() {
        let mut sheet = MemoryWorksheet::new("Balance").with_text(15, 2, "TOTAL ACTIVO");
        let values = BTreeMap::new();
        let names: Vec<String> = (0..6).map(|i| format!("Cuenta {i}")).collect();

        let mut report = FillReport::default();
        let total = write_section_block(
            &mut sheet,
            &names,
            13,
            15,
            &[ValueColumn { col: 4, values: &values }],
            &mut report,
        );

        // 2 rows available, 6 needed: 4 inserted, total row moved.
        assert_eq!(total, 19);
        assert_eq!(report.rows_inserted, 4);
        assert_eq!(report.accounts_written, 6);
        assert_eq!(sheet.read(19, 2), Some(CellValue::Text("TOTAL ACTIVO".to_string())));
        assert_eq!(
            sheet.read(19, 4),
            Some(CellValue::Formula("=SUM(D13:D18)".to_string()))
        );
    }

    #[test]
    fn test_relocated_total_row_formulas_are_shifted() {
        let mut sheet = MemoryWorksheet::new("Balance").with_text(15, 2, "TOTAL ACTIVO");
        // Template formula in a side column of the total row, referencing
        // the row above the total and a locked header row.
        sheet.write(15, 6, CellValue::Formula("=F14-F$10".to_string()));

        let values = BTreeMap::new();
        let names: Vec<String> = (0..6).map(|i| format!("Cuenta {i}")).collect();
        let mut report = FillReport::default();
        let total = write_section_block(
            &mut sheet,
            &names,
            13,
            15,
            &[ValueColumn { col: 4, values: &values }],
            &mut report,
        );

        assert_eq!(total, 19);
        assert_eq!(
            sheet.read(19, 6),
            Some(CellValue::Formula("=F18-F$10".to_string()))
        );
    }

    #[test]
    fn test_empty_section_skips_formula_over_empty_range() {
        let mut sheet = MemoryWorksheet::new("Balance").with_text(13, 2, "TOTAL");
        let values = BTreeMap::new();
        let mut report = FillReport::default();

        // Total row == start row: no account space at all, no formula.
        let total = write_section_block(
            &mut sheet,
            &[],
            13,
            13,
            &[ValueColumn { col: 4, values: &values }],
            &mut report,
        );
        assert_eq!(total, 13);
        assert_eq!(sheet.read(13, 4), None);
    }
}
