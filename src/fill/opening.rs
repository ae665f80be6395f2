use crate::classifier::{classify_with_dates, distinct_dates};
use crate::error::Result;
use crate::fill::{merged_values_at, write_section_block, FillReport, ValueColumn, ACCOUNTS_START_ROW};
use crate::formula::column_letter;
use crate::inputs::FillInputs;
use crate::key::{normalize_balances, PeriodType};
use crate::locator::find_anchor;
use crate::worksheet::{CellValue, Worksheet};
use log::info;

/// Opening balance column (C), current balance column (D), difference
/// formula column (E).
const OPENING_COL: u32 = 3;
const CURRENT_COL: u32 = 4;
const DIFF_COL: u32 = 5;

const DEFAULT_TOTAL_ROW: u32 = 44;

/// Fills the initial-balance test sheet: one row per account comparing the
/// opening balance register against the current balance at the most recent
/// date, with a per-row difference formula.
pub fn fill_opening_balance_sheet(
    sheet: &mut dyn Worksheet,
    inputs: &FillInputs,
    period: PeriodType,
) -> Result<FillReport> {
    let mut report = FillReport::default();

    let normalized = normalize_balances(&inputs.balances);
    let dates = distinct_dates(&normalized, period);
    let Some(&latest) = dates.last() else {
        info!("No {} balances found, leaving '{}' unchanged", period.token(), sheet.name());
        return Ok(report);
    };

    let by_section = classify_with_dates(&normalized, period);
    let current = merged_values_at(&by_section, latest);
    let opening = inputs.latest_opening_balances();

    // One row per account from either side; absent values fill with zero.
    let mut names: Vec<String> = current.keys().chain(opening.keys()).cloned().collect();
    names.sort();
    names.dedup();

    let anchor = find_anchor(
        sheet,
        &["TOTAL"],
        &[],
        ACCOUNTS_START_ROW..=ACCOUNTS_START_ROW + 80,
        DEFAULT_TOTAL_ROW,
    );
    report.note_anchor("TOTAL", anchor);

    let columns = [
        ValueColumn { col: OPENING_COL, values: &opening },
        ValueColumn { col: CURRENT_COL, values: &current },
    ];
    let total_row = write_section_block(
        sheet,
        &names,
        ACCOUNTS_START_ROW,
        anchor.row,
        &columns,
        &mut report,
    );

    let opening_l = column_letter(OPENING_COL);
    let current_l = column_letter(CURRENT_COL);
    for offset in 0..names.len() as u32 {
        let row = ACCOUNTS_START_ROW + offset;
        sheet.write(
            row,
            DIFF_COL,
            CellValue::Formula(format!("={opening_l}{row}-{current_l}{row}")),
        );
    }
    if !names.is_empty() {
        sheet.write(
            total_row,
            DIFF_COL,
            CellValue::Formula(format!("={opening_l}{total_row}-{current_l}{total_row}")),
        );
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::worksheet::MemoryWorksheet;

    fn inputs() -> FillInputs {
        let mut inputs = FillInputs::default();
        inputs.balances.insert("ANUAL-2023-12-31-ACTIVO-Caja".to_string(), 100.0);
        inputs.balances.insert("ANUAL-2023-12-31-PASIVO-Prestamos".to_string(), 60.0);
        inputs.opening_balances.insert("Caja-2023-01-01".to_string(), 90.0);
        inputs.opening_balances.insert("Caja-2022-01-01".to_string(), 70.0);
        inputs.opening_balances.insert("Alquileres-2023-01-01".to_string(), 12.0);
        inputs
    }

    #[test]
    fn test_opening_vs_current_rows() {
        let mut sheet = MemoryWorksheet::new("Saldos Iniciales").with_text(44, 2, "TOTAL");
        fill_opening_balance_sheet(&mut sheet, &inputs(), PeriodType::Annual).unwrap();

        // Union of both registers, sorted: Alquileres, Caja, Prestamos.
        assert_eq!(sheet.read(13, 2), Some(CellValue::Text("Alquileres".to_string())));
        assert_eq!(sheet.read(13, 3), Some(CellValue::Number(12.0)));
        assert_eq!(sheet.read(13, 4), Some(CellValue::Number(0.0)));

        // Most recent opening date wins for Caja.
        assert_eq!(sheet.read(14, 2), Some(CellValue::Text("Caja".to_string())));
        assert_eq!(sheet.read(14, 3), Some(CellValue::Number(90.0)));
        assert_eq!(sheet.read(14, 4), Some(CellValue::Number(100.0)));
        assert_eq!(
            sheet.read(14, 5),
            Some(CellValue::Formula("=C14-D14".to_string()))
        );

        assert_eq!(
            sheet.read(44, 3),
            Some(CellValue::Formula("=SUM(C13:C43)".to_string()))
        );
        assert_eq!(
            sheet.read(44, 5),
            Some(CellValue::Formula("=C44-D44".to_string()))
        );
    }

    #[test]
    fn test_account_missing_from_opening_register_is_zero() {
        let mut sheet = MemoryWorksheet::new("Saldos Iniciales").with_text(44, 2, "TOTAL");
        fill_opening_balance_sheet(&mut sheet, &inputs(), PeriodType::Annual).unwrap();

        assert_eq!(sheet.read(15, 2), Some(CellValue::Text("Prestamos".to_string())));
        assert_eq!(sheet.read(15, 3), Some(CellValue::Number(0.0)));
        assert_eq!(sheet.read(15, 4), Some(CellValue::Number(60.0)));
    }
}
