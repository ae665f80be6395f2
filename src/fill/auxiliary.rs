use crate::classifier::{classify_with_dates, distinct_dates};
use crate::error::Result;
use crate::fill::{merged_values_at, write_section_block, FillReport, ValueColumn, ACCOUNTS_START_ROW};
use crate::formula::column_letter;
use crate::inputs::FillInputs;
use crate::key::{normalize_balances, PeriodType};
use crate::locator::find_anchor;
use crate::worksheet::{CellValue, Worksheet};
use log::info;

/// Balance column (C), subledger column (D), difference formula column (E).
const BALANCE_COL: u32 = 3;
const SUBLEDGER_COL: u32 = 4;
const DIFF_COL: u32 = 5;

const DEFAULT_TOTAL_ROW: u32 = 44;

/// Fills the auxiliary-register comparison sheet: every subledger account
/// against its balance at the most recent date, with a per-row difference
/// formula flagging mismatches between the ledger and the subledger.
pub fn fill_auxiliary_sheet(
    sheet: &mut dyn Worksheet,
    inputs: &FillInputs,
    period: PeriodType,
) -> Result<FillReport> {
    let mut report = FillReport::default();

    if inputs.auxiliary_registers.is_empty() {
        info!("No auxiliary registers provided, leaving '{}' unchanged", sheet.name());
        return Ok(report);
    }

    let normalized = normalize_balances(&inputs.balances);
    let by_section = classify_with_dates(&normalized, period);
    let balances = distinct_dates(&normalized, period)
        .last()
        .map(|&latest| merged_values_at(&by_section, latest))
        .unwrap_or_default();

    // The subledger drives the row list here, not the balance export.
    let names: Vec<String> = inputs.auxiliary_registers.keys().cloned().collect();

    let anchor = find_anchor(
        sheet,
        &["TOTAL"],
        &[],
        ACCOUNTS_START_ROW..=ACCOUNTS_START_ROW + 80,
        DEFAULT_TOTAL_ROW,
    );
    report.note_anchor("TOTAL", anchor);

    let columns = [
        ValueColumn { col: BALANCE_COL, values: &balances },
        ValueColumn { col: SUBLEDGER_COL, values: &inputs.auxiliary_registers },
    ];
    let total_row = write_section_block(
        sheet,
        &names,
        ACCOUNTS_START_ROW,
        anchor.row,
        &columns,
        &mut report,
    );

    let balance_l = column_letter(BALANCE_COL);
    let subledger_l = column_letter(SUBLEDGER_COL);
    for offset in 0..names.len() as u32 {
        let row = ACCOUNTS_START_ROW + offset;
        sheet.write(
            row,
            DIFF_COL,
            CellValue::Formula(format!("={balance_l}{row}-{subledger_l}{row}")),
        );
    }
    if !names.is_empty() {
        sheet.write(
            total_row,
            DIFF_COL,
            CellValue::Formula(format!("={balance_l}{total_row}-{subledger_l}{total_row}")),
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
        inputs.auxiliary_registers.insert("Caja".to_string(), 98.5);
        inputs.auxiliary_registers.insert("Letras por Cobrar".to_string(), 40.0);
        inputs
    }

    #[test]
    fn test_subledger_comparison_rows() {
        let mut sheet = MemoryWorksheet::new("Registros Auxiliares").with_text(44, 2, "TOTAL");
        let report = fill_auxiliary_sheet(&mut sheet, &inputs(), PeriodType::Annual).unwrap();
        assert_eq!(report.accounts_written, 2);

        assert_eq!(sheet.read(13, 2), Some(CellValue::Text("Caja".to_string())));
        assert_eq!(sheet.read(13, 3), Some(CellValue::Number(100.0)));
        assert_eq!(sheet.read(13, 4), Some(CellValue::Number(98.5)));
        assert_eq!(
            sheet.read(13, 5),
            Some(CellValue::Formula("=C13-D13".to_string()))
        );

        // A subledger account without a ledger balance compares against 0.
        assert_eq!(sheet.read(14, 2), Some(CellValue::Text("Letras por Cobrar".to_string())));
        assert_eq!(sheet.read(14, 3), Some(CellValue::Number(0.0)));
    }

    #[test]
    fn test_no_registers_is_a_noop() {
        let mut sheet = MemoryWorksheet::new("Registros Auxiliares").with_text(44, 2, "TOTAL");
        let before = sheet.cell_count();
        let report =
            fill_auxiliary_sheet(&mut sheet, &FillInputs::default(), PeriodType::Annual).unwrap();
        assert_eq!(report.accounts_written, 0);
        assert_eq!(sheet.cell_count(), before);
    }
}
