use crate::classifier::{classify_with_dates, distinct_dates};
use crate::error::Result;
use crate::fill::{check_block_order, write_section_block, FillReport, ValueColumn, ACCOUNTS_START_ROW};
use crate::formula::{build_sum_formula, column_letter};
use crate::inputs::FillInputs;
use crate::key::{normalize_balances, PeriodType, Section};
use crate::locator::{find_anchor, find_column_by_header, HEADER_SCAN_COLS};
use crate::worksheet::{CellValue, Worksheet};
use log::info;
use std::collections::BTreeMap;

/// Balance column (D): the most recent date only.
const BALANCE_COL: u32 = 4;
/// Fallback adjustment columns when the header labels are missing.
const DEFAULT_DEBIT_COL: u32 = 5;
const DEFAULT_CREDIT_COL: u32 = 6;
/// Header row carrying the Debe/Haber captions.
const HEADER_ROW: u32 = ACCOUNTS_START_ROW - 1;

const SECTION_GAP: u32 = 3;

/// Fills a centralizing sheet: per-section account lists against the most
/// recent date, with adjustment debit/credit columns and an adjusted-balance
/// formula per row.
///
/// The second block concatenates pre-sorted Liability accounts before
/// pre-sorted Equity accounts; the two lists are NOT merged into one
/// globally sorted sequence.
pub fn fill_centralizing_sheet(
    sheet: &mut dyn Worksheet,
    inputs: &FillInputs,
    period: PeriodType,
) -> Result<FillReport> {
    let mut report = FillReport::default();

    let normalized = normalize_balances(&inputs.balances);
    let by_section = classify_with_dates(&normalized, period);
    let dates = distinct_dates(&normalized, period);
    let Some(&latest) = dates.last() else {
        info!("No {} balances found, leaving '{}' unchanged", period.token(), sheet.name());
        return Ok(report);
    };

    let debit_col =
        find_column_by_header(sheet, HEADER_ROW, &["DEBE"], HEADER_SCAN_COLS).unwrap_or(DEFAULT_DEBIT_COL);
    let credit_col = find_column_by_header(sheet, HEADER_ROW, &["HABER"], HEADER_SCAN_COLS)
        .unwrap_or(DEFAULT_CREDIT_COL);
    let adjusted_col = credit_col + 1;

    let section_values = |section: Section| -> BTreeMap<String, f64> {
        by_section
            .get(&section)
            .and_then(|by_date| by_date.get(&latest))
            .cloned()
            .unwrap_or_default()
    };

    let assets = section_values(Section::Asset);
    let liabilities = section_values(Section::Liability);
    let equity = section_values(Section::Equity);
    let results = section_values(Section::IncomeStatement);

    // Pasivo then Patrimonio, each pre-sorted, concatenated in that order.
    let mut liability_equity_names: Vec<String> = liabilities.keys().cloned().collect();
    liability_equity_names.extend(equity.keys().cloned());
    let mut liability_equity_values = liabilities;
    liability_equity_values.extend(equity);

    let blocks: [(&str, &'static [&'static str], &'static [&'static str], u32, Vec<String>, &BTreeMap<String, f64>); 3] = [
        (
            "TOTAL ACTIVO",
            &["TOTAL", "ACTIVO"],
            &[],
            34,
            assets.keys().cloned().collect(),
            &assets,
        ),
        (
            "TOTAL PASIVO Y PATRIMONIO",
            &["TOTAL", "PASIVO", "PATRIMONIO"],
            &[],
            55,
            liability_equity_names,
            &liability_equity_values,
        ),
        (
            "RESULTADO DEL EJERCICIO",
            &["RESULTADO", "EJERCICIO"],
            &[],
            76,
            results.keys().cloned().collect(),
            &results,
        ),
    ];

    let mut start_row = ACCOUNTS_START_ROW;
    let mut shifted_by: u32 = 0;

    for (label, needles, excluded, default_row, names, values) in blocks {
        let anchor = find_anchor(
            sheet,
            needles,
            excluded,
            start_row..=start_row + 80,
            default_row + shifted_by,
        );
        report.note_anchor(label, anchor);
        check_block_order(sheet.name(), label, start_row, anchor.row)?;

        let total_row = write_section_block(
            sheet,
            &names,
            start_row,
            anchor.row,
            &[ValueColumn { col: BALANCE_COL, values }],
            &mut report,
        );

        for (offset, name) in names.iter().enumerate() {
            let row = start_row + offset as u32;
            let entry = inputs.lookup_adjustment(name).copied().unwrap_or_default();
            sheet.write(row, debit_col, CellValue::Number(entry.debit));
            sheet.write(row, credit_col, CellValue::Number(entry.credit));
            sheet.write(
                row,
                adjusted_col,
                CellValue::Formula(adjusted_balance_formula(row, BALANCE_COL, debit_col, credit_col)),
            );
        }

        for col in [debit_col, credit_col] {
            if let Some(formula) = build_sum_formula(&column_letter(col), start_row, total_row - 1) {
                sheet.write(total_row, col, CellValue::Formula(formula));
            }
        }
        if !names.is_empty() {
            sheet.write(
                total_row,
                adjusted_col,
                CellValue::Formula(adjusted_balance_formula(total_row, BALANCE_COL, debit_col, credit_col)),
            );
        }

        shifted_by += total_row - anchor.row;
        start_row = total_row + SECTION_GAP;
    }

    Ok(report)
}

/// `balance + debit - credit` for one row.
fn adjusted_balance_formula(row: u32, balance_col: u32, debit_col: u32, credit_col: u32) -> String {
    format!(
        "={b}{row}+{d}{row}-{h}{row}",
        b = column_letter(balance_col),
        d = column_letter(debit_col),
        h = column_letter(credit_col)
    )
}
