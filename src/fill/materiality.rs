use crate::classifier::{classify_with_dates, distinct_dates};
use crate::error::Result;
use crate::fill::{merged_values_at, FillReport, ACCOUNTS_START_ROW, NAME_COL};
use crate::formula::{build_sum_formula, column_letter};
use crate::inputs::FillInputs;
use crate::key::{normalize_balances, PeriodType};
use crate::locator::find_anchor;
use crate::worksheet::{CellValue, Worksheet};
use log::{info, warn};

const VALUE_COL: u32 = 3;

/// The materiality table is hard-capped: the template reserves exactly this
/// many account rows and cannot be expanded.
pub const MATERIALITY_CAP: usize = 30;

/// Last reserved account row (rows 13..=42) and the default total row
/// right below it.
const LAST_ACCOUNT_ROW: u32 = ACCOUNTS_START_ROW + MATERIALITY_CAP as u32 - 1;
const DEFAULT_TOTAL_ROW: u32 = LAST_ACCOUNT_ROW + 1;

/// Fills the materiality worksheet with every account's balance at the most
/// recent date. The table cannot grow: accounts beyond the cap are dropped
/// with a warning and the rest of the sheet is still processed.
pub fn fill_materiality_sheet(
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
    let values = merged_values_at(&by_section, latest);
    let names: Vec<&String> = values.keys().collect();

    if names.len() > MATERIALITY_CAP {
        report.accounts_dropped = names.len() - MATERIALITY_CAP;
        warn!(
            "Materiality table in '{}' holds {} rows but {} accounts were classified; dropping {}",
            sheet.name(),
            MATERIALITY_CAP,
            names.len(),
            report.accounts_dropped
        );
    }

    for (offset, name) in names.iter().take(MATERIALITY_CAP).enumerate() {
        let row = ACCOUNTS_START_ROW + offset as u32;
        sheet.write(row, NAME_COL, CellValue::Text((*name).clone()));
        sheet.write(row, VALUE_COL, CellValue::Number(values[*name]));
        report.accounts_written += 1;
    }

    let anchor = find_anchor(
        sheet,
        &["TOTAL"],
        &[],
        ACCOUNTS_START_ROW..=DEFAULT_TOTAL_ROW + 10,
        DEFAULT_TOTAL_ROW,
    );
    report.note_anchor("TOTAL", anchor);

    if let Some(formula) =
        build_sum_formula(&column_letter(VALUE_COL), ACCOUNTS_START_ROW, anchor.row - 1)
    {
        sheet.write(anchor.row, VALUE_COL, CellValue::Formula(formula));
    }

    Ok(report)
}
