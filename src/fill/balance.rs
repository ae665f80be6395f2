use crate::classifier::{classify_with_dates, distinct_dates};
use crate::error::Result;
use crate::fill::{check_block_order, write_section_block, FillReport, ValueColumn, ACCOUNTS_START_ROW};
use crate::inputs::FillInputs;
use crate::key::{normalize_balances, PeriodType, Section};
use crate::locator::find_anchor;
use crate::worksheet::Worksheet;
use chrono::NaiveDate;
use log::info;
use std::collections::BTreeMap;

/// First per-date value column (D). Dates map onto columns ascending, the
/// oldest date in D and each newer date one column to the right.
const VALUE_START_COL: u32 = 4;

/// Rows between a section's total row and the next section's first account
/// row (total, spacer, section header).
const SECTION_GAP: u32 = 3;

struct SectionLayout {
    section: Section,
    label: &'static str,
    needles: &'static [&'static str],
    excluded: &'static [&'static str],
    default_total_row: u32,
}

/// Section blocks top to bottom, matching the general balance templates.
/// The exclusion terms keep a section's total label from matching the
/// combined "TOTAL PASIVO Y PATRIMONIO" grand-total row.
const SECTIONS: [SectionLayout; 4] = [
    SectionLayout {
        section: Section::Asset,
        label: "TOTAL ACTIVO",
        needles: &["TOTAL", "ACTIVO"],
        excluded: &[],
        default_total_row: 34,
    },
    SectionLayout {
        section: Section::Liability,
        label: "TOTAL PASIVO",
        needles: &["TOTAL", "PASIVO"],
        excluded: &["PATRIMONIO"],
        default_total_row: 55,
    },
    SectionLayout {
        section: Section::Equity,
        label: "TOTAL PATRIMONIO",
        needles: &["TOTAL", "PATRIMONIO"],
        excluded: &["PASIVO"],
        default_total_row: 76,
    },
    SectionLayout {
        section: Section::IncomeStatement,
        label: "RESULTADO DEL EJERCICIO",
        needles: &["RESULTADO", "EJERCICIO"],
        excluded: &[],
        default_total_row: 90,
    },
];

/// Fills an annual or semestral general balance sheet: one block per
/// section, one value column per distinct date, totals refreshed.
pub fn fill_balance_sheet(
    sheet: &mut dyn Worksheet,
    inputs: &FillInputs,
    period: PeriodType,
) -> Result<FillReport> {
    let mut report = FillReport::default();

    let normalized = normalize_balances(&inputs.balances);
    let by_section = classify_with_dates(&normalized, period);
    let dates = distinct_dates(&normalized, period);
    if dates.is_empty() {
        info!("No {} balances found, leaving '{}' unchanged", period.token(), sheet.name());
        return Ok(report);
    }

    let empty = BTreeMap::new();
    let empty_by_date = BTreeMap::new();
    let mut start_row = ACCOUNTS_START_ROW;
    let mut shifted_by: u32 = 0;

    for layout in &SECTIONS {
        let by_date = by_section.get(&layout.section).unwrap_or(&empty_by_date);
        let names = account_names(by_date);

        let anchor = find_anchor(
            sheet,
            layout.needles,
            layout.excluded,
            start_row..=start_row + 80,
            layout.default_total_row + shifted_by,
        );
        report.note_anchor(layout.label, anchor);
        check_block_order(sheet.name(), layout.label, start_row, anchor.row)?;

        let columns: Vec<ValueColumn<'_>> = dates
            .iter()
            .enumerate()
            .map(|(idx, date)| ValueColumn {
                col: VALUE_START_COL + idx as u32,
                values: by_date.get(date).unwrap_or(&empty),
            })
            .collect();

        let total_row = write_section_block(sheet, &names, start_row, anchor.row, &columns, &mut report);

        shifted_by += total_row - anchor.row;
        start_row = total_row + SECTION_GAP;
    }

    Ok(report)
}

/// Distinct account names across every date of the section, sorted.
pub(crate) fn account_names(by_date: &BTreeMap<NaiveDate, BTreeMap<String, f64>>) -> Vec<String> {
    let mut names: Vec<String> = by_date.values().flat_map(|m| m.keys().cloned()).collect();
    names.sort();
    names.dedup();
    names
}
