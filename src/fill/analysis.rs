use crate::classifier::{classify_with_dates, distinct_dates};
use crate::error::Result;
use crate::fill::balance::account_names;
use crate::fill::{check_block_order, write_section_block, FillReport, ValueColumn, ACCOUNTS_START_ROW};
use crate::formula::column_letter;
use crate::inputs::FillInputs;
use crate::key::{normalize_balances, PeriodType, Section};
use crate::locator::find_anchor;
use crate::worksheet::{CellValue, Worksheet};
use log::info;
use std::collections::BTreeMap;

/// Older comparison date column (C) and newer date column (D).
const OLDER_COL: u32 = 3;
const NEWER_COL: u32 = 4;
/// Derived columns: absolute variation, relative variation, vertical share
/// of each date against the section total.
const ABS_VAR_COL: u32 = 5;
const REL_VAR_COL: u32 = 6;
const SHARE_OLDER_COL: u32 = 7;
const SHARE_NEWER_COL: u32 = 8;

const SECTION_GAP: u32 = 3;

struct BlockLayout {
    section: Section,
    label: &'static str,
    needles: &'static [&'static str],
    excluded: &'static [&'static str],
    default_total_row: u32,
}

const BLOCKS: [BlockLayout; 4] = [
    BlockLayout {
        section: Section::Asset,
        label: "TOTAL ACTIVO",
        needles: &["TOTAL", "ACTIVO"],
        excluded: &[],
        default_total_row: 34,
    },
    BlockLayout {
        section: Section::Liability,
        label: "TOTAL PASIVO",
        needles: &["TOTAL", "PASIVO"],
        excluded: &["PATRIMONIO"],
        default_total_row: 55,
    },
    BlockLayout {
        section: Section::Equity,
        label: "TOTAL PATRIMONIO",
        needles: &["TOTAL", "PATRIMONIO"],
        excluded: &["PASIVO"],
        default_total_row: 76,
    },
    BlockLayout {
        section: Section::IncomeStatement,
        label: "RESULTADO DEL EJERCICIO",
        needles: &["RESULTADO", "EJERCICIO"],
        excluded: &[],
        default_total_row: 90,
    },
];

/// Fills a horizontal/vertical analysis sheet over the two most recent
/// dates. With fewer than two distinct dates there is nothing to compare
/// and the sheet is left untouched.
pub fn fill_analysis_sheet(
    sheet: &mut dyn Worksheet,
    inputs: &FillInputs,
    period: PeriodType,
) -> Result<FillReport> {
    let mut report = FillReport::default();

    let normalized = normalize_balances(&inputs.balances);
    let dates = distinct_dates(&normalized, period);
    if dates.len() < 2 {
        info!(
            "Only {} distinct date(s) for {}: skipping analysis sheet '{}'",
            dates.len(),
            period.token(),
            sheet.name()
        );
        return Ok(report);
    }
    let older = dates[dates.len() - 2];
    let newer = dates[dates.len() - 1];

    let by_section = classify_with_dates(&normalized, period);
    let empty = BTreeMap::new();
    let empty_by_date = BTreeMap::new();

    let mut start_row = ACCOUNTS_START_ROW;
    let mut shifted_by: u32 = 0;

    for layout in &BLOCKS {
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

        let columns = [
            ValueColumn { col: OLDER_COL, values: by_date.get(&older).unwrap_or(&empty) },
            ValueColumn { col: NEWER_COL, values: by_date.get(&newer).unwrap_or(&empty) },
        ];
        let total_row = write_section_block(sheet, &names, start_row, anchor.row, &columns, &mut report);

        for offset in 0..names.len() as u32 {
            let row = start_row + offset;
            write_variation_formulas(sheet, row, total_row);
        }
        if !names.is_empty() {
            let older_l = column_letter(OLDER_COL);
            let newer_l = column_letter(NEWER_COL);
            sheet.write(
                total_row,
                ABS_VAR_COL,
                CellValue::Formula(format!("={newer_l}{total_row}-{older_l}{total_row}")),
            );
        }

        shifted_by += total_row - anchor.row;
        start_row = total_row + SECTION_GAP;
    }

    Ok(report)
}

fn write_variation_formulas(sheet: &mut dyn Worksheet, row: u32, total_row: u32) {
    let older = column_letter(OLDER_COL);
    let newer = column_letter(NEWER_COL);
    let abs_var = column_letter(ABS_VAR_COL);

    sheet.write(
        row,
        ABS_VAR_COL,
        CellValue::Formula(format!("={newer}{row}-{older}{row}")),
    );
    sheet.write(
        row,
        REL_VAR_COL,
        CellValue::Formula(format!("=IF({older}{row}=0,0,{abs_var}{row}/{older}{row})")),
    );
    sheet.write(
        row,
        SHARE_OLDER_COL,
        CellValue::Formula(format!(
            "=IF({older}${total_row}=0,0,{older}{row}/{older}${total_row})"
        )),
    );
    sheet.write(
        row,
        SHARE_NEWER_COL,
        CellValue::Formula(format!(
            "=IF({newer}${total_row}=0,0,{newer}{row}/{newer}${total_row})"
        )),
    );
}
