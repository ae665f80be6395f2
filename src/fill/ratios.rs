use crate::classifier::{classify_for_ratios, distinct_dates, SectionAccounts};
use crate::error::Result;
use crate::fill::{check_block_order, write_section_block, FillReport, ValueColumn};
use crate::inputs::FillInputs;
use crate::key::{PeriodType, Section};
use crate::locator::find_anchor;
use crate::worksheet::Worksheet;
use log::info;
use std::collections::BTreeMap;

/// Ratio inputs live in a denser layout than the balance sheets: values in
/// column C, first block starting right below the sheet header.
const VALUE_COL: u32 = 3;
const FIRST_BLOCK_ROW: u32 = 8;
const BLOCK_GAP: u32 = 3;

/// Fills the ratio-analysis input blocks for the most recent date. Asset
/// and Liability accounts are split into Corriente / No Corriente blocks;
/// Patrimonio and Resultados stay flat. The block totals feed the ratio
/// formulas already present in the template.
pub fn fill_ratios_sheet(
    sheet: &mut dyn Worksheet,
    inputs: &FillInputs,
    period: PeriodType,
) -> Result<FillReport> {
    let mut report = FillReport::default();

    let dates = distinct_dates(&inputs.balances, period);
    let Some(&latest) = dates.last() else {
        info!("No {} balances found, leaving '{}' unchanged", period.token(), sheet.name());
        return Ok(report);
    };

    // The subtype split needs the raw keys; normalization would strip the
    // Corriente / No Corriente tags this sheet keys on.
    let sections = classify_for_ratios(&inputs.balances, period, latest);

    let empty = BTreeMap::new();
    let (asset_current, asset_non_current) = subtype_split(&sections, &empty, Section::Asset);
    let (liability_current, liability_non_current) = subtype_split(&sections, &empty, Section::Liability);
    let equity = flat_accounts(&sections, &empty, Section::Equity);
    let results = flat_accounts(&sections, &empty, Section::IncomeStatement);

    let blocks: [(&str, &'static [&'static str], &'static [&'static str], u32, &BTreeMap<String, f64>); 6] = [
        (
            "TOTAL ACTIVO CORRIENTE",
            &["TOTAL", "ACTIVO", "CORRIENTE"],
            &["NO CORRIENTE"],
            14,
            asset_current,
        ),
        (
            "TOTAL ACTIVO NO CORRIENTE",
            &["TOTAL", "ACTIVO", "NO CORRIENTE"],
            &[],
            24,
            asset_non_current,
        ),
        (
            "TOTAL PASIVO CORRIENTE",
            &["TOTAL", "PASIVO", "CORRIENTE"],
            &["NO CORRIENTE"],
            34,
            liability_current,
        ),
        (
            "TOTAL PASIVO NO CORRIENTE",
            &["TOTAL", "PASIVO", "NO CORRIENTE"],
            &[],
            44,
            liability_non_current,
        ),
        (
            "TOTAL PATRIMONIO",
            &["TOTAL", "PATRIMONIO"],
            &["PASIVO"],
            54,
            equity,
        ),
        (
            "RESULTADO DEL EJERCICIO",
            &["RESULTADO", "EJERCICIO"],
            &[],
            64,
            results,
        ),
    ];

    let mut start_row = FIRST_BLOCK_ROW;
    let mut shifted_by: u32 = 0;

    for (label, needles, excluded, default_row, values) in blocks {
        let anchor = find_anchor(
            sheet,
            needles,
            excluded,
            start_row..=start_row + 80,
            default_row + shifted_by,
        );
        report.note_anchor(label, anchor);
        check_block_order(sheet.name(), label, start_row, anchor.row)?;

        let names: Vec<String> = values.keys().cloned().collect();
        let total_row = write_section_block(
            sheet,
            &names,
            start_row,
            anchor.row,
            &[ValueColumn { col: VALUE_COL, values }],
            &mut report,
        );

        shifted_by += total_row - anchor.row;
        start_row = total_row + BLOCK_GAP;
    }

    Ok(report)
}

fn subtype_split<'a>(
    sections: &'a BTreeMap<Section, SectionAccounts>,
    empty: &'a BTreeMap<String, f64>,
    section: Section,
) -> (&'a BTreeMap<String, f64>, &'a BTreeMap<String, f64>) {
    match sections.get(&section) {
        Some(SectionAccounts::BySubtype { current, non_current }) => (current, non_current),
        _ => (empty, empty),
    }
}

fn flat_accounts<'a>(
    sections: &'a BTreeMap<Section, SectionAccounts>,
    empty: &'a BTreeMap<String, f64>,
    section: Section,
) -> &'a BTreeMap<String, f64> {
    match sections.get(&section) {
        Some(SectionAccounts::Flat(accounts)) => accounts,
        _ => empty,
    }
}
