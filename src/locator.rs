use crate::worksheet::Worksheet;
use log::debug;
use std::ops::RangeInclusive;

/// Rows scanned when looking for labeled anchors.
pub const ANCHOR_SCAN_ROWS: RangeInclusive<u32> = 1..=100;
/// Columns scanned when resolving a header column.
pub const HEADER_SCAN_COLS: RangeInclusive<u32> = 1..=30;
/// Label columns tried in priority order: B first, then C.
pub const LABEL_COLUMNS: [u32; 2] = [2, 3];

/// A located row landmark. `inferred` is true when no label matched and the
/// hardcoded fallback row was used, which means placement confidence is
/// reduced but processing continues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedAnchor {
    pub row: u32,
    pub inferred: bool,
}

/// Case-insensitive label test: every needle must appear as a substring and
/// no excluded term may appear. The exclusion list keeps "TOTAL ACTIVO"
/// from matching "TOTAL ACTIVO NO CORRIENTE".
fn label_matches(text: &str, needles: &[&str], excluded: &[&str]) -> bool {
    let haystack = text.to_uppercase();
    needles.iter().all(|n| haystack.contains(&n.to_uppercase()))
        && !excluded.iter().any(|e| haystack.contains(&e.to_uppercase()))
}

/// Scans `rows` in one column for a matching label.
pub fn find_row(
    sheet: &dyn Worksheet,
    needles: &[&str],
    excluded: &[&str],
    rows: RangeInclusive<u32>,
    col: u32,
) -> Option<u32> {
    for row in rows {
        if let Some(value) = sheet.read(row, col) {
            if let Some(text) = value.as_text() {
                if label_matches(text, needles, excluded) {
                    return Some(row);
                }
            }
        }
    }
    None
}

/// Locates a labeled anchor row, trying the primary label column across the
/// whole row range before the secondary one. Falls back to `default_row`
/// when nothing matches; the fallback is reported, not hidden.
pub fn find_anchor(
    sheet: &dyn Worksheet,
    needles: &[&str],
    excluded: &[&str],
    rows: RangeInclusive<u32>,
    default_row: u32,
) -> ResolvedAnchor {
    for col in LABEL_COLUMNS {
        if let Some(row) = find_row(sheet, needles, excluded, rows.clone(), col) {
            return ResolvedAnchor { row, inferred: false };
        }
    }

    debug!(
        "No anchor matching {:?} found in '{}', falling back to row {}",
        needles,
        sheet.name(),
        default_row
    );
    ResolvedAnchor {
        row: default_row,
        inferred: true,
    }
}

/// Finds the first column on `header_row` whose text matches any of the
/// candidate labels.
pub fn find_column_by_header(
    sheet: &dyn Worksheet,
    header_row: u32,
    candidates: &[&str],
    cols: RangeInclusive<u32>,
) -> Option<u32> {
    for col in cols {
        if let Some(value) = sheet.read(header_row, col) {
            if let Some(text) = value.as_text() {
                if candidates.iter().any(|c| label_matches(text, &[c], &[])) {
                    return Some(col);
                }
            }
        }
    }
    None
}
