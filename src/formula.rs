use crate::worksheet::CellValue;
use regex::{Captures, Regex};

/// Converts a 1-based column index to its letter form (1 -> "A", 27 -> "AA").
pub fn column_letter(col: u32) -> String {
    let mut col = col;
    let mut letters = Vec::new();
    while col > 0 {
        let rem = ((col - 1) % 26) as u8;
        letters.push(b'A' + rem);
        col = (col - 1) / 26;
    }
    letters.reverse();
    String::from_utf8(letters).unwrap_or_default()
}

/// Builds a range-sum formula over `first_row..=last_row` in one column.
/// Returns `None` for an empty or inverted range; callers skip the write
/// rather than emitting a formula over a non-existent range.
pub fn build_sum_formula(col: &str, first_row: u32, last_row: u32) -> Option<String> {
    if last_row < first_row {
        return None;
    }
    Some(format!("=SUM({col}{first_row}:{col}{last_row})"))
}

/// Rewrites a formula being relocated from `old_row` to `new_row`: every
/// relative row reference in a cell coordinate moves by the same delta,
/// `$`-locked rows stay put. Non-formula values pass through unchanged.
pub fn shift_formula_rows(value: &CellValue, old_row: u32, new_row: u32) -> CellValue {
    let CellValue::Formula(formula) = value else {
        return value.clone();
    };
    if old_row == new_row {
        return value.clone();
    }

    let delta = new_row as i64 - old_row as i64;
    let cell_ref = Regex::new(r"(\$?)([A-Za-z]+)(\$?)(\d+)").unwrap();

    let shifted = cell_ref.replace_all(formula, |caps: &Captures| {
        let col_abs = &caps[1];
        let col = &caps[2];
        let row_abs = &caps[3];
        let row: i64 = caps[4].parse().unwrap_or(0);

        let new_row = if row_abs.is_empty() { (row + delta).max(1) } else { row };
        format!("{col_abs}{col}{row_abs}{new_row}")
    });

    CellValue::Formula(shifted.into_owned())
}
