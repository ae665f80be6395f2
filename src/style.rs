use crate::worksheet::Worksheet;
use std::ops::RangeInclusive;

/// Copies one cell's visual style onto another, by value. A source cell
/// without style information leaves the destination untouched.
pub fn copy_style(sheet: &mut dyn Worksheet, src: (u32, u32), dest: (u32, u32)) {
    if let Some(style) = sheet.style(src.0, src.1) {
        sheet.set_style(dest.0, dest.1, style);
    }
}

/// Applies a template row's styles onto a destination row across a column
/// span. Used for rows created by capacity reconciliation, with a nearby
/// normal (non-total) account row as the template.
pub fn replicate_row_style(
    sheet: &mut dyn Worksheet,
    template_row: u32,
    dest_row: u32,
    cols: RangeInclusive<u32>,
) {
    for col in cols {
        copy_style(sheet, (template_row, col), (dest_row, col));
    }
}
