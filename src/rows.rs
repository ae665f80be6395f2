use crate::worksheet::Worksheet;
use log::debug;

/// Makes room for `needed_count` account rows between `range_start`
/// (first account row, inclusive) and `range_end` (the total row, which
/// bounds the block from below). Returns how many rows were inserted so the
/// caller can push every cached anchor at or below the boundary down by the
/// same amount.
///
/// Available space is measured from the current rows on every call, so a
/// second call with the same `needed_count` finds a deficit of zero.
pub fn ensure_capacity(
    sheet: &mut dyn Worksheet,
    range_start: u32,
    range_end: u32,
    needed_count: usize,
) -> u32 {
    let available = range_end.saturating_sub(range_start) as usize;
    let deficit = needed_count.saturating_sub(available);
    if deficit == 0 {
        return 0;
    }

    let inserted = deficit as u32;
    debug!(
        "Inserting {} rows at {} in '{}' ({} accounts, {} rows available)",
        inserted,
        range_end,
        sheet.name(),
        needed_count,
        available
    );
    sheet.insert_rows(range_end, inserted);
    shift_images(sheet, range_end, inserted);
    inserted
}

/// Pushes every image anchored at or below `at_row` down by `delta`. The
/// generic row insert does not touch image anchors, so this must run after
/// every insertion.
pub fn shift_images(sheet: &mut dyn Worksheet, at_row: u32, delta: u32) {
    if delta == 0 {
        return;
    }
    for anchor in sheet.image_anchors() {
        if anchor.row >= at_row {
            sheet.move_image(&anchor.name, anchor.row + delta, anchor.col);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::worksheet::{CellValue, ImageAnchor, MemoryWorksheet};

    #[test]
    fn test_no_insertion_when_space_suffices() {
        let mut sheet = MemoryWorksheet::new("Balance").with_text(20, 2, "TOTAL");
        let inserted = ensure_capacity(&mut sheet, 13, 20, 5);
        assert_eq!(inserted, 0);
        assert_eq!(sheet.read(20, 2), Some(CellValue::Text("TOTAL".to_string())));
    }

    #[test]
    fn test_deficit_inserts_at_boundary() {
        let mut sheet = MemoryWorksheet::new("Balance")
            .with_text(20, 2, "TOTAL ACTIVO")
            .with_text(23, 2, "PASIVO");

        // 7 rows available (13..20), 10 needed.
        let inserted = ensure_capacity(&mut sheet, 13, 20, 10);
        assert_eq!(inserted, 3);
        assert_eq!(sheet.read(23, 2), Some(CellValue::Text("TOTAL ACTIVO".to_string())));
        assert_eq!(sheet.read(26, 2), Some(CellValue::Text("PASIVO".to_string())));
    }

    #[test]
    fn test_idempotent_reconciliation() {
        let mut sheet = MemoryWorksheet::new("Balance").with_text(20, 2, "TOTAL ACTIVO");

        let first = ensure_capacity(&mut sheet, 13, 20, 10);
        assert_eq!(first, 3);

        // Re-measured against the moved total row: no further deficit.
        let second = ensure_capacity(&mut sheet, 13, 20 + first, 10);
        assert_eq!(second, 0);
    }

    #[test]
    fn test_zero_accounts_is_a_no_op() {
        let mut sheet = MemoryWorksheet::new("Balance").with_text(20, 2, "TOTAL");
        assert_eq!(ensure_capacity(&mut sheet, 13, 20, 0), 0);
    }

    #[test]
    fn test_row_shift_cascade_including_images() {
        // Anchors A < B < C; inserting k rows at A must move B and C (and
        // any image at or below A) down by k, leaving rows above A alone.
        let mut sheet = MemoryWorksheet::new("Balance")
            .with_text(10, 2, "header")
            .with_text(20, 2, "A")
            .with_text(30, 2, "B")
            .with_text(40, 2, "C");
        sheet.add_image(ImageAnchor { name: "above".to_string(), row: 8, col: 1 });
        sheet.add_image(ImageAnchor { name: "below".to_string(), row: 35, col: 1 });

        let k = ensure_capacity(&mut sheet, 13, 20, 11);
        assert_eq!(k, 4);

        assert_eq!(sheet.read(10, 2), Some(CellValue::Text("header".to_string())));
        assert_eq!(sheet.read(20 + k, 2), Some(CellValue::Text("A".to_string())));
        assert_eq!(sheet.read(30 + k, 2), Some(CellValue::Text("B".to_string())));
        assert_eq!(sheet.read(40 + k, 2), Some(CellValue::Text("C".to_string())));

        let images = sheet.image_anchors();
        assert_eq!(images.iter().find(|i| i.name == "above").unwrap().row, 8);
        assert_eq!(images.iter().find(|i| i.name == "below").unwrap().row, 35 + k);
    }
}
