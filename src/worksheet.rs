use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single cell content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Formula(String),
}

impl CellValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Number(_) | Self::Formula(_) => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(value) => Some(*value),
            Self::Text(_) | Self::Formula(_) => None,
        }
    }

    pub fn as_formula(&self) -> Option<&str> {
        match self {
            Self::Formula(formula) => Some(formula),
            Self::Text(_) | Self::Number(_) => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FontStyle {
    pub name: Option<String>,
    pub size: Option<f64>,
    pub bold: bool,
    pub italic: bool,
    pub color: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BorderStyle {
    pub top: Option<String>,
    pub bottom: Option<String>,
    pub left: Option<String>,
    pub right: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FillStyle {
    pub pattern: Option<String>,
    pub color: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Alignment {
    pub horizontal: Option<String>,
    pub vertical: Option<String>,
    pub wrap_text: bool,
}

/// Visual style of a cell. Every attribute is optional so partially styled
/// template cells copy over without special cases.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CellStyle {
    pub font: Option<FontStyle>,
    pub border: Option<BorderStyle>,
    pub fill: Option<FillStyle>,
    pub alignment: Option<Alignment>,
    pub number_format: Option<String>,
    pub locked: Option<bool>,
}

/// An image pinned to a cell position. Anchors are tracked separately from
/// cell content and are NOT moved by [`Worksheet::insert_rows`]; row-space
/// reconciliation shifts them explicitly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageAnchor {
    pub name: String,
    pub row: u32,
    pub col: u32,
}

/// Capability interface over one spreadsheet page.
///
/// The fill logic only ever talks to this trait, so it runs unchanged
/// against an in-memory worksheet in tests and against a real spreadsheet
/// backend in production. Rows and columns are 1-based throughout.
pub trait Worksheet {
    fn name(&self) -> &str;

    fn read(&self, row: u32, col: u32) -> Option<CellValue>;

    fn write(&mut self, row: u32, col: u32, value: CellValue);

    /// Inserts `count` blank rows starting at `at_row`; every cell and style
    /// at or below `at_row` moves down. Image anchors stay where they are.
    fn insert_rows(&mut self, at_row: u32, count: u32);

    fn style(&self, row: u32, col: u32) -> Option<CellStyle>;

    fn set_style(&mut self, row: u32, col: u32, style: CellStyle);

    fn image_anchors(&self) -> Vec<ImageAnchor>;

    fn move_image(&mut self, name: &str, row: u32, col: u32);

    /// Highest row holding any cell content.
    fn max_row(&self) -> u32;
}

/// In-memory [`Worksheet`] implementation, used as the test double and as
/// the reference for backend adapters.
#[derive(Debug, Clone, Default)]
pub struct MemoryWorksheet {
    name: String,
    cells: BTreeMap<(u32, u32), CellValue>,
    styles: BTreeMap<(u32, u32), CellStyle>,
    images: Vec<ImageAnchor>,
}

impl MemoryWorksheet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_text(mut self, row: u32, col: u32, text: impl Into<String>) -> Self {
        self.cells.insert((row, col), CellValue::Text(text.into()));
        self
    }

    pub fn add_image(&mut self, anchor: ImageAnchor) {
        self.images.push(anchor);
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }
}

impl Worksheet for MemoryWorksheet {
    fn name(&self) -> &str {
        &self.name
    }

    fn read(&self, row: u32, col: u32) -> Option<CellValue> {
        self.cells.get(&(row, col)).cloned()
    }

    fn write(&mut self, row: u32, col: u32, value: CellValue) {
        self.cells.insert((row, col), value);
    }

    fn insert_rows(&mut self, at_row: u32, count: u32) {
        if count == 0 {
            return;
        }
        self.cells = shift_keyed(&self.cells, at_row, count);
        self.styles = shift_keyed(&self.styles, at_row, count);
    }

    fn style(&self, row: u32, col: u32) -> Option<CellStyle> {
        self.styles.get(&(row, col)).cloned()
    }

    fn set_style(&mut self, row: u32, col: u32, style: CellStyle) {
        self.styles.insert((row, col), style);
    }

    fn image_anchors(&self) -> Vec<ImageAnchor> {
        self.images.clone()
    }

    fn move_image(&mut self, name: &str, row: u32, col: u32) {
        if let Some(image) = self.images.iter_mut().find(|i| i.name == name) {
            image.row = row;
            image.col = col;
        }
    }

    fn max_row(&self) -> u32 {
        self.cells.keys().map(|(row, _)| *row).max().unwrap_or(0)
    }
}

fn shift_keyed<T: Clone>(
    map: &BTreeMap<(u32, u32), T>,
    at_row: u32,
    count: u32,
) -> BTreeMap<(u32, u32), T> {
    map.iter()
        .map(|(&(row, col), value)| {
            let new_row = if row >= at_row { row + count } else { row };
            ((new_row, col), value.clone())
        })
        .collect()
}
