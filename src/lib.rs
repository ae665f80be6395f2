//! # Audit Workbook Filler
//!
//! A library for filling audit workbook templates (balance sheets,
//! centralizing sheets, ratio analyses) from a structured balance
//! dictionary keyed by period/section/account strings.
//!
//! ## Core Concepts
//!
//! - **Balance key**: a flat, `-`-delimited string encoding period type,
//!   date, section, account name, and an optional current/non-current
//!   subtype (`ANUAL-2023-12-31-ACTIVO-Caja-C`)
//! - **Section**: top-level accounting category (Activo, Pasivo,
//!   Patrimonio, Resultados)
//! - **Anchor**: a template row located by label text, falling back to a
//!   hardcoded row when the label is missing or renamed
//! - **Capacity reconciliation**: templates reserve a fixed number of
//!   account rows per section; when the classified data holds more, rows
//!   are inserted before the total row and every anchor, style, formula,
//!   and image below the insertion point is moved along
//!
//! ## Example
//!
//! ```rust,ignore
//! use audit_workbook_filler::*;
//!
//! let inputs = FillInputs::from_json(&payload)?;
//! let filler = WorkbookFiller::new(PeriodType::Annual);
//! let report = filler.fill_sheet(DocumentKind::Balance, &mut sheet, &inputs)?;
//! println!("wrote {} accounts", report.accounts_written);
//! ```
//!
//! The library never opens or saves files: callers hand in anything
//! implementing [`Worksheet`] and persist the mutated object themselves.

pub mod classifier;
pub mod error;
pub mod fill;
pub mod formula;
pub mod inputs;
pub mod key;
pub mod locator;
pub mod rows;
pub mod style;
pub mod worksheet;

pub use classifier::{classify, classify_for_ratios, classify_with_dates, distinct_dates, SectionAccounts};
pub use error::{FillError, Result};
pub use fill::{FillReport, ACCOUNTS_START_ROW};
pub use formula::{build_sum_formula, column_letter, shift_formula_rows};
pub use inputs::{AdjustmentEntry, FillInputs};
pub use key::{normalize_balances, AccountSubtype, BalanceKey, PeriodType, Section};
pub use locator::{find_anchor, find_column_by_header, ResolvedAnchor};
pub use rows::{ensure_capacity, shift_images};
pub use style::{copy_style, replicate_row_style};
pub use worksheet::{CellStyle, CellValue, ImageAnchor, MemoryWorksheet, Worksheet};

use log::{info, warn};

/// The document templates this library knows how to fill. Which template a
/// physical file corresponds to is decided upstream by file-name matching;
/// here the caller states the kind explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Balance,
    Centralizing,
    Analysis,
    Ratios,
    Materiality,
    OpeningBalances,
    AuxiliaryComparison,
}

impl DocumentKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Balance => "balance general",
            Self::Centralizing => "hoja centralizadora",
            Self::Analysis => "analisis horizontal-vertical",
            Self::Ratios => "ratios",
            Self::Materiality => "materialidad",
            Self::OpeningBalances => "saldos iniciales",
            Self::AuxiliaryComparison => "registros auxiliares",
        }
    }
}

/// What happened to one sheet during a batch fill.
#[derive(Debug)]
pub struct SheetOutcome {
    pub kind: DocumentKind,
    pub sheet_name: String,
    pub result: Result<FillReport>,
}

/// Entry point: dispatches balance data onto workbook sheets, one handler
/// per document type. A failure in one sheet never blocks the others.
pub struct WorkbookFiller {
    period: PeriodType,
}

impl WorkbookFiller {
    pub fn new(period: PeriodType) -> Self {
        Self { period }
    }

    /// Fills a single sheet of the given document kind.
    pub fn fill_sheet(
        &self,
        kind: DocumentKind,
        sheet: &mut dyn Worksheet,
        inputs: &FillInputs,
    ) -> Result<FillReport> {
        info!("Filling '{}' as {}", sheet.name(), kind.label());
        let report = match kind {
            DocumentKind::Balance => fill::balance::fill_balance_sheet(sheet, inputs, self.period)?,
            DocumentKind::Centralizing => {
                fill::centralizing::fill_centralizing_sheet(sheet, inputs, self.period)?
            }
            DocumentKind::Analysis => fill::analysis::fill_analysis_sheet(sheet, inputs, self.period)?,
            DocumentKind::Ratios => fill::ratios::fill_ratios_sheet(sheet, inputs, self.period)?,
            DocumentKind::Materiality => {
                fill::materiality::fill_materiality_sheet(sheet, inputs, self.period)?
            }
            DocumentKind::OpeningBalances => {
                fill::opening::fill_opening_balance_sheet(sheet, inputs, self.period)?
            }
            DocumentKind::AuxiliaryComparison => {
                fill::auxiliary::fill_auxiliary_sheet(sheet, inputs, self.period)?
            }
        };

        if !report.inferred_anchors.is_empty() {
            warn!(
                "'{}': {} anchor(s) placed on default rows: {:?}",
                sheet.name(),
                report.inferred_anchors.len(),
                report.inferred_anchors
            );
        }
        Ok(report)
    }

    /// Fills a batch of sheets, containing any error at the sheet boundary:
    /// a sheet that cannot be processed is reported in its outcome and the
    /// remaining sheets are still attempted.
    pub fn fill_all<'a>(
        &self,
        jobs: Vec<(DocumentKind, &'a mut dyn Worksheet)>,
        inputs: &FillInputs,
    ) -> Vec<SheetOutcome> {
        let mut outcomes = Vec::with_capacity(jobs.len());
        for (kind, sheet) in jobs {
            let sheet_name = sheet.name().to_string();
            let result = self.fill_sheet(kind, sheet, inputs);
            if let Err(error) = &result {
                warn!("Sheet '{}' left as-is: {}", sheet_name, error);
            }
            outcomes.push(SheetOutcome { kind, sheet_name, result });
        }
        outcomes
    }
}
