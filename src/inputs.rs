use crate::error::Result;
use chrono::NaiveDate;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A debit/credit pair from the adjustments and reclassifications register.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AdjustmentEntry {
    #[serde(rename = "debe")]
    pub debit: f64,
    #[serde(rename = "haber")]
    pub credit: f64,
}

/// Everything the reporting layer hands over for one fill run.
///
/// Key formats:
/// - `balances`: `PERIODTYPE-YYYY-MM-DD-SECTION-AccountName[-Subtype]`
/// - `opening_balances`: `AccountName-YYYY-MM-DD` (possibly several dates
///   per account; the most recent one wins)
/// - `auxiliary_registers` and `adjustments`: plain account names
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FillInputs {
    pub balances: BTreeMap<String, f64>,

    #[serde(default, rename = "registros_auxiliares")]
    pub auxiliary_registers: BTreeMap<String, f64>,

    #[serde(default, rename = "saldos_iniciales")]
    pub opening_balances: BTreeMap<String, f64>,

    #[serde(default, rename = "ajustes_reclasificaciones")]
    pub adjustments: BTreeMap<String, AdjustmentEntry>,
}

impl FillInputs {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Looks up an adjustment entry for an account.
    ///
    /// Exact name match first. If that fails, falls back to case-insensitive
    /// substring containment in either direction and returns the FIRST match
    /// in map order, not the best one. The fuzziness tolerates naming drift
    /// between the balance export and the adjustment register.
    pub fn lookup_adjustment(&self, account_name: &str) -> Option<&AdjustmentEntry> {
        if let Some(entry) = self.adjustments.get(account_name) {
            return Some(entry);
        }

        let needle = account_name.to_lowercase();
        for (candidate, entry) in &self.adjustments {
            let candidate_lower = candidate.to_lowercase();
            if candidate_lower.contains(&needle) || needle.contains(&candidate_lower) {
                debug!(
                    "Adjustment lookup for '{}' matched '{}' by substring",
                    account_name, candidate
                );
                return Some(entry);
            }
        }
        None
    }

    /// Collapses the opening-balance register to one value per account,
    /// keeping the value with the most recent date. Keys without a parseable
    /// trailing date are skipped.
    pub fn latest_opening_balances(&self) -> BTreeMap<String, f64> {
        let mut latest: BTreeMap<String, (NaiveDate, f64)> = BTreeMap::new();

        for (key, value) in &self.opening_balances {
            let Some((name, date)) = split_opening_key(key) else {
                debug!("Skipping opening-balance key without date suffix: '{}'", key);
                continue;
            };
            match latest.get(&name) {
                Some((existing, _)) if *existing >= date => {}
                _ => {
                    latest.insert(name, (date, *value));
                }
            }
        }

        latest.into_iter().map(|(name, (_, value))| (name, value)).collect()
    }
}

/// Splits `AccountName-YYYY-MM-DD` into name and date. The name may contain
/// `-`, so only the trailing three segments are read as a date.
fn split_opening_key(key: &str) -> Option<(String, NaiveDate)> {
    let segments: Vec<&str> = key.split('-').collect();
    if segments.len() < 4 {
        return None;
    }

    let tail = &segments[segments.len() - 3..];
    let year: i32 = tail[0].parse().ok()?;
    let month: u32 = tail[1].parse().ok()?;
    let day: u32 = tail[2].parse().ok()?;
    let date = NaiveDate::from_ymd_opt(year, month, day)?;

    let name = segments[..segments.len() - 3].join("-");
    if name.is_empty() {
        return None;
    }
    Some((name, date))
}
