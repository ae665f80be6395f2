use crate::key::{AccountSubtype, BalanceKey, PeriodType, Section};
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// Account values for a ratio block: Asset and Liability are split by
/// current/non-current subtype, Equity and IncomeStatement stay flat.
///
/// Downstream code matches on the variant instead of probing the shape of
/// a value to guess whether it is split.
#[derive(Debug, Clone, PartialEq)]
pub enum SectionAccounts {
    Flat(BTreeMap<String, f64>),
    BySubtype {
        current: BTreeMap<String, f64>,
        non_current: BTreeMap<String, f64>,
    },
}

fn decoded_keys<'a>(
    balances: &'a BTreeMap<String, f64>,
    period_type: PeriodType,
) -> impl Iterator<Item = (BalanceKey, f64)> + 'a {
    balances.iter().filter_map(move |(raw, value)| {
        let key = BalanceKey::decode(raw)?;
        (key.period_type == period_type).then_some((key, *value))
    })
}

/// Groups distinct account names by section for one period type.
///
/// Names come back sorted lexicographically and deduplicated; the ordering
/// is what makes regeneration idempotent.
pub fn classify(
    balances: &BTreeMap<String, f64>,
    period_type: PeriodType,
) -> BTreeMap<Section, Vec<String>> {
    let mut sections: BTreeMap<Section, Vec<String>> = BTreeMap::new();

    for (key, _) in decoded_keys(balances, period_type) {
        sections.entry(key.section).or_default().push(key.account_name);
    }

    for names in sections.values_mut() {
        names.sort();
        names.dedup();
    }
    sections
}

/// Groups values by section, then date, then account name. Used by the
/// multi-date views (balance columns, horizontal/vertical analysis).
pub fn classify_with_dates(
    balances: &BTreeMap<String, f64>,
    period_type: PeriodType,
) -> BTreeMap<Section, BTreeMap<NaiveDate, BTreeMap<String, f64>>> {
    let mut sections: BTreeMap<Section, BTreeMap<NaiveDate, BTreeMap<String, f64>>> =
        BTreeMap::new();

    for (key, value) in decoded_keys(balances, period_type) {
        sections
            .entry(key.section)
            .or_default()
            .entry(key.date)
            .or_default()
            .insert(key.account_name, value);
    }
    sections
}

/// Splits one date's accounts the way the ratios sheet consumes them:
/// Asset and Liability keyed by subtype, Equity and IncomeStatement flat.
/// Keys without a subtype tag land in the current bucket.
pub fn classify_for_ratios(
    balances: &BTreeMap<String, f64>,
    period_type: PeriodType,
    date: NaiveDate,
) -> BTreeMap<Section, SectionAccounts> {
    let mut sections: BTreeMap<Section, SectionAccounts> = BTreeMap::new();

    for (key, value) in decoded_keys(balances, period_type) {
        if key.date != date {
            continue;
        }
        match key.section {
            Section::Asset | Section::Liability => {
                let entry = sections.entry(key.section).or_insert_with(|| {
                    SectionAccounts::BySubtype {
                        current: BTreeMap::new(),
                        non_current: BTreeMap::new(),
                    }
                });
                if let SectionAccounts::BySubtype { current, non_current } = entry {
                    match key.subtype {
                        Some(AccountSubtype::NonCurrent) => {
                            non_current.insert(key.account_name, value);
                        }
                        _ => {
                            current.insert(key.account_name, value);
                        }
                    }
                }
            }
            Section::Equity | Section::IncomeStatement => {
                let entry = sections
                    .entry(key.section)
                    .or_insert_with(|| SectionAccounts::Flat(BTreeMap::new()));
                if let SectionAccounts::Flat(accounts) = entry {
                    accounts.insert(key.account_name, value);
                }
            }
        }
    }
    sections
}

/// All distinct dates present for a period type, sorted ascending.
pub fn distinct_dates(balances: &BTreeMap<String, f64>, period_type: PeriodType) -> Vec<NaiveDate> {
    let mut dates: Vec<NaiveDate> = decoded_keys(balances, period_type)
        .map(|(key, _)| key.date)
        .collect();
    dates.sort();
    dates.dedup();
    dates
}
