use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Reporting period a balance key belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PeriodType {
    Annual,
    Semiannual,
}

impl PeriodType {
    pub fn from_token(token: &str) -> Option<Self> {
        match token.to_uppercase().as_str() {
            "ANUAL" => Some(Self::Annual),
            "SEMESTRAL" => Some(Self::Semiannual),
            _ => None,
        }
    }

    pub fn token(&self) -> &'static str {
        match self {
            Self::Annual => "ANUAL",
            Self::Semiannual => "SEMESTRAL",
        }
    }
}

/// Top-level accounting category of an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Section {
    Asset,
    Liability,
    Equity,
    IncomeStatement,
}

impl Section {
    pub fn from_token(token: &str) -> Option<Self> {
        match token.to_uppercase().as_str() {
            "ACTIVO" => Some(Self::Asset),
            "PASIVO" => Some(Self::Liability),
            "PATRIMONIO" => Some(Self::Equity),
            "RESULTADOS" | "ER" => Some(Self::IncomeStatement),
            _ => None,
        }
    }

    pub fn token(&self) -> &'static str {
        match self {
            Self::Asset => "ACTIVO",
            Self::Liability => "PASIVO",
            Self::Equity => "PATRIMONIO",
            Self::IncomeStatement => "RESULTADOS",
        }
    }
}

/// Current / non-current split, present only on some Asset and Liability keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AccountSubtype {
    Current,
    NonCurrent,
    NotTagged,
}

impl AccountSubtype {
    fn from_segment(segment: &str) -> Option<Self> {
        match segment.to_uppercase().as_str() {
            "C" | "CORRIENTE" => Some(Self::Current),
            "NC" | "NO CORRIENTE" | "NOCORRIENTE" => Some(Self::NonCurrent),
            "NT" => Some(Self::NotTagged),
            _ => None,
        }
    }
}

/// Suffixes that [`normalize_balances`] strips from raw key strings.
const SUBTYPE_SUFFIXES: [&str; 6] = ["-C", "-NC", "-NT", "-CORRIENTE", "-NO CORRIENTE", "-NOCORRIENTE"];

/// A decoded balance key.
///
/// The wire format is a flat string with segments joined by `-`:
/// `PERIODTYPE-YYYY-MM-DD-SECTION-AccountName[-Subtype]`. Account names may
/// themselves contain `-`, so everything after the five fixed leading
/// segments belongs to the name, minus a recognized trailing subtype segment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceKey {
    pub period_type: PeriodType,
    pub date: NaiveDate,
    pub section: Section,
    pub account_name: String,
    pub subtype: Option<AccountSubtype>,
}

impl BalanceKey {
    /// Decodes a raw key string. Returns `None` for anything that does not
    /// match the expected shape: foreign and malformed keys are skipped,
    /// never treated as errors.
    pub fn decode(raw: &str) -> Option<Self> {
        let segments: Vec<&str> = raw.split('-').collect();
        if segments.len() < 6 {
            return None;
        }

        let period_type = PeriodType::from_token(segments[0])?;
        let year: i32 = segments[1].parse().ok()?;
        let month: u32 = segments[2].parse().ok()?;
        let day: u32 = segments[3].parse().ok()?;
        let date = NaiveDate::from_ymd_opt(year, month, day)?;
        let section = Section::from_token(segments[4])?;

        let mut name_segments = &segments[5..];
        let mut subtype = None;
        if name_segments.len() > 1 {
            if let Some(parsed) = AccountSubtype::from_segment(name_segments[name_segments.len() - 1]) {
                subtype = Some(parsed);
                name_segments = &name_segments[..name_segments.len() - 1];
            }
        }

        let account_name = name_segments.join("-");
        if account_name.is_empty() {
            return None;
        }

        Some(Self {
            period_type,
            date,
            section,
            account_name,
            subtype,
        })
    }

    pub fn encode(&self) -> String {
        let base = format!(
            "{}-{}-{}-{}",
            self.period_type.token(),
            self.date.format("%Y-%m-%d"),
            self.section.token(),
            self.account_name
        );
        match self.subtype {
            Some(AccountSubtype::Current) => format!("{}-C", base),
            Some(AccountSubtype::NonCurrent) => format!("{}-NC", base),
            Some(AccountSubtype::NotTagged) => format!("{}-NT", base),
            None => base,
        }
    }
}

/// Strips known subtype suffixes from every key, producing a subtype-agnostic
/// mapping.
///
/// If two differently-suffixed keys normalize to the same base key, the one
/// encountered later overwrites the earlier value. Correct input does not
/// collide (the subtype is part of the account identity upstream), but the
/// stripping itself does not verify that.
pub fn normalize_balances(balances: &BTreeMap<String, f64>) -> BTreeMap<String, f64> {
    let mut normalized = BTreeMap::new();
    for (key, value) in balances {
        let upper = key.to_uppercase();
        let mut base = key.as_str();
        for suffix in SUBTYPE_SUFFIXES {
            if upper.ends_with(suffix) {
                base = &key[..key.len() - suffix.len()];
                break;
            }
        }
        normalized.insert(base.to_string(), *value);
    }
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_plain_key() {
        let key = BalanceKey::decode("ANUAL-2023-12-31-ACTIVO-Caja").unwrap();
        assert_eq!(key.period_type, PeriodType::Annual);
        assert_eq!(key.date, NaiveDate::from_ymd_opt(2023, 12, 31).unwrap());
        assert_eq!(key.section, Section::Asset);
        assert_eq!(key.account_name, "Caja");
        assert_eq!(key.subtype, None);
    }

    #[test]
    fn test_decode_key_with_subtype() {
        let key = BalanceKey::decode("SEMESTRAL-2023-06-30-PASIVO-Cuentas por Pagar-NC").unwrap();
        assert_eq!(key.period_type, PeriodType::Semiannual);
        assert_eq!(key.section, Section::Liability);
        assert_eq!(key.account_name, "Cuentas por Pagar");
        assert_eq!(key.subtype, Some(AccountSubtype::NonCurrent));
    }

    #[test]
    fn test_decode_name_containing_dashes() {
        let key = BalanceKey::decode("ANUAL-2023-12-31-ACTIVO-Cuentas por Cobrar-Terceros").unwrap();
        // "Terceros" is not a subtype token, so it stays part of the name.
        assert_eq!(key.account_name, "Cuentas por Cobrar-Terceros");
        assert_eq!(key.subtype, None);
    }

    #[test]
    fn test_decode_subtype_spelled_out() {
        let key = BalanceKey::decode("ANUAL-2023-12-31-ACTIVO-Existencias-Corriente").unwrap();
        assert_eq!(key.subtype, Some(AccountSubtype::Current));
        let key = BalanceKey::decode("ANUAL-2023-12-31-ACTIVO-Existencias-No Corriente").unwrap();
        assert_eq!(key.subtype, Some(AccountSubtype::NonCurrent));
    }

    #[test]
    fn test_decode_rejects_malformed_keys() {
        assert!(BalanceKey::decode("").is_none());
        assert!(BalanceKey::decode("ANUAL-2023-12-31-ACTIVO").is_none());
        assert!(BalanceKey::decode("MENSUAL-2023-12-31-ACTIVO-Caja").is_none());
        assert!(BalanceKey::decode("ANUAL-2023-13-31-ACTIVO-Caja").is_none());
        assert!(BalanceKey::decode("ANUAL-2023-12-31-INVENTARIO-Caja").is_none());
    }

    #[test]
    fn test_decode_is_case_insensitive_on_tokens() {
        let key = BalanceKey::decode("anual-2023-12-31-activo-Caja-c").unwrap();
        assert_eq!(key.period_type, PeriodType::Annual);
        assert_eq!(key.section, Section::Asset);
        assert_eq!(key.subtype, Some(AccountSubtype::Current));
    }

    #[test]
    fn test_encode_round_trip() {
        let raw = "ANUAL-2023-12-31-PATRIMONIO-Capital Social";
        let key = BalanceKey::decode(raw).unwrap();
        assert_eq!(key.encode(), raw);

        let raw = "ANUAL-2023-12-31-ACTIVO-Caja-C";
        let key = BalanceKey::decode(raw).unwrap();
        assert_eq!(key.encode(), raw);
    }

    #[test]
    fn test_normalize_strips_suffixes() {
        let mut balances = BTreeMap::new();
        balances.insert("ANUAL-2023-12-31-ACTIVO-Caja-C".to_string(), 100.0);
        balances.insert("ANUAL-2023-12-31-PASIVO-Prestamos-NO CORRIENTE".to_string(), 50.0);
        balances.insert("ANUAL-2023-12-31-PATRIMONIO-Capital".to_string(), 30.0);

        let normalized = normalize_balances(&balances);
        assert_eq!(normalized.get("ANUAL-2023-12-31-ACTIVO-Caja"), Some(&100.0));
        assert_eq!(normalized.get("ANUAL-2023-12-31-PASIVO-Prestamos"), Some(&50.0));
        assert_eq!(normalized.get("ANUAL-2023-12-31-PATRIMONIO-Capital"), Some(&30.0));
        assert_eq!(normalized.len(), 3);
    }

    #[test]
    fn test_normalize_collision_last_write_wins() {
        // Two subtypes of the same base name collide after stripping. The
        // later key (in map order) wins; flagged as ambiguous upstream
        // behavior, kept as-is.
        let mut balances = BTreeMap::new();
        balances.insert("ANUAL-2023-12-31-ACTIVO-Inversiones-C".to_string(), 10.0);
        balances.insert("ANUAL-2023-12-31-ACTIVO-Inversiones-NC".to_string(), 20.0);

        let normalized = normalize_balances(&balances);
        assert_eq!(normalized.len(), 1);
        assert_eq!(normalized.get("ANUAL-2023-12-31-ACTIVO-Inversiones"), Some(&20.0));
    }
}
