// 📒 Financial Records - typed schema for the seven source tables
//
// Field names are our own. Backend column names appear only in the
// deserialize renames below (CSV import, JSON payloads) and in the column
// lists of the `db::Table` impls. Serialized output uses our names.

use serde::{Deserialize, Deserializer, Serialize};

/// Fiscal year index. Balance sheet starts at 0, income statement at 1.
pub type Year = i64;

/// NULL (JSON) or an empty cell (CSV) reads as the type's zero value
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// ============================================================================
// BALANCE SHEET (bangcandoiketoan)
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BalanceSheetRow {
    #[serde(rename(deserialize = "nam"))]
    pub year: Year,

    // ------------------------------------------------------------------------
    // Assets
    // ------------------------------------------------------------------------
    #[serde(rename(deserialize = "ts_nganhan"), default, deserialize_with = "null_as_default")]
    pub current_assets: f64,

    #[serde(rename(deserialize = "tienmat"), default, deserialize_with = "null_as_default")]
    pub cash: f64,

    #[serde(rename(deserialize = "hangtonkho"), default, deserialize_with = "null_as_default")]
    pub inventory: f64,

    #[serde(rename(deserialize = "khoanphaithu_cdkt"), default, deserialize_with = "null_as_default")]
    pub receivables: f64,

    #[serde(rename(deserialize = "ts_daihan"), default, deserialize_with = "null_as_default")]
    pub long_term_assets: f64,

    /// Editable on the base year row
    #[serde(rename(deserialize = "ts_vohinh"), default, deserialize_with = "null_as_default")]
    pub intangible_assets: f64,

    /// Tangible fixed assets at net book value
    #[serde(rename(deserialize = "ts_huuhinh_giatriconlai"), default, deserialize_with = "null_as_default")]
    pub tangible_assets_net: f64,

    #[serde(rename(deserialize = "tongtaisan"), default, deserialize_with = "null_as_default")]
    pub total_assets: f64,

    // ------------------------------------------------------------------------
    // Equity & liabilities
    // ------------------------------------------------------------------------
    #[serde(rename(deserialize = "voncsh"), default, deserialize_with = "null_as_default")]
    pub equity: f64,

    /// Editable on the base year row
    #[serde(rename(deserialize = "codonggopvon"), default, deserialize_with = "null_as_default")]
    pub shareholder_capital: f64,

    /// Editable on the base year row
    #[serde(rename(deserialize = "vongopcsh"), default, deserialize_with = "null_as_default")]
    pub paid_in_capital: f64,

    #[serde(rename(deserialize = "loinhuansauthue_cdkt"), default, deserialize_with = "null_as_default")]
    pub retained_earnings: f64,

    #[serde(rename(deserialize = "nophaitra"), default, deserialize_with = "null_as_default")]
    pub liabilities: f64,

    #[serde(rename(deserialize = "khoanvayphaitra"), default, deserialize_with = "null_as_default")]
    pub loans_payable: f64,

    #[serde(rename(deserialize = "tongnguonvon"), default, deserialize_with = "null_as_default")]
    pub total_liabilities_and_equity: f64,
}

// ============================================================================
// INCOME STATEMENT (baocaokqhdkd)
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IncomeStatementRow {
    #[serde(rename(deserialize = "nam"))]
    pub year: Year,

    #[serde(rename(deserialize = "soluong"), default, deserialize_with = "null_as_default")]
    pub units: f64,

    #[serde(rename(deserialize = "giaban"), default, deserialize_with = "null_as_default")]
    pub unit_price: f64,

    #[serde(rename(deserialize = "doanhthu"), default, deserialize_with = "null_as_default")]
    pub revenue: f64,

    #[serde(rename(deserialize = "nvl"), default, deserialize_with = "null_as_default")]
    pub materials: f64,

    #[serde(rename(deserialize = "chiphikhauhao"), default, deserialize_with = "null_as_default")]
    pub depreciation_expense: f64,

    #[serde(rename(deserialize = "chiphiluong"), default, deserialize_with = "null_as_default")]
    pub payroll: f64,

    #[serde(rename(deserialize = "tongchiphi_giavon"), default, deserialize_with = "null_as_default")]
    pub total_cost: f64,

    /// Operating profit, before interest and tax
    #[serde(rename(deserialize = "loinhuangop_ebit"), default, deserialize_with = "null_as_default")]
    pub ebit: f64,

    #[serde(rename(deserialize = "chiphilaivay"), default, deserialize_with = "null_as_default")]
    pub interest_expense: f64,

    #[serde(rename(deserialize = "loinhuantruocthue_ebt"), default, deserialize_with = "null_as_default")]
    pub ebt: f64,

    #[serde(rename(deserialize = "thuetndn"), default, deserialize_with = "null_as_default")]
    pub income_tax: f64,

    #[serde(rename(deserialize = "loinhuansauthue"), default, deserialize_with = "null_as_default")]
    pub net_income: f64,
}

// ============================================================================
// CASH FLOW (baocaoluuchuyentiente)
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CashFlowRow {
    #[serde(rename(deserialize = "nam"))]
    pub year: Year,

    #[serde(rename(deserialize = "loinhuansauthue"), default, deserialize_with = "null_as_default")]
    pub net_income: f64,

    #[serde(rename(deserialize = "khauhao"), default, deserialize_with = "null_as_default")]
    pub depreciation: f64,

    #[serde(rename(deserialize = "khoanphaithu"), default, deserialize_with = "null_as_default")]
    pub receivables_change: f64,

    #[serde(rename(deserialize = "nvldutru"), default, deserialize_with = "null_as_default")]
    pub materials_reserve: f64,

    #[serde(rename(deserialize = "khoanphaitra_lc"), default, deserialize_with = "null_as_default")]
    pub payables_change: f64,

    #[serde(rename(deserialize = "net_cfo"), default, deserialize_with = "null_as_default")]
    pub net_cfo: f64,

    #[serde(rename(deserialize = "cfi_capex"), default, deserialize_with = "null_as_default")]
    pub capex: f64,

    #[serde(rename(deserialize = "net_cfi"), default, deserialize_with = "null_as_default")]
    pub net_cfi: f64,

    #[serde(rename(deserialize = "vay"), default, deserialize_with = "null_as_default")]
    pub borrowing: f64,

    #[serde(rename(deserialize = "gopvon"), default, deserialize_with = "null_as_default")]
    pub equity_contribution: f64,

    #[serde(rename(deserialize = "net_cff"), default, deserialize_with = "null_as_default")]
    pub net_cff: f64,

    #[serde(rename(deserialize = "tienmatthaydoitrongky"), default, deserialize_with = "null_as_default")]
    pub net_cash_change: f64,

    #[serde(rename(deserialize = "tienmatdauky"), default, deserialize_with = "null_as_default")]
    pub opening_cash: f64,

    #[serde(rename(deserialize = "tienmatcuoiky"), default, deserialize_with = "null_as_default")]
    pub closing_cash: f64,

    #[serde(rename(deserialize = "fcf"), default, deserialize_with = "null_as_default")]
    pub free_cash_flow: f64,
}

// ============================================================================
// DEPRECIATION SCHEDULE (bangkhauhao) - one row per asset, keyed by id
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DepreciationAsset {
    pub id: i64,

    #[serde(rename(deserialize = "tenmay"))]
    pub asset_name: String,

    #[serde(rename(deserialize = "nguyengia"), default, deserialize_with = "null_as_default")]
    pub cost: f64,

    #[serde(rename(deserialize = "sonamsudung"), default, deserialize_with = "null_as_default")]
    pub useful_life_years: i64,

    #[serde(rename(deserialize = "nambatdau"), default, deserialize_with = "null_as_default")]
    pub start_year: Year,
}

// ============================================================================
// LOAN SCHEDULE (bangvay)
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoanYearRecord {
    #[serde(rename(deserialize = "nam"))]
    pub year: Year,

    #[serde(rename(deserialize = "tienmatcuoiky"), default, deserialize_with = "null_as_default")]
    pub ending_cash: f64,

    #[serde(rename(deserialize = "nhucauchitieu"), default, deserialize_with = "null_as_default")]
    pub funding_need: f64,

    #[serde(rename(deserialize = "khoanvay"), default, deserialize_with = "null_as_default")]
    pub loan_amount: f64,

    /// Fraction, not percent
    #[serde(rename(deserialize = "laisuat"), default, deserialize_with = "null_as_default")]
    pub interest_rate: f64,

    #[serde(rename(deserialize = "laivay"), default, deserialize_with = "null_as_default")]
    pub interest_expense: f64,

    #[serde(rename(deserialize = "du"), default, deserialize_with = "null_as_default")]
    pub balance: f64,
}

// ============================================================================
// WACC (wacc)
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WaccRow {
    #[serde(rename(deserialize = "nam"))]
    pub year: Year,

    #[serde(rename(deserialize = "re"), default, deserialize_with = "null_as_default")]
    pub cost_of_equity: f64,

    #[serde(rename(deserialize = "rd"), default, deserialize_with = "null_as_default")]
    pub cost_of_debt: f64,

    #[serde(rename(deserialize = "tc"), default, deserialize_with = "null_as_default")]
    pub tax_rate: f64,

    #[serde(rename(deserialize = "e"), default, deserialize_with = "null_as_default")]
    pub equity_value: f64,

    #[serde(rename(deserialize = "d"), default, deserialize_with = "null_as_default")]
    pub debt_value: f64,

    #[serde(rename(deserialize = "v"), default, deserialize_with = "null_as_default")]
    pub total_value: f64,

    #[serde(rename(deserialize = "wacc_value"), default, deserialize_with = "null_as_default")]
    pub wacc: f64,
}

// ============================================================================
// STORE COUNT (socuahang)
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreCountRow {
    #[serde(rename(deserialize = "nam"))]
    pub year: Year,

    #[serde(rename(deserialize = "soluong"), default, deserialize_with = "null_as_default")]
    pub stores: i64,
}

// ============================================================================
// YEAR-INDEXED ACCESS
// ============================================================================

/// Records that carry a fiscal year key
pub trait YearIndexed {
    fn year(&self) -> Year;
}

macro_rules! year_indexed {
    ($($ty:ty),* $(,)?) => {
        $(impl YearIndexed for $ty {
            fn year(&self) -> Year {
                self.year
            }
        })*
    };
}

year_indexed!(
    BalanceSheetRow,
    IncomeStatementRow,
    CashFlowRow,
    LoanYearRecord,
    WaccRow,
    StoreCountRow,
);

/// Find the row for an exact year
pub fn find_year<T: YearIndexed>(rows: &[T], year: Year) -> Option<&T> {
    rows.iter().find(|row| row.year() == year)
}

// ============================================================================
// EDITABLE INPUTS (year-0 overrides)
// ============================================================================

/// The three base-year values a user may overwrite
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EditableInputs {
    pub intangible_assets: f64,
    pub shareholder_capital: f64,
    pub paid_in_capital: f64,
}

impl Default for EditableInputs {
    fn default() -> Self {
        EditableInputs {
            intangible_assets: 1000.0,
            shareholder_capital: 500.0,
            paid_in_capital: 1000.0,
        }
    }
}

impl EditableInputs {
    /// Read the current inputs off a base-year row
    pub fn from_base_row(row: &BalanceSheetRow) -> Self {
        EditableInputs {
            intangible_assets: row.intangible_assets,
            shareholder_capital: row.shareholder_capital,
            paid_in_capital: row.paid_in_capital,
        }
    }

    /// Set one field from free-text form input, by field name
    ///
    /// Returns false for an unknown field name.
    pub fn set_field(&mut self, name: &str, raw: &str) -> bool {
        let value = parse_input(raw);
        match name {
            "intangible_assets" => self.intangible_assets = value,
            "shareholder_capital" => self.shareholder_capital = value,
            "paid_in_capital" => self.paid_in_capital = value,
            _ => return false,
        }
        true
    }
}

/// Parse a form value; anything unparseable becomes 0
pub fn parse_input(raw: &str) -> f64 {
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => v,
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_column_names_deserialize() {
        let json = serde_json::json!({
            "nam": 0,
            "tienmat": 500.0,
            "tongtaisan": 1000.0,
            "ts_vohinh": 1000.0,
            "codonggopvon": 500.0,
        });

        let row: BalanceSheetRow = serde_json::from_value(json).unwrap();

        assert_eq!(row.year, 0);
        assert_eq!(row.cash, 500.0);
        assert_eq!(row.total_assets, 1000.0);
        assert_eq!(row.shareholder_capital, 500.0);
        // Missing columns default to zero
        assert_eq!(row.inventory, 0.0);
    }

    #[test]
    fn test_null_columns_read_as_zero() {
        let json = serde_json::json!({
            "nam": 3,
            "doanhthu": null,
            "loinhuansauthue": 150.0,
        });

        let row: IncomeStatementRow = serde_json::from_value(json).unwrap();

        assert_eq!(row.year, 3);
        assert_eq!(row.revenue, 0.0);
        assert_eq!(row.net_income, 150.0);
    }

    #[test]
    fn test_find_year() {
        let rows = vec![
            StoreCountRow { year: 1, stores: 3 },
            StoreCountRow { year: 2, stores: 5 },
        ];

        assert_eq!(find_year(&rows, 2).map(|r| r.stores), Some(5));
        assert!(find_year(&rows, 7).is_none());
    }

    #[test]
    fn test_parse_input_falls_back_to_zero() {
        assert_eq!(parse_input("1250.5"), 1250.5);
        assert_eq!(parse_input(" 42 "), 42.0);
        assert_eq!(parse_input("abc"), 0.0);
        assert_eq!(parse_input(""), 0.0);
        assert_eq!(parse_input("NaN"), 0.0);
    }

    #[test]
    fn test_set_field() {
        let mut inputs = EditableInputs::default();

        assert!(inputs.set_field("paid_in_capital", "2000"));
        assert!(inputs.set_field("intangible_assets", "oops"));
        assert!(!inputs.set_field("unknown", "1"));

        assert_eq!(inputs.paid_in_capital, 2000.0);
        assert_eq!(inputs.intangible_assets, 0.0);
        assert_eq!(inputs.shareholder_capital, 500.0);
    }
}
