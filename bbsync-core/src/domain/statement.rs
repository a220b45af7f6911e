//! Statement domain model
//!
//! Raw line items mirror the bank's `listaLancamento` entries. Normalized
//! transactions are derived from them by the classifier and carry the raw
//! item along for power users.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value as JsonValue};

use crate::domain::result::{Error, Result};
use crate::domain::wire_date::deserialize_wire_date_raw;

// =============================================================================
// Wire models
// =============================================================================

/// One entry of a statement page as returned by the bank
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawLineItem {
    #[serde(rename = "indicadorTipoLancamento", default, deserialize_with = "deserialize_lenient")]
    pub entry_type: Option<String>,
    #[serde(rename = "dataLancamento", default, deserialize_with = "deserialize_wire_date_raw")]
    pub posting_date: Option<String>,
    #[serde(rename = "dataMovimento", default, deserialize_with = "deserialize_wire_date_raw")]
    pub movement_date: Option<String>,
    #[serde(rename = "numeroDocumento", default, deserialize_with = "deserialize_lenient")]
    pub document_number: Option<String>,
    #[serde(rename = "codigoHistorico", default, deserialize_with = "deserialize_lenient")]
    pub history_code: Option<String>,
    #[serde(rename = "textoDescricaoHistorico", default)]
    pub description: String,
    /// Magnitude; the bank sends it non-negative but we do not rely on it
    #[serde(rename = "valorLancamento", default, deserialize_with = "deserialize_amount")]
    pub amount: Decimal,
    #[serde(rename = "indicadorSinalLancamento", default, deserialize_with = "deserialize_lenient")]
    pub sign_indicator: Option<String>,
    #[serde(rename = "textoInformacaoComplementar", default)]
    pub complementary_info: String,
    #[serde(rename = "numeroCpfCnpjContrapartida", default, deserialize_with = "deserialize_lenient")]
    pub counterparty_tax_id: Option<String>,
    /// `F` (individual) or `J` (company)
    #[serde(rename = "indicadorTipoPessoaContrapartida", default, deserialize_with = "deserialize_lenient")]
    pub counterparty_person_type: Option<String>,
    #[serde(rename = "codigoBancoContrapartida", default, deserialize_with = "deserialize_lenient")]
    pub counterparty_bank: Option<String>,
    #[serde(rename = "codigoAgenciaContrapartida", default, deserialize_with = "deserialize_lenient")]
    pub counterparty_agency: Option<String>,
    #[serde(rename = "numeroContaContrapartida", default, deserialize_with = "deserialize_lenient")]
    pub counterparty_account: Option<String>,
    /// Anything else the bank sends, kept verbatim
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

/// One page of the statement endpoint's response
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatementPage {
    #[serde(rename = "numeroPaginaAtual", default, deserialize_with = "deserialize_count")]
    pub page_number: u32,
    #[serde(rename = "quantidadeTotalPagina", default, deserialize_with = "deserialize_count")]
    pub total_pages: u32,
    #[serde(rename = "quantidadeTotalRegistro", default, deserialize_with = "deserialize_count")]
    pub total_record_count: u32,
    #[serde(rename = "listaLancamento", default)]
    pub items: Vec<RawLineItem>,
}

impl StatementPage {
    /// Decode a page from a parsed JSON body
    ///
    /// An empty object is a valid empty page.
    pub fn from_json(value: JsonValue) -> Result<Self> {
        if !value.is_object() {
            return Err(Error::malformed("statement page is not a JSON object"));
        }
        serde_json::from_value(value)
            .map_err(|e| Error::malformed(format!("invalid statement page: {}", e)))
    }
}

// =============================================================================
// Normalized models
// =============================================================================

/// Direction of money movement relative to the account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Debit,
    Credit,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Debit => "debit",
            Direction::Credit => "credit",
        }
    }
}

/// A classified, display-ready transaction
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedTransaction {
    pub direction: Direction,
    pub movement_date: NaiveDate,
    pub counterparty_bank: Option<String>,
    /// Description, complementary info and formatted tax id joined in order
    pub operation_description: String,
    /// Always non-negative; see `signed_amount`
    pub amount: Decimal,
    pub raw_metadata: RawLineItem,
}

impl NormalizedTransaction {
    /// Amount with debits negative
    pub fn signed_amount(&self) -> Decimal {
        match self.direction {
            Direction::Debit => -self.amount,
            Direction::Credit => self.amount,
        }
    }

    /// The bank's own history text, without the composed extras
    pub fn primary_description(&self) -> &str {
        self.raw_metadata.description.trim()
    }
}

/// Balance derived from a marker line in a statement
///
/// This is a best-effort value: the statement API has no balance field.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountBalance {
    pub amount: Decimal,
    /// Description of the line the balance was read from
    pub marker: String,
    pub as_of: NaiveDate,
}

/// All pages of a statement, normalized
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedStatement {
    /// As reported by page 1
    pub total_pages: u32,
    /// As reported by page 1
    pub total_record_count: u32,
    pub items: Vec<NormalizedTransaction>,
    pub balance: Option<AccountBalance>,
}

impl AggregatedStatement {
    /// Whether every record announced by page 1 was collected
    pub fn is_complete(&self) -> bool {
        self.items.len() == self.total_record_count as usize
    }

    /// Sum of credits minus debits, excluding balance marker lines
    pub fn net_movement(&self, is_marker: impl Fn(&NormalizedTransaction) -> bool) -> Decimal {
        self.items
            .iter()
            .filter(|tx| !is_marker(tx))
            .map(NormalizedTransaction::signed_amount)
            .sum()
    }
}

/// Parameters of one statement page request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatementRequest {
    pub agency: String,
    pub account: String,
    pub connection_ref: String,
    pub app_key: String,
    /// Request-encoded (`DMMYYYY`)
    pub date_from: String,
    /// Request-encoded (`DMMYYYY`)
    pub date_to: String,
    pub page_number: u32,
    pub page_size: u32,
    pub wallet_ref: String,
}

impl StatementRequest {
    /// The same request pointed at another page
    pub fn for_page(&self, page_number: u32) -> Self {
        Self {
            page_number,
            ..self.clone()
        }
    }
}

// =============================================================================
// Lenient deserializers
// =============================================================================

/// Number-or-string field; zero, null and blank become `None`
fn deserialize_lenient<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error as _;
    let value: Option<JsonValue> = Option::deserialize(deserializer)?;
    match value {
        None | Some(JsonValue::Null) => Ok(None),
        Some(JsonValue::Number(n)) => {
            let s = n.to_string();
            Ok(if s == "0" { None } else { Some(s) })
        }
        Some(JsonValue::String(s)) => {
            let s = s.trim();
            Ok(if s.is_empty() || s == "0" { None } else { Some(s.to_string()) })
        }
        Some(_) => Err(D::Error::custom("expected number or string")),
    }
}

/// Deserialize amount that can be number or string
fn deserialize_amount<'de, D>(deserializer: D) -> std::result::Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error as _;
    let value: Option<JsonValue> = Option::deserialize(deserializer)?;
    match value {
        None | Some(JsonValue::Null) => Ok(Decimal::ZERO),
        Some(JsonValue::Number(n)) => n
            .to_string()
            .parse::<Decimal>()
            .or_else(|_| Decimal::from_scientific(&n.to_string()))
            .map_err(|e| D::Error::custom(format!("invalid decimal: {}", e))),
        Some(JsonValue::String(s)) => s
            .trim()
            .replace(',', ".")
            .parse::<Decimal>()
            .map_err(|e| D::Error::custom(format!("invalid decimal: {}", e))),
        Some(_) => Err(D::Error::custom("expected number or string for amount")),
    }
}

/// Page counters that can be number or string
fn deserialize_count<'de, D>(deserializer: D) -> std::result::Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error as _;
    let value: Option<JsonValue> = Option::deserialize(deserializer)?;
    match value {
        None | Some(JsonValue::Null) => Ok(0),
        Some(JsonValue::Number(n)) => n
            .as_u64()
            .and_then(|v| u32::try_from(v).ok())
            .ok_or_else(|| D::Error::custom(format!("invalid count: {}", n))),
        Some(JsonValue::String(s)) => s
            .trim()
            .parse::<u32>()
            .map_err(|e| D::Error::custom(format!("invalid count: {}", e))),
        Some(_) => Err(D::Error::custom("expected number or string for count")),
    }
}
