use crate::constants::{
    FIELD_ERROR, FIELD_ESTABLISHMENT_NAME, FIELD_INSTALLMENTS, FIELD_ITEMS, FIELD_RAW_RESPONSE,
    FIELD_SUM_WARNING, FIELD_TAX_ID, FIELD_TOTAL_AMOUNT, PARSE_FAILURE_MESSAGE,
};
use crate::errors::DecodeError;
use crate::validation::{coerce_f64, SumCheck};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{json, Value};

/// The result of sanitizing one model reply.
///
/// Exactly one shape reaches the client: either the decoded record (possibly
/// annotated with `aviso_soma`) or a parse failure carrying the raw text.
#[derive(Debug)]
pub enum Extraction {
    /// The reply decoded as JSON.
    Record { value: Value, check: SumCheck },
    /// The reply was not valid JSON.
    ParseFailure {
        raw_response: String,
        error: DecodeError,
    },
}

impl Extraction {
    pub fn is_parse_failure(&self) -> bool {
        matches!(self, Extraction::ParseFailure { .. })
    }

    /// The `aviso_soma` text, if the cross-check produced one.
    pub fn annotation(&self) -> Option<String> {
        match self {
            Extraction::Record { check, .. } => check.annotation(),
            Extraction::ParseFailure { .. } => None,
        }
    }

    /// Builds the JSON body returned to clients.
    pub fn into_value(self) -> Value {
        match self {
            Extraction::Record { mut value, check } => {
                if let (Some(map), Some(annotation)) = (value.as_object_mut(), check.annotation()) {
                    map.insert(FIELD_SUM_WARNING.to_string(), Value::String(annotation));
                }
                value
            }
            Extraction::ParseFailure { raw_response, .. } => parse_failure_body(&raw_response),
        }
    }

    /// A typed view of the record, when it looks like a receipt.
    pub fn receipt(&self) -> Option<ReceiptRecord> {
        match self {
            Extraction::Record { value, .. } => ReceiptRecord::from_value(value),
            Extraction::ParseFailure { .. } => None,
        }
    }
}

impl Serialize for Extraction {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Extraction::Record { value, check } => match (value.as_object(), check.annotation()) {
                (Some(map), Some(annotation)) => {
                    let mut annotated = map.clone();
                    annotated.insert(FIELD_SUM_WARNING.to_string(), Value::String(annotation));
                    annotated.serialize(serializer)
                }
                _ => value.serialize(serializer),
            },
            Extraction::ParseFailure { raw_response, .. } => {
                parse_failure_body(raw_response).serialize(serializer)
            }
        }
    }
}

fn parse_failure_body(raw_response: &str) -> Value {
    json!({
        FIELD_RAW_RESPONSE: raw_response,
        FIELD_ERROR: PARSE_FAILURE_MESSAGE,
    })
}

/// A line on the receipt, as the model transcribed it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    #[serde(rename = "descricao", default, deserialize_with = "lenient_string")]
    pub description: Option<String>,
    /// Free-form unit notation such as `0,280Kg` or `1UN`.
    #[serde(rename = "quantidade", default, deserialize_with = "lenient_string")]
    pub quantity: Option<String>,
    #[serde(rename = "preco_unitario", default, deserialize_with = "lenient_f64")]
    pub unit_price: Option<f64>,
    #[serde(rename = "preco_total", default, deserialize_with = "lenient_f64")]
    pub line_total: Option<f64>,
}

/// The receipt fields the extraction prompt asks for.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReceiptRecord {
    #[serde(rename = "nome_estabelecimento", default, deserialize_with = "lenient_string")]
    pub establishment_name: Option<String>,
    #[serde(rename = "cnpj", default, deserialize_with = "lenient_string")]
    pub tax_id: Option<String>,
    #[serde(rename = "itens", default, deserialize_with = "lenient_items")]
    pub items: Vec<LineItem>,
    #[serde(rename = "valor_total", default, deserialize_with = "lenient_f64")]
    pub total_amount: Option<f64>,
    #[serde(rename = "parcelamento", default, deserialize_with = "lenient_f64")]
    pub installments: Option<f64>,
}

impl ReceiptRecord {
    /// Best-effort conversion of a decoded reply into the typed view.
    ///
    /// Returns `None` for values that are not objects or carry none of the
    /// receipt fields. Values of the wrong type are dropped, not rejected.
    pub fn from_value(value: &Value) -> Option<Self> {
        let map = value.as_object()?;
        let known = [
            FIELD_ESTABLISHMENT_NAME,
            FIELD_TAX_ID,
            FIELD_ITEMS,
            FIELD_TOTAL_AMOUNT,
            FIELD_INSTALLMENTS,
        ];
        if !known.iter().any(|key| map.contains_key(*key)) {
            return None;
        }
        serde_json::from_value(value.clone()).ok()
    }
}

fn lenient_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(coerce_f64(&value))
}

fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

fn lenient_items<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<LineItem>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    let items = match value {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect(),
        _ => Vec::new(),
    };
    Ok(items)
}
