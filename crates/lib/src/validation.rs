//! # Totals Cross-Check
//!
//! Compares the sum of the line totals reported by the model against the
//! declared receipt total. A disagreement usually means the model misread a
//! digit, so it is surfaced to the client as an `aviso_soma` annotation rather
//! than rejected.

use crate::constants::{
    FIELD_ITEMS, FIELD_ITEM_LINE_TOTAL, FIELD_TOTAL_AMOUNT, SUM_VALIDATION_ERROR_MESSAGE,
};
use serde_json::{Map, Value};

/// The outcome of comparing the summed line totals against the declared total.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SumCheck {
    /// The record does not carry both `itens` and `valor_total`.
    Skipped,
    /// The sums agree within the tolerance.
    Ok { computed: f64, declared: f64 },
    /// The sums differ by more than the tolerance.
    MismatchWarning { computed: f64, declared: f64 },
    /// A total or a line total could not be read as a number.
    CoercionError,
}

impl SumCheck {
    /// Renders the `aviso_soma` text for outcomes that need one.
    pub fn annotation(&self) -> Option<String> {
        match self {
            SumCheck::Skipped | SumCheck::Ok { .. } => None,
            SumCheck::MismatchWarning { computed, declared } => Some(format!(
                "Soma calculada dos itens ({computed:.2}) difere do total declarado ({declared:.2}). \
                 Possível erro no modelo - verifique os valores."
            )),
            SumCheck::CoercionError => Some(SUM_VALIDATION_ERROR_MESSAGE.to_string()),
        }
    }
}

/// Cross-checks `itens[*].preco_total` against `valor_total`.
///
/// Items without a `preco_total` count as zero. Anything that is not
/// readable as a number, including `null`, yields [`SumCheck::CoercionError`].
pub fn cross_check(record: &Map<String, Value>, tolerance: f64) -> SumCheck {
    let (Some(items), Some(total)) = (record.get(FIELD_ITEMS), record.get(FIELD_TOTAL_AMOUNT))
    else {
        return SumCheck::Skipped;
    };

    let Some(computed) = sum_line_totals(items) else {
        return SumCheck::CoercionError;
    };
    let Some(declared) = coerce_f64(total) else {
        return SumCheck::CoercionError;
    };

    if (computed - declared).abs() > tolerance {
        SumCheck::MismatchWarning { computed, declared }
    } else {
        SumCheck::Ok { computed, declared }
    }
}

fn sum_line_totals(items: &Value) -> Option<f64> {
    items.as_array()?.iter().try_fold(0.0, |acc, item| {
        let line_total = match item.as_object()?.get(FIELD_ITEM_LINE_TOTAL) {
            Some(value) => coerce_f64(value)?,
            None => 0.0,
        };
        Some(acc + line_total)
    })
}

/// Reads a JSON value as a float the lenient way the model output needs:
/// numbers as-is, booleans as 1/0 and numeric strings parsed after trimming.
pub fn coerce_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}
