//! # Summary Rendering
//!
//! Turns a receipt response body into a short human-readable report.

use cupom::{
    constants::{FIELD_ERROR, FIELD_RAW_RESPONSE, FIELD_SUM_WARNING},
    ReceiptRecord,
};
use serde_json::Value;
use std::fmt::Write;

fn or_dash(value: Option<&str>) -> &str {
    value.unwrap_or("-")
}

fn money(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("R$ {v:.2}"))
}

/// Renders a response body from the extractor or the server.
///
/// Parse failures show the model's raw text. JSON that does not look like a
/// receipt is pretty-printed as is.
pub fn render_summary(body: &Value) -> String {
    if let (Some(raw), Some(error)) = (
        body.get(FIELD_RAW_RESPONSE).and_then(Value::as_str),
        body.get(FIELD_ERROR).and_then(Value::as_str),
    ) {
        return format!("Erro: {error}\nResposta do modelo:\n{raw}\n");
    }

    let Some(receipt) = ReceiptRecord::from_value(body) else {
        return format!(
            "{}\n",
            serde_json::to_string_pretty(body).unwrap_or_else(|_| body.to_string())
        );
    };

    let mut out = String::new();
    let _ = writeln!(
        out,
        "Estabelecimento: {}",
        or_dash(receipt.establishment_name.as_deref())
    );
    let _ = writeln!(out, "CNPJ: {}", or_dash(receipt.tax_id.as_deref()));
    let _ = writeln!(out, "Itens ({}):", receipt.items.len());
    for item in &receipt.items {
        let _ = writeln!(
            out,
            "  - {} | {} x {} = {}",
            or_dash(item.description.as_deref()),
            or_dash(item.quantity.as_deref()),
            money(item.unit_price),
            money(item.line_total)
        );
    }
    let _ = writeln!(out, "Total: {}", money(receipt.total_amount));
    if let Some(installments) = receipt.installments {
        let _ = writeln!(out, "Parcelamento: {installments}");
    }
    if let Some(warning) = body.get(FIELD_SUM_WARNING).and_then(Value::as_str) {
        let _ = writeln!(out, "Aviso: {warning}");
    }
    out
}
