//! # General Route Handlers
//!
//! The root and health check endpoints.

use crate::types::ServiceInfo;
use axum::Json;

pub const SERVICE_TITLE: &str = "Processador de Cupons Fiscais - IA Vision";
pub const SERVICE_DESCRIPTION: &str =
    "Extrai nome do estabelecimento, CNPJ, itens e valor total de cupons brasileiros";

/// The handler for the root (`/`) endpoint.
pub async fn root() -> Json<ServiceInfo> {
    Json(ServiceInfo {
        title: SERVICE_TITLE.to_string(),
        description: SERVICE_DESCRIPTION.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// The handler for the health check (`/health`) endpoint.
pub async fn health_check() -> &'static str {
    "OK"
}
