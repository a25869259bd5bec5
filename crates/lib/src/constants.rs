//! # Shared Constants
//!
//! Field names of the receipt JSON contract and the fixed user-facing messages.
//! Clients depend on these strings, so they live in one place.

/// The maximum absolute difference between the summed line totals and the
/// declared total before a mismatch is reported.
pub const DEFAULT_SUM_TOLERANCE: f64 = 0.01;

/// The default vision model served by the local Ollama instance.
pub const DEFAULT_MODEL: &str = "qwen32b-custom";

/// The default Ollama chat endpoint.
pub const DEFAULT_OLLAMA_CHAT_URL: &str = "http://localhost:11434/api/chat";

/// How many characters of the raw model reply are written to the log.
pub const RAW_RESPONSE_LOG_CHARS: usize = 200;

pub const FIELD_ESTABLISHMENT_NAME: &str = "nome_estabelecimento";
pub const FIELD_TAX_ID: &str = "cnpj";
pub const FIELD_ITEMS: &str = "itens";
pub const FIELD_TOTAL_AMOUNT: &str = "valor_total";
pub const FIELD_INSTALLMENTS: &str = "parcelamento";
pub const FIELD_ITEM_DESCRIPTION: &str = "descricao";
pub const FIELD_ITEM_QUANTITY: &str = "quantidade";
pub const FIELD_ITEM_UNIT_PRICE: &str = "preco_unitario";
pub const FIELD_ITEM_LINE_TOTAL: &str = "preco_total";

/// The annotation key attached when the cross-check fails.
pub const FIELD_SUM_WARNING: &str = "aviso_soma";
pub const FIELD_RAW_RESPONSE: &str = "raw_response";
pub const FIELD_ERROR: &str = "error";

/// The `error` text of a parse failure record.
pub const PARSE_FAILURE_MESSAGE: &str =
    "O modelo não retornou JSON válido. Veja raw_response acima.";

/// The `aviso_soma` text when a value cannot be read as a number.
pub const SUM_VALIDATION_ERROR_MESSAGE: &str =
    "Não foi possível validar a soma dos itens (valores inválidos).";
