//! # Fiscal Receipt Extraction
//!
//! This crate turns a photo of a Brazilian fiscal receipt (NFC-e) into
//! structured JSON using a local vision-language model.
//!
//! The model does the reading. This crate handles what surrounds it:
//! - staging the upload and calling the model ([`extractor`], [`providers`]),
//! - recovering JSON from a reply that may be wrapped in a markdown fence
//!   ([`sanitize`]),
//! - cross-checking the summed line totals against the declared total
//!   ([`validation`]).

pub mod constants;
pub mod errors;
pub mod extractor;
pub mod prompts;
pub mod providers;
pub mod sanitize;
pub mod types;
pub mod validation;

pub use errors::{DecodeError, ExtractionError};
pub use extractor::{ReceiptExtractor, ReceiptExtractorBuilder};
pub use sanitize::{sanitize, sanitize_and_validate, strip_markdown_fence, try_decode};
pub use types::{Extraction, LineItem, ReceiptRecord};
pub use validation::{cross_check, SumCheck};
