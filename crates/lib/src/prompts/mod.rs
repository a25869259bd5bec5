//! # Prompt Template Modules
//!
//! This module organizes the prompt templates sent to the vision model.

pub mod receipt;

pub use receipt::{RECEIPT_EXTRACTION_PROMPT, RECEIPT_EXTRACTION_SYSTEM_PROMPT};
