#![allow(dead_code)]
//! # Common Test Utilities
//!
//! This module provides shared utilities for testing, such as mock providers
//! and sample model replies, to keep tests isolated and repeatable.

use async_trait::async_trait;
use cupom::providers::ai::{AiProvider, ImageAttachment};
use cupom::ExtractionError;
use dotenvy::dotenv;
use std::fmt::Debug;
use std::sync::{Arc, Once, RwLock};

static INIT: Once = Once::new();

/// Initializes the tracing subscriber and loads .env for tests.
pub fn setup_tracing() {
    INIT.call_once(|| {
        dotenv().ok();
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .compact()
            .try_init();
    });
}

/// One recorded call to the mock provider.
#[derive(Clone, Debug)]
pub struct RecordedCall {
    pub system_prompt: String,
    pub user_prompt: String,
    pub images: Vec<ImageAttachment>,
}

// --- Mock AI Provider for Logic Testing ---
#[derive(Clone, Debug)]
pub struct MockAiProvider {
    pub call_history: Arc<RwLock<Vec<RecordedCall>>>,
    pub responses: Arc<RwLock<Vec<String>>>,
}

impl MockAiProvider {
    pub fn new(responses: Vec<String>) -> Self {
        Self {
            call_history: Arc::new(RwLock::new(Vec::new())),
            responses: Arc::new(RwLock::new(responses.into_iter().rev().collect())),
        }
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.call_history.read().unwrap().clone()
    }
}

#[async_trait]
impl AiProvider for MockAiProvider {
    async fn generate(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        images: &[ImageAttachment],
    ) -> Result<String, ExtractionError> {
        self.call_history.write().unwrap().push(RecordedCall {
            system_prompt: system_prompt.to_string(),
            user_prompt: user_prompt.to_string(),
            images: images.to_vec(),
        });

        if let Some(response) = self.responses.write().unwrap().pop() {
            Ok(response)
        } else {
            Ok("{}".to_string())
        }
    }
}

/// A provider whose every call fails as if the model server were down.
#[derive(Clone, Debug)]
pub struct FailingAiProvider;

#[async_trait]
impl AiProvider for FailingAiProvider {
    async fn generate(
        &self,
        _system_prompt: &str,
        _user_prompt: &str,
        _images: &[ImageAttachment],
    ) -> Result<String, ExtractionError> {
        Err(ExtractionError::AiApi("model not loaded".to_string()))
    }
}

/// A well-formed reply for a two-item receipt whose totals agree.
pub const CONSISTENT_RECEIPT: &str = r#"{
  "nome_estabelecimento": "SUPERMERCADO BOA VISTA LTDA",
  "cnpj": "08.616.988/0005-53",
  "itens": [
    {"descricao": "BANANA PRATA", "quantidade": "0,280Kg", "preco_unitario": 6.99, "preco_total": 1.96},
    {"descricao": "LEITE INTEGRAL 1L", "quantidade": "2UN", "preco_unitario": 4.50, "preco_total": 9.00}
  ],
  "valor_total": 10.96,
  "parcelamento": 1
}"#;

/// Fake JPEG bytes; the model never looks at them in tests.
pub fn sample_image() -> Vec<u8> {
    vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F']
}
