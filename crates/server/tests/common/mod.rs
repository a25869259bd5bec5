//! # Common Test Utilities
//!
//! `TestApp` spawns the real server on a random port with its vision model
//! pointed at an `httpmock::MockServer` that speaks the Ollama chat API.

// Not every test file uses every helper.
#![allow(unused)]

use anyhow::Result;
use axum::serve;
use cupom_server::{config, router, state::build_app_state};
use httpmock::MockServer;
use reqwest::{multipart, Client, Response};
use serde_json::json;
use std::{fs, path::Path};
use tempfile::{tempdir, TempDir};
use tokio::{net::TcpListener, task::JoinHandle};

/// A receipt whose line totals add up to `valor_total`.
pub const CONSISTENT_RECEIPT: &str = r#"{
  "nome_estabelecimento": "SUPERMERCADO BOM PRECO LTDA",
  "cnpj": "08.616.988/0005-53",
  "itens": [
    {"descricao": "ARROZ TIPO 1 5KG", "quantidade": "1UN", "preco_unitario": 24.90, "preco_total": 24.90},
    {"descricao": "LEITE INTEGRAL 1L", "quantidade": "6UN", "preco_unitario": 4.50, "preco_total": 27.00}
  ],
  "valor_total": 51.90,
  "parcelamento": null
}"#;

/// Bytes standing in for a JPEG upload.
pub fn sample_image() -> Vec<u8> {
    vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F']
}

/// The body of an Ollama `/api/chat` reply carrying `content`.
pub fn ollama_reply(content: &str) -> serde_json::Value {
    json!({
        "model": "qwen32b-custom",
        "message": { "role": "assistant", "content": content },
        "done": true
    })
}

/// A harness for end-to-end testing of the Axum server.
pub struct TestApp {
    pub address: String,
    pub client: Client,
    pub mock_server: MockServer,
    /// Where the server stages uploads.
    pub upload_dir: TempDir,
    _config_dir: TempDir,
    _server_handle: JoinHandle<()>,
    shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestApp {
    /// Spawns the server with the default test configuration.
    pub async fn spawn() -> Result<Self> {
        Self::spawn_with_config("").await
    }

    /// Spawns the server, appending `extra_yaml` to the generated `config.yml`.
    pub async fn spawn_with_config(extra_yaml: &str) -> Result<Self> {
        dotenvy::dotenv().ok();
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .compact()
            .try_init();

        let mock_server = MockServer::start_async().await;
        let upload_dir = tempdir()?;
        let config_dir = tempdir()?;
        let config_path = config_dir.path().join("config.yml");

        let config_content = format!(
            r#"
port: 0
host: "127.0.0.1"
temp_dir: "{}"
provider:
  provider: "ollama"
  api_url: "{}"
  model_name: "qwen32b-custom"
  timeout_secs: 5
{extra_yaml}
"#,
            path_str(upload_dir.path())?,
            mock_server.url("/api/chat"),
        );
        fs::write(&config_path, config_content)?;

        let config = config::get_config(Some(path_str(&config_path)?))?;
        let app_state = build_app_state(config).await?;

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let address = format!("http://{}", listener.local_addr()?);

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
        let server_handle = tokio::spawn(async move {
            let app = router::create_router(app_state);
            let server = serve(listener, app).with_graceful_shutdown(async {
                shutdown_rx.await.ok();
            });
            if let Err(e) = server.await {
                tracing::error!("[TestApp] Server error: {}", e);
            }
        });

        Ok(Self {
            address,
            client: Client::new(),
            mock_server,
            upload_dir,
            _config_dir: config_dir,
            _server_handle: server_handle,
            shutdown_tx: Some(shutdown_tx),
        })
    }

    /// Posts `data` as the `file` part of a multipart form.
    pub async fn upload(&self, data: Vec<u8>, content_type: &str) -> Result<Response> {
        let part = multipart::Part::bytes(data)
            .file_name("cupom.jpg")
            .mime_str(content_type)?;
        let form = multipart::Form::new().part("file", part);
        self.post_form(form).await
    }

    /// Posts an arbitrary multipart form to `/processar_cupom`.
    pub async fn post_form(&self, form: multipart::Form) -> Result<Response> {
        Ok(self
            .client
            .post(format!("{}/processar_cupom", self.address))
            .multipart(form)
            .send()
            .await?)
    }

    /// Number of files left behind in the upload staging directory.
    pub fn staged_files(&self) -> usize {
        fs::read_dir(self.upload_dir.path())
            .map(|d| d.count())
            .unwrap_or(0)
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

fn path_str(path: &Path) -> Result<&str> {
    path.to_str()
        .ok_or_else(|| anyhow::anyhow!("non UTF-8 path: {path:?}"))
}
