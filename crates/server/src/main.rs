#[tokio::main]
async fn main() -> anyhow::Result<()> {
    cupom_server::start().await
}
