#[tokio::main]
async fn main() -> anyhow::Result<()> {
    clinireport::run().await
}
