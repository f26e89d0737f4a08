#[tokio::main]
async fn main() -> anyhow::Result<()> {
    srs_server::run().await
}
