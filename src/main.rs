#[tokio::main]
async fn main() -> anyhow::Result<()> {
    bhavcopy_server_lib::run().await
}
