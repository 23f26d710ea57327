use anyhow::Result;

/// Main entry point
#[tokio::main]
async fn main() -> Result<()> {
    searxngr::cli::run().await
}
