use psm_reconciler::cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if it exists; API_* variables may come from it
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("Warning: Error loading .env file: {}", e);
        }
    }

    cli::run_cli().await
}
