#[tokio::main]
async fn main() {
    if let Err(e) = lib_notify_cli::init().await {
        eprintln!("❌ {e:#}");
        std::process::exit(1);
    }
}
