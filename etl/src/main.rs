use retail_etl::core::EtlApp;

#[tokio::main]
async fn main() {
    if let Err(e) = EtlApp::run().await {
        eprintln!("\nError: {:#}\n", e);
        std::process::exit(1);
    }
}
