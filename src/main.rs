use kitchen_cli::display::print_error;

#[tokio::main]
async fn main() {
    env_logger::init();

    if let Err(e) = kitchen_cli::run().await {
        print_error(&format!("Error: {}", e));
        std::process::exit(1);
    }
}
