use log::{error, info};
use service::{config::Config, logging::Logger, AppState};

#[tokio::main]
async fn main() {
    let config = Config::new();
    if let Err(e) = Logger::init_logger(&config) {
        eprintln!("Failed to initialize logger: {e}");
    }

    info!("Starting up in {:?} mode...", config.runtime_env());
    if config.jwt_secret().is_none() {
        error!("JWT_SECRET is not set; logins and authenticated requests will fail");
    }

    let app_state = AppState::init(config);

    if let Err(e) = web::init_server(app_state).await {
        error!("Server stopped with error: {e}");
        std::process::exit(1);
    }
}
