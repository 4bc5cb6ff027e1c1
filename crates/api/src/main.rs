use api::{build_app, init_auth_services, init_database, init_tracing};
use config::ApiConfig;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // Load configuration first to get logging settings
    let config = ApiConfig::load_or_env().unwrap_or_else(|e| {
        eprintln!("Failed to load configuration: {}", e);
        eprintln!("Application cannot start without a valid configuration.");
        std::process::exit(1);
    });

    init_tracing(&config.logging);
    tracing::debug!("Loaded configuration: {:?}", config.auth0);

    let database = init_database(&config.database).await.unwrap_or_else(|e| {
        tracing::error!(error = %e, "Failed to initialize database");
        std::process::exit(1);
    });

    let auth_state = init_auth_services(database, &config).unwrap_or_else(|e| {
        tracing::error!(error = %e, "Failed to initialize Auth0");
        std::process::exit(1);
    });

    let app = build_app(auth_state);

    let bind_address = config.server.bind_address();
    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .unwrap_or_else(|e| {
            tracing::error!(error = %e, "Failed to bind to {}", bind_address);
            std::process::exit(1);
        });

    tracing::info!("Server listening on http://{}", bind_address);
    tracing::info!("Auth0 callback URL: {}", config.auth0.callback_url());

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!(error = %e, "Server error");
        std::process::exit(1);
    }
}
