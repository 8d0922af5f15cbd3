use axum::Router;
use dotenvy::dotenv;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use events_server::config::Config;
use events_server::db;
use events_server::routes::create_routes;

#[tokio::main]
async fn main() {
    dotenv().ok();
    let config = Config::from_env();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.default_log_filter())),
        )
        .init();

    if config.debug {
        tracing::info!("Running in debug mode");
    }

    let pool = db::connect(&config)
        .await
        .expect("Failed to open database");

    tracing::info!(url = %config.database_url, "Successfully connected to database");

    db::initialize(&pool)
        .await
        .expect("Failed to initialize database");

    let app: Router = create_routes(pool);

    let addr = config.addr();
    tracing::info!("Server running at http://{}", addr);

    let listener = TcpListener::bind(addr)
        .await
        .expect("Failed to bind address");

    axum::serve(listener, app).await.expect("Server failed");
}
