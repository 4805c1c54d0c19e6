use gigboard_db::AppState;
use gigboard_server::config::ServerConfig;
use sea_orm_migration::MigratorTrait;
use std::sync::Arc;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let config = ServerConfig::from_env();
    gigboard_server::telemetry::init(&config);

    // Database connection
    let db_config = gigboard_db::DatabaseConfig::from_env();
    tracing::info!("connecting to database...");
    let db = gigboard_db::connect(&db_config)
        .await
        .expect("failed to connect to database");

    if config.run_migrations {
        tracing::info!("running database migrations...");
        gigboard_migration::Migrator::up(&db, None)
            .await
            .expect("failed to run migrations");
        tracing::info!("migrations complete");
    }

    let state = Arc::new(AppState { db });
    let app = gigboard_server::app(state, &config);

    let addr = config.addr();
    tracing::info!(%addr, "server started");

    axum::serve(
        tokio::net::TcpListener::bind(addr)
            .await
            .expect("failed to bind listener"),
        app,
    )
    .await
    .expect("server error");
}
