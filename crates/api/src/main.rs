use predmaint_api::config::ServerConfig;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    predmaint_api::init_tracing("predmaint_api=debug,tower_http=debug");

    let config = ServerConfig::from_env();

    let pool = predmaint_db::create_pool(&config.database_url, config.max_connections)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    predmaint_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    predmaint_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    predmaint_api::serve(pool, config)
        .await
        .expect("Server error");
}
