use api::auth::middleware::log_request;
use api::routes::routes;
use axum::{Router, middleware::from_fn};
use migration::Migrator;
use sea_orm_migration::MigratorTrait;
use tower_http::cors::{Any, CorsLayer};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};
use util::{config, state::AppState};

fn init_logging() -> WorkerGuard {
    let file_appender = tracing_appender::rolling::daily("logs", config::log_file());
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_new(config::log_level())
        .unwrap_or_else(|_| EnvFilter::new("api=info"));

    let registry = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(file_writer).with_ansi(false));

    if config::log_to_stdout() {
        registry.with(fmt::layer()).init();
    } else {
        registry.init();
    }

    guard
}

#[tokio::main]
async fn main() {
    // Held for the lifetime of the process so buffered log lines flush on exit.
    let _log_guard = init_logging();

    let db = db::connect().await;
    Migrator::up(&db, None)
        .await
        .expect("Failed to run database migrations");

    let app_state = AppState::new(db);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .nest("/api", routes(app_state))
        .layer(from_fn(log_request))
        .layer(cors);

    let addr = format!("{}:{}", config::host(), config::port());
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| panic!("Failed to bind {addr}: {e}"));

    tracing::info!("{} listening on {addr}", config::project_name());
    axum::serve(listener, app)
        .await
        .expect("Server crashed unexpectedly");
}
