mod app;
mod auth;
mod config;
mod error;
mod response;
mod roles;
mod state;
mod store;
mod users;
mod validation;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "hobbyhub=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let app_state = state::AppState::init().await?;
    tracing::info!(
        production = app_state.config.is_production,
        "configuration loaded"
    );

    if app_state.config.seed_demo_users {
        if let Err(e) = store::seed::seed_demo_users(app_state.store.as_ref()).await {
            tracing::error!(error = ?e, "seeding demo users failed; continuing");
        }
    }

    app::serve(app::build_app(app_state)).await
}
