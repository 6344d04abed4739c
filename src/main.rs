use std::net::SocketAddr;

use axum::{middleware, routing, Router};
use foody::{api, app::AppState, config::Config};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "foody=debug,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    let app_state = AppState::new_with_config(&config).await.unwrap();

    let app = Router::new()
        .route("/", routing::get(hello))
        .route(
            "/users",
            routing::post(api::user::create)
                .get(api::user::index)
                .put(api::user::upsert),
        )
        .route("/users/admin", routing::put(api::user::make_admin))
        .route("/users/:email", routing::get(api::user::admin_status))
        .route(
            "/menu",
            routing::get(api::menu::index).post(api::menu::create),
        )
        .route(
            "/orders",
            routing::post(api::order::create).get(api::order::index),
        )
        .route(
            "/create-payment-intent",
            routing::post(api::payment::create_intent),
        )
        .layer(middleware::from_fn_with_state(
            app_state.clone(),
            api::identity::attach_identity,
        ))
        .with_state(app_state)
        .layer(tower_http::cors::CorsLayer::permissive())
        .layer(tower_http::trace::TraceLayer::new_for_http());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::debug!("listening on {}", addr);

    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .unwrap();
}

async fn hello() -> &'static str {
    "Hello World"
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to install shutdown handler: {}", error);
        return;
    }

    tracing::info!("shutting down");
}
