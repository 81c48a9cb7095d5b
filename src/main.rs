use axum::{
    middleware::from_fn_with_state,
    routing::{delete, get, post},
    Router,
};

use http::{header, Method};
use std::net::SocketAddr;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};

use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod db;
mod error;
mod state;

mod crypto {
    pub mod tokens;
}

mod models {
    pub mod endpoint;
    pub mod image;
    pub mod session;
    pub mod user;
}

mod repositories {
    pub mod endpoint;
    pub mod image;
    pub mod session;
    pub mod user;
}

mod services {
    pub mod auth;
    pub mod images;
}

mod handlers {
    pub mod auth;
    pub mod endpoints;
    pub mod images;
    pub mod public;
    pub mod users;
}

mod middleware_layer {
    pub mod auth;
}

mod validation {
    pub mod auth;
}

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenvy::dotenv().ok();

    let config = Config::from_env()?;
    tracing::info!("Configuration loaded");

    // `elusive create-admin` bootstraps the first login and exits.
    if std::env::args().nth(1).as_deref() == Some("create-admin") {
        return create_admin(&config).await;
    }

    let state = AppState::new(&config).await?;

    db::init_schema(&state.db).await?;

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    let public_routes = Router::new()
        .route("/", get(handlers::public::info))
        .route("/images/{id}", get(handlers::public::image_bytes))
        .route("/{endpoint}", get(handlers::public::random_image))
        .with_state(state.clone());

    let login_routes = Router::new()
        .route("/client/login", post(handlers::auth::login))
        .with_state(state.clone());

    let client_routes = Router::new()
        .route("/client/me", get(handlers::auth::me))
        .route("/client/token", post(handlers::auth::token))
        .route(
            "/client/users",
            get(handlers::users::list_users).post(handlers::users::create_user),
        )
        .route("/client/users/{id}", delete(handlers::users::delete_user))
        .route(
            "/client/images/{endpoint_id}",
            get(handlers::images::list_images),
        )
        .route("/client/images", post(handlers::images::create_image))
        .route("/client/images/{id}", delete(handlers::images::delete_image))
        .route(
            "/client/endpoints",
            get(handlers::endpoints::list_endpoints).post(handlers::endpoints::create_endpoint),
        )
        .route(
            "/client/endpoints/{id}",
            delete(handlers::endpoints::delete_endpoint),
        )
        .route_layer(from_fn_with_state(
            state.clone(),
            middleware_layer::auth::require_auth,
        ))
        .with_state(state.clone());

    let app = Router::new()
        .merge(login_routes)
        .merge(client_routes)
        .merge(public_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::default())
                .on_request(DefaultOnRequest::default().level(Level::DEBUG))
                .on_response(DefaultOnResponse::default().level(Level::DEBUG))
                .on_failure(DefaultOnFailure::default().level(Level::ERROR)),
        )
        .layer(cors);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("API listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}

/// Bootstraps the `admin`/`admin` user so the panel has a first login.
async fn create_admin(config: &Config) -> anyhow::Result<()> {
    let pool = db::create_pool(config)?;
    db::init_schema(&pool).await?;

    match services::auth::bootstrap_admin(&pool).await? {
        Some(user) => {
            println!(
                "Created admin user with id {}\nUsername: admin\nPassword: admin\n\
                 Remember to create another user with a strong password and delete this one.",
                user.id
            );
        }
        None => {
            eprintln!("Error: Admin user already exists.");
        }
    }

    Ok(())
}
