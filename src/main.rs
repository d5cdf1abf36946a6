mod acl;
mod auth;
mod index;
mod saved_view;
mod search;
mod sketch;
mod timeline;
mod util;

use crate::{
    auth::{AuthApi, UserCred},
    saved_view::SavedViewApi,
    search::SearchApi,
    sketch::SketchApi,
    timeline::TimelineApi,
};
use color_eyre::eyre;
use jsonwebtoken::{DecodingKey, EncodingKey};
use poem::{
    endpoint::EmbeddedFilesEndpoint,
    get,
    listener::TcpListener,
    middleware::Tracing,
    session::{CookieConfig, CookieSession},
    web::cookie::CookieKey,
    EndpointExt, Route, Server,
};
use poem_openapi::OpenApiService;
use rust_embed::RustEmbed;
use sqlx::{migrate, PgPool};
use tracing_subscriber::EnvFilter;

/// Static files baked into the binary
#[derive(RustEmbed)]
#[folder = "assets"]
struct Assets;

/// Read a config from the Env Variable and then fall back to the .env file.
fn config(name: &str) -> Result<String, eyre::Error> {
    match std::env::var(name) {
        Ok(value) => Ok(value),
        Err(_) => Ok(dotenvy::var(name)?),
    }
}

#[tokio::main]
async fn main() -> Result<(), eyre::Error> {
    // Lets get pretty error reports
    color_eyre::install()?;

    // Use async-friendly logging for Poem
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("poem=trace,timesketch=info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let conn_str = config("DATABASE_URL")?;
    let web_addr_str = config("WEB_URL")?;
    let secret_key = config("SECRET_KEY")?;
    let user_creds: Vec<UserCred> = serde_json::from_str(&config("USER_CREDS")?)?;

    // Cookie keys need at least 32 bytes to derive from
    if secret_key.len() < 32 {
        return Err(eyre::eyre!("SECRET_KEY needs to be at least 32 bytes long"));
    }
    let encoding_key = EncodingKey::from_secret(secret_key.as_bytes());
    let decoding_key = DecodingKey::from_secret(secret_key.as_bytes());
    let cookie_key = CookieKey::derive_from(secret_key.as_bytes());

    tracing::info!(users = user_creds.len(), "loaded user credentials");

    // Connect to DB and upgrade if needed.
    let pool = PgPool::connect(&conn_str).await?;
    migrate!().run(&pool).await?;

    // Setup OpenAPI Swagger Page
    let api_service = OpenApiService::new(
        (AuthApi, SketchApi, TimelineApi, SavedViewApi, SearchApi),
        "Timesketch",
        "0.1.0",
    )
    .server(format!("http://{web_addr_str}/api/v1"));
    let spec = api_service.spec_endpoint();
    let swagger = api_service.swagger_ui();

    // User friendly locations
    let route = Route::new().at("/", get(index::index));
    let route = auth::route(route);
    let route = sketch::route(route);
    let route = timeline::route(route);
    let route = search::route(route);

    // Route inbound traffic
    let route = route
        // Developer friendly locations
        .nest("/api/v1", api_service)
        .nest("/assets", EmbeddedFilesEndpoint::<Assets>::new())
        .at("/spec", spec)
        .nest("/swagger", swagger)
        // Global context to be shared
        .data(pool)
        .data(user_creds)
        .data(encoding_key)
        .data(decoding_key)
        // Utilites being added to our services
        .with(CookieSession::new(CookieConfig::private(cookie_key)))
        .with(Tracing);

    // Lets run our service
    Server::new(TcpListener::bind(web_addr_str))
        .run(route)
        .await?;

    Ok(())
}
