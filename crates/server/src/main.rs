use std::{net::SocketAddr, sync::Arc};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, patch},
    Json, Router,
};
use shared::{
    domain::{NewProduct, Product, ProductId},
    error::{ApiError, ErrorCode},
    protocol::{FieldEdit, PRODUCTS_ROUTE},
};
use storage::Storage;
use tower_http::limit::RequestBodyLimitLayer;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

mod api;
mod app_state;
mod config;

use api::ApiContext;
use app_state::AppState;
use config::{load_settings, prepare_database_url};

type HttpResult<T> = Result<T, (StatusCode, Json<ApiError>)>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let settings = load_settings();
    let database_url = prepare_database_url(&settings.database_url)?;
    let storage = Storage::new(&database_url).await.map_err(|error| {
        error!(
            %database_url,
            %error,
            "failed to open SQLite database; verify parent directory exists and permissions are correct"
        );
        error
    })?;

    let state = AppState {
        api: ApiContext { storage },
    };
    let app = build_router(Arc::new(state), settings.max_body_bytes);

    let addr: SocketAddr = settings.server_bind.parse()?;
    info!(%addr, "product store listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_router(state: Arc<AppState>, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route(
            PRODUCTS_ROUTE,
            get(http_list_products).post(http_create_product),
        )
        .route(
            &format!("{PRODUCTS_ROUTE}/:id"),
            patch(http_update_product).delete(http_delete_product),
        )
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .with_state(state)
}

async fn healthz(State(state): State<Arc<AppState>>) -> HttpResult<&'static str> {
    state.api.storage.health_check().await.map_err(|e| {
        reject(ApiError::new(ErrorCode::Internal, e.to_string()))
    })?;
    Ok("ok")
}

async fn http_list_products(State(state): State<Arc<AppState>>) -> HttpResult<Json<Vec<Product>>> {
    let products = api::list_products(&state.api).await.map_err(reject)?;
    Ok(Json(products))
}

async fn http_create_product(
    State(state): State<Arc<AppState>>,
    Json(req): Json<NewProduct>,
) -> HttpResult<(StatusCode, Json<Product>)> {
    let product = api::create_product(&state.api, req).await.map_err(reject)?;
    info!(id = %product.id, name = %product.name, "product created");
    Ok((StatusCode::CREATED, Json(product)))
}

async fn http_update_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(edit): Json<FieldEdit>,
) -> HttpResult<Json<Product>> {
    let id = ProductId(id);
    let field = edit.field();
    let product = api::update_product(&state.api, &id, edit)
        .await
        .map_err(reject)?;
    info!(%id, %field, "product field updated");
    Ok(Json(product))
}

async fn http_delete_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> HttpResult<StatusCode> {
    let id = ProductId(id);
    api::delete_product(&state.api, &id).await.map_err(reject)?;
    info!(%id, "product deleted");
    Ok(StatusCode::NO_CONTENT)
}

fn reject(err: ApiError) -> (StatusCode, Json<ApiError>) {
    let status = match err.code {
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::Validation => StatusCode::BAD_REQUEST,
        ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status.is_server_error() {
        error!(message = %err.message, "request failed");
    } else {
        warn!(code = ?err.code, message = %err.message, "request rejected");
    }
    (status, Json(err))
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
