use axum::http::StatusCode;
use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use prometheus::{Encoder, TextEncoder};
use serde_json::{json, Value as JsonValue};
use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::Arc;
use storefront_core::{
    build_key_map, compile, normalize, slugify, Brand, CatalogError, Category, FormField, Product,
    ProductDraft, ProductModel,
};
use storefront_storage::seed::{self, SeedFile};
use storefront_storage::{facets, pipeline, Cache, CatalogStore, InMemoryCache, InMemoryCatalog};
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn, Level};
mod metrics;

#[derive(Clone)]
struct AppState {
    store: Arc<dyn CatalogStore>,
    cache: Arc<dyn Cache>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()))
        .init();

    let store: Arc<dyn CatalogStore> = Arc::new(InMemoryCatalog::new());
    let cache: Arc<dyn Cache> = Arc::new(InMemoryCache::new());

    if let Ok(path) = std::env::var("SEED_FILE") {
        let raw = std::fs::read_to_string(&path)?;
        let file: SeedFile = serde_json::from_str(&raw)?;
        if let Err(e) = seed::load_seed(store.as_ref(), file).await {
            warn!("seed load failed: {} — starting empty", e);
        }
    }

    let state = AppState { store, cache };
    let app = Router::new()
        .route("/health", get(health))
        .route("/v1/categories", post(create_category))
        .route("/v1/brands", post(create_brand))
        .route("/v1/models", post(create_model))
        .route("/v1/products", post(create_product).get(list_products))
        .route("/v1/products/:slug", get(get_product))
        .route("/v1/filters", post(create_filter))
        .route("/v1/filters/:category", get(get_filter))
        .route("/v1/form-fields", post(create_form_fields))
        .route("/v1/form-fields/:category", get(get_form_fields))
        .route("/metrics", get(metrics_text))
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );

    let addr: SocketAddr = std::env::var("HTTP_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:8080".to_string())
        .parse()?;
    info!("http listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn payload<T: serde::Serialize>(value: &T) -> JsonValue {
    serde_json::to_value(value).unwrap_or(JsonValue::Null)
}

fn ok(result: JsonValue) -> Response {
    (
        StatusCode::OK,
        Json(json!({"status": "success", "isSuccess": true, "result": result})),
    )
        .into_response()
}

fn ok_with_message(message: &str, result: JsonValue) -> Response {
    (
        StatusCode::OK,
        Json(json!({
            "status": "success",
            "isSuccess": true,
            "message": message,
            "result": result,
        })),
    )
        .into_response()
}

fn created(message: &str, result: JsonValue) -> Response {
    (
        StatusCode::CREATED,
        Json(json!({
            "status": "success",
            "isSuccess": true,
            "message": message,
            "result": result,
        })),
    )
        .into_response()
}

fn fail(err: CatalogError) -> Response {
    let status =
        StatusCode::from_u16(err.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (
        status,
        Json(json!({"status": "error", "isSuccess": false, "message": err.to_string()})),
    )
        .into_response()
}

async fn health() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

#[derive(serde::Deserialize)]
struct CreateCategory {
    category: String,
}

async fn create_category(
    State(app): State<AppState>,
    Json(req): Json<CreateCategory>,
) -> impl IntoResponse {
    metrics::OPS_TOTAL.with_label_values(&["createCategory"]).inc();
    match app.store.insert_category(Category::create(&req.category)).await {
        Ok(doc) => created("Category created successfully.", payload(&doc)),
        Err(e) => fail(e),
    }
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateBrand {
    brand: String,
    #[serde(default)]
    logo_image: Option<String>,
}

async fn create_brand(
    State(app): State<AppState>,
    Json(req): Json<CreateBrand>,
) -> impl IntoResponse {
    metrics::OPS_TOTAL.with_label_values(&["createBrand"]).inc();
    match app
        .store
        .insert_brand(Brand::create(&req.brand, req.logo_image))
        .await
    {
        Ok(doc) => created("Brand created successfully.", payload(&doc)),
        Err(e) => fail(e),
    }
}

#[derive(serde::Deserialize)]
struct CreateModel {
    model: String,
    brand: String,
    category: String,
}

async fn create_model(
    State(app): State<AppState>,
    Json(req): Json<CreateModel>,
) -> impl IntoResponse {
    metrics::OPS_TOTAL.with_label_values(&["createModel"]).inc();
    let brand = match app.store.brand_by_slug(&slugify(&req.brand)).await {
        Ok(Some(brand)) => brand,
        Ok(None) => {
            return fail(CatalogError::BadRequest(
                "This brand does not exist.".to_string(),
            ))
        }
        Err(e) => return fail(e),
    };
    let category = match app.store.category_by_slug(&slugify(&req.category)).await {
        Ok(Some(category)) => category,
        Ok(None) => {
            return fail(CatalogError::BadRequest(
                "This category does not exist.".to_string(),
            ))
        }
        Err(e) => return fail(e),
    };
    match app
        .store
        .insert_model(ProductModel::create(&req.model, &brand.id, &category.id))
        .await
    {
        Ok(doc) => created("Model created successfully.", payload(&doc)),
        Err(e) => fail(e),
    }
}

async fn create_product(
    State(app): State<AppState>,
    Json(draft): Json<ProductDraft>,
) -> impl IntoResponse {
    metrics::OPS_TOTAL.with_label_values(&["createProduct"]).inc();
    let category = match app.store.category_by_slug(&slugify(&draft.category)).await {
        Ok(Some(category)) => category,
        Ok(None) => {
            return fail(CatalogError::BadRequest(
                "This category does not exist.".to_string(),
            ))
        }
        Err(e) => return fail(e),
    };
    let brand = match app.store.brand_by_slug(&draft.brand).await {
        Ok(Some(brand)) => brand,
        Ok(None) => {
            return fail(CatalogError::BadRequest(
                "This brand does not exist.".to_string(),
            ))
        }
        Err(e) => return fail(e),
    };
    let model = match app.store.model_by_name(&draft.model).await {
        Ok(Some(model)) => model,
        Ok(None) => {
            return fail(CatalogError::BadRequest(
                "This model does not exist.".to_string(),
            ))
        }
        Err(e) => return fail(e),
    };

    let (product, features) = Product::create(draft, &category, &brand, &model);
    if let Err(e) = app.store.insert_product(product).await {
        return fail(e);
    }
    if let Err(e) = app.store.insert_features(features).await {
        return fail(e);
    }
    created("Product created successfully.", JsonValue::Null)
}

async fn list_products(
    State(app): State<AppState>,
    Query(raw): Query<BTreeMap<String, String>>,
) -> impl IntoResponse {
    metrics::OPS_TOTAL.with_label_values(&["listProducts"]).inc();
    let _timer = metrics::PRODUCT_QUERY_SECONDS.start_timer();
    let key_map = build_key_map();
    let compiled = compile(&normalize(&raw), &key_map);
    match pipeline::run(app.store.as_ref(), &compiled).await {
        Ok(page) => ok(payload(&page)),
        Err(e) => fail(e),
    }
}

async fn get_product(
    State(app): State<AppState>,
    Path(slug): Path<String>,
) -> impl IntoResponse {
    metrics::OPS_TOTAL.with_label_values(&["getProduct"]).inc();
    match pipeline::product_detail(app.store.as_ref(), &slug).await {
        Ok(detail) => ok(payload(&detail)),
        Err(e) => fail(e),
    }
}

#[derive(serde::Deserialize)]
struct CreateFilter {
    category: String,
    filters: Vec<facets::FilterRequest>,
}

async fn create_filter(
    State(app): State<AppState>,
    Json(req): Json<CreateFilter>,
) -> impl IntoResponse {
    metrics::OPS_TOTAL.with_label_values(&["createFilter"]).inc();
    match facets::create_filter(
        app.store.as_ref(),
        app.cache.as_ref(),
        &req.category,
        &req.filters,
    )
    .await
    {
        Ok(doc) => ok_with_message(
            "Create filter successfully",
            json!({
                "categoryId": doc.category_id,
                "filters": doc.filters,
                "category": doc.category,
            }),
        ),
        Err(e) => fail(e),
    }
}

async fn get_filter(
    State(app): State<AppState>,
    Path(category): Path<String>,
) -> impl IntoResponse {
    metrics::OPS_TOTAL.with_label_values(&["getFilter"]).inc();
    match facets::get_filter(app.store.as_ref(), app.cache.as_ref(), &category).await {
        Ok(view) => ok_with_message("Get filter successfully", payload(&view)),
        Err(e) => fail(e),
    }
}

#[derive(serde::Deserialize)]
struct CreateFormFields {
    category: String,
    fields: Vec<FormField>,
}

async fn create_form_fields(
    State(app): State<AppState>,
    Json(req): Json<CreateFormFields>,
) -> impl IntoResponse {
    metrics::OPS_TOTAL
        .with_label_values(&["createFormFields"])
        .inc();
    match facets::create_form_fields(
        app.store.as_ref(),
        app.cache.as_ref(),
        &req.category,
        req.fields,
    )
    .await
    {
        Ok(_) => created("Form fields created.", JsonValue::Null),
        Err(e) => fail(e),
    }
}

async fn get_form_fields(
    State(app): State<AppState>,
    Path(category): Path<String>,
) -> impl IntoResponse {
    metrics::OPS_TOTAL.with_label_values(&["getFormFields"]).inc();
    match facets::get_form_fields(app.store.as_ref(), app.cache.as_ref(), &category).await {
        Ok(view) => ok_with_message("Form fields found.", payload(&view)),
        Err(e) => fail(e),
    }
}

async fn metrics_text() -> impl IntoResponse {
    let families = prometheus::gather();
    let mut buf = Vec::new();
    if TextEncoder::new().encode(&families, &mut buf).is_err() {
        return (StatusCode::INTERNAL_SERVER_ERROR, "encode error".to_string()).into_response();
    }
    (StatusCode::OK, String::from_utf8_lossy(&buf).to_string()).into_response()
}
