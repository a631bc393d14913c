//! Product catalogue request handlers.
//!
//! Reads are public; writes go through the admin gate.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    middleware,
};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::api::doc::PRODUCT_TAG;
use crate::api::dto::{CreateProductRequest, ErrorResponse, UpdateProductRequest};
use crate::api::middleware::{require_admin, require_auth};
use crate::error::AppResult;
use crate::models::Product;
use crate::state::AppState;
use crate::utils::validate::ValidatedJson;

/// Creates product routes.
///
/// Routes:
/// - GET /                     - List all products (public)
/// - GET /{id}                 - Get product by ID (public)
/// - GET /category/{category}  - Products in a category (public)
/// - POST /                    - Create a product (admin)
/// - PUT /{id}                 - Update a product (admin)
/// - DELETE /{id}              - Delete a product (admin)
pub fn product_routes(state: &AppState) -> OpenApiRouter<AppState> {
    let public = OpenApiRouter::new()
        .routes(routes!(list_products))
        .routes(routes!(get_product))
        .routes(routes!(list_by_category));

    // Last route_layer runs first: authenticate, then check the admin flag
    let admin = OpenApiRouter::new()
        .routes(routes!(create_product))
        .routes(routes!(update_product, delete_product))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_admin,
        ))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_auth,
        ));

    public.merge(admin)
}

/// GET /api/products - List all products
#[utoipa::path(
    get,
    path = "/",
    tag = PRODUCT_TAG,
    responses(
        (status = 200, description = "All products in insertion order", body = Vec<Product>)
    )
)]
async fn list_products(State(state): State<AppState>) -> AppResult<Json<Vec<Product>>> {
    let products = state.services.products.list_products().await?;
    Ok(Json(products))
}

/// GET /api/products/{id} - Get product by ID
#[utoipa::path(
    get,
    path = "/{id}",
    tag = PRODUCT_TAG,
    params(("id" = String, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Product found", body = Product),
        (status = 404, description = "Product not found", body = ErrorResponse)
    )
)]
async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Product>> {
    let product = state.services.products.get_product(&id).await?;
    Ok(Json(product))
}

/// GET /api/products/category/{category} - Products in a category
///
/// The category must match exactly. An unknown category yields an empty list.
#[utoipa::path(
    get,
    path = "/category/{category}",
    tag = PRODUCT_TAG,
    params(("category" = String, Path, description = "Exact category name")),
    responses(
        (status = 200, description = "Matching products in insertion order", body = Vec<Product>)
    )
)]
async fn list_by_category(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> AppResult<Json<Vec<Product>>> {
    let products = state.services.products.list_by_category(&category).await?;
    Ok(Json(products))
}

/// POST /api/products - Create product
///
/// `stock` defaults to 0 when omitted.
#[utoipa::path(
    post,
    path = "/",
    tag = PRODUCT_TAG,
    request_body = CreateProductRequest,
    responses(
        (status = 201, description = "Product created", body = Product),
        (status = 400, description = "Invalid request data", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Admin access required", body = ErrorResponse)
    ),
    security(("bearerAuth" = []))
)]
async fn create_product(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateProductRequest>,
) -> AppResult<(StatusCode, Json<Product>)> {
    let product = state
        .services
        .products
        .create_product(payload.into_new_product())
        .await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// PUT /api/products/{id} - Update product
///
/// Only the fields present in the body change; an explicit `0` stock applies.
#[utoipa::path(
    put,
    path = "/{id}",
    tag = PRODUCT_TAG,
    params(("id" = String, Path, description = "Product ID")),
    request_body = UpdateProductRequest,
    responses(
        (status = 200, description = "Product updated", body = Product),
        (status = 400, description = "Invalid request data", body = ErrorResponse),
        (status = 403, description = "Admin access required", body = ErrorResponse),
        (status = 404, description = "Product not found", body = ErrorResponse)
    ),
    security(("bearerAuth" = []))
)]
async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidatedJson(payload): ValidatedJson<UpdateProductRequest>,
) -> AppResult<Json<Product>> {
    let product = state
        .services
        .products
        .update_product(&id, payload.into_update_product())
        .await?;
    Ok(Json(product))
}

/// DELETE /api/products/{id} - Delete product
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = PRODUCT_TAG,
    params(("id" = String, Path, description = "Product ID")),
    responses(
        (status = 204, description = "Product deleted"),
        (status = 403, description = "Admin access required", body = ErrorResponse),
        (status = 404, description = "Product not found", body = ErrorResponse)
    ),
    security(("bearerAuth" = []))
)]
async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    state.services.products.delete_product(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
