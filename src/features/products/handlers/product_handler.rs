use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::auth::model::Session;
use crate::features::products::dtos::{AdjustStockDto, ProductInput, UpdateProductDto};
use crate::features::products::models::Product;
use crate::features::products::services::ProductService;
use crate::shared::types::{ApiResponse, Meta};

/// List all products, newest first
#[utoipa::path(
    get,
    path = "/api/products",
    responses(
        (status = 200, description = "All products", body = ApiResponse<Vec<Product>>),
        (status = 502, description = "Backend unavailable")
    ),
    tag = "products"
)]
pub async fn list_products(
    State(service): State<Arc<ProductService>>,
) -> Result<Json<ApiResponse<Vec<Product>>>> {
    let products = service.try_get_all_products().await?;
    let total = products.len() as i64;
    Ok(Json(ApiResponse::success(
        Some(products),
        None,
        Some(Meta { total }),
    )))
}

/// Create a product
#[utoipa::path(
    post,
    path = "/api/products",
    request_body = ProductInput,
    responses(
        (status = 201, description = "Product created", body = ApiResponse<Product>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Session required")
    ),
    security(("bearer_auth" = [])),
    tag = "products"
)]
pub async fn create_product(
    State(service): State<Arc<ProductService>>,
    session: Session,
    AppJson(dto): AppJson<ProductInput>,
) -> Result<(StatusCode, Json<ApiResponse<Product>>)> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let product = service.add_product(&session, dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(Some(product), None, None)),
    ))
}

/// Partially update a product
#[utoipa::path(
    patch,
    path = "/api/products/{id}",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    request_body = UpdateProductDto,
    responses(
        (status = 200, description = "Product updated", body = ApiResponse<Product>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Session required"),
        (status = 404, description = "Product not found")
    ),
    security(("bearer_auth" = [])),
    tag = "products"
)]
pub async fn update_product(
    State(service): State<Arc<ProductService>>,
    Path(id): Path<Uuid>,
    session: Session,
    AppJson(dto): AppJson<UpdateProductDto>,
) -> Result<Json<ApiResponse<Product>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let patch = dto
        .into_patch()
        .map_err(|e| AppError::Validation(e.to_string()))?;
    if patch.is_empty() {
        return Err(AppError::BadRequest("No fields to update".to_string()));
    }

    let product = service.update_product(&session, id, patch).await?;
    Ok(Json(ApiResponse::success(Some(product), None, None)))
}

/// Delete a product
#[utoipa::path(
    delete,
    path = "/api/products/{id}",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Product deleted (or already absent)", body = ApiResponse<bool>),
        (status = 401, description = "Session required")
    ),
    security(("bearer_auth" = [])),
    tag = "products"
)]
pub async fn delete_product(
    State(service): State<Arc<ProductService>>,
    Path(id): Path<Uuid>,
    session: Session,
) -> Result<Json<ApiResponse<bool>>> {
    let deleted = service.delete_product(&session, id).await?;
    Ok(Json(ApiResponse::success(
        Some(deleted),
        Some("Product deleted".to_string()),
        None,
    )))
}

/// Add a signed delta to a product's stock
#[utoipa::path(
    post,
    path = "/api/products/{id}/stock",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    request_body = AdjustStockDto,
    responses(
        (status = 200, description = "Stock adjusted", body = ApiResponse<Product>),
        (status = 401, description = "Session required"),
        (status = 404, description = "Product not found")
    ),
    security(("bearer_auth" = [])),
    tag = "products"
)]
pub async fn adjust_stock(
    State(service): State<Arc<ProductService>>,
    Path(id): Path<Uuid>,
    session: Session,
    AppJson(dto): AppJson<AdjustStockDto>,
) -> Result<Json<ApiResponse<Product>>> {
    let product = service.update_stock(&session, id, dto.delta).await?;
    Ok(Json(ApiResponse::success(Some(product), None, None)))
}
