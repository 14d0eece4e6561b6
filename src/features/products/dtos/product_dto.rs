use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::features::products::models::{NewProduct, ProductPatch};

/// Validated product fields, shared by the admin form and the JSON API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
pub struct ProductInput {
    #[validate(
        length(min = 1, max = 255, message = "Name must be 1-255 characters"),
        custom(function = "validate_not_blank")
    )]
    pub name: String,

    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64, minimum = 0)]
    #[validate(custom(function = "validate_non_negative_price"))]
    pub price: Decimal,

    #[validate(range(min = 0, message = "Stock must not be negative"))]
    pub stock: i64,

    #[validate(length(max = 100, message = "Category must not exceed 100 characters"))]
    pub category: Option<String>,

    #[validate(length(max = 5000, message = "Description must not exceed 5000 characters"))]
    pub description: Option<String>,

    #[serde(rename = "imageUrl")]
    #[validate(url(message = "Image URL must be a valid URL"))]
    pub image_url: Option<String>,
}

impl ProductInput {
    pub fn into_new_product(self, now: DateTime<Utc>) -> NewProduct {
        NewProduct {
            name: self.name,
            price: self.price,
            stock: self.stock,
            category: self.category,
            description: self.description,
            image_url: self.image_url,
            updated_at: now,
        }
    }

    /// Full replacement of every editable column, as the edit form submits
    pub fn into_patch(self) -> ProductPatch {
        ProductPatch {
            name: Some(self.name),
            price: Some(self.price),
            stock: Some(self.stock),
            category: Some(self.category),
            description: Some(self.description),
            image_url: Some(self.image_url),
            updated_at: None,
        }
    }
}

/// Partial update for `PATCH /api/products/{id}`.
///
/// Omitted fields are left alone. An empty string clears a nullable column.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateProductDto {
    #[validate(
        length(min = 1, max = 255, message = "Name must be 1-255 characters"),
        custom(function = "validate_not_blank")
    )]
    pub name: Option<String>,

    #[serde(default, with = "rust_decimal::serde::float_option")]
    #[schema(value_type = Option<f64>, minimum = 0)]
    #[validate(custom(function = "validate_non_negative_price"))]
    pub price: Option<Decimal>,

    #[validate(range(min = 0, message = "Stock must not be negative"))]
    pub stock: Option<i64>,

    #[validate(length(max = 100, message = "Category must not exceed 100 characters"))]
    pub category: Option<String>,

    #[validate(length(max = 5000, message = "Description must not exceed 5000 characters"))]
    pub description: Option<String>,

    #[serde(rename = "imageUrl")]
    pub image_url: Option<String>,
}

impl UpdateProductDto {
    pub fn into_patch(self) -> Result<ProductPatch, ValidationError> {
        let image_url = match self.image_url {
            Some(url) if !url.trim().is_empty() => {
                url::Url::parse(url.trim()).map_err(|_| {
                    ValidationError::new("url").with_message("Image URL must be a valid URL".into())
                })?;
                Some(Some(url.trim().to_string()))
            }
            Some(_) => Some(None),
            None => None,
        };

        Ok(ProductPatch {
            name: self.name.map(|name| name.trim().to_string()),
            price: self.price,
            stock: self.stock,
            category: self.category.map(empty_to_none),
            description: self.description.map(empty_to_none),
            image_url,
            updated_at: None,
        })
    }
}

/// Body of `POST /api/products/{id}/stock`
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct AdjustStockDto {
    /// Signed amount added to the current stock
    pub delta: i64,
}

fn empty_to_none(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank").with_message("Name must not be blank".into()));
    }
    Ok(())
}

fn validate_non_negative_price(price: &Decimal) -> Result<(), ValidationError> {
    if price.is_sign_negative() && !price.is_zero() {
        return Err(
            ValidationError::new("negative_price").with_message("Price must not be negative".into())
        );
    }
    Ok(())
}
