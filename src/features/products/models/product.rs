use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// A row of the `products` table.
///
/// Column names follow the table as created by the storefront's first
/// release: `imageUrl` and `updatedAt` are camelCase, `created_at` is not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub price: Decimal,
    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub stock: i64,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "imageUrl", default)]
    pub image_url: Option<String>,
    #[serde(rename = "updatedAt", default)]
    pub updated_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Product {
    pub fn is_in_stock(&self) -> bool {
        self.stock > 0
    }

    pub fn is_low_stock(&self, threshold: i64) -> bool {
        self.stock < threshold
    }
}

/// Insert payload; `id` and `created_at` are filled in by the database
#[derive(Debug, Clone, Serialize)]
pub struct NewProduct {
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub stock: i64,
    pub category: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "imageUrl")]
    pub image_url: Option<String>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

/// Partial update. `None` leaves a column untouched; for the nullable
/// columns `Some(None)` writes `NULL`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ProductPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::float_option"
    )]
    #[schema(value_type = Option<f64>)]
    pub price: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock: Option<i64>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_some"
    )]
    #[schema(value_type = Option<String>)]
    pub category: Option<Option<String>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_some"
    )]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,
    #[serde(
        rename = "imageUrl",
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_some"
    )]
    #[schema(value_type = Option<String>)]
    pub image_url: Option<Option<String>>,
    #[serde(rename = "updatedAt", default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>, format = DateTime)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl ProductPatch {
    pub fn stock(stock: i64) -> Self {
        Self {
            stock: Some(stock),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.price.is_none()
            && self.stock.is_none()
            && self.category.is_none()
            && self.description.is_none()
            && self.image_url.is_none()
    }

    /// Apply the patch to a product in place
    #[cfg(test)]
    pub fn apply_to(&self, product: &mut Product) {
        if let Some(name) = &self.name {
            product.name = name.clone();
        }
        if let Some(price) = self.price {
            product.price = price;
        }
        if let Some(stock) = self.stock {
            product.stock = stock;
        }
        if let Some(category) = &self.category {
            product.category = category.clone();
        }
        if let Some(description) = &self.description {
            product.description = description.clone();
        }
        if let Some(image_url) = &self.image_url {
            product.image_url = image_url.clone();
        }
        if let Some(updated_at) = self.updated_at {
            product.updated_at = Some(updated_at);
        }
    }
}

/// Distinguishes an explicit `null` from a missing field
fn deserialize_some<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// Rows written by older clients may carry `stock: null`
fn deserialize_null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Only the `stock` column, for the read half of a stock adjustment
#[derive(Debug, Clone, Deserialize)]
pub struct StockRow {
    #[serde(default)]
    pub stock: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(value: &str) -> Decimal {
        value.parse().unwrap()
    }

    #[test]
    fn test_product_deserializes_table_row() {
        let row = r#"{
            "id": "7f1c2b8e-2c1a-4a3e-9d55-0c6f5d7e8a90",
            "name": "Paracetamol 500mg",
            "price": 45.5,
            "stock": 100,
            "category": "otc",
            "description": null,
            "imageUrl": null,
            "updatedAt": "2026-10-16T09:00:00Z",
            "created_at": "2026-10-16T09:00:00+00:00"
        }"#;

        let product: Product = serde_json::from_str(row).unwrap();
        assert_eq!(product.price, dec("45.5"));
        assert_eq!(product.stock, 100);
        assert_eq!(product.category.as_deref(), Some("otc"));
        assert!(product.is_in_stock());
        assert!(!product.is_low_stock(5));
    }

    #[test]
    fn test_null_stock_reads_as_zero() {
        let row = r#"{
            "id": "7f1c2b8e-2c1a-4a3e-9d55-0c6f5d7e8a90",
            "name": "Bandage",
            "price": 20,
            "stock": null,
            "created_at": "2026-10-16T09:00:00Z"
        }"#;

        let product: Product = serde_json::from_str(row).unwrap();
        assert_eq!(product.stock, 0);
        assert!(!product.is_in_stock());
        assert!(product.image_url.is_none());
    }

    #[test]
    fn test_new_product_uses_table_column_names() {
        let new = NewProduct {
            name: "Cetirizine".to_string(),
            price: dec("12.00"),
            stock: 3,
            category: None,
            description: Some("Antihistamine".to_string()),
            image_url: None,
            updated_at: Utc::now(),
        };

        let value = serde_json::to_value(&new).unwrap();
        assert_eq!(value["price"], serde_json::json!(12.0));
        assert!(value.get("imageUrl").is_some());
        assert!(value.get("updatedAt").is_some());
        assert!(value.get("image_url").is_none());
    }

    #[test]
    fn test_patch_skips_untouched_columns() {
        let patch = ProductPatch::stock(7);
        let value = serde_json::to_value(&patch).unwrap();
        assert_eq!(value, serde_json::json!({ "stock": 7 }));
    }

    #[test]
    fn test_patch_null_clears_nullable_column() {
        let patch: ProductPatch =
            serde_json::from_str(r#"{ "description": null, "price": 9.99 }"#).unwrap();
        assert_eq!(patch.description, Some(None));
        assert_eq!(patch.category, None);
        assert_eq!(patch.price, Some(dec("9.99")));

        let value = serde_json::to_value(&patch).unwrap();
        assert_eq!(value["description"], serde_json::Value::Null);
        assert!(value.get("category").is_none());
    }
}
