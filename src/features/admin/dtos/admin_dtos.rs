use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::features::products::dtos::ProductInput;
use crate::features::products::models::Product;
use crate::shared::format::{capitalize_words, format_inr_fixed, truncate};

const DESCRIPTION_EXCERPT_CHARS: usize = 50;

/// Product form exactly as submitted. Every field is raw text so a rejected
/// submission can be shown again as typed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductFormInput {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub stock: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image_url: String,
}

impl ProductFormInput {
    /// Prefill for editing an existing product
    pub fn from_product(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            price: product.price.normalize().to_string(),
            stock: product.stock.to_string(),
            category: product.category.clone().unwrap_or_default(),
            description: product.description.clone().unwrap_or_default(),
            image_url: product.image_url.clone().unwrap_or_default(),
        }
    }

    /// Parse and validate into a [`ProductInput`]
    pub fn parse(&self) -> Result<ProductInput, Vec<String>> {
        let mut errors = Vec::new();

        let price = match self.price.trim().parse::<Decimal>() {
            Ok(price) => Some(price),
            Err(_) => {
                errors.push("price: Price must be a number".to_string());
                None
            }
        };
        let stock = match self.stock.trim().parse::<i64>() {
            Ok(stock) => Some(stock),
            Err(_) => {
                errors.push("stock: Stock must be a whole number".to_string());
                None
            }
        };

        let (Some(price), Some(stock)) = (price, stock) else {
            return Err(errors);
        };

        let input = ProductInput {
            name: self.name.trim().to_string(),
            price,
            stock,
            category: non_empty(&self.category),
            description: non_empty(&self.description),
            image_url: non_empty(&self.image_url),
        };

        input
            .validate()
            .map_err(|e| e.to_string().lines().map(str::to_string).collect::<Vec<_>>())?;
        Ok(input)
    }
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// One row of the admin products table
#[derive(Debug, Clone, Serialize)]
pub struct ProductRow {
    pub id: String,
    pub name: String,
    pub description_excerpt: String,
    pub image_url: Option<String>,
    pub category_label: String,
    pub price_label: String,
    pub stock: i64,
    pub stock_badge_class: &'static str,
}

impl From<&Product> for ProductRow {
    fn from(product: &Product) -> Self {
        let category_label = product
            .category
            .as_deref()
            .filter(|category| !category.is_empty())
            .map(capitalize_words)
            .unwrap_or_else(|| "N/A".to_string());

        Self {
            id: product.id.to_string(),
            name: product.name.clone(),
            description_excerpt: product
                .description
                .as_deref()
                .map(|description| truncate(description, DESCRIPTION_EXCERPT_CHARS))
                .unwrap_or_default(),
            image_url: product.image_url.clone().filter(|url| !url.is_empty()),
            category_label,
            price_label: format_inr_fixed(product.price),
            stock: product.stock,
            stock_badge_class: if product.is_in_stock() {
                "bg-green-100 text-green-800"
            } else {
                "bg-red-100 text-red-800"
            },
        }
    }
}

/// Body of the delete confirmation form
#[derive(Debug, Deserialize)]
pub struct DeleteConfirmDto {
    #[serde(default)]
    pub confirm: Option<String>,
}

impl DeleteConfirmDto {
    pub fn is_confirmed(&self) -> bool {
        self.confirm.as_deref() == Some("yes")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::product;

    fn form(name: &str, price: &str, stock: &str) -> ProductFormInput {
        ProductFormInput {
            name: name.to_string(),
            price: price.to_string(),
            stock: stock.to_string(),
            ..ProductFormInput::default()
        }
    }

    #[test]
    fn test_parse_trims_and_types_fields() {
        let mut raw = form("  Paracetamol 500mg ", "45.50", "100");
        raw.category = "otc".to_string();
        raw.description = "   ".to_string();

        let input = raw.parse().unwrap();
        assert_eq!(input.name, "Paracetamol 500mg");
        assert_eq!(input.price, "45.5".parse().unwrap());
        assert_eq!(input.stock, 100);
        assert_eq!(input.category.as_deref(), Some("otc"));
        assert_eq!(input.description, None);
    }

    #[test]
    fn test_parse_rejects_instead_of_coercing() {
        assert!(form("Dolo", "abc", "1").parse().is_err());
        assert!(form("Dolo", "10", "1.5").parse().is_err());
        assert!(form("Dolo", "10", "").parse().is_err());
        assert!(form("", "10", "1").parse().is_err());
        assert!(form("Dolo", "-1", "1").parse().is_err());
    }

    #[test]
    fn test_row_labels() {
        let mut item = product("Dolo 650", 0);
        item.category = Some("pain relief".to_string());
        item.price = "45.5".parse().unwrap();
        item.description = Some("x".repeat(60));

        let row = ProductRow::from(&item);
        assert_eq!(row.category_label, "Pain Relief");
        assert_eq!(row.price_label, "₹45.50");
        assert_eq!(row.stock_badge_class, "bg-red-100 text-red-800");
        assert_eq!(row.description_excerpt.len(), 53);

        let row = ProductRow::from(&product("Cetirizine", 2));
        assert_eq!(row.category_label, "N/A");
        assert_eq!(row.stock_badge_class, "bg-green-100 text-green-800");
    }

    #[test]
    fn test_prefill_round_trips_through_parse() {
        let mut item = product("Dolo 650", 7);
        item.price = "30.00".parse().unwrap();

        let raw = ProductFormInput::from_product(&item);
        assert_eq!(raw.price, "30");
        assert_eq!(raw.parse().unwrap().stock, 7);
    }

    #[test]
    fn test_delete_confirmation() {
        assert!(DeleteConfirmDto { confirm: Some("yes".to_string()) }.is_confirmed());
        assert!(!DeleteConfirmDto { confirm: None }.is_confirmed());
    }
}
