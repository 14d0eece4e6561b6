use serde::Serialize;

use crate::core::config::StorefrontConfig;
use crate::core::error::Result;
use crate::features::products::models::Product;
use crate::shared::constants::NO_PRODUCTS_MESSAGE;
use crate::shared::format::format_inr;
use crate::shared::templates::render_template;
use minijinja::context;

/// One product card in the public catalog
#[derive(Debug, Clone, Serialize)]
pub struct ProductCard {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub image_url: String,
    pub price_label: String,
    pub low_stock_message: Option<String>,
    pub order_url: String,
}

/// Turns the product list into the public catalog markup
pub struct CatalogRenderer {
    config: StorefrontConfig,
}

impl CatalogRenderer {
    pub fn new(config: StorefrontConfig) -> Self {
        Self { config }
    }

    pub fn store_name(&self) -> &str {
        &self.config.store_name
    }

    /// Cards for the in-stock products, in the order given
    pub fn cards(&self, products: &[Product]) -> Vec<ProductCard> {
        products
            .iter()
            .filter(|product| product.is_in_stock())
            .map(|product| self.card(product))
            .collect()
    }

    fn card(&self, product: &Product) -> ProductCard {
        let low_stock_message = product
            .is_low_stock(self.config.low_stock_threshold)
            .then(|| format!("Only {} left in stock!", product.stock));

        ProductCard {
            id: product.id.to_string(),
            name: product.name.clone(),
            description: product
                .description
                .clone()
                .filter(|description| !description.is_empty()),
            image_url: product
                .image_url
                .clone()
                .filter(|url| !url.is_empty())
                .unwrap_or_else(|| self.config.placeholder_image_url.clone()),
            price_label: format_inr(product.price),
            low_stock_message,
            order_url: self.order_link(product),
        }
    }

    /// WhatsApp deep link with a prefilled order message
    pub fn order_link(&self, product: &Product) -> String {
        format!(
            "https://wa.me/{}?text=Hello%20{},%20I%20want%20to%20order:%0AProduct:%20{}%0APrice:%20{}%0AQty:%201%0AAddress:%20%5BYour%20Address%5D",
            self.config.whatsapp_number,
            urlencoding::encode(&self.config.store_name),
            urlencoding::encode(&product.name),
            urlencoding::encode(&format_inr(product.price)),
        )
    }

    /// Inner markup of `#products-container`
    pub fn render_fragment(&self, products: &[Product]) -> Result<String> {
        render_template(
            "catalog/products.html",
            context! {
                cards => self.cards(products),
                empty_message => NO_PRODUCTS_MESSAGE,
            },
        )
    }
}
