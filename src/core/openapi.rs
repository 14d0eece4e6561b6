use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::features::products::{dtos as products_dtos, handlers as products_handlers, models};
use crate::shared::types::{ApiResponse, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Products
        products_handlers::list_products,
        products_handlers::create_product,
        products_handlers::update_product,
        products_handlers::delete_product,
        products_handlers::adjust_stock,
    ),
    components(
        schemas(
            Meta,
            models::Product,
            products_dtos::ProductInput,
            products_dtos::UpdateProductDto,
            products_dtos::AdjustStockDto,
            ApiResponse<models::Product>,
            ApiResponse<Vec<models::Product>>,
            ApiResponse<bool>,
        )
    ),
    tags(
        (name = "products", description = "Product catalog management"),
    ),
    modifiers(&SecurityAddon),
    info(
        title = "Dava Samjho Storefront API",
        version = "0.1.0",
        description = "API documentation for the Dava Samjho storefront",
    )
)]
pub struct ApiDoc;

/// Adds the session bearer scheme (the backend access token) to the OpenAPI document
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_product_paths() {
        let mut openapi = ApiDoc::openapi();
        SwaggerInfoModifier {
            title: "Shop".to_string(),
            version: "1.2.3".to_string(),
            description: "desc".to_string(),
        }
        .modify(&mut openapi);

        assert_eq!(openapi.info.title, "Shop");
        assert!(openapi.paths.paths.contains_key("/api/products"));
        assert!(openapi.paths.paths.contains_key("/api/products/{id}/stock"));

        let components = openapi.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }
}
