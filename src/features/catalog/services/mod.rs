mod catalog_renderer;

pub use catalog_renderer::CatalogRenderer;
