mod feed;
mod product_service;
mod repository;

pub use feed::ProductFeed;
pub use product_service::ProductService;
pub use repository::{ProductRepository, SupabaseProductRepository};
