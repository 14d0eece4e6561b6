mod catalog_handler;

pub use catalog_handler::{index, products_fragment, products_stream, CatalogState};
