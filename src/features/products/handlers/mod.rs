pub mod product_handler;

pub use product_handler::{
    __path_adjust_stock, __path_create_product, __path_delete_product, __path_list_products,
    __path_update_product, adjust_stock, create_product, delete_product, list_products,
    update_product,
};
