mod admin_handler;

pub use admin_handler::{
    cancel, create, delete, delete_confirm, edit_form, list, new_form, table_stream, update,
    AdminPageState,
};
