//! Admin panel view state.
//!
//! The panel is either showing the product table or the product form. The
//! product being edited, if any, is part of the form state, so a submit
//! always knows whether it creates or updates.
//!
//! ```text
//!   List --open_create--> Form{edit_id: None}
//!   List --open_edit----> Form{edit_id: Some(id)}   (not found: stay, error toast)
//!   Form --submit ok----> List                       (success toast)
//!   Form --submit err---> Form                       (error toast, input kept)
//!   Form --cancel-------> List
//!   List --delete-------> List                       (success or error toast)
//! ```

use uuid::Uuid;

use crate::features::admin::dtos::ProductFormInput;
use crate::features::auth::model::Session;
use crate::features::products::models::Product;
use crate::features::products::ProductService;
use crate::shared::constants::{
    MSG_PRODUCT_ADDED, MSG_PRODUCT_DELETED, MSG_PRODUCT_DELETE_FAILED, MSG_PRODUCT_LOAD_FAILED,
    MSG_PRODUCT_SAVE_FAILED, MSG_PRODUCT_UPDATED,
};
use crate::shared::toast::Toast;

#[derive(Debug, Clone, PartialEq)]
pub struct ProductForm {
    /// `Some` when editing an existing product
    pub edit_id: Option<Uuid>,
    pub fields: ProductFormInput,
}

impl ProductForm {
    pub fn title(&self) -> &'static str {
        if self.edit_id.is_some() {
            "Edit Product"
        } else {
            "Add New Product"
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AdminView {
    List,
    Form(ProductForm),
}

#[derive(Debug)]
pub struct AdminPanel {
    view: AdminView,
    toast: Option<Toast>,
}

impl Default for AdminPanel {
    fn default() -> Self {
        Self {
            view: AdminView::List,
            toast: None,
        }
    }
}

impl AdminPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Panel already showing the create form
    pub fn creating() -> Self {
        let mut panel = Self::new();
        panel.open_create();
        panel
    }

    /// Panel already showing the edit form for `id`; the fields are replaced
    /// by whatever gets submitted
    pub fn editing(id: Uuid) -> Self {
        Self {
            view: AdminView::Form(ProductForm {
                edit_id: Some(id),
                fields: ProductFormInput::default(),
            }),
            toast: None,
        }
    }

    pub fn view(&self) -> &AdminView {
        &self.view
    }

    pub fn take_toast(&mut self) -> Option<Toast> {
        self.toast.take()
    }

    pub fn open_create(&mut self) {
        self.view = AdminView::Form(ProductForm {
            edit_id: None,
            fields: ProductFormInput::default(),
        });
    }

    /// Look `id` up in a freshly loaded list and open it for editing
    pub fn open_edit(&mut self, id: Uuid, products: &[Product]) -> bool {
        match products.iter().find(|product| product.id == id) {
            Some(product) => {
                self.view = AdminView::Form(ProductForm {
                    edit_id: Some(id),
                    fields: ProductFormInput::from_product(product),
                });
                true
            }
            None => {
                tracing::warn!("Product {} not found for editing", id);
                self.toast = Some(Toast::error(MSG_PRODUCT_LOAD_FAILED));
                false
            }
        }
    }

    pub fn cancel(&mut self) {
        self.view = AdminView::List;
    }

    /// Save the submitted fields. Only meaningful while the form is open.
    pub async fn submit(
        &mut self,
        service: &ProductService,
        session: &Session,
        fields: ProductFormInput,
    ) {
        let edit_id = match &self.view {
            AdminView::Form(form) => form.edit_id,
            AdminView::List => {
                tracing::warn!("Product form submitted while the table was showing");
                return;
            }
        };

        let result = match fields.parse() {
            Ok(input) => match edit_id {
                Some(id) => service
                    .update_product(session, id, input.into_patch())
                    .await
                    .map(|_| MSG_PRODUCT_UPDATED),
                None => service
                    .add_product(session, input)
                    .await
                    .map(|_| MSG_PRODUCT_ADDED),
            },
            Err(errors) => {
                tracing::info!("Product form rejected: {}", errors.join("; "));
                self.fail_submit(edit_id, fields);
                return;
            }
        };

        match result {
            Ok(message) => {
                self.view = AdminView::List;
                self.toast = Some(Toast::success(message));
            }
            Err(e) => {
                tracing::error!("Error saving product: {}", e);
                self.fail_submit(edit_id, fields);
            }
        }
    }

    fn fail_submit(&mut self, edit_id: Option<Uuid>, fields: ProductFormInput) {
        self.view = AdminView::Form(ProductForm { edit_id, fields });
        self.toast = Some(Toast::error(MSG_PRODUCT_SAVE_FAILED));
    }

    /// Delete after the admin confirmed. The table catches up through the
    /// live feed rather than a reload here.
    pub async fn delete(&mut self, service: &ProductService, session: &Session, id: Uuid) {
        self.view = AdminView::List;
        self.toast = Some(match service.delete_product(session, id).await {
            Ok(_) => Toast::success(MSG_PRODUCT_DELETED),
            Err(e) => {
                tracing::error!("Error deleting product {}: {}", id, e);
                Toast::error(MSG_PRODUCT_DELETE_FAILED)
            }
        });
    }
}
