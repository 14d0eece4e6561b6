// =============================================================================
// CATALOG
// =============================================================================

pub const NO_PRODUCTS_MESSAGE: &str = "No products available at the moment.";

// =============================================================================
// ADMIN TOASTS
// =============================================================================

pub const MSG_PRODUCT_ADDED: &str = "Product added successfully!";
pub const MSG_PRODUCT_UPDATED: &str = "Product updated successfully!";
pub const MSG_PRODUCT_SAVE_FAILED: &str = "Error saving product. Please try again.";
pub const MSG_PRODUCT_DELETED: &str = "Product deleted successfully!";
pub const MSG_PRODUCT_DELETE_FAILED: &str = "Error deleting product. Please try again.";
pub const MSG_PRODUCT_LOAD_FAILED: &str = "Error loading product details. Please try again.";

// =============================================================================
// APPOINTMENTS
// =============================================================================

pub const MSG_APPOINTMENT_BOOKED: &str =
    "Appointment booked successfully! We will contact you shortly on WhatsApp.";
pub const MSG_APPOINTMENT_FAILED: &str = "An error occurred. Please try again.";

// =============================================================================
// AUTH
// =============================================================================

pub const ADMIN_LOGIN_PATH: &str = "/admin/login";
pub const ADMIN_HOME_PATH: &str = "/admin";
