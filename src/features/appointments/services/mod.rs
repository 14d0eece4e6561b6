mod appointment_window;

pub use appointment_window::{appointment_window, DATETIME_LOCAL_FORMAT};
