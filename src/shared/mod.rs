pub mod constants;
pub mod cookies;
pub mod flash;
pub mod format;
pub mod templates;
pub mod toast;
pub mod types;
pub mod validation;

#[cfg(test)]
pub mod test_helpers;
