use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Phone number for WhatsApp follow-up: optional `+`, 10-15 digits,
    /// spaces and hyphens allowed between digits
    /// - Valid: "9876543210", "+91 98765 43210", "+91-98765-43210"
    /// - Invalid: "12345", "phone", "+91 98765 4321x"
    pub static ref PHONE_REGEX: Regex = Regex::new(r"^\+?[0-9](?:[ -]?[0-9]){9,14}$").unwrap();
}
