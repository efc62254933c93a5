pub mod admin_key;
pub mod base_url;
pub mod error_details;
