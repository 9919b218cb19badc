//! Data transfer objects for the application layer.

mod fill_request;

pub use fill_request::parse_fill_request;
