pub mod common;
pub mod header;
pub mod import;
pub mod layout;
pub mod methods;
