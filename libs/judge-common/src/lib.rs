pub mod encoding;
pub mod env;
pub mod types;
