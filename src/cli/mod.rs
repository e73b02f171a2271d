pub mod contribute;
pub mod import;
pub mod setup;
pub mod ui;
pub mod validate;
