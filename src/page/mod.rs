pub mod dom;
pub mod loader;
pub mod path;
