pub mod apply;
pub mod component;
pub mod engine;
