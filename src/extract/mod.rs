pub mod descriptor_model;
pub mod extractor;
pub mod families;
pub mod forms;
pub mod validation;
pub mod value;
