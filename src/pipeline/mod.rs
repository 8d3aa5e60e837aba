pub mod pipeline;
pub mod presence;
