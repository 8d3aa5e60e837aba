pub mod checksum;
pub mod codec;
pub mod compression;
pub mod snapshot_model;
