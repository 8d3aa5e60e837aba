pub mod match_key;
pub mod normalize;
