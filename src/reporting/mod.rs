pub mod analysis;
pub mod summary;
