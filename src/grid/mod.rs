pub mod generator;
pub mod tract;
