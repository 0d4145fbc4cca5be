pub mod matcher;
pub mod validation;
