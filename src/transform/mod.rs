pub mod coordinates;
pub mod tle;
