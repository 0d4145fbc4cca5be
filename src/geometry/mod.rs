pub mod polygon;
pub mod shell;
