pub mod paths;
pub mod runtime;
