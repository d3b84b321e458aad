//! Command implementations

pub mod aggregate;
pub mod list;
pub mod matrix;
pub mod run;
