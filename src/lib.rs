pub mod config;
pub mod git;
pub mod rewrite;

mod error;

pub use error::Error;
