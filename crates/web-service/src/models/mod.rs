pub mod common;
pub mod err;
pub mod filter;
pub mod issues;
