//! Helper functions for page rendering

mod date;
mod url;

pub use date::*;
pub use url::*;
