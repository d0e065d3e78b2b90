//! Lead status machine, filtering, and the page-owned lead cache.

mod filter;
mod status;
mod store;

pub use filter::*;
pub use status::*;
pub use store::*;
