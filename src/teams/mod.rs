//! Sales team aggregation and page view state.

mod performance;
mod view;

pub use performance::*;
pub use view::*;
