//! Task assignment: which unit an annotator sees next, and how much
//! surrounding text they may pull in

mod select;
mod types;
mod window;

pub use select::TaskSelector;
pub use types::{AssignedTask, Granularity, Task, Window};
pub use window::{expand_above, expand_below};
