//! Terminal output: progress bars and run summaries.

pub mod progress;
pub mod summary;

pub use progress::ProgressObserver;
pub use summary::{SummaryOptions, render_totals};
