pub mod table;
pub mod task_meta;
pub mod writer;

pub use table::EventTable;
pub use writer::{ConversionLog, WriteOutcome};
