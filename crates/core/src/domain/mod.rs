pub mod metric;
pub mod narrative;
pub mod raw;
pub mod report;
pub mod structured;
