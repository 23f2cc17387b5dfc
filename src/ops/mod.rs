pub mod progress;
pub mod project_ops;
pub mod reorder;
pub mod task_ops;
pub mod transfer;
pub mod week_bars;
