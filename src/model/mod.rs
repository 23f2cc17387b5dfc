pub mod config;
pub mod lenient;
pub mod palette;
pub mod project;
pub mod state;
pub mod task;

pub use config::*;
pub use palette::*;
pub use project::*;
pub use state::*;
pub use task::*;
