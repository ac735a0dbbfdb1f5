pub mod console_logger;
pub mod file_logger;
pub mod multi_logger;
pub mod noop_logger;
pub mod path_export;
pub mod reference_solver;
pub mod scenario_data;

pub use console_logger::*;
pub use file_logger::*;
pub use multi_logger::*;
pub use noop_logger::*;
pub use path_export::*;
pub use reference_solver::{reference_solver_factory, ReferenceSolver};
pub use scenario_data::*;
