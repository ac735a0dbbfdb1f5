pub mod collision;
pub mod objective;
pub mod planner;
pub mod scenario;
pub mod solution;
pub mod trajectory;
pub mod types;

// Re-export all public types for convenience
pub use collision::*;
pub use objective::*;
pub use planner::*;
pub use scenario::*;
pub use solution::*;
pub use trajectory::*;
pub use types::*;
