pub mod logger;
pub mod motion_planning;

pub use logger::*;
pub use motion_planning::*;
