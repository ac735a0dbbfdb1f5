pub mod motion_planning_service;

pub use motion_planning_service::*;
