pub mod aggregate;
pub mod expr;
pub mod generation;
pub mod ports;
pub mod warm_start;

pub use aggregate::*;
pub use expr::*;
pub use generation::*;
pub use ports::*;
pub use warm_start::*;
