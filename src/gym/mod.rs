pub mod planner;
pub mod smartcab;

pub use planner::RoutePlanner;
pub use smartcab::{Smartcab, WorldConfig};
