pub mod planner;
pub mod selection;
pub mod state;

pub use planner::Planner;
pub use selection::SelectionController;
pub use state::PlannerState;
