pub mod loader;
pub mod reports;
pub mod seeds;
pub mod simulation;

pub use loader::ConfigDirLoader;
pub use seeds::resolve_seed_inputs;
pub use simulation::{JobSimulationResult, OrderSimulator, SimulationPlan, TesterEngine};
