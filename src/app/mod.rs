mod orchestrator;
mod runtime;
mod shutdown;
mod simulate;
mod startup;
mod types;

#[cfg(test)]
mod tests;

pub use orchestrator::DojoOrchestrator;
pub use types::{ComponentState, ShutdownReason, SimulationOptions, SimulationReport, UserCommand};
