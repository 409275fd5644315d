// Scenario suites for the coordinator; shared fixtures live in `utils`.
pub mod utils;
