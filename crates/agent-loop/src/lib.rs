pub mod runner;

pub use runner::{run_instance, Result, RunnerContext};
