pub mod bubbles;
pub mod clock;
pub mod collision;
pub mod config;
pub mod interpreter;
pub mod runner;
pub mod scheduler;
pub mod stage;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::EngineConfig;
pub use interpreter::{execute, step};
pub use runner::{RunSummary, run_realtime, run_until_idle};
pub use scheduler::{Activation, RunState, Scheduler};
pub use stage::Stage;
