pub mod cli;
pub mod prompt;
pub mod run;
pub mod settings;

pub use cli::Cli;
pub use run::{RunPlan, RunReport, build_request, run_task};
pub use settings::Settings;
