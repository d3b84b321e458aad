//! Task definitions and loading
//!
//! A suite is a directory `suites/<suite>/tasks/` whose sub-directories are
//! tasks. Each task holds a `task.yml`, a prompt template and a case stream.

mod loader;
mod task;
mod template;

pub use loader::TaskLoader;
pub use task::{Case, EvaluatorSpec, TaskConfig};
pub use template::PromptTemplate;
