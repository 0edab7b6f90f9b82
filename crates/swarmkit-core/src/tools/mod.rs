mod traits;
mod args;
mod function;
mod handoff;
mod retry;

pub use traits::*;
pub use args::Args;
pub use function::{FunctionTool, FunctionToolBuilder, ParamKind, ParamSpec};
pub use handoff::Handoff;
pub use retry::{RetryPolicy, WithRetry};
