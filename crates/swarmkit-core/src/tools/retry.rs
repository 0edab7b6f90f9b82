use crate::context::ContextVariables;
use crate::error::SwarmError;
use crate::tools::{AgentFunction, Args, FunctionResult};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_secs(1),
        }
    }
}

type DelayFn = Arc<dyn Fn(&Args) -> Option<Duration> + Send + Sync>;

/// Retries the wrapped function when it returns a retryable error.
/// Invalid arguments are returned at once.
///
/// Exhausting the attempts is not an error: the last failure is reported to
/// the model as the function's value so it can explain what happened.
pub struct WithRetry<F> {
    inner: F,
    policy: RetryPolicy,
    delay_for: Option<DelayFn>,
}

impl<F: AgentFunction> WithRetry<F> {
    pub fn new(inner: F, policy: RetryPolicy) -> Self {
        Self {
            inner,
            policy,
            delay_for: None,
        }
    }

    /// Pick the delay from the call's arguments, falling back to the policy delay.
    pub fn with_delay_fn(
        mut self,
        f: impl Fn(&Args) -> Option<Duration> + Send + Sync + 'static,
    ) -> Self {
        self.delay_for = Some(Arc::new(f));
        self
    }

    fn delay(&self, args: &Args) -> Duration {
        self.delay_for
            .as_ref()
            .and_then(|f| f(args))
            .unwrap_or(self.policy.delay)
    }
}

#[async_trait::async_trait]
impl<F: AgentFunction> AgentFunction for WithRetry<F> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn description(&self) -> &str {
        self.inner.description()
    }

    fn parameters_schema(&self) -> Value {
        self.inner.parameters_schema()
    }

    async fn execute(
        &self,
        args: Args,
        context: &ContextVariables,
    ) -> Result<FunctionResult, SwarmError> {
        let max = self.policy.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;
            match self.inner.execute(args.clone(), context).await {
                Ok(result) => return Ok(result),
                Err(e) if !e.is_retryable() => return Err(e),
                Err(e) if attempt >= max => {
                    tracing::warn!(function = %self.name(), attempts = attempt, error = %e, "giving up");
                    return Ok(FunctionResult::new(format!(
                        "Failed after {max} retries: {e}"
                    )));
                }
                Err(e) => {
                    let delay = self.delay(&args);
                    tracing::warn!(
                        function = %self.name(),
                        "Retry {attempt}/{max} after {:.1}s delay: {e}",
                        delay.as_secs_f64()
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}
