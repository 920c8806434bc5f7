//! Operator confirmation as an injectable capability.

/// A yes/no question put to the operator.
///
/// The driver asks at most once per run, and only in paginated mode when
/// invalid records were seen. Injecting the answer keeps the driver testable
/// without an interactive terminal.
pub trait Confirm: Send + Sync {
    fn confirm(&self, prompt: &str) -> anyhow::Result<bool>;
}
