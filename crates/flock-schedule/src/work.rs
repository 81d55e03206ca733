//! The `Work` trait — what an execution unit computes.

/// A pure computation from one payload to one result.
///
/// Execution units hold an `Arc<W>` and call [`process`][Self::process] once
/// per dispatched payload, so implementations must be `Send + Sync`.  All
/// inputs arrive by value; a `Work` must not keep per-payload state between
/// calls (a unit never leaks one job's data into the next).
///
/// # Example
///
/// ```rust
/// use flock_schedule::Work;
///
/// struct Double;
///
/// impl Work for Double {
///     type Input = u32;
///     type Output = u32;
///     fn process(&self, input: u32) -> u32 { input * 2 }
/// }
///
/// assert_eq!(Double.process(21), 42);
/// ```
pub trait Work: Send + Sync + 'static {
    type Input: Send + 'static;
    type Output: Send + 'static;

    fn process(&self, input: Self::Input) -> Self::Output;
}
