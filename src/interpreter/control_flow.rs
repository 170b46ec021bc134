/// The outcome of one interpreting call. Faults are recorded (diagnostic +
/// error flag) at the raise site, so a recovered fault surfaces here as
/// `Completed` and scanning simply goes on; `Unwound` aborts the whole run;
/// `Stopped` unwinds to the nearest enclosing procedure invocation, which
/// converts it back to `Completed` after popping its scope.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Completed,
    Stopped,
    Unwound,
}
