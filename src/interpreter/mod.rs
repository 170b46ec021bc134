pub mod callables;
pub mod control_flow;
pub mod environment;
pub mod error;
pub mod evaluator;
pub mod expression;

pub use callables::{Callable, Command, CommandError, CommandHandler, CommandKind, Procedure, Registry, RegistryError};
pub use control_flow::Flow;
pub use environment::{Scope, ScopeChain};
pub use error::{Fault, Severity};
pub use evaluator::{Interpreter, RunOutcome, DEFAULT_MAX_DEPTH};
