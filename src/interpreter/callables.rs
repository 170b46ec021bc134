use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::token::TokenStream;
use crate::value::Value;

/// Failure signalled by a host command handler; reported by the
/// interpreter with the command name and call-site position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandError {
    pub message: String,
}

impl CommandError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CommandError {}

pub type CommandHandler = Rc<dyn Fn(&[Value]) -> Result<(), CommandError>>;

/// What a command does when invoked. `Make` and `Stop` need interpreter
/// state (the global scope, the non-local exit) and are executed by the
/// interpreter itself; everything else is a host handler.
#[derive(Clone)]
pub enum CommandKind {
    Host(CommandHandler),
    Make,
    Stop,
}

impl fmt::Debug for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandKind::Host(_) => write!(f, "Host(..)"),
            CommandKind::Make => write!(f, "Make"),
            CommandKind::Stop => write!(f, "Stop"),
        }
    }
}

/// A fixed-arity built-in supplied before the run starts.
#[derive(Debug, Clone)]
pub struct Command {
    pub name: String,
    pub arity: usize,
    pub kind: CommandKind,
}

/// A user-defined callable created by `to`/`end`: named formal parameters
/// and a token-range body.
#[derive(Debug, Clone)]
pub struct Procedure {
    pub name: String,
    pub params: Vec<String>,
    pub body: TokenStream,
}

#[derive(Debug, Clone)]
pub enum Callable {
    Command(Command),
    Procedure(Procedure),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    NameTaken { name: String },
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::NameTaken { name } => {
                write!(f, "a command named '{}' is already registered", name)
            }
        }
    }
}

impl std::error::Error for RegistryError {}

/// One case-insensitive name→Callable table for commands and procedures.
/// Command registration is append-only; procedure definition replaces a
/// prior procedure but may never displace a command.
#[derive(Debug)]
pub struct Registry {
    entries: IndexMap<String, Callable>,
}

impl Registry {
    /// A fresh registry always carries the two language-provided commands:
    /// `make` (bind a global variable) and `stop` (non-local exit).
    pub fn new() -> Self {
        let mut registry = Self {
            entries: IndexMap::new(),
        };
        for (name, arity, kind) in [
            ("make", 2, CommandKind::Make),
            ("stop", 0, CommandKind::Stop),
        ] {
            registry.entries.insert(
                name.to_string(),
                Callable::Command(Command {
                    name: name.to_string(),
                    arity,
                    kind,
                }),
            );
        }
        registry
    }

    pub fn register_command(
        &mut self,
        name: &str,
        arity: usize,
        kind: CommandKind,
    ) -> Result<(), RegistryError> {
        let key = name.to_lowercase();
        if self.entries.contains_key(&key) {
            return Err(RegistryError::NameTaken { name: key });
        }
        self.entries.insert(
            key.clone(),
            Callable::Command(Command {
                name: key,
                arity,
                kind,
            }),
        );
        Ok(())
    }

    /// Install a procedure. A prior procedure of the same name is silently
    /// replaced; the caller guards against command names beforehand.
    pub fn define_procedure(&mut self, procedure: Procedure) {
        self.entries
            .insert(procedure.name.clone(), Callable::Procedure(procedure));
    }

    pub fn lookup(&self, name: &str) -> Option<&Callable> {
        self.entries.get(&name.to_lowercase())
    }

    pub fn is_command(&self, name: &str) -> bool {
        matches!(self.lookup(name), Some(Callable::Command(_)))
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}
