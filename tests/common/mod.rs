#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use trtl::interpreter::{Interpreter, RunOutcome};
use trtl::lexer::lex;
use trtl::token::TokenStream;
use trtl::value::Value;

/// A finished run plus every probe-command invocation in order.
pub struct Harness {
    pub outcome: RunOutcome,
    pub calls: Vec<(String, Vec<Value>)>,
}

impl Harness {
    pub fn call_names(&self) -> Vec<&str> {
        self.calls.iter().map(|(name, _)| name.as_str()).collect()
    }

    /// First argument of the nth call, as a double.
    pub fn nth_double(&self, index: usize) -> f64 {
        self.calls[index].1[0].as_double().expect("double argument")
    }

    pub fn messages(&self) -> Vec<String> {
        self.outcome
            .diagnostics
            .iter()
            .map(|d| d.to_string())
            .collect()
    }
}

/// Run a script with the given probe commands registered; each records
/// its invocations instead of drawing.
pub fn run_with_commands(source: &str, commands: &[(&str, usize)]) -> Harness {
    let tokens = lex(source).expect("lex failed");
    let mut interpreter = Interpreter::new(TokenStream::new(tokens));
    let calls: Rc<RefCell<Vec<(String, Vec<Value>)>>> = Rc::new(RefCell::new(Vec::new()));
    for (name, arity) in commands {
        let recorded_name = name.to_string();
        let log = Rc::clone(&calls);
        interpreter
            .register(name, *arity, move |args| {
                log.borrow_mut()
                    .push((recorded_name.clone(), args.to_vec()));
                Ok(())
            })
            .expect("register failed");
    }
    let outcome = interpreter.go();
    let calls = calls.borrow().clone();
    Harness { outcome, calls }
}

/// The default probe set used by most tests.
pub fn run(source: &str) -> Harness {
    run_with_commands(source, &[("fd", 1), ("rt", 1), ("bk", 1), ("emit", 1), ("pair", 2)])
}
