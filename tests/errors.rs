mod common;

use common::{run, run_with_commands};
use trtl::interpreter::CommandError;
use trtl::lexer::lex;

#[test]
fn test_multiple_independent_errors_all_reported() {
    let result = run("first\nfd 10\nsecond");
    assert!(result.outcome.had_error);
    let messages = result.messages();
    assert_eq!(messages.len(), 2);
    assert!(messages[0].contains("Undefined procedure or primitive 'first'"));
    assert!(messages[1].contains("Undefined procedure or primitive 'second'"));
}

#[test]
fn test_execution_suppressed_after_first_error() {
    // fd comes after the first fault: its argument is still validated but
    // the command does not run.
    let result = run("nosuch\nfd 10");
    assert!(result.outcome.had_error);
    assert!(result.calls.is_empty());
}

#[test]
fn test_commands_before_error_do_run() {
    let result = run("fd 10\nnosuch");
    assert_eq!(result.call_names(), vec!["fd"]);
}

#[test]
fn test_unknown_character_reported_and_scanning_continues() {
    let result = run("fd 1\n@\nrt 2");
    assert!(result.outcome.had_error);
    let messages = result.messages();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].contains("Unexpected character '@'"));
    assert_eq!(result.call_names(), vec!["fd"]);
}

#[test]
fn test_stray_value_token_reported() {
    let result = run("5 fd 1");
    assert!(result.outcome.had_error);
    assert!(result.messages()[0].contains("Unexpected Integer '5'"));
}

#[test]
fn test_not_enough_arguments_message_format() {
    let result = run("fd");
    assert_eq!(
        result.messages(),
        vec!["FD: need more arguments @ line 1, column 1".to_string()]
    );
}

#[test]
fn test_undefined_variable_diagnostic_format() {
    let result = run("fd :x\nrt 1");
    assert!(result.outcome.had_error);
    assert_eq!(
        result.messages(),
        vec!["Undefined variable 'x' @ line 1, column 4".to_string()]
    );
    assert!(result.calls.is_empty());
}

#[test]
fn test_expression_fault_at_command_site_is_serious() {
    let result = run("fd 1 +\nrt 1");
    assert!(result.outcome.had_error);
    let messages = result.messages();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].contains("Expression syntax error"));
    assert!(result.calls.is_empty());
}

#[test]
fn test_serious_fault_discards_rest_of_run() {
    let result = run("repeat 2 [fd 1\nnosuch 1");
    assert!(result.outcome.had_error);
    assert_eq!(result.messages().len(), 1);
}

#[test]
fn test_bad_quote_aborts_lexing() {
    let error = lex("fd 1\nprint \"oops").expect_err("should fail");
    assert_eq!(error.to_string(), "Bad quoted string @ line 2, column 7");
}

#[test]
fn test_failing_host_command_is_recoverable() {
    let source = "boom 1\nnosuch";
    let tokens = lex(source).expect("lex failed");
    let mut interpreter = trtl::Interpreter::new(trtl::TokenStream::new(tokens));
    interpreter
        .register("boom", 1, |_args| {
            Err(CommandError::new("invalid number"))
        })
        .expect("register failed");
    let outcome = interpreter.go();
    assert!(outcome.had_error);
    let messages: Vec<String> = outcome.diagnostics.iter().map(|d| d.to_string()).collect();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0], "BOOM: invalid number @ line 1, column 1");
    assert!(messages[1].contains("nosuch"));
}

#[test]
fn test_clean_run_reports_nothing() {
    let result = run("fd 10\nrt 90\nfd 10");
    assert!(!result.outcome.had_error);
    assert!(result.outcome.diagnostics.is_empty());
    assert_eq!(result.calls.len(), 3);
}

#[test]
fn test_diagnostics_keep_source_order() {
    let result = run_with_commands("alpha\nbeta\ngamma", &[]);
    let messages = result.messages();
    assert_eq!(messages.len(), 3);
    assert!(messages[0].contains("'alpha'"));
    assert!(messages[1].contains("'beta'"));
    assert!(messages[2].contains("'gamma'"));
}

#[test]
fn test_brackets_outside_control_flow_are_unexpected() {
    let result = run("[fd 1]");
    assert!(result.outcome.had_error);
    assert!(result.messages()[0].contains("Unexpected LeftBracket"));
}
