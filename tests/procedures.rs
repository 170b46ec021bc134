mod common;

use common::{run, run_with_commands};
use trtl::interpreter::Interpreter;
use trtl::lexer::lex;
use trtl::token::TokenStream;

#[test]
fn test_square_procedure() {
    let result = run("to square :s\nrepeat 4 [fd :s rt 90]\nend\nsquare 10");
    assert!(!result.outcome.had_error, "{:?}", result.messages());
    assert_eq!(result.calls.len(), 8);
    assert_eq!(
        result.call_names(),
        vec!["fd", "rt", "fd", "rt", "fd", "rt", "fd", "rt"]
    );
    for i in [0, 2, 4, 6] {
        assert_eq!(result.nth_double(i), 10.0);
    }
}

#[test]
fn test_parameter_scope_is_popped_after_return() {
    let result = run("to square :s\nfd :s\nend\nsquare 10\nfd :s");
    assert!(result.outcome.had_error);
    // The call itself ran with s bound...
    assert_eq!(result.call_names(), vec!["fd"]);
    assert_eq!(result.nth_double(0), 10.0);
    // ...and the later reference finds nothing.
    assert!(result.messages()[0].contains("Undefined variable 's'"));
}

#[test]
fn test_arguments_bind_by_position() {
    let result = run("to pairup :a :b\nfd :a\nrt :b\nend\npairup 1 2");
    assert!(!result.outcome.had_error);
    assert_eq!(result.call_names(), vec!["fd", "rt"]);
    assert_eq!(result.nth_double(0), 1.0);
    assert_eq!(result.nth_double(1), 2.0);
}

#[test]
fn test_procedure_names_case_insensitive() {
    let result = run("to Square :S\nfd :s\nend\nSQUARE 7");
    assert!(!result.outcome.had_error);
    assert_eq!(result.nth_double(0), 7.0);
}

#[test]
fn test_local_parameter_shadows_global() {
    let result = run("make \"s 99\nto probe :s\nfd :s\nend\nprobe 5\nfd :s");
    assert!(!result.outcome.had_error, "{:?}", result.messages());
    assert_eq!(result.nth_double(0), 5.0);
    assert_eq!(result.nth_double(1), 99.0);
}

#[test]
fn test_stop_skips_rest_of_procedure() {
    let result = run("to walk\nfd 1\nstop\nrt 1\nend\nwalk\nfd 99");
    assert!(!result.outcome.had_error);
    assert_eq!(result.call_names(), vec!["fd", "fd"]);
    assert_eq!(result.nth_double(1), 99.0);
}

#[test]
fn test_stop_unwinds_nested_blocks_inside_procedure() {
    let result = run("to walk\nrepeat 3 [fd 1 stop rt 1]\nbk 5\nend\nwalk\nfd 99");
    assert!(!result.outcome.had_error);
    assert_eq!(result.call_names(), vec!["fd", "fd"]);
}

#[test]
fn test_stop_at_top_level_ends_the_run_quietly() {
    let result = run("fd 1\nstop\nrt 2");
    assert!(!result.outcome.had_error);
    assert_eq!(result.call_names(), vec!["fd"]);
}

#[test]
fn test_recursive_procedure_with_stop() {
    let result = run(
        "to count :n\nif :n = 0 [stop]\nfd :n\ncount :n - 1\nend\ncount 3",
    );
    assert!(!result.outcome.had_error, "{:?}", result.messages());
    assert_eq!(result.call_names(), vec!["fd", "fd", "fd"]);
    assert_eq!(result.nth_double(0), 3.0);
    assert_eq!(result.nth_double(2), 1.0);
}

#[test]
fn test_runaway_recursion_is_reported_not_crashed() {
    let tokens = lex("to loop\nloop\nend\nloop").expect("lex failed");
    let interpreter = Interpreter::new(TokenStream::new(tokens)).with_max_depth(16);
    let outcome = interpreter.go();
    assert!(outcome.had_error);
    assert_eq!(outcome.diagnostics.len(), 1);
    assert!(outcome.diagnostics[0]
        .to_string()
        .contains("Maximum recursion depth exceeded"));
}

#[test]
fn test_redefining_builtin_fails_and_builtin_survives() {
    let result = run("to fd\nrt 1\nend\nfd 1\nnosuch");
    assert!(result.outcome.had_error);
    let messages = result.messages();
    assert!(messages[0].contains("Cannot overwrite primitive 'fd'"));
    // Scanning continued: fd still resolves as a command (no undefined-name
    // fault for it), and the genuinely unknown name is still reported.
    assert_eq!(messages.len(), 2);
    assert!(messages[1].contains("Undefined procedure or primitive 'nosuch'"));
}

#[test]
fn test_redefining_procedure_silently_replaces() {
    let result = run("to greet\nfd 1\nend\nto greet\nrt 2\nend\ngreet");
    assert!(!result.outcome.had_error);
    assert_eq!(result.call_names(), vec!["rt"]);
    assert_eq!(result.nth_double(0), 2.0);
}

#[test]
fn test_procedure_call_with_missing_arguments_recovers() {
    let result = run("to p :a\nfd :a\nend\np\nnosuch");
    assert!(result.outcome.had_error);
    let messages = result.messages();
    assert!(messages[0].contains("P: need more arguments"));
    assert!(messages[1].contains("nosuch"));
}

#[test]
fn test_to_must_start_on_fresh_line() {
    let result = run("fd 1 to p\nfd 2\nend");
    assert!(result.outcome.had_error);
    assert!(result.messages()[0]
        .contains("'TO' statement should start from a new line"));
}

#[test]
fn test_to_without_end_is_serious() {
    let result = run("to p\nfd 1");
    assert!(result.outcome.had_error);
    assert!(result.messages()[0].contains("incomplete 'TO' statement"));
}

#[test]
fn test_nested_to_is_serious() {
    let result = run("to outer\nto inner\nend\nend");
    assert!(result.outcome.had_error);
    assert!(result.messages()[0].contains("nested 'TO' statement"));
}

#[test]
fn test_keyword_is_not_a_procedure_name() {
    let result = run("to repeat\nfd 1\nend");
    assert!(result.outcome.had_error);
    assert!(result.messages()[0].contains("invalid procedure name 'repeat'"));
}

#[test]
fn test_duplicate_parameters_rejected() {
    let result = run("to p :a :a\nfd 1\nend");
    assert!(result.outcome.had_error);
    assert!(result.messages()[0].contains("duplicated parameter ':a'"));
}

#[test]
fn test_end_must_be_alone_on_its_line() {
    let result = run("to p\nfd 1 end");
    assert!(result.outcome.had_error);
    assert!(result.messages()[0].contains("'END' should start from a new line"));
}

#[test]
fn test_unexpected_end_is_serious() {
    let result = run("end\nnosuch 1");
    assert!(result.outcome.had_error);
    assert_eq!(result.messages().len(), 1);
    assert!(result.messages()[0].contains("Unexpected 'END'"));
}

#[test]
fn test_make_binds_global_inside_procedure() {
    let result = run_with_commands(
        "to setup\nmake \"width 42\nend\nsetup\nfd :width",
        &[("fd", 1)],
    );
    assert!(!result.outcome.had_error, "{:?}", result.messages());
    assert_eq!(result.nth_double(0), 42.0);
}

#[test]
fn test_stop_is_swallowed_when_error_flag_set() {
    // The undefined name sets the flag; the later stop is not executed,
    // and scanning still reaches the last statement's validation.
    let result = run("nosuch\nstop\nfd :gone");
    assert!(result.outcome.had_error);
    let messages = result.messages();
    assert_eq!(messages.len(), 2);
    assert!(messages[1].contains("Undefined variable 'gone'"));
}
