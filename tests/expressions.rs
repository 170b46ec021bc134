mod common;

use common::run;

#[test]
fn test_arithmetic_precedence() {
    let result = run("emit 3 + 4 * 2");
    assert!(!result.outcome.had_error);
    assert_eq!(result.nth_double(0), 11.0);
}

#[test]
fn test_parenthesized_grouping() {
    let result = run("emit (3 + 4) * 2");
    assert_eq!(result.nth_double(0), 14.0);
}

#[test]
fn test_sign_runs_read_as_expected() {
    let result = run("emit 3+-2\nemit 3 - -2");
    assert!(!result.outcome.had_error);
    assert_eq!(result.nth_double(0), 1.0);
    assert_eq!(result.nth_double(1), 5.0);
}

#[test]
fn test_functions_in_arguments() {
    let result = run("emit sqrt(16)\nemit pow(2, 5)");
    assert!(!result.outcome.had_error, "{:?}", result.messages());
    assert_eq!(result.nth_double(0), 4.0);
    assert_eq!(result.nth_double(1), 32.0);
}

#[test]
fn test_make_then_reference() {
    let result = run("make \"x 10\nemit :x + 5");
    assert!(!result.outcome.had_error, "{:?}", result.messages());
    assert_eq!(result.nth_double(0), 15.0);
}

#[test]
fn test_variable_names_case_insensitive() {
    let result = run("make \"x 3\nemit :X\nemit :x");
    assert!(!result.outcome.had_error);
    assert_eq!(result.nth_double(0), 3.0);
    assert_eq!(result.nth_double(1), 3.0);
}

#[test]
fn test_make_rejects_number_name() {
    let result = run("make 5 10");
    assert!(result.outcome.had_error);
    assert!(result.messages()[0].contains("MAKE: cannot make number as variable name"));
}

#[test]
fn test_make_rejects_malformed_identifier() {
    let result = run("make \"not-a-name\" 10");
    assert!(result.outcome.had_error);
    assert!(result.messages()[0].contains("MAKE: invalid identifier as variable name"));
}

#[test]
fn test_make_overwrites_existing_binding() {
    let result = run("make \"x 1\nmake \"x 2\nemit :x");
    assert!(!result.outcome.had_error);
    assert_eq!(result.nth_double(0), 2.0);
}

#[test]
fn test_division_by_zero_is_serious() {
    let result = run("emit 1 / 0\nemit 2");
    assert!(result.outcome.had_error);
    assert!(result.calls.is_empty());
    assert_eq!(result.messages().len(), 1);
    assert!(result.messages()[0].contains("Division by zero in expression"));
}

#[test]
fn test_undefined_variables_reported_per_name() {
    let result = run("emit :a + :b");
    assert!(result.outcome.had_error);
    assert!(result.calls.is_empty());
    let messages = result.messages();
    assert_eq!(messages.len(), 2);
    assert!(messages[0].contains("Undefined variable 'a'"));
    assert!(messages[1].contains("Undefined variable 'b'"));
}

#[test]
fn test_string_argument() {
    let result = run("emit \"hello\"");
    assert!(!result.outcome.had_error);
    assert_eq!(result.calls[0].1[0].as_text(), Some("hello"));
}

#[test]
fn test_word_string_argument() {
    let result = run("emit \"left rt 90");
    assert!(!result.outcome.had_error, "{:?}", result.messages());
    assert_eq!(result.calls[0].1[0].as_text(), Some("left"));
    assert_eq!(result.call_names(), vec!["emit", "rt"]);
}

#[test]
fn test_argument_runs_split_on_value_boundaries() {
    // "1 + 2" then "3": the run continues through operators only.
    let result = run("pair 1 + 2 3");
    assert!(!result.outcome.had_error);
    assert_eq!(result.calls[0].1[0].as_double(), Some(3.0));
    assert_eq!(result.calls[0].1[1].as_double(), Some(3.0));
}

#[test]
fn test_parenthesized_arguments_split() {
    let result = run("pair (1 + 1) (3)");
    assert!(!result.outcome.had_error);
    assert_eq!(result.calls[0].1[0].as_double(), Some(2.0));
    assert_eq!(result.calls[0].1[1].as_double(), Some(3.0));
}

#[test]
fn test_command_names_case_insensitive() {
    let result = run("EMIT 4\nEmit 5");
    assert!(!result.outcome.had_error);
    assert_eq!(result.nth_double(0), 4.0);
    assert_eq!(result.nth_double(1), 5.0);
}

#[test]
fn test_boolean_words_case_insensitive_in_conditions() {
    let result = run("make \"flag \"TRUE\"\nif :flag [emit 1]");
    assert!(!result.outcome.had_error, "{:?}", result.messages());
    assert_eq!(result.calls.len(), 1);
}

#[test]
fn test_expression_spanning_comparison_digraphs() {
    let result = run("if 1 <= 2 [emit 1]\nif 1 <> 2 [emit 2]\nif 2 >= 3 [emit 3]");
    assert!(!result.outcome.had_error);
    assert_eq!(result.calls.len(), 2);
}
