use std::io::{self, Write};
use std::process;

use clap::Parser;
use owo_colors::OwoColorize;

use trtl::canvas::Canvas;
use trtl::cli::{generate_completions, AppConfig, Args, Commands};
use trtl::diagnostic::render_diagnostics;
use trtl::interpreter::Interpreter;
use trtl::lexer;
use trtl::token::TokenStream;

fn main() {
    let args = Args::parse();

    if let Some(Commands::Complete { shell }) = args.command {
        generate_completions(shell);
        return;
    }

    let config = match AppConfig::from_args(&args) {
        Ok(config) => config,
        Err(message) => {
            eprintln!("{}", message);
            process::exit(1);
        }
    };

    let Some(script) = args.script.as_ref() else {
        error_message(&config, "You must specify an input file.");
        process::exit(1);
    };

    let source = match std::fs::read_to_string(script) {
        Ok(source) => source,
        Err(error) => {
            error_message(
                &config,
                &format!("Failed to read {}: {}", script.display(), error),
            );
            process::exit(1);
        }
    };

    let tokens = match lexer::lex(&source) {
        Ok(tokens) => tokens,
        Err(error) => {
            error_message(&config, &error.to_string());
            process::exit(1);
        }
    };

    let mut interpreter = Interpreter::new(TokenStream::new(tokens));
    let canvas = Canvas::new();
    if let Err(error) = canvas.install(&mut interpreter) {
        error_message(&config, &error.to_string());
        process::exit(1);
    }

    let outcome = interpreter.go();
    render_diagnostics(&outcome.diagnostics, config.color_enabled);
    if outcome.had_error {
        process::exit(1);
    }

    let svg = canvas.to_svg(config.margins);
    match &args.out {
        Some(path) => {
            if let Err(error) = std::fs::write(path, svg) {
                error_message(
                    &config,
                    &format!("Failed to write {}: {}", path.display(), error),
                );
                process::exit(1);
            }
        }
        None => {
            print!("{}", svg);
            io::stdout().flush().unwrap();
        }
    }
}

fn error_message(config: &AppConfig, message: &str) {
    if config.color_enabled {
        eprintln!("{}", message.red().bold());
    } else {
        eprintln!("{}", message);
    }
}
