use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::io;
use std::path::PathBuf;

use crate::svg::Margins;

#[derive(Parser, Debug)]
#[command(name = "trtl")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Turtle graphics scripting language interpreter", long_about = None)]
pub struct Args {
    /// Script file to interpret.
    #[arg(value_name = "SCRIPT")]
    pub script: Option<PathBuf>,

    /// Write the SVG drawing here instead of stdout.
    #[arg(short, long, value_name = "FILE")]
    pub out: Option<PathBuf>,

    /// Margins around the drawing, CSS style: 1-4 comma-separated
    /// non-negative integers (top, right, bottom, left).
    #[arg(short = 'm', long = "margin", value_name = "MARGINS")]
    pub margin: Option<String>,

    #[arg(long = "color", value_name = "WHEN", default_value = "auto")]
    pub color: ColorChoice,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    Complete {
        #[arg(value_name = "SHELL")]
        shell: Shell,
    },
}

#[derive(Debug, Clone, Copy)]
pub enum ColorChoice {
    Auto,
    Always,
    Never,
}

impl std::str::FromStr for ColorChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(ColorChoice::Auto),
            "always" => Ok(ColorChoice::Always),
            "never" => Ok(ColorChoice::Never),
            _ => Err(format!(
                "Invalid color choice: {}. Must be 'auto', 'always', or 'never'",
                s
            )),
        }
    }
}

pub fn generate_completions(shell: Shell) {
    let mut cmd = Args::command();
    let bin_name = cmd.get_name().to_string();
    generate(shell, &mut cmd, &bin_name, &mut io::stdout());
}

pub struct AppConfig {
    pub color_enabled: bool,
    pub margins: Option<Margins>,
}

impl AppConfig {
    pub fn from_args(args: &Args) -> Result<Self, String> {
        let color_enabled = match args.color {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => atty::is(atty::Stream::Stderr),
        };
        let margins = match &args.margin {
            Some(margin) => Some(parse_margins(margin)?),
            None => None,
        };
        Ok(AppConfig {
            color_enabled,
            margins,
        })
    }
}

/// CSS margin rules: one value for all sides; two for vertical/horizontal;
/// three for top, horizontal, bottom; four for top, right, bottom, left.
pub fn parse_margins(list: &str) -> Result<Margins, String> {
    let mut values = Vec::new();
    for part in list.split(',') {
        let margin: u32 = part
            .trim()
            .parse()
            .map_err(|_| format!("Invalid margin '{}'", part.trim()))?;
        values.push(margin);
    }
    match values.as_slice() {
        [all] => Ok(Margins {
            top: *all,
            right: *all,
            bottom: *all,
            left: *all,
        }),
        [vertical, horizontal] => Ok(Margins {
            top: *vertical,
            right: *horizontal,
            bottom: *vertical,
            left: *horizontal,
        }),
        [top, horizontal, bottom] => Ok(Margins {
            top: *top,
            right: *horizontal,
            bottom: *bottom,
            left: *horizontal,
        }),
        [top, right, bottom, left] => Ok(Margins {
            top: *top,
            right: *right,
            bottom: *bottom,
            left: *left,
        }),
        _ => Err("You have specified too many margins.".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_margin_css_rules() {
        assert_eq!(
            parse_margins("5").expect("one value"),
            Margins { top: 5, right: 5, bottom: 5, left: 5 }
        );
        assert_eq!(
            parse_margins("5,10").expect("two values"),
            Margins { top: 5, right: 10, bottom: 5, left: 10 }
        );
        assert_eq!(
            parse_margins("1,2,3").expect("three values"),
            Margins { top: 1, right: 2, bottom: 3, left: 2 }
        );
        assert_eq!(
            parse_margins("1,2,3,4").expect("four values"),
            Margins { top: 1, right: 2, bottom: 3, left: 4 }
        );
    }

    #[test]
    fn test_margin_errors() {
        assert!(parse_margins("1,2,3,4,5").is_err());
        assert!(parse_margins("-3").is_err());
        assert!(parse_margins("abc").is_err());
    }
}
