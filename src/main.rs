mod debug_report;

use chrono::{Local, NaiveDateTime};
use hourspan::{Options, SkippedTextPolicy, parse_verbose_with};
use std::io::{self, IsTerminal, Read};

const AT_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"];

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let config = match parse_args() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(2);
        }
    };

    let opts = Options { skipped_text: config.policy };
    let res = match parse_verbose_with(&config.input, &opts) {
        Ok(res) => res,
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(1);
        }
    };

    let at = config.at.unwrap_or_else(|| Local::now().naive_local());
    debug_report::print_run(&res, &at, config.color);
}

struct CliConfig {
    input: String,
    /// Query instant; `None` means the local wall clock.
    at: Option<NaiveDateTime>,
    policy: SkippedTextPolicy,
    color: bool,
}

fn parse_args() -> Result<CliConfig, String> {
    let mut input: Option<String> = None;
    let mut at = None;
    let mut policy = SkippedTextPolicy::Warn;
    let mut color = io::stdout().is_terminal();
    let mut args = std::env::args().skip(1).peekable();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            "-V" | "--version" => {
                println!("hourspan {}", env!("CARGO_PKG_VERSION"));
                std::process::exit(0);
            }
            "--color" => color = true,
            "--no-color" => color = false,
            "--strict" => policy = SkippedTextPolicy::Reject,
            "--at" => {
                let value = args.next().ok_or_else(|| "error: --at expects a value".to_string())?;
                at = Some(parse_at(&value)?);
            }
            "--input" | "-i" => {
                let value = args.next().ok_or_else(|| "error: --input expects a value".to_string())?;
                set_input(&mut input, value)?;
            }
            "--" => {
                let rest = args.collect::<Vec<_>>().join(" ");
                if !rest.trim().is_empty() {
                    set_input(&mut input, rest)?;
                }
                break;
            }
            _ if arg.starts_with("--at=") => {
                at = Some(parse_at(arg.trim_start_matches("--at="))?);
            }
            _ if arg.starts_with("--input=") => {
                set_input(&mut input, arg.trim_start_matches("--input=").to_string())?;
            }
            _ if arg.starts_with('-') => {
                return Err(format!("error: unknown option '{arg}'"));
            }
            _ => {
                let rest = std::iter::once(arg).chain(args).collect::<Vec<_>>().join(" ");
                set_input(&mut input, rest)?;
                break;
            }
        }
    }

    let input = match input {
        Some(value) => value,
        None => read_stdin_input()?,
    };

    if input.trim().is_empty() {
        return Err(format!("error: no input provided\n\n{}", help_text()));
    }

    Ok(CliConfig { input, at, policy, color })
}

fn set_input(slot: &mut Option<String>, value: String) -> Result<(), String> {
    if slot.is_some() {
        return Err("error: input provided multiple times".to_string());
    }
    *slot = Some(value);
    Ok(())
}

fn read_stdin_input() -> Result<String, String> {
    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer).map_err(|err| format!("error: failed to read stdin: {err}"))?;
    Ok(buffer)
}

fn parse_at(value: &str) -> Result<NaiveDateTime, String> {
    AT_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .ok_or_else(|| format!("error: invalid --at '{value}' (expected YYYY-MM-DDTHH:MM[:SS])"))
}

fn print_help() {
    println!("{}", help_text());
}

fn help_text() -> String {
    format!(
        "hourspan {version}

Parse business-hours text and report whether it is open at an instant.

Usage:
  hourspan [OPTIONS] [--] <input...>
  hourspan [OPTIONS] --input <text>

Options:
  -i, --input <text>         Input text to parse. If omitted, reads remaining args
                             or stdin when no args are provided.
  --at <timestamp>           Instant to check, YYYY-MM-DDTHH:MM[:SS] local time.
                             Default: now.
  --strict                   Fail on any text that is not part of the schedule.
  --color                    Force ANSI color output.
  --no-color                 Disable ANSI color output.
  -h, --help                 Show this help message.
  -V, --version              Print version information.

Environment:
  RUST_LOG                   Log filter (default: warn). Use debug to trace tokens
                             and rules.

Exit codes:
  0  Success.
  1  The input could not be parsed.
  2  Invalid arguments or missing input.
",
        version = env!("CARGO_PKG_VERSION"),
    )
}
