use chrono::{Datelike, NaiveDateTime};
use hourspan::{EvaluatorKind, ParseResultVerbose, TokenSummary};

mod ansi {
    pub const RESET: &str = "\x1b[0m";
    pub const DIM: &str = "\x1b[2m";
    pub const BOLD: &str = "\x1b[1m";

    pub const GREEN: &str = "\x1b[32m";
    pub const RED: &str = "\x1b[31m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const BLUE: &str = "\x1b[34m";
    pub const CYAN: &str = "\x1b[36m";
    pub const GRAY: &str = "\x1b[90m";

    pub struct Palette {
        enabled: bool,
    }

    impl Palette {
        pub fn new(enabled: bool) -> Self {
            Self { enabled }
        }

        pub fn paint(&self, s: impl AsRef<str>, color: &str) -> String {
            if self.enabled { format!("{}{}{}", color, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }

        pub fn bold(&self, s: impl AsRef<str>) -> String {
            if self.enabled { format!("{}{}{}", BOLD, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }

        pub fn dim(&self, s: impl AsRef<str>) -> String {
            if self.enabled { format!("{}{}{}", DIM, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }
    }
}

pub fn print_run(res: &ParseResultVerbose, at: &NaiveDateTime, color: bool) {
    let palette = ansi::Palette::new(color);
    let details = &res.details;
    println!("\n{}", palette.bold(palette.paint(format!("⚙  Parsing: \"{}\"", res.text.trim()), ansi::CYAN)));

    println!("\n{}", palette.paint("━━━ Tokens ━━━", ansi::GRAY));
    if details.tokens.is_empty() {
        println!("{}", palette.dim("  No tokens recognized"));
    }
    for token in &details.tokens {
        println!("  {}", fmt_token_compact(token, &palette));
    }

    if !details.skipped.is_empty() {
        println!("\n{}", palette.paint("━━━ Skipped ━━━", ansi::GRAY));
        for s in &details.skipped {
            println!(
                "  {} {}",
                palette.paint(format!("{}..{}", s.start, s.end), ansi::YELLOW),
                palette.paint(format!("\"{}\"", s.text), ansi::RED)
            );
        }
    }

    println!("\n{}", palette.paint("━━━ Rules ━━━", ansi::GRAY));
    match &res.schedule {
        None => {
            println!("{}", palette.dim("  No rules produced"));
            println!("\n{}", palette.paint("Possible reasons:", ansi::YELLOW));
            println!("  • No day or hour phrase was recognized");
            println!("  • Only lone times were given (\"at 5pm\" is not an interval)");
            println!("\n{}", palette.dim("  Tip: Set RUST_LOG=debug to trace tokens and rules"));
        }
        Some(schedule) => {
            for (idx, rule) in details.rules.iter().enumerate() {
                println!("  {} {}", palette.paint(format!("[{idx}]"), ansi::GRAY), palette.paint(rule, ansi::BLUE));
            }

            let open = schedule.is_open(at);
            let verdict = if open { palette.paint("OPEN", ansi::GREEN) } else { palette.paint("CLOSED", ansi::RED) };
            println!(
                "\n  {} {} {}",
                palette.dim(format!("{} {}", at.weekday(), at.format("%Y-%m-%d %H:%M"))),
                palette.dim("│"),
                palette.bold(verdict)
            );

            match schedule.compile(EvaluatorKind::Bitmap) {
                Ok(eval) => println!("  {} {}", palette.dim("compiled:"), palette.dim(format!("{eval:?}"))),
                Err(err) => println!("  {} {}", palette.dim("compiled:"), palette.dim(err.to_string())),
            }
        }
    }

    println!("\n{}", palette.paint("━━━ Timing ━━━", ansi::GRAY));
    println!(
        "  Total: {}  │  Lex: {}  │  Assemble: {}",
        palette.paint(format!("{:?}", details.total), ansi::GREEN),
        palette.paint(format!("{:?}", details.lex), ansi::CYAN),
        palette.dim(format!("{:?}", details.assemble)),
    );
    println!();
}

fn fmt_token_compact(token: &TokenSummary, palette: &ansi::Palette) -> String {
    format!(
        "{} {} {} {}",
        palette.paint(format!("{}..{}", token.start, token.end), ansi::YELLOW),
        palette.paint(format!("{:?}", token.class), ansi::BLUE),
        palette.bold(format!("\"{}\"", token.body)),
        palette.dim(token.preview.clone())
    )
}
