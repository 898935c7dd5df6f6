//! Parsing engine.
//!
//! ## How the parts work together
//!
//! ```text
//! text ── lexer::tokenize ──> [Lexeme] ── Assembler ──> Schedule
//!         (lexer.rs)                      (assembler.rs)
//!                  \                         /
//!                   └── Parser::run (parser.rs): timings + skipped text
//! ```
//!
//! - `lexer.rs`: normalizes the text and runs the composite phrase regex,
//!   producing typed tokens plus the fragments it could not read.
//! - `assembler.rs`: the grouping state machine that turns tokens into
//!   positive and negative rule spans.
//! - `parser.rs`: drives both phases and applies the skipped-text policy.
//! - `metrics.rs`: per-phase timings and the bundled run result.
//!
//! ## Debugging
//!
//! The engine logs through the `log` facade: `trace` for every lexer match,
//! `debug` for the token stream and each emitted rule span, `warn` for
//! skipped text. The `hourspan` binary wires this up to `RUST_LOG`.

#[path = "engine/assembler.rs"]
mod assembler;
#[path = "engine/lexer.rs"]
mod lexer;
#[path = "engine/metrics.rs"]
mod metrics;
#[path = "engine/parser.rs"]
mod parser;

#[allow(unused_imports)]
pub use assembler::{Assembler, Assembly, GroupState};
#[allow(unused_imports)]
pub use lexer::{LexOutput, Lexeme, normalize, tokenize};
#[allow(unused_imports)]
pub use metrics::{RunMetrics, RunResult};
pub use parser::Parser;
