//! Text utility CLI commands: `format`, `terms`, `date`, `normalize`, `decode`.
//!
//! These need no configuration or database; they print the result of the
//! matching core helper, one line per result.

use anyhow::Result;

use ncm_lookup_core::codes::{build_code_search_terms, format_ncm_code, CodePattern};
use ncm_lookup_core::format::{decode_html_entities, format_date_br, normalize_for_search};

/// Text helper to run.
#[derive(Debug, Clone)]
pub enum TextOp {
    Format { pattern: CodePattern },
    Terms,
    Date,
    Normalize,
    Decode,
}

/// Apply `op` to `input`, returning the output lines.
pub fn apply(op: &TextOp, input: &str) -> Vec<String> {
    match op {
        TextOp::Format { pattern } => vec![format_ncm_code(input, *pattern)],
        TextOp::Terms => build_code_search_terms(input),
        TextOp::Date => vec![format_date_br(input)],
        TextOp::Normalize => vec![normalize_for_search(input)],
        TextOp::Decode => vec![decode_html_entities(input)],
    }
}

pub fn run_text(op: &TextOp, inputs: &[String]) -> Result<()> {
    for input in inputs {
        for line in apply(op, input) {
            println!("{}", line);
        }
    }
    Ok(())
}
