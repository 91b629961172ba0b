//! Joins continuation lines into one logical statement, preserving
//! interstitial comments (spec §4.3, `scan_instruction_lines`).

use std::sync::OnceLock;

use regex::Regex;

use crate::error::Error;
use crate::line_utils::{has_continuation, is_comment, strip_continuation};
use crate::model::Kind;

fn instruction_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*(\S+)\s+\S+.*$").unwrap())
}

pub struct ScannedInstruction {
    pub kind: Kind,
    pub raw_args: String,
    pub raw_lines: Vec<String>,
}

/// `lines` starts at a non-blank, non-comment line. `line_no` is the
/// 1-based line number of `lines[0]`, used only for error reporting.
/// Returns the scanned instruction and the number of lines it consumed.
pub fn scan_instruction_lines(
    lines: &[String],
    escape: char,
    line_no: usize,
) -> Result<(ScannedInstruction, usize), Error> {
    let first = lines[0].trim();
    let captures = instruction_regex()
        .captures(first)
        .ok_or(Error::syntax_error(line_no))?;
    let keyword_raw = &captures[1];
    let keyword = keyword_raw.to_uppercase();
    let kind = Kind::from_keyword(&keyword).ok_or_else(|| Error::unknown_instruction(keyword, line_no))?;

    let mut raw_lines = vec![first.to_string()];
    let mut consumed = 1;

    let remainder = first[keyword_raw.len()..].trim();
    let mut terminated = !has_continuation(remainder, escape);
    let mut raw_args = if terminated {
        remainder.to_string()
    } else {
        strip_continuation(remainder, escape).to_string()
    };

    while !terminated && consumed < lines.len() {
        let line = lines[consumed].trim();
        consumed += 1;

        if line.is_empty() {
            continue;
        }
        if is_comment(line) {
            raw_lines.push(line.to_string());
            continue;
        }

        let content = if has_continuation(line, escape) {
            strip_continuation(line, escape)
        } else {
            terminated = true;
            line
        };
        raw_args.push_str(content);
        raw_lines.push(content.to_string());
    }

    if !terminated {
        return Err(Error::UnterminatedContinuation { line: line_no });
    }

    Ok((
        ScannedInstruction {
            kind,
            raw_args,
            raw_lines,
        },
        consumed,
    ))
}
