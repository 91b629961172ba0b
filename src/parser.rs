//! Top-level sequential driver (spec §4.6): directive prelude, then
//! blank/comment/instruction dispatch until the input is exhausted.

use crate::decode::{comment, decode_instruction};
use crate::directives::{resolve_escape_character, scan_parser_directives};
use crate::error::Error;
use crate::lexer::scan_instruction_lines;
use crate::line_utils::{is_blank, is_comment};
use crate::model::Parsed;

pub fn parse(lines: &[String]) -> Result<Parsed, Error> {
    if lines.is_empty() {
        return Err(Error::EmptyInput);
    }

    let (directives, directive_count) = scan_parser_directives(lines)?;
    let escape_character = resolve_escape_character(&directives)?;
    let escape = escape_character.as_char();

    let mut idx = directive_count;
    let mut statements = Vec::new();

    while idx < lines.len() {
        if is_blank(&lines[idx]) {
            idx += 1;
            continue;
        }

        let line_no = idx + 1;

        if is_comment(lines[idx].trim()) {
            let (statement, consumed) = comment::scan(&lines[idx..]);
            statements.push(statement);
            idx += consumed;
            continue;
        }

        let (scanned, consumed) = scan_instruction_lines(&lines[idx..], escape, line_no)?;
        let statement = decode_instruction(scanned.kind, &scanned.raw_args, scanned.raw_lines, line_no)?;
        statements.push(statement);
        idx += consumed;
    }

    Ok(Parsed {
        escape_character,
        statements,
    })
}
