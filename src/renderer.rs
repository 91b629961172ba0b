//! Canonical pretty-printer (spec §4.8). `parse -> render` is a fixed point
//! on canonical input.

use std::fmt;
use std::fmt::Write as _;

use crate::error::Error;
use crate::model::{EscapeCharacter, Kind, Parsed, Statement};

/// Writes `parsed` into any `fmt::Write` sink.
///
/// A sink write failure is not reported through the return value here, same
/// as the original renderer discards `fmt.Fprint`/`fmt.Fprintln`'s error
/// return: `UnknownStatementKind` is reserved for a genuinely unrecognized
/// statement, which this closed `Statement` enum can never produce.
pub fn render_to(parsed: &Parsed, sink: &mut dyn fmt::Write) -> Result<(), Error> {
    if parsed.escape_character != EscapeCharacter::DEFAULT {
        let _ = writeln!(sink, "# escape={}", parsed.escape_character);
        let _ = writeln!(sink);
    }

    for (i, statement) in parsed.statements.iter().enumerate() {
        if i > 0 {
            let _ = writeln!(sink);
        }
        render_statement(statement, i, parsed, sink);
    }

    Ok(())
}

/// Convenience wrapper returning a `String` rather than requiring a sink.
pub fn render(parsed: &Parsed) -> Result<String, Error> {
    let mut out = String::new();
    render_to(parsed, &mut out)?;
    Ok(out)
}

fn render_statement(statement: &Statement, index: usize, parsed: &Parsed, sink: &mut dyn fmt::Write) {
    match statement {
        Statement::Comment(comment) => {
            if index > 0 && matches!(parsed.statements[index - 1], Statement::Comment(_)) {
                let _ = writeln!(sink);
            }
            for (j, line) in comment.lines.iter().enumerate() {
                if j > 0 {
                    let _ = writeln!(sink);
                }
                let _ = write!(sink, "#{line}");
            }
        }
        _ => render_instruction(statement, index, parsed, sink),
    }
}

fn render_instruction(statement: &Statement, index: usize, parsed: &Parsed, sink: &mut dyn fmt::Write) {
    let kind = statement.kind();

    if kind == Kind::From
        && index > 0
        && !matches!(parsed.statements[index - 1], Statement::Comment(_))
    {
        let _ = writeln!(sink);
    }

    let _ = write!(sink, "{kind}");

    for (key, value) in statement.flags() {
        let _ = write!(sink, " --{key}={value}");
    }

    let arguments = statement.arguments();
    if arguments.exec_form {
        let _ = write!(sink, " [ ");
        for (i, token) in arguments.tokens.iter().enumerate() {
            if i > 0 {
                let _ = write!(sink, ", ");
            }
            let _ = write!(sink, "\"{token}\"");
        }
        let _ = write!(sink, " ]");
    } else {
        for token in &arguments.tokens {
            let _ = write!(sink, " {token}");
        }
    }
}
