use std::sync::OnceLock;

use regex::Regex;

use crate::error::Error;
use crate::model::{FromInstruction, Statement};

fn from_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)^\s*FROM\s+(?:--platform=(\S+)\s+)?(\S+)(?:\s+AS\s+(\S+))?\s*$").unwrap()
    })
}

/// `raw_args` is everything after the `FROM` keyword; the keyword is
/// reattached so a single regex can see the whole logical line (spec §4.4).
pub fn decode(raw_args: &str, line: usize) -> Result<Statement, Error> {
    let full_line = format!("FROM {raw_args}");
    let captures = from_regex().captures(&full_line).ok_or(Error::syntax_error(line))?;

    let platform = captures.get(1).map(|m| m.as_str().to_string());
    let image = captures[2].to_string();
    let alias = captures.get(3).map(|m| m.as_str().to_string());

    Ok(Statement::From(FromInstruction {
        platform,
        image,
        alias,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_image() {
        let Statement::From(from) = decode("alpine:3", 1).unwrap() else {
            panic!("expected From");
        };
        assert_eq!(from.image, "alpine:3");
        assert_eq!(from.platform, None);
        assert_eq!(from.alias, None);
    }

    #[test]
    fn platform_and_alias() {
        let Statement::From(from) = decode("--platform=linux/amd64 golang:1 AS builder", 1).unwrap() else {
            panic!("expected From");
        };
        assert_eq!(from.platform.as_deref(), Some("linux/amd64"));
        assert_eq!(from.image, "golang:1");
        assert_eq!(from.alias.as_deref(), Some("builder"));
    }

    #[test]
    fn case_insensitive_as() {
        let Statement::From(from) = decode("alpine as base", 1).unwrap() else {
            panic!("expected From");
        };
        assert_eq!(from.alias.as_deref(), Some("base"));
    }

    #[test]
    fn rejects_missing_image() {
        assert_eq!(decode("", 7), Err(Error::SyntaxError { line: 7 }));
    }
}
