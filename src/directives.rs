//! Parser-directive prelude scanning (spec §4.2).

use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;

use crate::error::Error;
use crate::model::EscapeCharacter;

const ESCAPE_KEY: &str = "escape";

fn directive_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*#\s*([^=\s]+)\s*=\s*([^=\s]+)\s*$").unwrap())
}

/// Consumes leading `# key=value` lines. Stops at the first line that fails
/// to match, including blank lines, instructions, and non-directive
/// comments. Returns the lowercased-key directive map and how many lines it
/// consumed.
pub fn scan_parser_directives(lines: &[String]) -> Result<(BTreeMap<String, String>, usize), Error> {
    let mut directives = BTreeMap::new();
    let mut consumed = 0;

    for line in lines {
        let Some(captures) = directive_regex().captures(line) else {
            break;
        };
        let key = captures[1].to_lowercase();
        let value = captures[2].to_string();
        if directives.contains_key(&key) {
            return Err(Error::duplicate_directive(key));
        }
        directives.insert(key, value);
        consumed += 1;
    }

    Ok((directives, consumed))
}

/// Only `escape` is interpreted semantically; everything else in the
/// directive map is retained but otherwise unused by the core.
pub fn resolve_escape_character(directives: &BTreeMap<String, String>) -> Result<EscapeCharacter, Error> {
    let Some(value) = directives.get(ESCAPE_KEY) else {
        return Ok(EscapeCharacter::DEFAULT);
    };

    let mut chars = value.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => {
            EscapeCharacter::from_char(c).ok_or_else(|| Error::invalid_escape(value.clone()))
        }
        _ => Err(Error::invalid_escape(value.clone())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(s: &[&str]) -> Vec<String> {
        s.iter().map(|l| l.to_string()).collect()
    }

    #[test]
    fn scans_until_first_non_directive_line() {
        let input = lines(&["# syntax=docker/dockerfile:1", "# escape=`", "FROM alpine"]);
        let (directives, consumed) = scan_parser_directives(&input).unwrap();
        assert_eq!(consumed, 2);
        assert_eq!(directives.get("escape"), Some(&"`".to_string()));
        assert_eq!(directives.get("syntax"), Some(&"docker/dockerfile:1".to_string()));
    }

    #[test]
    fn stops_on_blank_line() {
        let input = lines(&["# escape=`", "", "# looks=like-a-directive-too"]);
        let (_, consumed) = scan_parser_directives(&input).unwrap();
        assert_eq!(consumed, 1);
    }

    #[test]
    fn rejects_duplicate_keys() {
        let input = lines(&["# escape=`", "# escape=\\"]);
        assert_eq!(
            scan_parser_directives(&input),
            Err(Error::duplicate_directive("escape"))
        );
    }

    #[test]
    fn escape_must_be_exactly_one_recognized_character() {
        let mut directives = BTreeMap::new();
        directives.insert(ESCAPE_KEY.to_string(), "`".to_string());
        assert_eq!(resolve_escape_character(&directives), Ok(EscapeCharacter::Backtick));

        directives.insert(ESCAPE_KEY.to_string(), "xy".to_string());
        assert!(resolve_escape_character(&directives).is_err());

        directives.insert(ESCAPE_KEY.to_string(), "x".to_string());
        assert!(resolve_escape_character(&directives).is_err());
    }

    #[test]
    fn defaults_to_backslash_when_absent() {
        assert_eq!(
            resolve_escape_character(&BTreeMap::new()),
            Ok(EscapeCharacter::DEFAULT)
        );
    }
}
