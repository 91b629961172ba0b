use std::collections::BTreeMap;

use crate::error::Error;
use crate::model::{EnvInstruction, Statement};

/// Quotes `raw` in `"..."` if it contains whitespace and is not already
/// wrapped in a matching pair of `"`/`'`. Shared between the legacy-`ENV`
/// decoder and the resolver (spec §9); `escape_character` is accepted for
/// signature symmetry but currently unused.
pub fn ensure_modern_env_value(raw: &str, _escape_character: char) -> String {
    if raw.chars().any(char::is_whitespace) && !is_fully_quoted(raw) {
        format!("\"{raw}\"")
    } else {
        raw.to_string()
    }
}

fn is_fully_quoted(s: &str) -> bool {
    let mut chars = s.chars();
    match (chars.next(), s.chars().last()) {
        (Some(first), Some(last)) if s.chars().count() >= 2 => {
            (first == '"' || first == '\'') && first == last
        }
        _ => false,
    }
}

pub fn decode(raw_args: &str, line: usize) -> Result<Statement, Error> {
    let args = raw_args.trim();
    if args.is_empty() {
        return Err(Error::syntax_error(line));
    }

    let chars: Vec<char> = args.chars().collect();
    let mut pos = 0;
    let mut partial_key = String::new();
    while pos < chars.len() && chars[pos] != '=' && !chars[pos].is_whitespace() {
        partial_key.push(chars[pos]);
        pos += 1;
    }
    if partial_key.is_empty() {
        return Err(Error::syntax_error(line));
    }
    if pos == chars.len() {
        // Legacy form collapses to a bare key with no value.
        let mut env = BTreeMap::new();
        env.insert(partial_key.clone(), String::new());
        return Ok(Statement::Env(EnvInstruction {
            env,
            key_order: vec![partial_key],
        }));
    }

    if chars[pos] != '=' {
        return decode_legacy(&chars, pos, partial_key, line);
    }

    decode_modern(&chars, pos + 1, partial_key, line)
}

fn decode_legacy(chars: &[char], mut pos: usize, key: String, line: usize) -> Result<Statement, Error> {
    while pos < chars.len() && chars[pos].is_whitespace() {
        pos += 1;
    }
    let raw_value: String = chars[pos..].iter().collect();
    let value = ensure_modern_env_value(&raw_value, '\\');

    let mut env = BTreeMap::new();
    env.insert(key.clone(), value);
    let _ = line;
    Ok(Statement::Env(EnvInstruction {
        env,
        key_order: vec![key],
    }))
}

/// One-pass scanner for `KEY=VALUE ...` pairs. States: reading a key,
/// reading an unquoted value, or reading a value inside a quote (spec §4.4).
fn decode_modern(chars: &[char], mut pos: usize, first_key: String, line: usize) -> Result<Statement, Error> {
    let mut env = BTreeMap::new();
    let mut key_order = Vec::new();

    let mut key = first_key;
    let mut partial_key = String::new();
    let mut value = String::new();
    let mut current_quote: Option<char> = None;

    let mut commit = |key: &mut String, value: &mut String, env: &mut BTreeMap<String, String>, key_order: &mut Vec<String>| {
        env.insert(key.clone(), std::mem::take(value));
        key_order.push(std::mem::take(key));
    };

    while pos < chars.len() {
        let c = chars[pos];
        pos += 1;

        if key.is_empty() {
            if c.is_whitespace() {
                if !partial_key.is_empty() {
                    return Err(Error::syntax_error(line));
                }
                continue;
            }
            if c == '=' {
                if partial_key.is_empty() {
                    return Err(Error::syntax_error(line));
                }
                key = std::mem::take(&mut partial_key);
                continue;
            }
            partial_key.push(c);
            continue;
        }

        if let Some(quote) = current_quote {
            value.push(c);
            if c == quote {
                current_quote = None;
                commit(&mut key, &mut value, &mut env, &mut key_order);
            }
            continue;
        }

        if c.is_whitespace() {
            if !value.is_empty() {
                commit(&mut key, &mut value, &mut env, &mut key_order);
            }
            continue;
        }

        if c == '"' || c == '\'' {
            value.push(c);
            current_quote = Some(c);
            continue;
        }

        value.push(c);
    }

    if current_quote.is_some() {
        return Err(Error::syntax_error(line));
    }
    if !partial_key.is_empty() {
        return Err(Error::syntax_error(line));
    }
    if !key.is_empty() {
        commit(&mut key, &mut value, &mut env, &mut key_order);
    }

    Ok(Statement::Env(EnvInstruction { env, key_order }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modern_form_with_quotes_and_trailing_unquoted_pair() {
        let Statement::Env(env) = decode(r#"A=1 B="two words" C=three"#, 1).unwrap() else {
            panic!("expected Env");
        };
        assert_eq!(env.key_order, vec!["A", "B", "C"]);
        assert_eq!(env.env["A"], "1");
        assert_eq!(env.env["B"], r#""two words""#);
        assert_eq!(env.env["C"], "three");
    }

    #[test]
    fn legacy_form_quotes_whitespace_bearing_values() {
        let Statement::Env(env) = decode("ONE TWO= THREE=world", 1).unwrap() else {
            panic!("expected Env");
        };
        assert_eq!(env.key_order, vec!["ONE"]);
        assert_eq!(env.env["ONE"], "\"TWO= THREE=world\"");
    }

    #[test]
    fn single_quoted_value() {
        let Statement::Env(env) = decode("GREETING='hi there'", 1).unwrap() else {
            panic!("expected Env");
        };
        assert_eq!(env.env["GREETING"], "'hi there'");
    }

    #[test]
    fn rejects_blank_key() {
        assert_eq!(decode("=value", 3), Err(Error::SyntaxError { line: 3 }));
    }

    #[test]
    fn first_key_followed_by_whitespace_is_legacy_form_not_an_error() {
        let Statement::Env(env) = decode("FOO =bar", 3).unwrap() else {
            panic!("expected Env");
        };
        assert_eq!(env.key_order, vec!["FOO"]);
        assert_eq!(env.env["FOO"], "=bar");
    }

    #[test]
    fn rejects_whitespace_between_key_and_equals_in_modern_form() {
        assert_eq!(decode("A=1 B =2", 3), Err(Error::SyntaxError { line: 3 }));
    }

    #[test]
    fn rejects_unterminated_quote() {
        assert_eq!(decode(r#"FOO="unterminated"#, 3), Err(Error::SyntaxError { line: 3 }));
    }

    #[test]
    fn ensure_modern_env_value_leaves_already_quoted_values_alone() {
        assert_eq!(ensure_modern_env_value("\"a b\"", '\\'), "\"a b\"");
        assert_eq!(ensure_modern_env_value("a b", '\\'), "\"a b\"");
        assert_eq!(ensure_modern_env_value("ab", '\\'), "ab");
    }
}
