//! Scoped build-argument and environment-variable substitution (spec §4.7).
//!
//! Treated as a stateless function over `(parsed, build_args, env) ->
//! parsed`: scopes are threaded through local accumulators rather than
//! shared mutable state (spec §9).

use std::collections::BTreeMap;

use crate::decode::env::ensure_modern_env_value;
use crate::error::Error;
use crate::model::{
    ArgInstruction, CommentStatement, EnvInstruction, FromInstruction, GenericInstruction, Kind,
    Parsed, Statement,
};

type VarMap = BTreeMap<String, String>;

/// `env` is accepted for parity with the public signature but, per the
/// substitution precedence spelled out for each statement kind, is not
/// consulted by any resolution rule: `ARG` precedence is `global ARG ->
/// build_args -> default`, and `ENV`/generic substitution precedence is
/// `(stage ENV, stage ARG)` — neither chain includes the caller-supplied
/// environment.
pub fn resolve(parsed: &Parsed, build_args: &BTreeMap<String, String>, env: &BTreeMap<String, String>) -> Result<Parsed, Error> {
    let escape = parsed.escape_character.as_char();
    let mut global_arg: VarMap = BTreeMap::new();
    let mut statements = Vec::new();
    let mut idx = 0;

    idx = resolve_preamble(&parsed.statements, idx, &mut global_arg, build_args, &mut statements)?;

    if idx == parsed.statements.len() {
        return Err(Error::MissingFrom);
    }

    while idx < parsed.statements.len() {
        idx = resolve_stage(&parsed.statements, idx, &global_arg, build_args, env, escape, &mut statements)?;
    }

    Ok(Parsed {
        escape_character: parsed.escape_character,
        statements,
    })
}

/// Consumes every statement before the first `FROM`. `Arg` statements are
/// resolved and replaced with tombstone comments; everything else passes
/// through unchanged. Returns the index of the first `FROM` (or the end of
/// input if there is none).
fn resolve_preamble(
    input: &[Statement],
    mut idx: usize,
    global_arg: &mut VarMap,
    build_args: &VarMap,
    out: &mut Vec<Statement>,
) -> Result<usize, Error> {
    let mut tombstone: Vec<String> = Vec::new();

    while idx < input.len() && input[idx].kind() != Kind::From {
        match &input[idx] {
            Statement::Arg(arg) => {
                let (value, source) = lookup_arg(arg, global_arg, build_args)?;
                global_arg.insert(arg.name.clone(), value.clone());
                tombstone.push(tombstone_line(arg, &value, source));
            }
            other => {
                flush_tombstone(&mut tombstone, out);
                out.push(other.clone());
            }
        }
        idx += 1;
    }
    flush_tombstone(&mut tombstone, out);

    Ok(idx)
}

/// Resolves one `FROM` through (but excluding) the next `FROM`.
fn resolve_stage(
    input: &[Statement],
    mut idx: usize,
    global_arg: &VarMap,
    build_args: &VarMap,
    _env: &VarMap,
    escape: char,
    out: &mut Vec<Statement>,
) -> Result<usize, Error> {
    let Statement::From(from) = &input[idx] else {
        unreachable!("caller guarantees a FROM at this index");
    };
    out.push(Statement::From(resolve_from(from, global_arg)));
    idx += 1;

    let mut stage_arg: VarMap = BTreeMap::new();
    let mut stage_env: VarMap = BTreeMap::new();
    let mut tombstone: Vec<String> = Vec::new();

    while idx < input.len() && input[idx].kind() != Kind::From {
        match &input[idx] {
            Statement::Arg(arg) => {
                let (value, source) = lookup_arg(arg, global_arg, build_args)?;
                stage_arg.insert(arg.name.clone(), value.clone());
                tombstone.push(tombstone_line(arg, &value, source));
            }
            Statement::Env(env_stmt) => {
                flush_tombstone(&mut tombstone, out);
                out.push(resolve_env(env_stmt, &mut stage_env, &stage_arg, escape));
            }
            Statement::Generic(generic) => {
                flush_tombstone(&mut tombstone, out);
                out.push(resolve_generic(generic, &stage_env, &stage_arg));
            }
            other => {
                flush_tombstone(&mut tombstone, out);
                out.push(other.clone());
            }
        }
        idx += 1;
    }
    flush_tombstone(&mut tombstone, out);

    Ok(idx)
}

fn flush_tombstone(tombstone: &mut Vec<String>, out: &mut Vec<Statement>) {
    if !tombstone.is_empty() {
        out.push(Statement::Comment(CommentStatement {
            lines: std::mem::take(tombstone),
        }));
    }
}

/// Resolution order for `ARG`, identical in the preamble and inside a
/// stage: prior global declaration, then `build_args`, then the
/// statement's own default (spec §4.7). The caller writes the chosen value
/// into whichever scope the `ARG` belongs to — global in the preamble,
/// stage-local inside a stage — this function only looks up, never writes.
fn lookup_arg(arg: &ArgInstruction, global_arg: &VarMap, build_args: &VarMap) -> Result<(String, &'static str), Error> {
    if let Some(value) = global_arg.get(&arg.name) {
        return Ok((value.clone(), "prior declaration"));
    }
    if let Some(value) = build_args.get(&arg.name) {
        return Ok((value.clone(), "build argument"));
    }
    if let Some(default_value) = &arg.default_value {
        return Ok((default_value.clone(), "default value"));
    }
    Err(Error::unresolved_arg(arg.name.clone()))
}

fn tombstone_line(arg: &ArgInstruction, value: &str, source: &str) -> String {
    let original = match &arg.default_value {
        Some(default_value) => format!("ARG {}={default_value}", arg.name),
        None => format!("ARG {}", arg.name),
    };
    format!(" `{original}` was resolved to `{}={value}` from {source}.", arg.name)
}

fn resolve_from(from: &FromInstruction, global_arg: &VarMap) -> FromInstruction {
    FromInstruction {
        platform: from.platform.as_deref().map(|p| substitute_vars(p, &[global_arg])),
        image: substitute_vars(&from.image, &[global_arg]),
        alias: from.alias.clone(),
    }
}

fn resolve_env(env_stmt: &EnvInstruction, stage_env: &mut VarMap, stage_arg: &VarMap, escape: char) -> Statement {
    let mut resolved_env = BTreeMap::new();
    let mut key_order = Vec::with_capacity(env_stmt.key_order.len());

    for key in &env_stmt.key_order {
        let raw = &env_stmt.env[key];
        let substituted = substitute_vars(raw, &[stage_env, stage_arg]);
        let value = ensure_modern_env_value(&substituted, escape);
        resolved_env.insert(key.clone(), value.clone());
        key_order.push(key.clone());
        stage_env.insert(key.clone(), value);
    }

    Statement::Env(EnvInstruction {
        env: resolved_env,
        key_order,
    })
}

fn resolve_generic(generic: &GenericInstruction, stage_env: &VarMap, stage_arg: &VarMap) -> Statement {
    let scopes = [stage_env, stage_arg];
    let tokens = generic
        .arguments
        .tokens
        .iter()
        .map(|token| substitute_vars(token, &scopes))
        .collect();
    let raw_lines = generic
        .raw_lines
        .iter()
        .map(|line| substitute_vars(line, &scopes))
        .collect();

    Statement::Generic(GenericInstruction {
        kind: generic.kind,
        arguments: crate::model::Arguments {
            tokens,
            exec_form: generic.arguments.exec_form,
        },
        raw_lines,
    })
}

fn lookup<'a>(name: &str, scopes: &[&'a VarMap]) -> Option<&'a str> {
    scopes.iter().find_map(|scope| scope.get(name)).map(String::as_str)
}

/// Recognizes `$NAME`, `${NAME}`, `${NAME:-default}`, `${NAME:+alt}`.
/// Unknown placeholders expand to the empty string (spec §4.7).
pub fn substitute_vars(input: &str, scopes: &[&VarMap]) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(dollar) = rest.find('$') {
        out.push_str(&rest[..dollar]);
        rest = &rest[dollar + 1..];

        if let Some(after_brace) = rest.strip_prefix('{') {
            if let Some(close) = after_brace.find('}') {
                out.push_str(&expand_braced(&after_brace[..close], scopes));
                rest = &after_brace[close + 1..];
                continue;
            }
            // Unterminated `${` — emit the rest of the string verbatim.
            out.push('$');
            out.push('{');
            out.push_str(after_brace);
            rest = "";
            continue;
        }

        let name_len = rest
            .char_indices()
            .take_while(|&(i, c)| if i == 0 { is_name_start(c) } else { is_name_continue(c) })
            .count();
        if name_len == 0 {
            out.push('$');
            continue;
        }
        let name = &rest[..name_len];
        out.push_str(lookup(name, scopes).unwrap_or(""));
        rest = &rest[name_len..];
    }
    out.push_str(rest);
    out
}

fn is_name_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_name_continue(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn expand_braced(inner: &str, scopes: &[&VarMap]) -> String {
    if let Some((name, alt)) = inner.split_once(":+") {
        return if lookup(name, scopes).is_some() {
            substitute_vars(alt, scopes)
        } else {
            String::new()
        };
    }
    if let Some((name, default)) = inner.split_once(":-") {
        return match lookup(name, scopes) {
            Some(value) => value.to_string(),
            None => substitute_vars(default, scopes),
        };
    }
    lookup(inner, scopes).unwrap_or("").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::line_utils::split_lines;
    use crate::parser::parse;

    fn scopes_of(pairs: &[(&str, &str)]) -> VarMap {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn substitute_forms() {
        let env = scopes_of(&[("NAME", "world")]);
        assert_eq!(substitute_vars("hi $NAME!", &[&env]), "hi world!");
        assert_eq!(substitute_vars("hi ${NAME}!", &[&env]), "hi world!");
        assert_eq!(substitute_vars("$MISSING", &[&env]), "");
        assert_eq!(substitute_vars("${MISSING:-fallback}", &[&env]), "fallback");
        assert_eq!(substitute_vars("${NAME:+set}", &[&env]), "set");
        assert_eq!(substitute_vars("${MISSING:+set}", &[&env]), "");
    }

    #[test]
    fn default_form_expands_recursively() {
        let env = scopes_of(&[("M", "resolved")]);
        assert_eq!(substitute_vars("${MISSING:-$M}", &[&env]), "resolved");
    }

    #[test]
    fn missing_from_fails() {
        let parsed = parse(&split_lines("ARG X=1")).unwrap();
        assert_eq!(
            resolve(&parsed, &BTreeMap::new(), &BTreeMap::new()),
            Err(Error::MissingFrom)
        );
    }

    #[test]
    fn preamble_arg_becomes_tombstone_comment() {
        let parsed = parse(&split_lines("ARG VERSION=1.0\nFROM img:${VERSION}")).unwrap();
        let resolved = resolve(&parsed, &BTreeMap::new(), &BTreeMap::new()).unwrap();

        let Statement::Comment(comment) = &resolved.statements[0] else {
            panic!("expected Comment")
        };
        assert_eq!(
            comment.lines,
            vec![" `ARG VERSION=1.0` was resolved to `VERSION=1.0` from default value."]
        );

        let Statement::From(from) = &resolved.statements[1] else {
            panic!("expected From")
        };
        assert_eq!(from.image, "img:1.0");
    }

    #[test]
    fn unresolved_arg_without_default_fails() {
        let parsed = parse(&split_lines("ARG VERSION\nFROM img:${VERSION}")).unwrap();
        assert_eq!(
            resolve(&parsed, &BTreeMap::new(), &BTreeMap::new()),
            Err(Error::unresolved_arg("VERSION"))
        );
    }

    #[test]
    fn build_args_override_default() {
        let parsed = parse(&split_lines("ARG VERSION=1.0\nFROM img:${VERSION}")).unwrap();
        let build_args = scopes_of(&[("VERSION", "2.0")]);
        let resolved = resolve(&parsed, &build_args, &BTreeMap::new()).unwrap();
        let Statement::From(from) = &resolved.statements[1] else {
            panic!("expected From")
        };
        assert_eq!(from.image, "img:2.0");
    }

    #[test]
    fn env_substitution_publishes_into_stage_env_immediately() {
        let parsed = parse(&split_lines("FROM alpine\nENV A=1\nENV B=${A}-2")).unwrap();
        let resolved = resolve(&parsed, &BTreeMap::new(), &BTreeMap::new()).unwrap();
        let Statement::Env(env) = &resolved.statements[2] else {
            panic!("expected Env")
        };
        assert_eq!(env.env["B"], "1-2");
    }

    #[test]
    fn stage_arg_never_shadows_global_arg_for_lookup() {
        let parsed = parse(&split_lines("ARG BASE=alpine\nFROM ${BASE}\nARG BASE=ignored\nRUN echo $BASE")).unwrap();
        let resolved = resolve(&parsed, &BTreeMap::new(), &BTreeMap::new()).unwrap();
        let Statement::Generic(run) = &resolved.statements[3] else {
            panic!("expected Generic")
        };
        assert_eq!(run.arguments.tokens, vec!["echo", "alpine"]);
    }
}
