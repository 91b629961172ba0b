use std::sync::OnceLock;

use regex::Regex;

use crate::error::Error;
use crate::model::{ArgInstruction, Statement};

fn arg_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*([^=\s]+)(?:\s*=\s*([^=\s]+))?\s*$").unwrap())
}

pub fn decode(raw_args: &str, line: usize) -> Result<Statement, Error> {
    let captures = arg_regex().captures(raw_args).ok_or(Error::syntax_error(line))?;
    let name = captures[1].to_string();
    let default_value = captures.get(2).map(|m| m.as_str().to_string());
    Ok(Statement::Arg(ArgInstruction { name, default_value }))
}
