pub mod arg;
pub mod comment;
pub mod env;
pub mod from;
pub mod generic;

use crate::error::Error;
use crate::model::{Kind, Statement};

/// Dispatches a scanned instruction to its per-keyword decoder (spec §4.4).
pub fn decode_instruction(
    kind: Kind,
    raw_args: &str,
    raw_lines: Vec<String>,
    line: usize,
) -> Result<Statement, Error> {
    match kind {
        Kind::Arg => arg::decode(raw_args, line),
        Kind::Env => env::decode(raw_args, line),
        Kind::From => from::decode(raw_args, line),
        _ => Ok(generic::decode(kind, raw_args, raw_lines)),
    }
}
