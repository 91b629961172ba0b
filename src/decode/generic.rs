use crate::line_utils::parse_json_string_list;
use crate::model::{Arguments, GenericInstruction, Kind, Statement};

/// `ADD`, `CMD`, `COPY`, `ENTRYPOINT`, `RUN`, `SHELL`, `VOLUME` probe for
/// exec-form JSON first; every other kind is always shell-form
/// whitespace-split (spec §4.4).
pub fn decode(kind: Kind, raw_args: &str, raw_lines: Vec<String>) -> Statement {
    let arguments = if kind.is_exec_capable() {
        match parse_json_string_list(raw_args) {
            Some(tokens) => Arguments {
                tokens,
                exec_form: true,
            },
            None => shell_form(raw_args),
        }
    } else {
        shell_form(raw_args)
    };

    Statement::Generic(GenericInstruction {
        kind,
        arguments,
        raw_lines,
    })
}

fn shell_form(raw_args: &str) -> Arguments {
    Arguments {
        tokens: raw_args.split_whitespace().map(str::to_string).collect(),
        exec_form: false,
    }
}
