use core::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    EmptyInput,
    SyntaxError { line: usize },
    UnknownInstruction { kind: String, line: usize },
    UnterminatedContinuation { line: usize },
    DuplicateDirective { key: String },
    InvalidEscape { value: String },
    MissingFrom,
    UnresolvedArg { name: String },
    UnknownStatementKind,
}

impl Error {
    pub fn syntax_error(line: usize) -> Self {
        Self::SyntaxError { line }
    }

    pub fn unknown_instruction(kind: impl Into<String>, line: usize) -> Self {
        Self::UnknownInstruction {
            kind: kind.into(),
            line,
        }
    }

    pub fn duplicate_directive(key: impl Into<String>) -> Self {
        Self::DuplicateDirective { key: key.into() }
    }

    pub fn invalid_escape(value: impl Into<String>) -> Self {
        Self::InvalidEscape {
            value: value.into(),
        }
    }

    pub fn unresolved_arg(name: impl Into<String>) -> Self {
        Self::UnresolvedArg { name: name.into() }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyInput => write!(f, "dockerfile was empty"),
            Self::SyntaxError { line } => write!(f, "syntax error on line {line}"),
            Self::UnknownInstruction { kind, line } => {
                write!(f, "unknown instruction {kind:?} on line {line}")
            }
            Self::UnterminatedContinuation { line } => {
                write!(f, "multi-line statement starting on line {line} does not terminate")
            }
            Self::DuplicateDirective { key } => {
                write!(f, "directive {key:?} set multiple times")
            }
            Self::InvalidEscape { value } => {
                write!(f, "escape directive must be one of ['\\\\', '`'], got {value:?}")
            }
            Self::MissingFrom => write!(f, "dockerfile did not contain a FROM statement"),
            Self::UnresolvedArg { name } => {
                write!(f, "ARG {name} has no default and was not supplied")
            }
            Self::UnknownStatementKind => write!(f, "statement kind outside the known set"),
        }
    }
}

impl std::error::Error for Error {}
