use std::collections::BTreeMap;
use std::fmt;

use crate::renderer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Kind {
    Add,
    Arg,
    Cmd,
    Comment,
    Copy,
    Entrypoint,
    Env,
    Expose,
    From,
    Healthcheck,
    Label,
    Maintainer,
    Onbuild,
    Run,
    Shell,
    Stopsignal,
    User,
    Volume,
    Workdir,
}

impl Kind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Add => "ADD",
            Self::Arg => "ARG",
            Self::Cmd => "CMD",
            Self::Comment => "COMMENT",
            Self::Copy => "COPY",
            Self::Entrypoint => "ENTRYPOINT",
            Self::Env => "ENV",
            Self::Expose => "EXPOSE",
            Self::From => "FROM",
            Self::Healthcheck => "HEALTHCHECK",
            Self::Label => "LABEL",
            Self::Maintainer => "MAINTAINER",
            Self::Onbuild => "ONBUILD",
            Self::Run => "RUN",
            Self::Shell => "SHELL",
            Self::Stopsignal => "STOPSIGNAL",
            Self::User => "USER",
            Self::Volume => "VOLUME",
            Self::Workdir => "WORKDIR",
        }
    }

    /// Looks up a keyword (already uppercased by the caller). `COMMENT` is
    /// deliberately excluded: comments are never dispatched through a keyword.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Some(match keyword {
            "ADD" => Self::Add,
            "ARG" => Self::Arg,
            "CMD" => Self::Cmd,
            "COPY" => Self::Copy,
            "ENTRYPOINT" => Self::Entrypoint,
            "ENV" => Self::Env,
            "EXPOSE" => Self::Expose,
            "FROM" => Self::From,
            "HEALTHCHECK" => Self::Healthcheck,
            "LABEL" => Self::Label,
            "MAINTAINER" => Self::Maintainer,
            "ONBUILD" => Self::Onbuild,
            "RUN" => Self::Run,
            "SHELL" => Self::Shell,
            "STOPSIGNAL" => Self::Stopsignal,
            "USER" => Self::User,
            "VOLUME" => Self::Volume,
            "WORKDIR" => Self::Workdir,
            _ => return None,
        })
    }

    /// Instructions that attempt the exec-form JSON probe before falling
    /// back to a whitespace split (spec §4.4).
    pub const fn is_exec_capable(self) -> bool {
        matches!(
            self,
            Self::Add | Self::Cmd | Self::Entrypoint | Self::Copy | Self::Run | Self::Shell | Self::Volume
        )
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shared token container for instructions that don't need a dedicated shape.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Arguments {
    pub tokens: Vec<String>,
    pub exec_form: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommentStatement {
    pub lines: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgInstruction {
    pub name: String,
    pub default_value: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EnvInstruction {
    pub env: BTreeMap<String, String>,
    pub key_order: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FromInstruction {
    pub platform: Option<String>,
    pub image: String,
    pub alias: Option<String>,
}

/// Every other instruction keyword: flags pass through as tokens, arguments
/// are either exec-form (JSON-probed) or shell-form (whitespace-split).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenericInstruction {
    pub kind: Kind,
    pub arguments: Arguments,
    /// Raw input lines for this statement, escapes stripped, keyword included
    /// on the first line. Not used by the renderer, but substituted by the
    /// resolver for symmetry (spec §9).
    pub raw_lines: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    Comment(CommentStatement),
    Arg(ArgInstruction),
    Env(EnvInstruction),
    From(FromInstruction),
    Generic(GenericInstruction),
}

impl Statement {
    pub fn kind(&self) -> Kind {
        match self {
            Self::Comment(_) => Kind::Comment,
            Self::Arg(_) => Kind::Arg,
            Self::Env(_) => Kind::Env,
            Self::From(_) => Kind::From,
            Self::Generic(g) => g.kind,
        }
    }

    /// Flag name -> flag value. Only `FROM`'s `--platform` is modeled; every
    /// other flag (`--chown=`, `--from=`, ...) is left inside the token list.
    pub fn flags(&self) -> BTreeMap<String, String> {
        let mut flags = BTreeMap::new();
        if let Self::From(from) = self {
            if let Some(platform) = &from.platform {
                flags.insert("platform".to_string(), platform.clone());
            }
        }
        flags
    }

    pub fn arguments(&self) -> Arguments {
        match self {
            Self::Comment(_) => Arguments::default(),
            Self::Arg(arg) => {
                let mut token = arg.name.clone();
                if let Some(default_value) = &arg.default_value {
                    token.push('=');
                    token.push_str(default_value);
                }
                Arguments {
                    tokens: vec![token],
                    exec_form: false,
                }
            }
            Self::Env(env) => {
                let tokens = env
                    .key_order
                    .iter()
                    .map(|key| format!("{key}={}", env.env[key]))
                    .collect();
                Arguments {
                    tokens,
                    exec_form: false,
                }
            }
            Self::From(from) => {
                let mut tokens = vec![from.image.clone()];
                if let Some(alias) = &from.alias {
                    tokens.push("AS".to_string());
                    tokens.push(alias.clone());
                }
                Arguments {
                    tokens,
                    exec_form: false,
                }
            }
            Self::Generic(generic) => generic.arguments.clone(),
        }
    }
}

/// The escape character declared by a parser directive, or the default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscapeCharacter {
    Backslash,
    Backtick,
}

impl EscapeCharacter {
    pub const DEFAULT: Self = Self::Backslash;

    pub const fn as_char(self) -> char {
        match self {
            Self::Backslash => '\\',
            Self::Backtick => '`',
        }
    }

    pub fn from_char(value: char) -> Option<Self> {
        match value {
            '\\' => Some(Self::Backslash),
            '`' => Some(Self::Backtick),
            _ => None,
        }
    }
}

impl Default for EscapeCharacter {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for EscapeCharacter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Parsed {
    pub escape_character: EscapeCharacter,
    pub statements: Vec<Statement>,
}

impl fmt::Display for Parsed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&renderer::render(self).map_err(|_| fmt::Error)?)
    }
}
