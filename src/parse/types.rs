//! Types produced by the tokenizer and parser and consumed by the executor.

/// A lexical unit of one input line.
///
/// Quote characters never survive tokenization: a quoted `">"` becomes
/// `Word(">")`, which the parser treats as an ordinary argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// An argument or command name.
    Word(String),
    /// `|`: feed the previous stage's output to the next stage
    Pipe,
    /// `>`: truncate the target with the output
    RedirectOut,
    /// `>>`: append the output to the target
    RedirectAppend,
    /// `<`: read the target as input
    RedirectIn,
    /// `<<`: recognized but carries no execution semantics
    HereDoc,
}

impl Token {
    /// The token's shell syntax (the word text for `Word`).
    pub fn as_str(&self) -> &str {
        match self {
            Token::Word(w) => w,
            Token::Pipe => "|",
            Token::RedirectOut => ">",
            Token::RedirectAppend => ">>",
            Token::RedirectIn => "<",
            Token::HereDoc => "<<",
        }
    }

    /// Redirect kind for the operator tokens that carry one.
    pub fn redirect_kind(&self) -> Option<RedirectKind> {
        match self {
            Token::RedirectOut => Some(RedirectKind::OutputTruncate),
            Token::RedirectAppend => Some(RedirectKind::OutputAppend),
            Token::RedirectIn => Some(RedirectKind::Input),
            Token::HereDoc => Some(RedirectKind::None),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RedirectKind {
    #[default]
    None,
    /// `>`
    OutputTruncate,
    /// `>>`
    OutputAppend,
    /// `<`
    Input,
}

impl RedirectKind {
    pub fn is_output(self) -> bool {
        matches!(self, RedirectKind::OutputTruncate | RedirectKind::OutputAppend)
    }
}

/// Redirect attached to one pipeline stage.
///
/// `path` is `Some` for every kind except `None`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RedirectInfo {
    pub kind: RedirectKind,
    pub path: Option<String>,
}

impl RedirectInfo {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn new(kind: RedirectKind, path: impl Into<String>) -> Self {
        match kind {
            RedirectKind::None => Self::none(),
            _ => Self {
                kind,
                path: Some(path.into()),
            },
        }
    }
}

/// One stage of a pipeline: `name args... [redirect]`.
///
/// `name` is never empty; stages without words are dropped by the parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandNode {
    pub name: String,
    pub args: Vec<String>,
    pub redirect: RedirectInfo,
}

/// Stages joined by `|`, executed left to right.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Pipeline {
    pub commands: Vec<CommandNode>,
}

impl Pipeline {
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

/// Pipelines separated by unquoted `;`.
///
/// Always holds at least one pipeline; blank input parses to a single empty one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sequence {
    pub pipelines: Vec<Pipeline>,
}

/// Result of the operator-blind legacy parse: a command word plus its arguments.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParsedCommand {
    pub command: String,
    pub args: Vec<String>,
}
