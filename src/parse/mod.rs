pub mod shell;
pub mod tokenize;
pub mod types;

pub use shell::{
    parse_pipeline, parse_pipeline_with, parse_sequence, parse_sequence_with, split_sequence,
};
pub use tokenize::{parse, split_words, tokenize, tokenize_with};
pub use types::{
    CommandNode, ParsedCommand, Pipeline, RedirectInfo, RedirectKind, Sequence, Token,
};
