use log::{debug, warn};

use super::tokenize::tokenize_with;
use super::types::{CommandNode, Pipeline, RedirectInfo, RedirectKind, Sequence, Token};

/// Split a line at unquoted `;`, keeping quote characters in each part.
///
/// Runs before tokenization, so it tracks quote state on its own.
/// Blank parts are dropped.
pub fn split_sequence(input: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut buf = String::new();
    let (mut sq, mut dq) = (false, false);

    for c in input.chars() {
        if c == '"' && !sq {
            dq = !dq;
        } else if c == '\'' && !dq {
            sq = !sq;
        } else if c == ';' && !sq && !dq {
            parts.push(std::mem::take(&mut buf));
            continue;
        }
        buf.push(c);
    }
    parts.push(buf);

    parts.retain(|p| !p.trim().is_empty());
    parts
}

/// Parse one `;`-free part into pipeline stages, expanding variables from the environment.
pub fn parse_pipeline(part: &str) -> Vec<CommandNode> {
    parse_pipeline_with(part, |name| std::env::var(name).ok())
}

/// Parse one part into stages with a caller-supplied variable lookup.
///
/// `|` ends a stage. A redirect operator takes the next word as its target;
/// words after the target still belong to the stage, and the last redirect
/// of a stage wins. Stages with no words are dropped, so stray pipes
/// degrade instead of failing. A redirect with no target word ends parsing
/// and discards the stage being built.
pub fn parse_pipeline_with<F>(part: &str, lookup: F) -> Vec<CommandNode>
where
    F: Fn(&str) -> Option<String>,
{
    let tokens = tokenize_with(part, lookup);
    debug!("tokens: {tokens:?}");

    let mut stages = Vec::new();
    let mut words: Vec<String> = Vec::new();
    let mut redirect = RedirectInfo::none();
    let mut iter = tokens.into_iter();

    while let Some(token) = iter.next() {
        match token {
            Token::Word(w) => words.push(w),
            Token::Pipe => push_stage(&mut stages, &mut words, &mut redirect),
            op => {
                let Some(kind) = op.redirect_kind() else {
                    continue;
                };
                let Some(Token::Word(target)) = iter.next() else {
                    debug!("dangling `{}` dropped with its stage", op.as_str());
                    return stages;
                };
                if kind == RedirectKind::None {
                    warn!("`{}` is not supported; ignoring `{target}`", op.as_str());
                    continue;
                }
                redirect = RedirectInfo::new(kind, target);
            }
        }
    }
    push_stage(&mut stages, &mut words, &mut redirect);
    stages
}

fn push_stage(stages: &mut Vec<CommandNode>, words: &mut Vec<String>, redirect: &mut RedirectInfo) {
    let redirect = std::mem::take(redirect);
    let mut taken = std::mem::take(words).into_iter();
    if let Some(name) = taken.next() {
        stages.push(CommandNode {
            name,
            args: taken.collect(),
            redirect,
        });
    }
}

/// Parse a full input line into a sequence of pipelines.
pub fn parse_sequence(input: &str) -> Sequence {
    parse_sequence_with(input, |name| std::env::var(name).ok())
}

/// Parse a full line with a caller-supplied variable lookup.
///
/// Empty pipelines are skipped; when none remain, the sequence holds a
/// single empty pipeline.
pub fn parse_sequence_with<F>(input: &str, lookup: F) -> Sequence
where
    F: Fn(&str) -> Option<String>,
{
    let mut pipelines: Vec<Pipeline> = split_sequence(input)
        .iter()
        .map(|part| Pipeline {
            commands: parse_pipeline_with(part, &lookup),
        })
        .filter(|p| !p.is_empty())
        .collect();

    if pipelines.is_empty() {
        pipelines.push(Pipeline::default());
    }
    Sequence { pipelines }
}
