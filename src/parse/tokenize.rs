use super::types::{ParsedCommand, Token};

/// Tokenize one pipeline's text, expanding `$NAME` from the process environment.
pub fn tokenize(input: &str) -> Vec<Token> {
    tokenize_with(input, |name| std::env::var(name).ok())
}

/// Tokenize with a caller-supplied variable lookup.
///
/// Scans left to right with two quote flags. Outside quotes, `>`, `>>`, `<`,
/// `<<` and `|` are operator tokens and whitespace separates words. Outside
/// single quotes, `$NAME` is replaced by `lookup(NAME)` (empty when unset);
/// the value is spliced into the current word and never re-split.
///
/// An unclosed quote runs to end of input; no error is raised.
pub fn tokenize_with<F>(input: &str, lookup: F) -> Vec<Token>
where
    F: Fn(&str) -> Option<String>,
{
    let mut tokens = Vec::new();
    let mut buf = String::new();
    // Set once a quote pair has been opened, so `""` still yields a word.
    let mut quoted = false;

    let chars: Vec<char> = input.chars().collect();
    let len = chars.len();
    let mut i = 0;
    let (mut sq, mut dq) = (false, false);

    while i < len {
        let c = chars[i];

        if c == '"' && !sq {
            dq = !dq;
            quoted = true;
            i += 1;
            continue;
        }
        if c == '\'' && !dq {
            sq = !sq;
            quoted = true;
            i += 1;
            continue;
        }

        if !sq && !dq {
            let next = chars.get(i + 1).copied();
            let op = match (c, next) {
                ('>', Some('>')) => Some((Token::RedirectAppend, 2)),
                ('>', _) => Some((Token::RedirectOut, 1)),
                ('<', Some('<')) => Some((Token::HereDoc, 2)),
                ('<', _) => Some((Token::RedirectIn, 1)),
                ('|', _) => Some((Token::Pipe, 1)),
                _ => None,
            };
            if let Some((token, width)) = op {
                flush_word(&mut tokens, &mut buf, &mut quoted);
                tokens.push(token);
                i += width;
                continue;
            }
            if c.is_whitespace() {
                flush_word(&mut tokens, &mut buf, &mut quoted);
                i += 1;
                continue;
            }
        }

        if c == '$' && !sq {
            let start = i + 1;
            let mut end = start;
            while end < len && is_var_char(chars[end]) {
                end += 1;
            }
            if end > start {
                let name: String = chars[start..end].iter().collect();
                buf.push_str(&lookup(&name).unwrap_or_default());
                i = end;
                continue;
            }
        }

        buf.push(c);
        i += 1;
    }

    flush_word(&mut tokens, &mut buf, &mut quoted);
    tokens
}

fn flush_word(tokens: &mut Vec<Token>, buf: &mut String, quoted: &mut bool) {
    if !buf.is_empty() || *quoted {
        tokens.push(Token::Word(std::mem::take(buf)));
    }
    *quoted = false;
}

fn is_var_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Split on unquoted whitespace only. Operators and `$` are ordinary characters.
pub fn split_words(input: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut buf = String::new();
    let mut quoted = false;
    let (mut sq, mut dq) = (false, false);

    for c in input.trim().chars() {
        if c == '"' && !sq {
            dq = !dq;
            quoted = true;
            continue;
        }
        if c == '\'' && !dq {
            sq = !sq;
            quoted = true;
            continue;
        }
        if c.is_whitespace() && !sq && !dq {
            if !buf.is_empty() || quoted {
                words.push(std::mem::take(&mut buf));
            }
            quoted = false;
            continue;
        }
        buf.push(c);
    }
    if !buf.is_empty() || quoted {
        words.push(buf);
    }
    words
}

/// Legacy single-command parse: first word is the command, the rest are arguments.
pub fn parse(input: &str) -> ParsedCommand {
    let mut words = split_words(input).into_iter();
    let command = words.next().unwrap_or_default();
    ParsedCommand {
        command,
        args: words.collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(tokens: &[Token]) -> Vec<&str> {
        tokens.iter().map(|t| t.as_str()).collect()
    }

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn tokenize_simple() {
        let tokens = tokenize_with("ls -la /tmp", no_env);
        assert_eq!(words(&tokens), vec!["ls", "-la", "/tmp"]);
    }

    #[test]
    fn tokenize_strips_quotes() {
        let tokens = tokenize_with(r#"echo "a b" 'c d' e"#, no_env);
        assert_eq!(words(&tokens), vec!["echo", "a b", "c d", "e"]);
    }

    #[test]
    fn tokenize_nested_other_quote_is_literal() {
        let tokens = tokenize_with(r#"echo "it's" 'say "hi"'"#, no_env);
        assert_eq!(words(&tokens), vec!["echo", "it's", "say \"hi\""]);
    }

    #[test]
    fn tokenize_operators_without_spaces() {
        let tokens = tokenize_with("echo hi>out.txt|cat<in.txt", no_env);
        assert_eq!(
            tokens,
            vec![
                Token::Word("echo".into()),
                Token::Word("hi".into()),
                Token::RedirectOut,
                Token::Word("out.txt".into()),
                Token::Pipe,
                Token::Word("cat".into()),
                Token::RedirectIn,
                Token::Word("in.txt".into()),
            ]
        );
    }

    #[test]
    fn tokenize_double_char_operators() {
        let tokens = tokenize_with("a >> b << c", no_env);
        assert_eq!(tokens[1], Token::RedirectAppend);
        assert_eq!(tokens[3], Token::HereDoc);
    }

    #[test]
    fn tokenize_quoted_operator_is_word() {
        let tokens = tokenize_with(r#"echo ">" '|'"#, no_env);
        assert_eq!(
            tokens,
            vec![
                Token::Word("echo".into()),
                Token::Word(">".into()),
                Token::Word("|".into()),
            ]
        );
    }

    #[test]
    fn tokenize_expands_variables() {
        let lookup = |name: &str| (name == "USER_NAME").then(|| "ada".to_string());
        let tokens = tokenize_with("echo $USER_NAME-x \"$USER_NAME\" '$USER_NAME'", lookup);
        assert_eq!(words(&tokens), vec!["echo", "ada-x", "ada", "$USER_NAME"]);
    }

    #[test]
    fn tokenize_expanded_whitespace_not_resplit() {
        let lookup = |_: &str| Some("a b".to_string());
        let tokens = tokenize_with("echo $X", lookup);
        assert_eq!(words(&tokens), vec!["echo", "a b"]);
    }

    #[test]
    fn tokenize_unset_variable_is_empty() {
        let tokens = tokenize_with("echo pre$NOPE post", no_env);
        assert_eq!(words(&tokens), vec!["echo", "pre", "post"]);
    }

    #[test]
    fn tokenize_lone_dollar_is_literal() {
        let tokens = tokenize_with("echo $ $- 5$", no_env);
        assert_eq!(words(&tokens), vec!["echo", "$", "$-", "5$"]);
    }

    #[test]
    fn tokenize_unclosed_quote_runs_to_end() {
        let tokens = tokenize_with("echo \"a | b", no_env);
        assert_eq!(words(&tokens), vec!["echo", "a | b"]);
    }

    #[test]
    fn tokenize_empty_quotes_yield_empty_word() {
        let tokens = tokenize_with("echo \"\" x", no_env);
        assert_eq!(words(&tokens), vec!["echo", "", "x"]);
    }

    #[test]
    fn tokenize_whitespace_only() {
        assert!(tokenize_with("  \t ", no_env).is_empty());
    }

    #[test]
    fn parse_quoted_arguments() {
        let parsed = parse(r#"echo "a b" 'c d' e"#);
        assert_eq!(parsed.command, "echo");
        assert_eq!(parsed.args, vec!["a b", "c d", "e"]);
    }

    #[test]
    fn parse_ignores_operators() {
        let parsed = parse("echo a>b | c");
        assert_eq!(parsed.args, vec!["a>b", "|", "c"]);
    }

    #[test]
    fn parse_empty() {
        assert_eq!(parse("   "), ParsedCommand::default());
    }
}
