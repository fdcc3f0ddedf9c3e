/// One call of a built-in: its name, explicit arguments, and optional input.
#[derive(Debug, Clone, Copy)]
pub struct Invocation<'a> {
    /// Name the command was invoked under.
    pub name: &'a str,
    /// Explicit arguments after the name, already unquoted and expanded.
    pub args: &'a [String],
    /// Piped output of the previous stage, or the content of a `<` file.
    pub stdin: Option<&'a str>,
}

impl<'a> Invocation<'a> {
    pub fn new(name: &'a str, args: &'a [String]) -> Self {
        Self {
            name,
            args,
            stdin: None,
        }
    }

    pub fn with_stdin(mut self, stdin: Option<&'a str>) -> Self {
        self.stdin = stdin;
        self
    }

    /// Check if any argument matches a flag exactly.
    pub fn has_flag(&self, flag: &str) -> bool {
        self.args.iter().any(|w| w == flag)
    }

    /// Check for a single-letter option, alone (`-l`) or grouped (`-la`).
    pub fn has_option(&self, letter: char) -> bool {
        self.args.iter().any(|w| {
            w.len() > 1 && w.starts_with('-') && !w.starts_with("--") && w[1..].contains(letter)
        })
    }

    /// Arguments that are not options. A lone `-` counts as an operand.
    pub fn operands(&self) -> impl Iterator<Item = &'a String> + 'a {
        let args: &'a [String] = self.args;
        args.iter().filter(|w| *w == "-" || !w.starts_with('-'))
    }
}
