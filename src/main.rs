//! tinsh: interactive shell front end.
//!
//! Usage:
//!   tinsh                 interactive prompt
//!   tinsh -c '<line>'     run one line and exit
//!   tinsh --dump-config   print the merged configuration as TOML
//!   tinsh --verbose       also log to stderr

use anyhow::{Context, Result, bail};
use log::{debug, info};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use tinsh::config::Config;
use tinsh::exec::Executor;
use tinsh::state::{ShellMode, ShellState};

struct Args {
    verbose: bool,
    dump_config: bool,
    command: Option<String>,
}

fn parse_args() -> Result<Args> {
    let mut args = Args {
        verbose: false,
        dump_config: false,
        command: None,
    };
    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--verbose" | "-v" => args.verbose = true,
            "--dump-config" => args.dump_config = true,
            "-c" => {
                let line = iter.next().context("-c needs a command line")?;
                args.command = Some(line);
            }
            other => bail!("unknown argument: {other}"),
        }
    }
    Ok(args)
}

fn main() -> Result<()> {
    let args = parse_args()?;
    let config = Config::load();

    if args.dump_config {
        print!("{}", config.to_toml().context("serializing config")?);
        return Ok(());
    }

    tinsh::logging::init(&config.logging, args.verbose);
    let (mut executor, mut state) = tinsh::session(&config);

    if let Some(line) = args.command {
        print_output(&executor.run(&mut state, &line));
        return Ok(());
    }

    repl(&config, &mut executor, &mut state)
}

fn repl(config: &Config, executor: &mut Executor, state: &mut ShellState) -> Result<()> {
    let mut editor = DefaultEditor::new().context("creating line editor")?;
    info!("session started in {}", state.current_dir().display());

    loop {
        let prompt = config
            .settings
            .prompt
            .replace("{cwd}", &state.current_dir().display().to_string());
        match editor.readline(&prompt) {
            Ok(line) => {
                let trimmed = line.trim();
                if state.mode == ShellMode::Normal && matches!(trimmed, "exit" | "quit") {
                    break;
                }
                if !trimmed.is_empty() {
                    let _ = editor.add_history_entry(trimmed);
                }
                print_output(&executor.run(state, &line));
            }
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e).context("reading input"),
        }
    }
    debug!("session ended after {} lines", state.history.len());
    Ok(())
}

fn print_output(output: &str) {
    if !output.is_empty() {
        println!("{output}");
    }
}
