//! Applying `>`, `>>` and `<` to files.

use std::fs::{self, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::Path;

use log::debug;

use crate::error::ShellError;
use crate::parse::RedirectKind;

/// Write a stage's output to `path` according to `kind`.
///
/// `>` replaces the file with exactly `output`. `>>` makes sure existing
/// content ends in a newline, then appends `output` plus one newline.
pub fn write_output(path: &Path, kind: RedirectKind, output: &str) -> Result<(), ShellError> {
    debug!("redirect {kind:?} -> {}", path.display());
    let result = match kind {
        RedirectKind::OutputTruncate => fs::write(path, output),
        RedirectKind::OutputAppend => append(path, output),
        RedirectKind::Input | RedirectKind::None => return Ok(()),
    };
    result.map_err(|e| ShellError::io(path.display().to_string(), e))
}

fn append(path: &Path, output: &str) -> io::Result<()> {
    let mut file = OpenOptions::new()
        .read(true)
        .append(true)
        .create(true)
        .open(path)?;

    let len = file.metadata()?.len();
    if len > 0 {
        let mut last = [0u8; 1];
        file.seek(SeekFrom::Start(len - 1))?;
        file.read_exact(&mut last)?;
        if last[0] != b'\n' {
            file.write_all(b"\n")?;
        }
    }
    file.write_all(output.as_bytes())?;
    file.write_all(b"\n")
}

/// Full text of an input-redirect file.
pub fn read_input(path: &Path) -> io::Result<String> {
    debug!("redirect < {}", path.display());
    fs::read_to_string(path)
}
