use std::io::Write;
use std::process::{Command, Stdio};

use crate::core::error::DchatError;

/// Copies text by piping it to the platform clipboard command.
pub fn copy_to_clipboard(text: &str) -> Result<(), DchatError> {
    #[cfg(target_os = "macos")]
    {
        run_with_stdin("pbcopy", &[], text)
    }
    #[cfg(target_os = "windows")]
    {
        run_with_stdin("cmd", &["/C", "clip"], text)
    }
    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    {
        if run_with_stdin("wl-copy", &[], text).is_ok() {
            return Ok(());
        }
        if run_with_stdin("xclip", &["-selection", "clipboard"], text).is_ok() {
            return Ok(());
        }
        if run_with_stdin("xsel", &["--clipboard", "--input"], text).is_ok() {
            return Ok(());
        }
        Err(DchatError::Input(
            "No clipboard command found (install wl-copy, xclip, or xsel)".to_string(),
        ))
    }
}

fn run_with_stdin(cmd: &str, args: &[&str], input: &str) -> Result<(), DchatError> {
    let mut child = Command::new(cmd)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|_| DchatError::Input(format!("Clipboard command `{}` not available", cmd)))?;

    if let Some(mut stdin) = child.stdin.take() {
        let _ = stdin.write_all(input.as_bytes());
    }

    match child.wait() {
        Ok(status) if status.success() => Ok(()),
        _ => Err(DchatError::Input(format!(
            "Clipboard command `{}` failed",
            cmd
        ))),
    }
}
