use std::io::Write;
use std::process::{Command, Stdio};

/// Write-only clipboard capability used by the copy controls.
pub trait Clipboard {
    fn write_text(&self, text: &str) -> Result<(), String>;
}

/// Clipboard backed by the platform's copy command.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClipboard;

impl Clipboard for SystemClipboard {
    fn write_text(&self, text: &str) -> Result<(), String> {
        copy_to_clipboard(text)
    }
}

pub fn copy_to_clipboard(text: &str) -> Result<(), String> {
    #[cfg(target_os = "macos")]
    {
        return pipe_into("pbcopy", &[], text);
    }
    #[cfg(target_os = "windows")]
    {
        return pipe_into("cmd", &["/C", "clip"], text);
    }
    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    {
        const CANDIDATES: [(&str, &[&str]); 3] = [
            ("wl-copy", &[]),
            ("xclip", &["-selection", "clipboard"]),
            ("xsel", &["--clipboard", "--input"]),
        ];
        let mut last_error = None;
        for (cmd, args) in CANDIDATES {
            match pipe_into(cmd, args, text) {
                Ok(()) => return Ok(()),
                Err(err) => last_error = Some(err),
            }
        }
        Err(last_error
            .map(|err| format!("{err}; install wl-copy, xclip, or xsel"))
            .unwrap_or_else(|| "No clipboard command found".to_string()))
    }
}

fn pipe_into(cmd: &str, args: &[&str], input: &str) -> Result<(), String> {
    let mut child = Command::new(cmd)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|_| format!("Clipboard command `{cmd}` not available"))?;
    // stdin is closed at the end of this block so the child sees EOF.
    let written = match child.stdin.take() {
        Some(mut stdin) => stdin.write_all(input.as_bytes()),
        None => Ok(()),
    };
    let status = child.wait();
    written.map_err(|err| format!("Clipboard command `{cmd}` rejected input: {err}"))?;
    match status {
        Ok(status) if status.success() => Ok(()),
        _ => Err(format!("Clipboard command `{cmd}` failed")),
    }
}
