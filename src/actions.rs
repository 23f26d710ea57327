//! Browser and clipboard integration. Fire-and-forget: failures are
//! reported by the caller but never end the session.

use anyhow::{Context, Result};
use std::io::Write;
use std::process::{Command, Stdio};

/// Platform command used to hand a URL to the default browser, unless
/// the config overrides it.
pub fn default_url_handler() -> &'static str {
    if cfg!(target_os = "macos") {
        "open"
    } else if cfg!(target_os = "windows") {
        "explorer"
    } else {
        "xdg-open"
    }
}

pub fn open_url(handler: &str, url: &str) -> Result<()> {
    Command::new(handler)
        .arg(url)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .with_context(|| format!("failed to run url handler '{handler}'"))?;
    Ok(())
}

/// Pipe text into the platform clipboard tool. On Linux both the X11
/// and Wayland tools are tried.
pub fn copy_to_clipboard(text: &str) -> Result<()> {
    let candidates: &[&[&str]] = if cfg!(target_os = "macos") {
        &[&["pbcopy"]]
    } else if cfg!(target_os = "windows") {
        &[&["clip"]]
    } else {
        &[&["xclip", "-selection", "clipboard"], &["wl-copy"]]
    };

    let mut last_err = None;
    for candidate in candidates {
        match pipe_into(candidate, text) {
            Ok(()) => return Ok(()),
            Err(e) => last_err = Some(e),
        }
    }
    Err(last_err.unwrap_or_else(|| anyhow::anyhow!("no clipboard tool available")))
}

fn pipe_into(command: &[&str], text: &str) -> Result<()> {
    let (program, args) = command
        .split_first()
        .context("empty clipboard command")?;
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .with_context(|| format!("failed to run '{program}'"))?;

    if let Some(stdin) = child.stdin.as_mut() {
        stdin
            .write_all(text.as_bytes())
            .with_context(|| format!("failed to write to '{program}'"))?;
    }
    let status = child.wait().with_context(|| format!("'{program}' did not exit"))?;
    if !status.success() {
        anyhow::bail!("'{program}' exited with {status}");
    }
    Ok(())
}
