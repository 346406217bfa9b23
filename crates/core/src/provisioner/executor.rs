//! Subprocess spawning and output streaming for provisioners.
//!
//! This module turns a provisioner's [`Command`] into a running child in its
//! own process group and exposes its stdout and stderr as one stream of
//! lines.

use crate::provisioner::base::SpawnError;
use std::io;
use std::pin::Pin;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, Command};
use tokio_stream::wrappers::LinesStream;
use tokio_stream::{Stream, StreamExt};

/// Lines read from a child's stdout and stderr, in arrival order.
pub type OutputLines = Pin<Box<dyn Stream<Item = io::Result<String>> + Send>>;

/// Spawn `cmd` as the leader of a new process group.
///
/// stdin is closed, stdout and stderr are piped. The child's pid doubles as
/// its process-group id.
pub fn spawn_in_group(mut cmd: Command) -> Result<Child, SpawnError> {
    cmd.stdin(Stdio::null());
    cmd.stdout(Stdio::piped());
    cmd.stderr(Stdio::piped());
    #[cfg(unix)]
    cmd.process_group(0);

    let program = cmd.as_std().get_program().to_string_lossy().into_owned();
    cmd.spawn().map_err(|source| SpawnError::Io { program, source })
}

/// Take the child's pipes and merge them into one line stream.
///
/// The stream ends once both pipes are closed.
///
/// # Errors
///
/// Returns `SpawnError::MissingPipe` if stdout was not piped.
pub fn output_lines(child: &mut Child) -> Result<OutputLines, SpawnError> {
    let stdout = child.stdout.take().ok_or(SpawnError::MissingPipe)?;
    let stdout = LinesStream::new(BufReader::new(stdout).lines());

    match child.stderr.take() {
        Some(stderr) => {
            let stderr = LinesStream::new(BufReader::new(stderr).lines());
            Ok(Box::pin(stdout.merge(stderr)))
        }
        None => Ok(Box::pin(stdout)),
    }
}
