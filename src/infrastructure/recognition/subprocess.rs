//! Subprocess recognizer adapter

use std::process::Stdio;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::Mutex;

use crate::application::ports::{EngineError, EngineEventSink, SpeechRecognizer};
use crate::domain::transcript::Segment;

/// One recognition result line emitted by the recognizer command
#[derive(Debug, Deserialize)]
struct ResultLine {
    text: String,
    #[serde(rename = "final", default)]
    is_final: bool,
}

/// Drives an external streaming speech-to-text command.
///
/// The command line is split on whitespace and spawned once per listening
/// pass. It must write one JSON object per line to stdout:
/// `{"text": "...", "final": true|false}`. Lines that do not parse are
/// skipped. A clean exit is the engine's own termination (the silence
/// timeout case); a non-zero exit is a fault. Stop sends a termination
/// signal so the process can flush in-flight results before exiting.
///
/// Sequence numbers keep increasing across restarts, so results a command
/// redelivers after a restart are caught by the aggregator's guard.
pub struct CommandRecognizer {
    program: String,
    args: Vec<String>,
    process: Arc<Mutex<Option<Child>>>,
    next_sequence: Arc<AtomicU64>,
}

impl CommandRecognizer {
    /// Create a recognizer from a whitespace-separated command line
    pub fn new(command_line: &str) -> Self {
        let mut parts = command_line.split_whitespace().map(str::to_string);
        let program = parts.next().unwrap_or_default();
        Self {
            program,
            args: parts.collect(),
            process: Arc::new(Mutex::new(None)),
            next_sequence: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Spawn the recognizer process
    fn spawn_process(&self) -> Result<Child, EngineError> {
        Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    EngineError::CommandNotFound(self.program.clone())
                } else {
                    EngineError::StartFailed(e.to_string())
                }
            })
    }

    /// Ask the process to terminate, letting it flush its output
    #[cfg(unix)]
    fn terminate(child: &mut Child) -> Result<(), EngineError> {
        use nix::sys::signal::{self, Signal};
        use nix::unistd::Pid;

        if let Some(id) = child.id() {
            signal::kill(Pid::from_raw(id as i32), Signal::SIGTERM)
                .map_err(|e| EngineError::RecognitionFailed(format!("Signal failed: {}", e)))?;
        }
        Ok(())
    }

    #[cfg(not(unix))]
    fn terminate(child: &mut Child) -> Result<(), EngineError> {
        child
            .start_kill()
            .map_err(|e| EngineError::RecognitionFailed(e.to_string()))
    }
}

#[async_trait]
impl SpeechRecognizer for CommandRecognizer {
    async fn start(&self, sink: EngineEventSink) -> Result<(), EngineError> {
        let mut process_guard = self.process.lock().await;
        if process_guard.is_some() {
            return Err(EngineError::StartFailed(
                "Recognition already in progress".to_string(),
            ));
        }

        let mut child = self.spawn_process()?;
        let stdout = child.stdout.take().ok_or_else(|| {
            EngineError::StartFailed("Failed to capture recognizer output".to_string())
        })?;

        *process_guard = Some(child);
        drop(process_guard);

        // Forward result lines until the process goes quiet, then classify
        // the exit.
        let process = Arc::clone(&self.process);
        let next_sequence = Arc::clone(&self.next_sequence);
        tokio::spawn(async move {
            let mut lines = BufReader::new(stdout).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                let Ok(result) = serde_json::from_str::<ResultLine>(line) else {
                    continue;
                };
                let sequence = next_sequence.fetch_add(1, Ordering::SeqCst);
                sink.results(vec![Segment::new(sequence, result.text, result.is_final)]);
            }

            let child = process.lock().await.take();
            match child {
                Some(child) => match child.wait_with_output().await {
                    // A signal exit means our own stop terminated it.
                    Ok(output) if output.status.success() || output.status.code().is_none() => {
                        sink.ended();
                    }
                    Ok(output) => {
                        let stderr = String::from_utf8_lossy(&output.stderr);
                        sink.faulted(EngineError::RecognitionFailed(format!(
                            "recognizer exited with {}: {}",
                            output.status,
                            stderr.lines().last().unwrap_or("unknown error")
                        )));
                    }
                    Err(e) => {
                        sink.faulted(EngineError::RecognitionFailed(e.to_string()));
                    }
                },
                None => sink.ended(),
            }
        });

        Ok(())
    }

    async fn stop(&self) -> Result<(), EngineError> {
        let mut process_guard = self.process.lock().await;
        if let Some(child) = process_guard.as_mut() {
            Self::terminate(child)?;
        }
        Ok(())
    }
}
