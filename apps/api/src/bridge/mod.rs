/// External process bridge.
///
/// Every Python helper (ATS scorer, OCR, MCQ generation) and the LaTeX
/// compiler is driven through here: spawn, capture stdout/stderr, kill on
/// timeout. Scripts print progress logs before their result, so the payload
/// is the last top-level JSON object on stdout.
use std::ffi::OsString;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use serde_json::Value;
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, warn};

pub const MCQ_TIMEOUT: Duration = Duration::from_secs(60);
pub const OCR_TIMEOUT: Duration = Duration::from_secs(600);
pub const ATS_TIMEOUT: Duration = Duration::from_secs(600);
pub const LATEX_TIMEOUT: Duration = Duration::from_secs(60);

const STDERR_LIMIT: usize = 500;

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("{label} timed out after {}s", .timeout.as_secs())]
    Timeout { label: String, timeout: Duration },

    #[error("{label} failed: {reason}")]
    Failed {
        label: String,
        reason: String,
        stderr: String,
    },

    #[error("{label} reported failure: {message}")]
    Reported {
        label: String,
        message: String,
        payload: Value,
    },
}

/// One invocation of an external program.
#[derive(Debug, Clone)]
pub struct ScriptCall {
    /// Human-readable name used in logs and error messages.
    pub label: String,
    pub program: String,
    pub args: Vec<OsString>,
    pub timeout: Duration,
    pub working_dir: Option<PathBuf>,
}

impl ScriptCall {
    pub fn new(label: impl Into<String>, program: impl Into<String>, timeout: Duration) -> Self {
        Self {
            label: label.into(),
            program: program.into(),
            args: Vec::new(),
            timeout,
            working_dir: None,
        }
    }

    /// A Python script run through the configured interpreter.
    pub fn python(
        label: impl Into<String>,
        interpreter: &str,
        script: PathBuf,
        timeout: Duration,
    ) -> Self {
        Self::new(label, interpreter, timeout).arg(script)
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn current_dir(mut self, dir: PathBuf) -> Self {
        self.working_dir = Some(dir);
        self
    }
}

#[derive(Debug)]
pub struct ProcessOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Runs the program to completion. Non-zero exit is a `Failed` error.
pub async fn run_process(call: &ScriptCall) -> Result<ProcessOutput, BridgeError> {
    let mut command = Command::new(&call.program);
    command
        .args(&call.args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    if let Some(dir) = &call.working_dir {
        command.current_dir(dir);
    }

    debug!("Spawning {} ({})", call.label, call.program);
    let child = command.spawn().map_err(|e| BridgeError::Failed {
        label: call.label.clone(),
        reason: format!("could not start '{}': {e}", call.program),
        stderr: String::new(),
    })?;

    // Dropping the wait future on timeout drops the child, which kills it.
    let output = tokio::time::timeout(call.timeout, child.wait_with_output())
        .await
        .map_err(|_| {
            warn!("{} exceeded {}s and was killed", call.label, call.timeout.as_secs());
            BridgeError::Timeout {
                label: call.label.clone(),
                timeout: call.timeout,
            }
        })?
        .map_err(|e| BridgeError::Failed {
            label: call.label.clone(),
            reason: format!("could not collect output: {e}"),
            stderr: String::new(),
        })?;

    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

    if !output.status.success() {
        return Err(BridgeError::Failed {
            label: call.label.clone(),
            reason: format!("exited with {}", output.status),
            stderr: truncate_chars(&stderr, STDERR_LIMIT),
        });
    }

    Ok(ProcessOutput { stdout, stderr })
}

/// Runs a script and returns the JSON object it printed last.
/// A payload carrying `"success": false` becomes `BridgeError::Reported`.
pub async fn run_json_script(call: &ScriptCall) -> Result<Value, BridgeError> {
    let output = run_process(call).await?;

    if output.stdout.trim().is_empty() {
        return Err(BridgeError::Failed {
            label: call.label.clone(),
            reason: "produced no output".to_string(),
            stderr: truncate_chars(&output.stderr, STDERR_LIMIT),
        });
    }

    let payload = extract_trailing_json(&output.stdout).ok_or_else(|| BridgeError::Failed {
        label: call.label.clone(),
        reason: "output did not end with a JSON object".to_string(),
        stderr: truncate_chars(&output.stderr, STDERR_LIMIT),
    })?;

    if payload.get("success").and_then(Value::as_bool) == Some(false) {
        let message = payload
            .get("error")
            .or_else(|| payload.get("message"))
            .and_then(Value::as_str)
            .unwrap_or("script reported failure")
            .to_string();
        return Err(BridgeError::Reported {
            label: call.label.clone(),
            message,
            payload,
        });
    }

    Ok(payload)
}

/// Finds the last top-level `{...}` object in `stdout`.
///
/// The object must end at the last `}`; among the `{` positions before it,
/// the leftmost one that yields a valid object is the outermost one.
pub fn extract_trailing_json(stdout: &str) -> Option<Value> {
    let end = stdout.rfind('}')?;
    let body = &stdout[..=end];

    body.match_indices('{')
        .map(|(start, _)| &body[start..])
        .find_map(|candidate| {
            serde_json::from_str::<Value>(candidate)
                .ok()
                .filter(Value::is_object)
        })
}

pub fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}

/// At most `max` bytes of `s`, cut back to the nearest char boundary.
pub fn truncate_bytes(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}
