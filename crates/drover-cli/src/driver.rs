//! Bridge to an external browser driver process.
//!
//! Generated actions are Playwright snippets, so the actual browser lives in
//! a separate driver process configured via `execution.driver_cmd`. The
//! bridge speaks a line-delimited JSON protocol over the driver's stdio: one
//! request object per line out, one response object per line back, strictly
//! in order. The runner only ever issues one request at a time, so the
//! protocol needs no correlation ids.

use async_trait::async_trait;
use drover_core::{DroverError, PageSurface};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::sync::Mutex;

/// One request to the driver process.
#[derive(Debug, Serialize)]
struct DriverRequest<'a> {
    /// Operation name: `open`, `location`, `content`, `act`, `wait` or `close`
    op: &'a str,

    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<&'a str>,

    #[serde(skip_serializing_if = "Option::is_none")]
    headless: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<&'a str>,
}

impl<'a> DriverRequest<'a> {
    fn op(op: &'a str) -> Self {
        Self {
            op,
            url: None,
            headless: None,
            code: None,
        }
    }
}

/// One response line from the driver process.
#[derive(Debug, Deserialize)]
struct DriverResponse {
    ok: bool,

    /// Payload for `location` and `content`
    #[serde(default)]
    value: Option<String>,

    /// Failure message when `ok` is false
    #[serde(default)]
    error: Option<String>,
}

/// [`PageSurface`] implementation backed by a driver subprocess.
pub struct DriverBridge {
    child: Mutex<Child>,
    stdin: Mutex<ChildStdin>,
    stdout: Mutex<BufReader<ChildStdout>>,
}

impl DriverBridge {
    /// Spawns the driver command and opens the entry page.
    ///
    /// The command string is split on whitespace; shell quoting is not
    /// interpreted. The child is killed when the bridge is dropped.
    pub async fn launch(cmd: &str, url: &str, headless: bool) -> drover_core::Result<Self> {
        let mut parts = cmd.split_whitespace();
        let program = parts.next().ok_or_else(|| {
            DroverError::configuration("execution.driver_cmd is empty")
        })?;

        let mut child = Command::new(program)
            .args(parts)
            .stdin(std::process::Stdio::piped())
            .stdout(std::process::Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|err| {
                DroverError::configuration(format!("Failed to spawn driver '{cmd}': {err}"))
            })?;

        let stdin = child.stdin.take().ok_or_else(|| {
            DroverError::configuration("Driver process exposes no stdin")
        })?;
        let stdout = child.stdout.take().ok_or_else(|| {
            DroverError::configuration("Driver process exposes no stdout")
        })?;

        let bridge = Self {
            child: Mutex::new(child),
            stdin: Mutex::new(stdin),
            stdout: Mutex::new(BufReader::new(stdout)),
        };

        bridge
            .exchange(DriverRequest {
                op: "open",
                url: Some(url),
                headless: Some(headless),
                code: None,
            })
            .await?;

        Ok(bridge)
    }

    /// Asks the driver to close the page and waits for it to exit.
    pub async fn shutdown(self) {
        if let Err(err) = self.exchange(DriverRequest::op("close")).await {
            warn!("driver close failed: {err}");
        }

        // Dropping stdin signals end of input to drivers that read a loop.
        let Self { child, stdin, stdout } = self;
        drop(stdin.into_inner());
        drop(stdout.into_inner());
        if let Err(err) = child.into_inner().wait().await {
            warn!("driver did not exit cleanly: {err}");
        }
    }

    /// Sends one request line and reads one response line.
    async fn exchange(&self, request: DriverRequest<'_>) -> drover_core::Result<DriverResponse> {
        let mut line = serde_json::to_string(&request)?;
        line.push('\n');
        debug!("driver <- {}", line.trim_end());

        {
            let mut stdin = self.stdin.lock().await;
            stdin
                .write_all(line.as_bytes())
                .await
                .map_err(|err| DroverError::execution(format!("Driver write failed: {err}")))?;
            stdin
                .flush()
                .await
                .map_err(|err| DroverError::execution(format!("Driver write failed: {err}")))?;
        }

        let mut reply = String::new();
        let read = self
            .stdout
            .lock()
            .await
            .read_line(&mut reply)
            .await
            .map_err(|err| DroverError::execution(format!("Driver read failed: {err}")))?;
        if read == 0 {
            return Err(DroverError::execution("Driver process closed its stdout"));
        }
        debug!("driver -> {}", reply.trim_end());

        let response: DriverResponse = serde_json::from_str(reply.trim())?;
        if response.ok {
            Ok(response)
        } else {
            Err(DroverError::execution(
                response
                    .error
                    .unwrap_or_else(|| "Driver reported an unspecified failure".to_string()),
            ))
        }
    }
}

#[async_trait]
impl PageSurface for DriverBridge {
    async fn current_location(&self) -> String {
        match self.exchange(DriverRequest::op("location")).await {
            Ok(response) => response.value.unwrap_or_default(),
            Err(err) => {
                warn!("driver location query failed: {err}");
                String::new()
            }
        }
    }

    async fn body_markup(&self) -> drover_core::Result<String> {
        let response = self.exchange(DriverRequest::op("content")).await?;
        response
            .value
            .ok_or_else(|| DroverError::execution("Driver returned no page content"))
    }

    async fn run_generated_action(&self, code: &str) -> drover_core::Result<()> {
        self.exchange(DriverRequest {
            op: "act",
            url: None,
            headless: None,
            code: Some(code),
        })
        .await
        .map(|_| ())
    }

    async fn wait_for_quiescence(&self) -> drover_core::Result<()> {
        self.exchange(DriverRequest::op("wait")).await.map(|_| ())
    }
}
