//! Provider adapter that runs an external program
//!
//! The prompt is written to the program's stdin and the completion is read
//! from its stdout. Sampling parameters travel as `CHORUS_*` environment
//! variables. Exit codes follow `sysexits.h` so the program can signal the
//! failure class:
//!
//! | exit  | meaning           | mapped to            |
//! |-------|-------------------|----------------------|
//! | 64/65 | bad request       | invalid request      |
//! | 69    | unavailable       | status 503           |
//! | 75    | try again later   | status 429           |
//! | 77    | permission denied | status 401           |
//! | other | failure           | status 500           |

use crate::config::FileProviderConfig;
use async_trait::async_trait;
use chorus_application::{AdapterError, BackendAdapter, GenerateParams, Generation};
use chorus_domain::util::truncate_str;
use std::collections::BTreeMap;
use std::process::{ExitStatus, Stdio};
use std::time::{Duration, Instant};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

const EX_USAGE: i32 = 64;
const EX_DATAERR: i32 = 65;
const EX_UNAVAILABLE: i32 = 69;
const EX_TEMPFAIL: i32 = 75;
const EX_NOPERM: i32 = 77;

/// Max bytes of stderr carried into an error message
const STDERR_EXCERPT: usize = 200;

pub struct CommandAdapter {
    name: String,
    program: String,
    args: Vec<String>,
    api_key_env: Option<String>,
    cost_per_1k_tokens: f64,
    timeout: Duration,
}

impl CommandAdapter {
    pub fn new(name: impl Into<String>, program: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            program: program.into(),
            args: Vec::new(),
            api_key_env: None,
            cost_per_1k_tokens: 0.0,
            timeout: Duration::from_secs(60),
        }
    }

    /// Build from a `[providers.<name>]` section. `None` if no command is set.
    pub fn from_config(name: &str, config: &FileProviderConfig) -> Option<Self> {
        let program = config.command.as_deref()?.trim();
        if program.is_empty() {
            return None;
        }
        let mut adapter = Self::new(name, program)
            .with_args(config.args.clone())
            .with_cost_per_1k_tokens(config.cost_per_1k_tokens)
            .with_timeout(Duration::from_secs(config.timeout_seconds.max(1)));
        adapter.api_key_env = config.api_key_env.clone();
        Some(adapter)
    }

    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    pub fn with_api_key_env(mut self, var: impl Into<String>) -> Self {
        self.api_key_env = Some(var.into());
        self
    }

    pub fn with_cost_per_1k_tokens(mut self, cost: f64) -> Self {
        self.cost_per_1k_tokens = cost;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn run(
        &self,
        model: &str,
        prompt: &str,
        params: &GenerateParams,
    ) -> Result<String, AdapterError> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .env("CHORUS_MODEL", model)
            .env("CHORUS_TEMPERATURE", params.temperature.to_string())
            .env("CHORUS_TOP_P", params.top_p.to_string())
            .env("CHORUS_MAX_TOKENS", params.max_tokens.to_string())
            .env("CHORUS_N_SAMPLES", params.n_samples.to_string())
            .env("CHORUS_JSON_MODE", params.json_mode.to_string())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                AdapterError::NotConfigured(format!(
                    "{}: cannot run {}: {}",
                    self.name, self.program, e
                ))
            })?;

        // Feed stdin from its own task so a child that writes before it reads
        // cannot fill the stdout pipe and stall us.
        let writer = child.stdin.take().map(|mut stdin| {
            let prompt = prompt.to_string();
            tokio::spawn(async move {
                stdin.write_all(prompt.as_bytes()).await?;
                stdin.shutdown().await
            })
        });

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| AdapterError::Connection(e.to_string()))?;

        if let Some(writer) = writer
            && let Ok(Err(e)) = writer.await
        {
            debug!("{}: prompt not fully consumed: {}", self.name, e);
        }

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(map_exit(output.status, truncate_str(stderr.trim(), STDERR_EXCERPT)));
        }

        let text = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if text.is_empty() {
            return Err(AdapterError::Status {
                status: 502,
                message: "empty completion".to_string(),
            });
        }
        Ok(text)
    }
}

fn map_exit(status: ExitStatus, stderr: &str) -> AdapterError {
    let message = stderr.to_string();
    match status.code() {
        Some(EX_USAGE | EX_DATAERR) => AdapterError::InvalidRequest(message),
        Some(EX_UNAVAILABLE) => AdapterError::Status { status: 503, message },
        Some(EX_TEMPFAIL) => AdapterError::Status { status: 429, message },
        Some(EX_NOPERM) => AdapterError::Status { status: 401, message },
        Some(_) => AdapterError::Status { status: 500, message },
        None => AdapterError::Connection(format!("terminated by signal: {}", message)),
    }
}

#[async_trait]
impl BackendAdapter for CommandAdapter {
    fn provider(&self) -> &str {
        &self.name
    }

    fn is_available(&self) -> bool {
        if which::which(&self.program).is_err() {
            debug!("{}: {} not found on PATH", self.name, self.program);
            return false;
        }
        match &self.api_key_env {
            Some(var) => std::env::var_os(var).is_some_and(|v| !v.is_empty()),
            None => true,
        }
    }

    async fn generate(
        &self,
        model: &str,
        prompt: &str,
        params: &GenerateParams,
    ) -> Result<Generation, AdapterError> {
        let started = Instant::now();
        let text = tokio::time::timeout(self.timeout, self.run(model, prompt, params))
            .await
            .map_err(|_| AdapterError::Timeout)??;

        let tokens = (prompt.split_whitespace().count() + text.split_whitespace().count()) as u64;
        Ok(Generation {
            cost_usd: tokens as f64 / 1000.0 * self.cost_per_1k_tokens,
            text,
            tokens,
            latency_ms: started.elapsed().as_secs_f64() * 1000.0,
            backend_name: model.to_string(),
            metadata: BTreeMap::new(),
        })
    }
}
