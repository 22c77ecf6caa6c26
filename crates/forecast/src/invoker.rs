//! Runs the external forecasting process.
//!
//! One child process per call, with the symbol as its last argument. The
//! child is started in its own process group. The group is killed whenever
//! the call ends: on timeout before [`InvokeError::Timeout`] is returned, after
//! a normal exit to sweep up anything the script left behind, and when the
//! call's future is dropped mid-flight.

use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, warn};
use tokio::io::AsyncReadExt;
use tokio::process::{Child, Command};

use crate::errors::{truncate_diagnostic, InvokeError};
use crate::models::RawProcessOutput;
use crate::symbol::Symbol;

/// Default time budget for one forecast.
pub const DEFAULT_BUDGET: Duration = Duration::from_secs(30);

/// Text the forecasting process writes to stderr for unknown symbols.
pub const NO_DATA_MARKER: &str = "No data found";

/// Source of raw forecasts.
///
/// Implementations must run at most one forecast per call and must not leave
/// anything running once the call returns.
#[async_trait]
pub trait ForecastInvoker: Send + Sync {
    async fn invoke(
        &self,
        symbol: &Symbol,
        budget: Duration,
    ) -> Result<RawProcessOutput, InvokeError>;
}

/// [`ForecastInvoker`] backed by an external program.
#[derive(Debug, Clone)]
pub struct ProcessInvoker {
    program: String,
    args: Vec<String>,
}

impl ProcessInvoker {
    /// `args` are passed before the symbol, e.g. `python ml/predict.py <SYMBOL>`.
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    fn command(&self, symbol: &Symbol) -> Command {
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .arg(symbol.as_str())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        #[cfg(unix)]
        command.process_group(0);
        command
    }
}

#[async_trait]
impl ForecastInvoker for ProcessInvoker {
    async fn invoke(
        &self,
        symbol: &Symbol,
        budget: Duration,
    ) -> Result<RawProcessOutput, InvokeError> {
        debug!(
            "Spawning forecast process '{}' for {} (budget {:?})",
            self.program, symbol, budget
        );
        let mut child = self
            .command(symbol)
            .spawn()
            .map_err(|source| InvokeError::SpawnError {
                program: self.program.clone(),
                source,
            })?;

        // Taken now: once the leader is reaped `Child::id` returns None.
        let mut group = ProcessGroup::new(child.id());

        let (Some(mut stdout), Some(mut stderr)) = (child.stdout.take(), child.stderr.take())
        else {
            terminate(&mut child, &mut group).await;
            return Err(InvokeError::ProcessFailure {
                diagnostic: "forecast process output was not captured".to_string(),
            });
        };

        let collect = async {
            let mut out = Vec::new();
            let mut err = Vec::new();
            let (status, _, _) = tokio::try_join!(
                child.wait(),
                stdout.read_to_end(&mut out),
                stderr.read_to_end(&mut err)
            )?;
            Ok::<_, std::io::Error>((status, out, err))
        };
        let outcome = tokio::time::timeout(budget, collect).await;

        let (status, out, err) = match outcome {
            Ok(Ok(collected)) => collected,
            Ok(Err(e)) => {
                terminate(&mut child, &mut group).await;
                return Err(InvokeError::ProcessFailure {
                    diagnostic: truncate_diagnostic(&e.to_string()),
                });
            }
            Err(_) => {
                warn!(
                    "Forecast for {} exceeded {:?}, killing process group",
                    symbol, budget
                );
                terminate(&mut child, &mut group).await;
                return Err(InvokeError::Timeout(budget));
            }
        };
        group.kill();

        let stderr_text = String::from_utf8_lossy(&err);
        if !status.success() {
            return Err(classify_failure(symbol, status, &stderr_text));
        }
        if !stderr_text.trim().is_empty() {
            debug!(
                "Forecast stderr for {}: {}",
                symbol,
                truncate_diagnostic(stderr_text.trim())
            );
        }

        Ok(RawProcessOutput::from(
            String::from_utf8_lossy(&out).into_owned(),
        ))
    }
}

/// Maps an unsuccessful exit to [`InvokeError::SymbolNotFound`] or
/// [`InvokeError::ProcessFailure`].
pub(crate) fn classify_failure(symbol: &Symbol, status: ExitStatus, stderr: &str) -> InvokeError {
    if stderr.contains(NO_DATA_MARKER) {
        return InvokeError::SymbolNotFound(symbol.to_string());
    }
    let stderr = stderr.trim();
    let diagnostic = if stderr.is_empty() {
        format!("forecast process {}", status)
    } else {
        stderr.to_string()
    };
    InvokeError::ProcessFailure {
        diagnostic: truncate_diagnostic(&diagnostic),
    }
}

/// Process group of one forecast, killed at most once and at the latest on drop.
struct ProcessGroup {
    pgid: Option<u32>,
}

impl ProcessGroup {
    fn new(pgid: Option<u32>) -> Self {
        Self { pgid }
    }

    fn kill(&mut self) {
        if let Some(pgid) = self.pgid.take() {
            #[cfg(unix)]
            kill_process_group(pgid);
            #[cfg(not(unix))]
            let _ = pgid;
        }
    }
}

impl Drop for ProcessGroup {
    fn drop(&mut self) {
        self.kill();
    }
}

/// Kills the child's process group and reaps the child if it is still running.
async fn terminate(child: &mut Child, group: &mut ProcessGroup) {
    group.kill();
    if child.id().is_none() {
        return;
    }
    if let Err(e) = child.kill().await {
        warn!("Failed to reap forecast process: {}", e);
    }
}

#[cfg(unix)]
#[allow(unsafe_code)]
fn kill_process_group(pgid: u32) {
    let Ok(pgid) = libc::pid_t::try_from(pgid) else {
        return;
    };
    // SAFETY: killpg takes no pointers. The group id is the child's pid,
    // which `process_group(0)` made a fresh group leader.
    let rc = unsafe { libc::killpg(pgid, libc::SIGKILL) };
    if rc != 0 {
        let err = std::io::Error::last_os_error();
        if err.raw_os_error() != Some(libc::ESRCH) {
            warn!("Failed to kill forecast process group {}: {}", pgid, err);
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::symbol::validate;
    use std::os::unix::process::ExitStatusExt;
    use std::path::Path;
    use std::time::Instant;
    use tempfile::tempdir;

    /// Runs `script` under `sh -c`; the symbol arrives as `$1`.
    fn shell(script: &str) -> ProcessInvoker {
        ProcessInvoker::new(
            "sh",
            vec!["-c".to_string(), script.to_string(), "forecast".to_string()],
        )
    }

    fn symbol(code: &str) -> Symbol {
        validate(code).unwrap()
    }

    /// Zombies count as gone: once killed, reaping orphans is init's job.
    fn is_alive(pid: &str) -> bool {
        if Path::new("/proc/self").exists() {
            return match std::fs::read_to_string(Path::new("/proc").join(pid).join("stat")) {
                Ok(stat) => !stat
                    .rsplit_once(')')
                    .is_some_and(|(_, rest)| rest.trim_start().starts_with('Z')),
                Err(_) => false,
            };
        }
        std::process::Command::new("kill")
            .args(["-0", pid])
            .stderr(Stdio::null())
            .status()
            .map(|status| status.success())
            .unwrap_or(false)
    }

    async fn wait_until_gone(pid: &str) -> bool {
        for _ in 0..40 {
            if !is_alive(pid) {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        false
    }

    #[test]
    fn test_classify_failure() {
        let sym = symbol("ZZZZ");
        let status = ExitStatus::from_raw(1 << 8);

        match classify_failure(&sym, status, "{\"error\": \"No data found for ZZZZ.\"}") {
            InvokeError::SymbolNotFound(s) => assert_eq!(s, "ZZZZ"),
            other => panic!("unexpected error: {other:?}"),
        }

        match classify_failure(&sym, status, &"Traceback ".repeat(50)) {
            InvokeError::ProcessFailure { diagnostic } => {
                assert!(diagnostic.starts_with("Traceback"));
                assert_eq!(diagnostic.chars().count(), 100);
            }
            other => panic!("unexpected error: {other:?}"),
        }

        match classify_failure(&sym, status, "  ") {
            InvokeError::ProcessFailure { diagnostic } => {
                assert!(diagnostic.contains("exit status"), "{diagnostic}")
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_returns_stdout_untouched() {
        let invoker = shell("printf \"{'symbol': '%s'}\" \"$1\"; echo progress >&2");
        let output = invoker
            .invoke(&symbol("AAPL"), Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(output.as_str(), "{'symbol': 'AAPL'}");
    }

    #[tokio::test]
    async fn test_passes_symbol_as_single_argument() {
        let invoker = shell("echo \"$#:$1\"");
        let output = invoker
            .invoke(&symbol("RELIANCE.NS"), Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(output.as_str(), "1:RELIANCE.NS\n");
    }

    #[tokio::test]
    async fn test_no_data_marker_is_not_found() {
        let invoker = shell("echo \"No data found for $1\" >&2; exit 1");
        let err = invoker
            .invoke(&symbol("NOPE"), Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(matches!(err, InvokeError::SymbolNotFound(ref s) if s == "NOPE"));
    }

    #[tokio::test]
    async fn test_non_zero_exit_is_process_failure() {
        let invoker = shell("echo 'module not found' >&2; exit 2");
        let err = invoker
            .invoke(&symbol("AAPL"), Duration::from_secs(5))
            .await
            .unwrap_err();
        match err {
            InvokeError::ProcessFailure { diagnostic } => assert_eq!(diagnostic, "module not found"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_missing_binary_is_spawn_error() {
        let invoker = ProcessInvoker::new("/nonexistent/forecast-binary", Vec::new());
        let err = invoker
            .invoke(&symbol("AAPL"), Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(matches!(err, InvokeError::SpawnError { .. }));
    }

    #[tokio::test]
    async fn test_timeout_kills_whole_process_group() {
        let dir = tempdir().unwrap();
        let pid_file = dir.path().join("pids");
        let script = format!(
            "sleep 30 & echo $! > '{}'; echo $$ >> '{}'; wait",
            pid_file.display(),
            pid_file.display()
        );
        let invoker = shell(&script);

        let started = Instant::now();
        let err = invoker
            .invoke(&symbol("SLOW"), Duration::from_millis(500))
            .await
            .unwrap_err();
        assert!(matches!(err, InvokeError::Timeout(_)));
        assert!(started.elapsed() < Duration::from_secs(10));

        let pids = read_pids(&pid_file);
        assert_eq!(pids.len(), 2, "expected grandchild and shell pids");
        for pid in &pids {
            assert!(wait_until_gone(pid).await, "process {pid} outlived the request");
        }
    }

    #[tokio::test]
    async fn test_timeout_kills_background_job_after_leader_exits() {
        let dir = tempdir().unwrap();
        let pid_file = dir.path().join("pids");
        // The leader exits at once; the background job keeps stdout open.
        let script = format!("sleep 20 & echo $! > '{}'; exit 0", pid_file.display());
        let invoker = shell(&script);

        let err = invoker
            .invoke(&symbol("SLOW"), Duration::from_millis(500))
            .await
            .unwrap_err();
        assert!(matches!(err, InvokeError::Timeout(_)));

        let pids = read_pids(&pid_file);
        assert_eq!(pids.len(), 1);
        assert!(
            wait_until_gone(&pids[0]).await,
            "background job {} outlived the request",
            pids[0]
        );
    }

    #[tokio::test]
    async fn test_dropped_call_kills_whole_process_group() {
        let dir = tempdir().unwrap();
        let pid_file = dir.path().join("pids");
        let script = format!(
            "sleep 20 & echo $! > '{}'; echo $$ >> '{}'; wait",
            pid_file.display(),
            pid_file.display()
        );
        let invoker = shell(&script);

        let outer = tokio::time::timeout(
            Duration::from_millis(300),
            invoker.invoke(&symbol("SLOW"), Duration::from_secs(30)),
        )
        .await;
        assert!(outer.is_err());

        let pids = read_pids(&pid_file);
        assert_eq!(pids.len(), 2, "expected background job and shell pids");
        for pid in &pids {
            assert!(wait_until_gone(pid).await, "process {pid} outlived the request");
        }
    }

    #[tokio::test]
    async fn test_detached_leftovers_are_swept_after_success() {
        let dir = tempdir().unwrap();
        let pid_file = dir.path().join("pids");
        let script = format!(
            "sleep 20 >/dev/null 2>&1 & echo $! > '{}'; echo done",
            pid_file.display()
        );
        let invoker = shell(&script);

        let output = invoker
            .invoke(&symbol("AAPL"), Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(output.as_str(), "done\n");

        let pids = read_pids(&pid_file);
        assert_eq!(pids.len(), 1);
        assert!(wait_until_gone(&pids[0]).await, "leftover {} still running", pids[0]);
    }

    fn read_pids(path: &Path) -> Vec<String> {
        std::fs::read_to_string(path)
            .unwrap_or_default()
            .lines()
            .map(|line| line.trim().to_string())
            .filter(|line| !line.is_empty())
            .collect()
    }
}
