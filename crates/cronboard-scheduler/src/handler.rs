use std::collections::HashMap;
use std::io::{self, Read};
use std::process::{Command, Stdio};
use std::sync::Arc;

use cronboard_core::JobDescriptor;
use tracing::debug;

use crate::{error::JobError, types::ScheduleRecord};

/// Longest `messages` text a command handler will store.
pub const MAX_MESSAGE_CHARS: usize = 4_000;

/// Bytes kept from each of a command's stdout and stderr; the rest is drained
/// and discarded so the child never blocks on a full pipe.
pub const MAX_CAPTURE_BYTES: u64 = 64 * 1024;

/// Job logic, keyed by a descriptor's `instance`.
///
/// Runs synchronously on the caller's thread. The record is the one that will
/// be persisted; handlers may write `messages` on success.
pub trait JobHandler: Send + Sync {
    fn execute(&self, job: &JobDescriptor, record: &mut ScheduleRecord) -> Result<(), JobError>;
}

/// Maps `instance` names to handlers.
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    handlers: HashMap<String, Arc<dyn JobHandler>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with `noop` and `command` already registered.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register("noop", Arc::new(NoopHandler));
        registry.register("command", Arc::new(CommandHandler));
        registry
    }

    /// Register `handler` under `instance`, replacing any previous one.
    pub fn register(&mut self, instance: impl Into<String>, handler: Arc<dyn JobHandler>) {
        let instance = instance.into();
        debug!(%instance, "job handler registered");
        self.handlers.insert(instance, handler);
    }

    pub fn get(&self, instance: &str) -> Option<Arc<dyn JobHandler>> {
        self.handlers.get(instance).cloned()
    }

    pub fn contains(&self, instance: &str) -> bool {
        self.handlers.contains_key(instance)
    }

    /// Look up the handler for `job.instance` and run it.
    pub fn invoke(&self, job: &JobDescriptor, record: &mut ScheduleRecord) -> Result<(), JobError> {
        let handler = self
            .get(&job.instance)
            .ok_or_else(|| JobError::HandlerNotFound {
                instance: job.instance.clone(),
            })?;
        handler.execute(job, record)
    }
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<_> = self.handlers.keys().collect();
        names.sort();
        f.debug_struct("HandlerRegistry").field("handlers", &names).finish()
    }
}

/// Always succeeds.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHandler;

impl JobHandler for NoopHandler {
    fn execute(&self, _job: &JobDescriptor, _record: &mut ScheduleRecord) -> Result<(), JobError> {
        Ok(())
    }
}

/// Runs `job.method` through `sh -c` and waits for it.
///
/// Non-zero exit fails the job with stderr (or the exit status when stderr is
/// empty). Non-empty stdout lands in `messages` on success.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommandHandler;

impl JobHandler for CommandHandler {
    fn execute(&self, job: &JobDescriptor, record: &mut ScheduleRecord) -> Result<(), JobError> {
        let command = job.method.trim();
        if command.is_empty() {
            return Err(JobError::ExecutionFailed(format!(
                "job '{}' has no command configured",
                job.name
            )));
        }

        debug!(job = %job.name, %command, "running command");
        let mut child = Command::new("sh")
            .arg("-c")
            .arg(command)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| JobError::ExecutionFailed(format!("spawn failed: {e}")))?;

        // stderr on its own thread so neither pipe can fill up while the
        // other is being read.
        let stderr_reader = child.stderr.take().map(|pipe| {
            std::thread::spawn(move || read_capped(pipe, MAX_CAPTURE_BYTES))
        });
        let stdout = match child.stdout.take() {
            Some(pipe) => read_capped(pipe, MAX_CAPTURE_BYTES),
            None => Ok(Vec::new()),
        };
        let stderr = match stderr_reader {
            Some(handle) => handle.join().unwrap_or_else(|_| Ok(Vec::new())),
            None => Ok(Vec::new()),
        };
        let status = child
            .wait()
            .map_err(|e| JobError::ExecutionFailed(format!("wait failed: {e}")))?;

        let read_err =
            |e: io::Error| JobError::ExecutionFailed(format!("reading output failed: {e}"));
        let stdout = stdout.map_err(read_err)?;
        let stderr = stderr.map_err(read_err)?;
        let stdout = String::from_utf8_lossy(&stdout);
        let stderr = String::from_utf8_lossy(&stderr);

        if !status.success() {
            let stderr = stderr.trim();
            let message = if stderr.is_empty() {
                format!("command exited with {status}")
            } else {
                clamp_message(stderr, MAX_MESSAGE_CHARS)
            };
            return Err(JobError::ExecutionFailed(message));
        }

        let stdout = stdout.trim();
        if !stdout.is_empty() {
            record.messages = Some(clamp_message(stdout, MAX_MESSAGE_CHARS));
        }
        Ok(())
    }
}

/// Read at most `cap` bytes from `reader`, then drain and drop the remainder.
fn read_capped<R: Read>(mut reader: R, cap: u64) -> io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    (&mut reader).take(cap).read_to_end(&mut buf)?;
    io::copy(&mut reader, &mut io::sink())?;
    Ok(buf)
}

/// Keep the head and tail of `text` when it exceeds `max_chars` characters.
fn clamp_message(text: &str, max_chars: usize) -> String {
    let total = text.chars().count();
    if total <= max_chars {
        return text.to_owned();
    }
    let half = max_chars / 2;
    let head: String = text.chars().take(half).collect();
    let tail: String = text.chars().skip(total - half).collect();
    let omitted = total - 2 * half;
    format!("{head}\n... [{omitted} chars omitted] ...\n{tail}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ScheduleStatus;
    use chrono::Utc;

    fn record() -> ScheduleRecord {
        ScheduleRecord::new("job", ScheduleStatus::Success, Utc::now())
    }

    #[test]
    fn unknown_instance_is_handler_not_found() {
        let registry = HandlerRegistry::with_builtins();
        let job = JobDescriptor::new("orphan", "magento_indexer");
        let err = registry.invoke(&job, &mut record()).unwrap_err();
        assert!(matches!(err, JobError::HandlerNotFound { ref instance } if instance == "magento_indexer"));
    }

    #[test]
    fn builtins_are_registered() {
        let registry = HandlerRegistry::with_builtins();
        assert!(registry.contains("noop"));
        assert!(registry.contains("command"));
        assert!(!registry.contains("shell"));
    }

    #[test]
    fn noop_succeeds() {
        let registry = HandlerRegistry::with_builtins();
        let job = JobDescriptor::new("a", "noop");
        let mut rec = record();
        registry.invoke(&job, &mut rec).unwrap();
        assert!(rec.messages.is_none());
    }

    #[test]
    fn command_success_captures_stdout() {
        let job = JobDescriptor::new("echo", "command").with_method("echo hello");
        let mut rec = record();
        CommandHandler.execute(&job, &mut rec).unwrap();
        assert_eq!(rec.messages.as_deref(), Some("hello"));
    }

    #[test]
    fn command_failure_uses_stderr() {
        let job = JobDescriptor::new("fail", "command").with_method("echo broken >&2; exit 3");
        let err = CommandHandler.execute(&job, &mut record()).unwrap_err();
        assert_eq!(err.to_string(), "broken");
    }

    #[test]
    fn command_failure_without_stderr_reports_status() {
        let job = JobDescriptor::new("fail", "command").with_method("exit 7");
        let err = CommandHandler.execute(&job, &mut record()).unwrap_err();
        assert!(err.to_string().contains('7'));
    }

    #[test]
    fn empty_command_fails() {
        let job = JobDescriptor::new("blank", "command");
        let err = CommandHandler.execute(&job, &mut record()).unwrap_err();
        assert!(err.to_string().contains("no command"));
    }

    #[test]
    fn capped_read_keeps_head_and_consumes_rest() {
        let mut source = io::Cursor::new(vec![b'x'; 10_000]);
        let buf = read_capped(&mut source, 16).unwrap();
        assert_eq!(buf.len(), 16);
        assert_eq!(source.position(), 10_000);
    }

    #[test]
    fn chatty_command_output_is_bounded() {
        // ~1 MB on stdout; only the captured head can reach the record.
        let job = JobDescriptor::new("chatty", "command")
            .with_method("head -c 1048576 /dev/zero | tr '\\0' 'y'");
        let mut rec = record();
        CommandHandler.execute(&job, &mut rec).unwrap();
        let msg = rec.messages.unwrap();
        assert!(msg.chars().count() < MAX_MESSAGE_CHARS + 100);
        assert!(msg.contains("chars omitted"));
    }

    #[test]
    fn clamp_keeps_short_text() {
        assert_eq!(clamp_message("short", 10), "short");
    }

    #[test]
    fn clamp_keeps_head_and_tail() {
        let text = format!("{}{}{}", "A".repeat(10), "B".repeat(100), "C".repeat(10));
        let out = clamp_message(&text, 20);
        assert!(out.starts_with(&"A".repeat(10)));
        assert!(out.ends_with(&"C".repeat(10)));
        assert!(out.contains("100 chars omitted"));
    }
}
