//! Non-mutating content scans and the append-only audit trail.

use crate::config::SanitizerConfig;
use crate::sanitizer::patterns::{CSS_DOM, EVENT_HANDLER_NAME, MARKUP_TAG, PROTOCOL, SCRIPT_TAG};
use crate::sanitizer::unicode::{is_invisible, is_stripped_control};
use cadence_core::{CadenceError, CadenceResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use uuid::Uuid;

/// A category of suspicious content found by [`check_dangerous_content`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentWarning {
    /// Something shaped like an HTML/XML tag.
    HtmlTag,
    /// An opening or closing script tag.
    ScriptTag,
    /// A `javascript:`, `vbscript:`, `data:` or `file:` token.
    DangerousProtocol,
    /// An inline event-handler attribute (`onclick=` and friends).
    EventHandler,
    /// CSS expressions, imports or DOM sinks such as `document.cookie`.
    CssInjection,
    /// Zero-width, bidi-control or control characters.
    InvisibleUnicode,
    /// Input longer than the scan limit; only the prefix was inspected.
    Oversized,
}

impl fmt::Display for ContentWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            ContentWarning::HtmlTag => "HTML tags detected",
            ContentWarning::ScriptTag => "Script tags detected",
            ContentWarning::DangerousProtocol => "Dangerous protocol detected",
            ContentWarning::EventHandler => "Event handler attribute detected",
            ContentWarning::CssInjection => "CSS or DOM injection pattern detected",
            ContentWarning::InvisibleUnicode => "Suspicious invisible unicode characters detected",
            ContentWarning::Oversized => "Input exceeds maximum scanned length",
        };
        f.write_str(msg)
    }
}

/// Result of scanning a piece of text. Scanning never alters the text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentReport {
    /// `true` when no warning was raised.
    pub is_safe: bool,
    /// Every category that matched, in a fixed order.
    pub warnings: Vec<ContentWarning>,
}

impl ContentReport {
    /// Human-readable messages for each warning.
    pub fn messages(&self) -> Vec<String> {
        self.warnings.iter().map(ToString::to_string).collect()
    }
}

/// Scan `input` for suspicious content using the default scan limit.
pub fn check_dangerous_content(input: &str) -> ContentReport {
    check_dangerous_content_with(input, &SanitizerConfig::default())
}

/// Scan at most `max_input_length` characters of `input` and report every
/// category that matches.
pub fn check_dangerous_content_with(input: &str, config: &SanitizerConfig) -> ContentReport {
    let (scanned, oversized) = match input.char_indices().nth(config.max_input_length) {
        Some((idx, _)) => (&input[..idx], true),
        None => (input, false),
    };

    let mut warnings = Vec::new();
    if MARKUP_TAG.is_match(scanned) {
        warnings.push(ContentWarning::HtmlTag);
    }
    if SCRIPT_TAG.is_match(scanned) {
        warnings.push(ContentWarning::ScriptTag);
    }
    if PROTOCOL.is_match(scanned) {
        warnings.push(ContentWarning::DangerousProtocol);
    }
    if EVENT_HANDLER_NAME.is_match(scanned) {
        warnings.push(ContentWarning::EventHandler);
    }
    if CSS_DOM.is_match(scanned) {
        warnings.push(ContentWarning::CssInjection);
    }
    if scanned
        .chars()
        .any(|c| is_invisible(c) || is_stripped_control(c))
    {
        warnings.push(ContentWarning::InvisibleUnicode);
    }
    if oversized {
        warnings.push(ContentWarning::Oversized);
    }

    ContentReport {
        is_safe: warnings.is_empty(),
        warnings,
    }
}

/// One scanned submission as written to the audit trail.
#[derive(Debug, Clone, Serialize)]
pub struct AuditEntry {
    /// When the scan was recorded.
    pub timestamp: DateTime<Utc>,
    /// Groups the entries of one submitted form.
    pub submission_id: Uuid,
    /// Name of the scanned field.
    pub field: String,
    /// Categories raised by the scan.
    pub warnings: Vec<ContentWarning>,
    /// Clean or flagged.
    pub outcome: AuditOutcome,
}

/// Whether a scanned field raised any warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditOutcome {
    /// No warnings.
    Clean,
    /// At least one warning.
    Flagged,
}

/// Append-only audit log of content scans.
pub struct AuditLog {
    tx: mpsc::UnboundedSender<AuditEntry>,
    writer: JoinHandle<()>,
}

impl AuditLog {
    /// Create a new AuditLog. Spawns a background task that appends entries
    /// to `<log_dir>/audit.jsonl`, so it must be called inside a tokio runtime.
    pub fn new(log_dir: PathBuf) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<AuditEntry>();

        let writer = tokio::spawn(async move {
            if let Err(e) = tokio::fs::create_dir_all(&log_dir).await {
                warn!(dir = %log_dir.display(), error = %e, "Cannot create audit log directory");
            }
            let log_file = log_dir.join("audit.jsonl");

            while let Some(entry) = rx.recv().await {
                if let Err(e) = append_entry(&log_file, &entry).await {
                    warn!(error = %e, "Failed to write audit entry");
                }
            }
        });

        Self { tx, writer }
    }

    /// Emit `entry` as a tracing event and queue it for the log file.
    pub fn log(&self, entry: AuditEntry) {
        match entry.outcome {
            AuditOutcome::Clean => info!(
                submission_id = %entry.submission_id,
                field = %entry.field,
                "content audit"
            ),
            AuditOutcome::Flagged => warn!(
                submission_id = %entry.submission_id,
                field = %entry.field,
                warnings = ?entry.warnings,
                "content audit flagged submission"
            ),
        }
        let _ = self.tx.send(entry);
    }

    /// Record the outcome of [`check_dangerous_content`] for one field.
    pub fn log_report(
        &self,
        submission_id: Uuid,
        field: impl Into<String>,
        report: &ContentReport,
    ) {
        let outcome = if report.is_safe {
            AuditOutcome::Clean
        } else {
            AuditOutcome::Flagged
        };
        self.log(AuditEntry {
            timestamp: Utc::now(),
            submission_id,
            field: field.into(),
            warnings: report.warnings.clone(),
            outcome,
        });
    }

    /// Stop accepting entries and wait until everything queued is written.
    pub async fn close(self) -> CadenceResult<()> {
        drop(self.tx);
        self.writer
            .await
            .map_err(|e| CadenceError::Audit(format!("audit writer failed: {e}")))
    }
}

async fn append_entry(path: &Path, entry: &AuditEntry) -> CadenceResult<()> {
    let line = serde_json::to_string(entry)?;
    let mut file = tokio::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await?;
    file.write_all(format!("{line}\n").as_bytes()).await?;
    Ok(())
}
