//! Output formatting for CLI commands.
//!
//! Supports table (human-readable) and JSON output formats.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;
use zabbix_bulk::RunSummary;

use crate::cli::Format;
use crate::config::Config;
use crate::error::CliError;

/// Output formatter that handles both table and JSON output.
#[derive(Debug, Clone, Copy)]
pub struct OutputFormat {
    format: Format,
}

impl OutputFormat {
    /// Create a new output formatter.
    #[must_use]
    pub const fn new(format: Format) -> Self {
        Self { format }
    }

    /// Get the current format.
    #[must_use]
    pub const fn format(&self) -> Format {
        self.format
    }

    /// Check if JSON format is selected.
    #[must_use]
    pub const fn is_json(&self) -> bool {
        matches!(self.format, Format::Json)
    }

    /// Write a serializable value to the output.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write<W, T>(&self, writer: &mut W, value: &T) -> Result<(), CliError>
    where
        W: Write + ?Sized,
        T: Serialize + TableDisplay,
    {
        match self.format {
            Format::Json => {
                serde_json::to_writer_pretty(&mut *writer, value)
                    .map_err(|e| CliError::Format(format!("JSON serialization failed: {e}")))?;
                writeln!(writer)?;
            }
            Format::Table => {
                value.write_table(writer)?;
            }
        }
        Ok(())
    }

    /// Write a serializable value to a string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_string<T>(&self, value: &T) -> Result<String, CliError>
    where
        T: Serialize + TableDisplay,
    {
        let mut buf = Vec::new();
        self.write(&mut buf, value)?;
        String::from_utf8(buf).map_err(|e| CliError::Format(format!("UTF-8 error: {e}")))
    }
}

impl Default for OutputFormat {
    fn default() -> Self {
        Self::new(Format::Table)
    }
}

/// Trait for types that can be displayed as a table.
pub trait TableDisplay {
    /// Write the value as a human-readable table.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    fn write_table<W: Write + ?Sized>(&self, writer: &mut W) -> Result<(), CliError>;
}

/// In-memory writer whose contents can be read back.
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    /// Everything written so far, decoded lossily.
    #[must_use]
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock()).into_owned()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Output sink shared by all commands of one process.
#[derive(Clone)]
pub struct Console {
    format: OutputFormat,
    writer: Arc<Mutex<Box<dyn Write + Send>>>,
}

impl std::fmt::Debug for Console {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Console")
            .field("format", &self.format)
            .finish_non_exhaustive()
    }
}

impl Console {
    /// Console writing to an arbitrary writer.
    pub fn new(format: OutputFormat, writer: impl Write + Send + 'static) -> Self {
        Self {
            format,
            writer: Arc::new(Mutex::new(Box::new(writer))),
        }
    }

    /// Console writing to standard output.
    #[must_use]
    pub fn stdout(format: OutputFormat) -> Self {
        Self::new(format, std::io::stdout())
    }

    /// Console writing to a buffer, for inspecting output.
    #[must_use]
    pub fn buffer(format: OutputFormat) -> (Self, SharedBuffer) {
        let buffer = SharedBuffer::default();
        (Self::new(format, buffer.clone()), buffer)
    }

    /// The output format.
    #[must_use]
    pub const fn format(&self) -> OutputFormat {
        self.format
    }

    /// Render a value in the configured format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn render<T>(&self, value: &T) -> Result<(), CliError>
    where
        T: Serialize + TableDisplay,
    {
        let mut writer = self.writer.lock();
        self.format.write(&mut **writer, value)?;
        writer.flush()?;
        Ok(())
    }

    /// Print an informational message.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn message(&self, text: impl Into<String>) -> Result<(), CliError> {
        self.render(&Message {
            message: text.into(),
        })
    }
}

/// Plain informational message.
#[derive(Debug, Clone, Serialize)]
pub struct Message {
    /// Message text.
    pub message: String,
}

impl TableDisplay for Message {
    fn write_table<W: Write + ?Sized>(&self, writer: &mut W) -> Result<(), CliError> {
        writeln!(writer, "{}", self.message)?;
        Ok(())
    }
}

/// Host information for listing.
#[derive(Debug, Clone, Serialize)]
pub struct HostInfo {
    /// Host ID.
    pub hostid: String,
    /// Technical host name.
    pub host: String,
    /// Monitoring status.
    pub status: String,
    /// Names of the host groups the host belongs to.
    pub hostgroups: Vec<String>,
}

/// List of hosts for display.
#[derive(Debug, Clone, Serialize)]
pub struct HostList {
    /// Matching hosts.
    pub hosts: Vec<HostInfo>,
}

impl TableDisplay for HostList {
    fn write_table<W: Write + ?Sized>(&self, writer: &mut W) -> Result<(), CliError> {
        if self.hosts.is_empty() {
            writeln!(writer, "No hosts found")?;
            return Ok(());
        }

        writeln!(writer, "{:<10}  {:<32}  {:<10}  HOST GROUPS", "HOSTID", "NAME", "STATUS")?;
        writeln!(writer, "{}", "─".repeat(80))?;
        for host in &self.hosts {
            writeln!(
                writer,
                "{:<10}  {:<32}  {:<10}  {}",
                host.hostid,
                truncate(&host.host, 32),
                host.status,
                host.hostgroups.join(", ")
            )?;
        }

        writeln!(writer)?;
        writeln!(writer, "Total: {} host(s)", self.hosts.len())?;
        Ok(())
    }
}

/// Host group information for listing.
#[derive(Debug, Clone, Serialize)]
pub struct HostGroupInfo {
    /// Group ID.
    pub groupid: String,
    /// Group name.
    pub name: String,
    /// Number of hosts in the group.
    pub host_count: usize,
}

/// List of host groups for display.
#[derive(Debug, Clone, Serialize)]
pub struct HostGroupList {
    /// Matching host groups.
    pub hostgroups: Vec<HostGroupInfo>,
}

impl TableDisplay for HostGroupList {
    fn write_table<W: Write + ?Sized>(&self, writer: &mut W) -> Result<(), CliError> {
        if self.hostgroups.is_empty() {
            writeln!(writer, "No host groups found")?;
            return Ok(());
        }

        writeln!(writer, "{:<10}  {:<40}  {:>6}", "GROUPID", "NAME", "HOSTS")?;
        writeln!(writer, "{}", "─".repeat(60))?;
        for group in &self.hostgroups {
            writeln!(
                writer,
                "{:<10}  {:<40}  {:>6}",
                group.groupid,
                truncate(&group.name, 40),
                group.host_count
            )?;
        }
        Ok(())
    }
}

/// Result of a create operation.
#[derive(Debug, Clone, Serialize)]
pub struct Created {
    /// Kind of object created.
    pub object: String,
    /// Name of the created object.
    pub name: String,
    /// IDs returned by the API.
    pub ids: Vec<String>,
}

impl TableDisplay for Created {
    fn write_table<W: Write + ?Sized>(&self, writer: &mut W) -> Result<(), CliError> {
        writeln!(
            writer,
            "Created {} '{}' ({})",
            self.object,
            self.name,
            self.ids.join(", ")
        )?;
        Ok(())
    }
}

/// Result of acknowledging events.
#[derive(Debug, Clone, Serialize)]
pub struct Acknowledged {
    /// Acknowledged event IDs.
    pub eventids: Vec<String>,
    /// Whether the problems were closed.
    pub closed: bool,
    /// Acknowledgement message, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl TableDisplay for Acknowledged {
    fn write_table<W: Write + ?Sized>(&self, writer: &mut W) -> Result<(), CliError> {
        let verb = if self.closed { "Acknowledged and closed" } else { "Acknowledged" };
        writeln!(writer, "{verb} event(s): {}", self.eventids.join(", "))?;
        Ok(())
    }
}

/// Configuration for display, secrets redacted.
#[derive(Debug, Clone, Serialize)]
pub struct ConfigView {
    /// Path the configuration was loaded from, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    /// Redacted configuration.
    pub config: Config,
}

impl TableDisplay for ConfigView {
    fn write_table<W: Write + ?Sized>(&self, writer: &mut W) -> Result<(), CliError> {
        if let Some(path) = &self.path {
            writeln!(writer, "# {}", path.display())?;
        }
        write!(writer, "{}", self.config.to_toml()?)?;
        Ok(())
    }
}

/// Summary of a bulk run.
#[derive(Debug, Clone, Serialize)]
pub struct BulkReport {
    /// Command file that was run.
    pub file: PathBuf,
    /// Execution counts.
    #[serde(flatten)]
    pub summary: RunSummary,
}

impl TableDisplay for BulkReport {
    fn write_table<W: Write + ?Sized>(&self, writer: &mut W) -> Result<(), CliError> {
        writeln!(writer, "Bulk execution of {}", self.file.display())?;
        writeln!(writer, "══════════════════════════════════")?;
        writeln!(writer, "  Total:          {}", self.summary.total)?;
        writeln!(writer, "  Succeeded:      {}", self.summary.succeeded)?;
        writeln!(writer, "  Failed:         {}", self.summary.failed)?;
        writeln!(writer, "  Skipped lines:  {}", self.summary.skipped)?;
        Ok(())
    }
}

/// Truncate a string to max length, adding ellipsis if needed.
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(1)).collect();
        format!("{kept}…")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hosts() -> HostList {
        HostList {
            hosts: vec![HostInfo {
                hostid: "10084".into(),
                host: "web01.example.com".into(),
                status: "Enabled".into(),
                hostgroups: vec!["Linux servers".into(), "Web".into()],
            }],
        }
    }

    #[test]
    fn output_format_default_is_table() {
        let format = OutputFormat::default();
        assert_eq!(format.format(), Format::Table);
        assert!(!format.is_json());
    }

    #[test]
    fn host_list_table() {
        let output = OutputFormat::new(Format::Table)
            .to_string(&hosts())
            .expect("should format");
        assert!(output.contains("HOSTID"));
        assert!(output.contains("web01.example.com"));
        assert!(output.contains("Linux servers, Web"));
        assert!(output.contains("Total: 1 host(s)"));
    }

    #[test]
    fn host_list_json() {
        let output = OutputFormat::new(Format::Json)
            .to_string(&hosts())
            .expect("should format");
        let value: serde_json::Value = serde_json::from_str(&output).expect("valid JSON");
        assert_eq!(value["hosts"][0]["hostid"], "10084");
    }

    #[test]
    fn empty_host_list_table() {
        let output = OutputFormat::default()
            .to_string(&HostList { hosts: Vec::new() })
            .expect("should format");
        assert_eq!(output, "No hosts found\n");
    }

    #[test]
    fn bulk_report_json_is_flat() {
        let report = BulkReport {
            file: PathBuf::from("commands.txt"),
            summary: RunSummary {
                total: 3,
                succeeded: 3,
                failed: 0,
                skipped: 2,
            },
        };
        let output = OutputFormat::new(Format::Json)
            .to_string(&report)
            .expect("should format");
        let value: serde_json::Value = serde_json::from_str(&output).expect("valid JSON");
        assert_eq!(value["total"], 3);
        assert_eq!(value["skipped"], 2);
        assert_eq!(value["file"], "commands.txt");
    }

    #[test]
    fn console_buffer_captures_messages() {
        let (console, buffer) = Console::buffer(OutputFormat::default());
        console.message("hello").expect("should write");
        console
            .render(&Created {
                object: "host group".into(),
                name: "Linux".into(),
                ids: vec!["42".into()],
            })
            .expect("should write");
        assert_eq!(buffer.contents(), "hello\nCreated host group 'Linux' (42)\n");
    }

    #[test]
    fn truncate_long_names() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a-very-long-hostname", 8), "a-very-…");
    }
}
