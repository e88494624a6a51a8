//! Output formatters for ranking reports

use crate::config::OutputFormat;
use crate::error::{Result, ResumeRankerError};
use crate::output::report::RankingReport;
use colored::{Color, Colorize};
use std::path::Path;

/// Trait for formatting ranking reports
pub trait OutputFormatter {
    fn format_report(&self, report: &RankingReport) -> Result<String>;
    fn supports_format(&self) -> OutputFormat;
}

/// Aligned console table, optionally colored
pub struct ConsoleFormatter {
    use_colors: bool,
}

/// JSON formatter for scripting and integration
pub struct JsonFormatter {
    pretty: bool,
}

/// Markdown pipe table
pub struct MarkdownFormatter {
    include_metadata: bool,
}

/// Picks the formatter for a requested output format
pub struct ReportGenerator {
    console_formatter: ConsoleFormatter,
    json_formatter: JsonFormatter,
    markdown_formatter: MarkdownFormatter,
}

const JOB_PREVIEW_CHARS: usize = 80;

fn similarity_color(similarity: f32) -> Color {
    match similarity {
        s if s >= 0.75 => Color::Green,
        s if s >= 0.5 => Color::BrightGreen,
        s if s >= 0.25 => Color::Yellow,
        _ => Color::Red,
    }
}

impl ConsoleFormatter {
    pub fn new(use_colors: bool) -> Self {
        Self { use_colors }
    }

    fn colorize(&self, text: &str, color: Color) -> String {
        if self.use_colors {
            text.color(color).to_string()
        } else {
            text.to_string()
        }
    }

    fn format_header(&self, title: &str) -> String {
        if self.use_colors {
            format!("\n{} {}\n", "█".color(Color::Blue).bold(), title.color(Color::Blue).bold())
        } else {
            format!("\n# {}\n", title)
        }
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format_report(&self, report: &RankingReport) -> Result<String> {
        let mut output = String::new();

        output.push_str(&self.format_header("CANDIDATE RANKING"));
        output.push_str(&format!("Job: {}\n", report.job_preview(JOB_PREVIEW_CHARS)));
        output.push_str(&format!(
            "Model: {} | Candidates: {} | Processing time: {}ms\n\n",
            report.embedding_model, report.candidates_considered, report.processing_time_ms
        ));

        let name_width = report
            .entries
            .iter()
            .map(|e| e.name.chars().count())
            .max()
            .unwrap_or(0)
            .max("Name".len());

        output.push_str(&format!("{:>4}  {:<width$}  {:>10}\n", "Rank", "Name", "Similarity", width = name_width));
        output.push_str(&format!("{}\n", "-".repeat(4 + 2 + name_width + 2 + 10)));

        for entry in &report.entries {
            let score = format!("{:>10.4}", entry.similarity);
            output.push_str(&format!(
                "{:>4}  {:<width$}  {}\n",
                entry.rank,
                entry.name,
                self.colorize(&score, similarity_color(entry.similarity)),
                width = name_width
            ));
        }

        if !report.skipped.is_empty() {
            output.push_str(&self.format_header("Skipped"));
            for skipped in &report.skipped {
                output.push_str(&format!(
                    "  • {}: {}\n",
                    skipped.name,
                    self.colorize(&skipped.reason, Color::Yellow)
                ));
            }
        }

        Ok(output)
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Console
    }
}

impl JsonFormatter {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_report(&self, report: &RankingReport) -> Result<String> {
        if self.pretty {
            Ok(serde_json::to_string_pretty(report)?)
        } else {
            Ok(serde_json::to_string(report)?)
        }
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Json
    }
}

impl MarkdownFormatter {
    pub fn new(include_metadata: bool) -> Self {
        Self { include_metadata }
    }

    fn escape_cell(text: &str) -> String {
        text.replace('|', "\\|")
    }
}

impl OutputFormatter for MarkdownFormatter {
    fn format_report(&self, report: &RankingReport) -> Result<String> {
        let mut output = String::new();

        output.push_str("# Candidate Ranking\n\n");

        if self.include_metadata {
            output.push_str(&format!(
                "**Job:** {}\n\n**Model:** `{}` | **Candidates:** {} | **Processing Time:** {}ms\n\n",
                Self::escape_cell(&report.job_preview(JOB_PREVIEW_CHARS)),
                report.embedding_model,
                report.candidates_considered,
                report.processing_time_ms
            ));
        }

        output.push_str("| Rank | Name | Similarity |\n");
        output.push_str("|------|------|------------|\n");
        for entry in &report.entries {
            output.push_str(&format!(
                "| {} | {} | {:.4} |\n",
                entry.rank,
                Self::escape_cell(&entry.name),
                entry.similarity
            ));
        }

        if !report.skipped.is_empty() {
            output.push_str("\n## Skipped\n\n");
            for skipped in &report.skipped {
                output.push_str(&format!("- **{}**: {}\n", skipped.name, skipped.reason));
            }
        }

        Ok(output)
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Markdown
    }
}

impl ReportGenerator {
    pub fn new() -> Self {
        Self::with_options(true, true, true)
    }

    pub fn with_options(use_colors: bool, pretty_json: bool, include_metadata: bool) -> Self {
        Self {
            console_formatter: ConsoleFormatter::new(use_colors),
            json_formatter: JsonFormatter::new(pretty_json),
            markdown_formatter: MarkdownFormatter::new(include_metadata),
        }
    }

    pub fn generate_report(&self, report: &RankingReport, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Console => self.console_formatter.format_report(report),
            OutputFormat::Json => self.json_formatter.format_report(report),
            OutputFormat::Markdown => self.markdown_formatter.format_report(report),
        }
    }
}

impl Default for ReportGenerator {
    fn default() -> Self {
        Self::new()
    }
}

pub fn parse_output_format(format: &str) -> Result<OutputFormat> {
    match format.to_lowercase().as_str() {
        "console" => Ok(OutputFormat::Console),
        "json" => Ok(OutputFormat::Json),
        "markdown" | "md" => Ok(OutputFormat::Markdown),
        _ => Err(ResumeRankerError::InvalidInput(format!(
            "Invalid output format: {}. Supported: console, json, markdown",
            format
        ))),
    }
}

pub fn save_report_to_file(content: &str, file_path: &Path) -> Result<()> {
    use std::fs;
    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(file_path, content).map_err(|e| {
        ResumeRankerError::OutputFormatting(format!("Failed to write {}: {}", file_path.display(), e))
    })
}
