//! Output formatting for CLI commands

use anyhow::{Context, Result};
use serde::Serialize;

use super::driver::Change;

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Yaml,
}

impl OutputFormat {
    /// Parse output format from string
    pub fn parse(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "yaml" => Ok(OutputFormat::Yaml),
            _ => anyhow::bail!("Unsupported output format: '{}'. Use 'json' or 'yaml'.", s),
        }
    }
}

/// Print data in the specified format
pub fn print_output<T: Serialize>(data: &T, format: &str) -> Result<()> {
    match OutputFormat::parse(format)? {
        OutputFormat::Json => print_json(data),
        OutputFormat::Yaml => print_yaml(data),
    }
}

/// Print data as JSON
pub fn print_json<T: Serialize>(data: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(data).context("Failed to serialize to JSON")?;
    println!("{}", json);
    Ok(())
}

/// Print data as YAML
pub fn print_yaml<T: Serialize>(data: &T) -> Result<()> {
    let yaml = serde_yaml::to_string(data).context("Failed to serialize to YAML")?;
    println!("{}", yaml);
    Ok(())
}

/// Render changes as an aligned table
pub fn format_changes(changes: &[Change]) -> String {
    let kind_width = changes.iter().map(|c| c.kind.len()).max().unwrap_or(0).max("KIND".len());
    let name_width = changes.iter().map(|c| c.name.len()).max().unwrap_or(0).max("NAME".len());

    let mut out = format!("{:<kind_width$}  {:<name_width$}  ACTION\n", "KIND", "NAME");
    out.push_str(&"-".repeat(kind_width + name_width + 4 + "ACTION".len()));
    out.push('\n');
    for change in changes {
        out.push_str(&format!(
            "{:<kind_width$}  {:<name_width$}  {}\n",
            change.kind, change.name, change.action
        ));
    }
    out
}

/// One-line summary, e.g. "2 to create, 1 to update, 0 to replace, 0 to delete"
pub fn summarize(changes: &[Change]) -> String {
    let count = |prefix: &str| changes.iter().filter(|c| c.action.starts_with(prefix)).count();
    format!(
        "{} to create, {} to update, {} to replace, {} to delete",
        count("create"),
        count("update"),
        count("replace"),
        count("delete")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn changes() -> Vec<Change> {
        vec![
            Change {
                kind: "mirror_sessions",
                name: "span-test".to_string(),
                action: "create".to_string(),
            },
            Change {
                kind: "security_policies",
                name: "web".to_string(),
                action: "replace (tenant)".to_string(),
            },
        ]
    }

    #[test]
    fn test_output_format_parse() {
        assert_eq!(OutputFormat::parse("json").unwrap(), OutputFormat::Json);
        assert_eq!(OutputFormat::parse("YAML").unwrap(), OutputFormat::Yaml);
        assert!(OutputFormat::parse("table").is_err());
    }

    #[test]
    fn test_format_changes() {
        let table = format_changes(&changes());
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("KIND"));
        assert!(lines[3].starts_with("security_policies  web"));
        assert!(lines[3].ends_with("replace (tenant)"));
    }

    #[test]
    fn test_summarize() {
        assert_eq!(summarize(&changes()), "1 to create, 0 to update, 1 to replace, 0 to delete");
    }
}
