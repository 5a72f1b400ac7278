//! Output formatting for CLI commands.
//!
//! This module provides formatting utilities for displaying
//! schemas, states and diagnostics in various formats.

use colored::Colorize;
use std::fmt::Write;
use tabled::{Table, Tabled};

use crate::framework::{Attribute, AttributeType, Diagnostic, Diagnostics, ProviderSchema, Schema};
use crate::provider::Response;

use super::commands::OutputFormat;

/// Output formatter for CLI.
#[derive(Debug)]
pub struct OutputFormatter {
    /// Output format.
    format: OutputFormat,
}

/// Type row for the schema listing.
#[derive(Tabled)]
struct TypeRow {
    #[tabled(rename = "Kind")]
    kind: String,
    #[tabled(rename = "Type")]
    name: String,
    #[tabled(rename = "Attributes")]
    attributes: usize,
    #[tabled(rename = "Description")]
    description: String,
}

/// Attribute row for a single type's schema.
#[derive(Tabled)]
struct AttributeRow {
    #[tabled(rename = "Attribute")]
    name: String,
    #[tabled(rename = "Type")]
    attr_type: String,
    #[tabled(rename = "Mode")]
    mode: String,
    #[tabled(rename = "Description")]
    description: String,
}

impl OutputFormatter {
    /// Creates a new output formatter.
    #[must_use]
    pub const fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats the list of every registered type.
    #[must_use]
    pub fn format_provider_schema(&self, schema: &ProviderSchema) -> String {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(schema).unwrap_or_default(),
            OutputFormat::Text => Self::format_provider_schema_text(schema),
        }
    }

    fn format_provider_schema_text(schema: &ProviderSchema) -> String {
        let rows: Vec<TypeRow> = schema
            .resources
            .iter()
            .map(|(name, s)| ("resource", name, s))
            .chain(schema.data_sources.iter().map(|(name, s)| ("data source", name, s)))
            .map(|(kind, name, s)| TypeRow {
                kind: kind.to_string(),
                name: name.clone(),
                attributes: s.attributes.len(),
                description: Self::truncate(s.description.as_deref().unwrap_or_default(), 60),
            })
            .collect();

        let mut output = String::new();
        let _ = writeln!(
            output,
            "\nBraintrust provider: {} resources, {} data sources\n",
            schema.resources.len().to_string().green(),
            schema.data_sources.len().to_string().green()
        );
        output.push_str(&Table::new(rows).to_string());
        output.push('\n');
        output
    }

    /// Formats the schema of one type.
    #[must_use]
    pub fn format_type_schema(&self, type_name: &str, schema: &Schema) -> String {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(schema).unwrap_or_default(),
            OutputFormat::Text => {
                let mut output = String::new();
                let _ = writeln!(output, "\n{}", type_name.bold());
                if let Some(description) = &schema.description {
                    let _ = writeln!(output, "   {description}");
                }
                output.push('\n');

                let rows: Vec<AttributeRow> = schema
                    .attributes
                    .iter()
                    .map(|(name, attr)| AttributeRow {
                        name: name.clone(),
                        attr_type: Self::type_label(&attr.attr_type),
                        mode: Self::mode_label(attr),
                        description: Self::truncate(attr.description.as_deref().unwrap_or_default(), 60),
                    })
                    .collect();
                output.push_str(&Table::new(rows).to_string());
                output.push('\n');
                output
            }
        }
    }

    /// Formats the result of a provider operation.
    #[must_use]
    pub fn format_response(&self, response: &Response) -> String {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(response).unwrap_or_default(),
            OutputFormat::Text => {
                let mut output = Self::format_diagnostics_text(&response.diagnostics);
                match &response.state {
                    Some(state) => {
                        output.push_str(&serde_json::to_string_pretty(state).unwrap_or_default());
                        output.push('\n');
                    }
                    None if !response.has_errors() => {
                        let _ = writeln!(output, "{} no state", "-".dimmed());
                    }
                    None => {}
                }
                output
            }
        }
    }

    /// Formats diagnostics on their own, e.g. after validation.
    #[must_use]
    pub fn format_diagnostics(&self, diagnostics: &Diagnostics) -> String {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(diagnostics).unwrap_or_default(),
            OutputFormat::Text if diagnostics.is_empty() => {
                format!("{} valid\n", "✓".green())
            }
            OutputFormat::Text => Self::format_diagnostics_text(diagnostics),
        }
    }

    fn format_diagnostics_text(diagnostics: &Diagnostics) -> String {
        let mut output = String::new();
        for diagnostic in diagnostics.iter() {
            let _ = writeln!(output, "{}", Self::format_diagnostic(diagnostic));
        }
        output
    }

    /// Formats a diagnostic with color.
    fn format_diagnostic(diagnostic: &Diagnostic) -> String {
        let marker = if diagnostic.is_error() {
            "Error:".red().bold()
        } else {
            "Warning:".yellow().bold()
        };
        let mut line = format!("{marker} {}", diagnostic.summary);
        if let Some(attribute) = &diagnostic.attribute {
            let _ = write!(line, " ({})", attribute.cyan());
        }
        if let Some(detail) = &diagnostic.detail {
            let _ = write!(line, "\n   {detail}");
        }
        line
    }

    fn type_label(attr_type: &AttributeType) -> String {
        match attr_type {
            AttributeType::String => String::from("string"),
            AttributeType::Int64 => String::from("int64"),
            AttributeType::Bool => String::from("bool"),
            AttributeType::List(element) => format!("list({})", Self::type_label(element)),
            AttributeType::Map(element) => format!("map({})", Self::type_label(element)),
            AttributeType::Object(_) => String::from("object"),
        }
    }

    fn mode_label(attr: &Attribute) -> String {
        let flags = attr.flags;
        let mut mode = match (flags.required, flags.optional, flags.computed) {
            (true, _, _) => "required".yellow().to_string(),
            (false, true, true) => String::from("optional, computed"),
            (false, true, false) => String::from("optional"),
            _ => "computed".dimmed().to_string(),
        };
        if attr.force_new {
            mode.push_str(", forces new");
        }
        if flags.sensitive {
            let _ = write!(mode, ", {}", "sensitive".magenta());
        }
        mode
    }

    /// Truncates a string to a maximum length.
    fn truncate(s: &str, max_len: usize) -> String {
        if s.chars().count() <= max_len {
            s.to_string()
        } else {
            let head: String = s.chars().take(max_len - 3).collect();
            format!("{head}...")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framework::Diagnostic;
    use serde_json::json;

    #[test]
    fn test_type_label() {
        let ty = AttributeType::list(AttributeType::map(AttributeType::String));
        assert_eq!(OutputFormatter::type_label(&ty), "list(map(string))");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(OutputFormatter::truncate("short", 10), "short");
        assert_eq!(OutputFormatter::truncate("a longer description", 10), "a longe...");
    }

    #[test]
    fn test_json_response() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.push(Diagnostic::warning("Provider configuration").with_detail("plain http"));
        let response = Response {
            state: Some(json!({"id": "p1"})),
            diagnostics,
        };

        let text = OutputFormatter::new(OutputFormat::Json).format_response(&response);
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();

        assert_eq!(value["state"]["id"], "p1");
        assert_eq!(value["diagnostics"][0]["severity"], "warning");
    }

    #[test]
    fn test_text_diagnostics_include_detail() {
        colored::control::set_override(false);
        let mut diagnostics = Diagnostics::new();
        diagnostics.push(
            Diagnostic::error("Invalid input")
                .with_detail("`id` and `name` cannot both be set")
                .with_attribute("name"),
        );

        let text = OutputFormatter::new(OutputFormat::Text).format_diagnostics(&diagnostics);
        assert!(text.contains("Error: Invalid input (name)"));
        assert!(text.contains("`id` and `name` cannot both be set"));
    }
}
