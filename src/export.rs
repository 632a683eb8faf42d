/// Export selected tabs as Markdown, CSV, JSON, HTML or plain text

use crate::error::{Error, Result};
use crate::tab_data::TabRecord;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Markdown,
    Csv,
    Json,
    Html,
    Text,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 5] = [
        ExportFormat::Markdown,
        ExportFormat::Csv,
        ExportFormat::Json,
        ExportFormat::Html,
        ExportFormat::Text,
    ];

    pub fn filename(self) -> &'static str {
        match self {
            ExportFormat::Markdown => "tabs.md",
            ExportFormat::Csv => "tabs.csv",
            ExportFormat::Json => "tabs.json",
            ExportFormat::Html => "tabs.html",
            ExportFormat::Text => "tabs.txt",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            ExportFormat::Markdown => "text/markdown",
            ExportFormat::Csv => "text/csv",
            ExportFormat::Json => "application/json",
            ExportFormat::Html => "text/html",
            ExportFormat::Text => "text/plain",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ExportFormat::Markdown => "Markdown",
            ExportFormat::Csv => "CSV",
            ExportFormat::Json => "JSON",
            ExportFormat::Html => "HTML",
            ExportFormat::Text => "Text",
        }
    }
}

/// A file ready to hand to the downloads API
#[derive(Debug, Clone, PartialEq)]
pub struct ExportFile {
    pub content: String,
    pub filename: &'static str,
    pub mime_type: &'static str,
}

#[derive(Serialize)]
struct ExportEntry<'a> {
    title: &'a str,
    url: &'a str,
    domain: &'a str,
}

/// Render `tabs` in `format`; an empty selection is an error
pub fn export_tabs(format: ExportFormat, tabs: &[TabRecord]) -> Result<ExportFile> {
    if tabs.is_empty() {
        return Err(Error::EmptySelection);
    }

    let content = match format {
        ExportFormat::Markdown => to_markdown(tabs),
        ExportFormat::Csv => to_csv(tabs),
        ExportFormat::Json => to_json(tabs)?,
        ExportFormat::Html => to_html(tabs),
        ExportFormat::Text => to_text(tabs),
    };

    Ok(ExportFile {
        content,
        filename: format.filename(),
        mime_type: format.mime_type(),
    })
}

fn to_markdown(tabs: &[TabRecord]) -> String {
    let rows: Vec<String> = tabs
        .iter()
        .map(|tab| {
            format!(
                "| {} | {} | {} |",
                escape_markdown(&tab.title),
                escape_markdown(&tab.url),
                escape_markdown(&tab.domain)
            )
        })
        .collect();
    format!("| Title | URL | Domain |\n|-------|-----|--------|\n{}", rows.join("\n"))
}

fn escape_markdown(field: &str) -> String {
    field.replace('|', "\\|")
}

fn to_csv(tabs: &[TabRecord]) -> String {
    let rows: Vec<String> = tabs
        .iter()
        .map(|tab| {
            format!(
                "{},{},{}",
                quote_csv(&tab.title),
                quote_csv(&tab.url),
                quote_csv(&tab.domain)
            )
        })
        .collect();
    format!("Title,URL,Domain\n{}", rows.join("\n"))
}

fn quote_csv(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

fn to_json(tabs: &[TabRecord]) -> Result<String> {
    let entries: Vec<ExportEntry> = tabs
        .iter()
        .map(|tab| ExportEntry {
            title: &tab.title,
            url: &tab.url,
            domain: &tab.domain,
        })
        .collect();
    Ok(serde_json::to_string_pretty(&entries)?)
}

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn to_html(tabs: &[TabRecord]) -> String {
    let rows: String = tabs
        .iter()
        .map(|tab| {
            let url = escape_html(&tab.url);
            format!(
                "      <tr>\n        <td>{}</td>\n        <td><a href=\"{}\">{}</a></td>\n        <td>{}</td>\n      </tr>\n",
                escape_html(&tab.title),
                url,
                url,
                escape_html(&tab.domain)
            )
        })
        .collect();

    format!(
        "<!DOCTYPE html>\n<html>\n<head><title>Exported Tabs</title></head>\n<body>\n  <h1>Exported Tabs</h1>\n  <table border=\"1\">\n      <tr><th>Title</th><th>URL</th><th>Domain</th></tr>\n{}  </table>\n</body>\n</html>\n",
        rows
    )
}

fn to_text(tabs: &[TabRecord]) -> String {
    tabs.iter()
        .map(|tab| format!("Title: {}\nURL: {}\nDomain: {}\n---", tab.title, tab.url, tab.domain))
        .collect::<Vec<String>>()
        .join("\n\n")
}
