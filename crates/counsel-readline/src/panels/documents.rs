//! Listing of the user's uploaded documents.

use colored::Colorize;
use counsel_core::chat::Document;
use std::fmt::Write;

fn format_size(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}

pub fn render_documents(documents: &[Document]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", "Documents".bold());

    if documents.is_empty() {
        let _ = writeln!(out, "{}", "  No documents uploaded yet.".bright_black());
        return out;
    }

    for document in documents {
        let size = document.file_size.map(format_size).unwrap_or_default();
        let status = if document.processed { "processed" } else { "pending" };
        let _ = writeln!(
            out,
            "  {} {} {}",
            document.file_name,
            format!("{} {}", document.created_at.format("%Y-%m-%d"), size)
                .trim_end()
                .bright_black(),
            format!("[{}]", status).bright_black()
        );
    }
    out
}
