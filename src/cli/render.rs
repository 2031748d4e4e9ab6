//! Text tables for console listings.

use std::fmt::Write;

use crate::core::HistoryEntry;
use crate::domain::{Resource, User};

pub fn resources(resources: &[&Resource]) -> String {
    if resources.is_empty() {
        return "No resources in the library.\n".to_string();
    }

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<10} {:<10} {:<30} {:<12} {:<20}",
        "ID", "TYPE", "TITLE", "STATE", "DETAIL"
    );
    let _ = writeln!(out, "{}", "-".repeat(86));

    for r in resources {
        let _ = writeln!(
            out,
            "{:<10} {:<10} {:<30} {:<12} {:<20}",
            r.id(),
            r.kind().name(),
            truncate(r.title(), 30),
            r.state().to_string(),
            r.kind().detail()
        );
    }

    let _ = writeln!(out, "\nTotal: {} resources", resources.len());
    out
}

pub fn users(users: &[User]) -> String {
    if users.is_empty() {
        return "No registered users.\n".to_string();
    }

    let mut out = String::from("Registered users:\n");
    for u in users {
        let _ = writeln!(out, "- ID: {} | Name: {}", u.id, u.name);
    }
    out
}

pub fn history(entries: &[HistoryEntry<'_>]) -> String {
    if entries.is_empty() {
        return "No loans recorded.\n".to_string();
    }

    let mut out = String::from("Loan history:\n");
    for entry in entries {
        let _ = writeln!(out, "- {}", entry.summary());
    }
    out
}

/// Cut to `max` characters, marking the cut with "..."
fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{}...", kept)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_listings() {
        assert_eq!(resources(&[]), "No resources in the library.\n");
        assert_eq!(users(&[]), "No registered users.\n");
        assert_eq!(history(&[]), "No loans recorded.\n");
    }

    #[test]
    fn test_resource_table_rows() {
        let book = Resource::book("b1", "Dune", "Herbert");
        let dvd = Resource::dvd("d1", "Alien", 117);
        let table = resources(&[&book, &dvd]);

        assert!(table.contains("Author: Herbert"));
        assert!(table.contains("Duration: 117 min"));
        assert!(table.contains("AVAILABLE"));
        assert!(table.ends_with("Total: 2 resources\n"));
    }

    #[test]
    fn test_truncate_multibyte_title() {
        let title = "Cien años de soledad y otras historias largas";
        let cut = truncate(title, 12);
        assert_eq!(cut.chars().count(), 12);
        assert!(cut.ends_with("..."));
    }
}
