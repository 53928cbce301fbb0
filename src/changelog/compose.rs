//! Message formatting for tags and changelog files.

/// Header line of every tag message.
pub const HEADER: &str = "Changelog";

/// Format entries into the annotated tag message.
///
/// The header, a blank line, then one entry per line in the order given.
pub fn compose<S: AsRef<str>>(entries: &[S]) -> String {
    let body: Vec<&str> = entries.iter().map(AsRef::as_ref).collect();
    format!("{}\n\n{}", HEADER, body.join("\n"))
}

/// Render a markdown section for a changelog file.
///
/// ```text
/// ## v1.2.0
///
/// - #42 - Add feature X
/// - #41
/// ```
pub fn changelog_section<S: AsRef<str>>(tag: &str, entries: &[S]) -> String {
    let mut section = format!("## {}\n\n", tag);
    if entries.is_empty() {
        section.push_str("No merged pull requests.\n");
    }
    for entry in entries {
        section.push_str("- ");
        section.push_str(entry.as_ref());
        section.push('\n');
    }
    section
}

/// Put `section` on top of an existing changelog file's content.
pub fn prepend_section(existing: &str, section: &str) -> String {
    if existing.trim().is_empty() {
        return section.to_string();
    }
    format!("{}\n{}", section, existing)
}
