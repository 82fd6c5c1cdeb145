use anyhow::Result;
use initrepo_core::{ChangeReview, EntryKind};
use inquire::Confirm;
use similar::{ChangeTag, TextDiff};
use std::fmt::Write;
use std::path::Path;

/// Prompts on the terminal before each change.
pub struct InteractiveReview;

impl ChangeReview for InteractiveReview {
    fn approve_content(&self, path: &Path, old_content: &str, new_content: &str) -> Result<bool> {
        show_diff_and_confirm(path, old_content, new_content, "Content change")
    }

    fn approve_rename(&self, from: &Path, to: &Path, kind: EntryKind) -> Result<bool> {
        show_path_change_and_confirm(from, to, kind)
    }
}

/// Renders a coloured line diff, or `None` when the texts are identical.
pub fn render_diff(old_content: &str, new_content: &str) -> Result<Option<String>> {
    let diff = TextDiff::from_lines(old_content, new_content);
    let mut output = String::new();
    let mut has_changes = false;

    for (i, group) in diff.grouped_ops(3).iter().enumerate() {
        if i > 0 {
            writeln!(output, "{:-^1$}", "", 40)?;
        }
        for op in group {
            for change in diff.iter_changes(op) {
                let (sign, style) = match change.tag() {
                    ChangeTag::Delete => ("- ", "\x1b[31m"),
                    ChangeTag::Insert => ("+ ", "\x1b[32m"),
                    ChangeTag::Equal => ("  ", "\x1b[0m"),
                };
                write!(output, "{}{}{}\x1b[0m", style, sign, change.value())?;
                if change.missing_newline() {
                    writeln!(output)?;
                }
                if change.tag() != ChangeTag::Equal {
                    has_changes = true;
                }
            }
        }
    }

    Ok(has_changes.then_some(output))
}

fn show_diff_and_confirm(path: &Path, old_content: &str, new_content: &str, description: &str) -> Result<bool> {
    println!("\n📝 {}: {}", description, path.display());

    let Some(diff) = render_diff(old_content, new_content)? else {
        println!("No changes detected.");
        return Ok(false);
    };
    println!("{}", diff);

    let apply = Confirm::new("Apply this change?").with_default(true).prompt()?;
    Ok(apply)
}

fn show_path_change_and_confirm(from: &Path, to: &Path, kind: EntryKind) -> Result<bool> {
    println!("\n📁 {} rename:", kind);
    println!("  \x1b[31m- {}\x1b[0m", from.display());
    println!("  \x1b[32m+ {}\x1b[0m", to.display());

    let apply = Confirm::new("Apply this rename?").with_default(true).prompt()?;
    Ok(apply)
}
