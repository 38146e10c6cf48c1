//! Human and porcelain output formatting.
//!
//! The porcelain format is the tool's wire format: tab-separated fields,
//! one record per line, stable across releases. Human output adds colour
//! (decided once per command) and truncates to the terminal width.

use std::io::IsTerminal;

use colored::Colorize;

use crate::core::{DiffMode, Hunk, LineSpec, ResultGroup};

/// Per-command output configuration.
///
/// The colour decision is derived at most once per command from the
/// `--no-color` flag, whether stdout is a TTY, and the `NO_COLOR`
/// environment variable. Porcelain output is never coloured.
#[derive(Debug)]
pub struct OutputCtx {
    /// Emit machine-readable tab-separated records.
    pub porcelain: bool,
    /// Terminal width for human-mode truncation.
    pub width: usize,
}

impl OutputCtx {
    /// Decide colour and width for this command invocation.
    pub fn new(porcelain: bool, no_color: bool) -> Self {
        let tty = std::io::stdout().is_terminal();
        let color =
            !porcelain && !no_color && tty && std::env::var_os("NO_COLOR").is_none();
        colored::control::set_override(color);
        Self {
            porcelain,
            width: terminal_width(),
        }
    }

    /// One hunk metadata record for `list`.
    ///
    /// Fields: `short_sha`, `file_path`, `start`, `end`, `summary`, with
    /// start/end on the stable side of `mode` (worktree lines for
    /// unstaged, HEAD lines for staged).
    pub fn hunk_line(&self, hunk: &Hunk<'_>, mode: DiffMode) -> String {
        let (start, end) = hunk.display_range(mode);
        if self.porcelain {
            return format!(
                "{}\t{}\t{}\t{}\t{}",
                hunk.short_sha(),
                hunk.file_path,
                start,
                end,
                sanitize_field(hunk.summary()),
            );
        }
        let prefix = format!(
            "{} {} {}-{} ",
            hunk.short_sha().yellow(),
            hunk.file_path.cyan(),
            start,
            end
        );
        let used = hunk.short_sha().chars().count()
            + hunk.file_path.chars().count()
            + format!(" {}-{} ", start, end).chars().count()
            + 1;
        let room = self.width.saturating_sub(used);
        format!("{}{}", prefix, truncate_chars(hunk.summary(), room).dimmed())
    }

    /// One result-group record for `stage`/`unstage`.
    ///
    /// Porcelain fields: verb, file, applied (comma list of
    /// `sha[:ranges]`), absorbed (comma list or `-`), results (comma list
    /// or `-`).
    pub fn group_line(&self, verb: &str, group: &ResultGroup) -> String {
        let applied: Vec<String> = group
            .applied
            .iter()
            .map(|(sha, spec)| applied_label(sha, spec.as_ref()))
            .collect();
        if self.porcelain {
            return format!(
                "{}\t{}\t{}\t{}\t{}",
                verb,
                group.file_path,
                join_or_dash(&applied),
                join_or_dash(&group.absorbed),
                join_or_dash(&group.results),
            );
        }
        let mut line = format!("{} {}", verb.green(), applied.join(", ").yellow());
        for absorbed in &group.absorbed {
            line.push_str(&format!(" +{}", absorbed.yellow()));
        }
        if group.results.is_empty() {
            line.push_str(&format!(" -> {}", "?".dimmed()));
        } else {
            line.push_str(&format!(" -> {}", group.results.join(", ").yellow()));
        }
        line.push(' ');
        line.push_str(&group.file_path.cyan().to_string());
        line
    }

    /// One simple verb record (`stashed`, `restored`, `would-restore`).
    pub fn verb_line(&self, verb: &str, label: &str, file: &str) -> String {
        if self.porcelain {
            format!("{}\t{}\t{}", verb, label, file)
        } else {
            format!("{} {} {}", verb.green(), label.yellow(), file.cyan())
        }
    }

    /// One `check` status record.
    pub fn check_line(&self, status: &str, token: &str, hunk: Option<&Hunk<'_>>) -> String {
        if self.porcelain {
            match hunk {
                Some(h) => format!("{}\t{}\t{}\t{}", status, token, h.short_sha(), h.file_path),
                None => format!("{}\t{}", status, token),
            }
        } else {
            let painted = match status {
                "ok" => status.green().to_string(),
                _ => status.red().to_string(),
            };
            match hunk {
                Some(h) => format!(
                    "{} {} ({} {})",
                    token.yellow(),
                    painted,
                    h.short_sha(),
                    h.file_path.cyan()
                ),
                None => format!("{} {}", token.yellow(), painted),
            }
        }
    }
}

fn applied_label(sha: &str, spec: Option<&LineSpec>) -> String {
    match spec {
        Some(spec) => format!("{}:{}", sha, spec),
        None => sha.to_string(),
    }
}

fn join_or_dash(items: &[String]) -> String {
    if items.is_empty() {
        "-".to_string()
    } else {
        items.join(",")
    }
}

/// Tabs inside free-form fields would break the TSV framing.
fn sanitize_field(s: &str) -> String {
    s.replace('\t', " ")
}

/// Terminal width: ioctl probe, then `COLUMNS`, then 80.
fn terminal_width() -> usize {
    crossterm::terminal::size()
        .ok()
        .map(|(w, _)| w as usize)
        .filter(|w| *w > 0)
        .or_else(|| {
            std::env::var("COLUMNS")
                .ok()
                .and_then(|v| v.parse::<usize>().ok())
        })
        .unwrap_or(80)
}

/// Truncate to at most `max_chars` Unicode characters, appending "..."
/// when something was cut.
fn truncate_chars(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
