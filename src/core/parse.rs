//! Unified-diff parsing and the content-addressed hunk model.
//!
//! The parser consumes the byte stream `git diff` writes (with `a/`/`b/`
//! prefixes and colour disabled) and produces an ordered list of [`Hunk`]s,
//! each labelled with a SHA-1 digest that stays stable while sibling hunks
//! are staged or unstaged.

use std::borrow::Cow;

use sha1::{Digest, Sha1};

/// Which side of a diff supplies the stable line number for hashing.
///
/// The hash must reference the side that does not shift when peer hunks are
/// applied: the worktree side for an index-vs-worktree diff, the HEAD side
/// for anything diffed against HEAD.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffMode {
    /// Index-vs-worktree diff (`git diff`); the worktree side is stable.
    WorktreeRelative,
    /// HEAD-vs-index (`git diff --cached`) or HEAD-vs-worktree
    /// (`git diff HEAD`); the HEAD side is stable.
    HeadRelative,
}

impl DiffMode {
    /// Pick the line number fed into the hunk hash.
    pub fn stable_line(self, old_start: u32, new_start: u32) -> u32 {
        match self {
            DiffMode::WorktreeRelative => new_start,
            DiffMode::HeadRelative => old_start,
        }
    }
}

/// A single hunk parsed out of a unified diff.
///
/// Borrows from the diff text it was parsed from; hunks never outlive the
/// command that produced them.
#[derive(Debug, Clone)]
pub struct Hunk<'a> {
    /// Repository-relative path, C-unquoted when the diff quoted it.
    pub file_path: Cow<'a, str>,
    /// Old-side start line from the `@@` header.
    pub old_start: u32,
    /// Old-side line count from the `@@` header.
    pub old_count: u32,
    /// New-side start line from the `@@` header.
    pub new_start: u32,
    /// New-side line count from the `@@` header.
    pub new_count: u32,
    /// Label text after the closing `@@`, usually a function signature.
    pub context: &'a str,
    /// Exact bytes from the `@@` header through the last body line.
    pub raw_lines: &'a str,
    /// Only the `+`/`-`/`\ No newline` lines, newline-joined. Hash input.
    pub diff_lines: String,
    /// Lower-case 40-hex SHA-1 of `(file_path, stable_line, diff_lines)`.
    pub sha_hex: String,
    /// File section carried a `new file mode` header.
    pub is_new_file: bool,
    /// File section carried a `deleted file mode` header.
    pub is_deleted_file: bool,
    /// Hunk came from a synthetic diff of an untracked file.
    pub is_untracked: bool,
    /// Prelude bytes required to re-apply this hunk standalone.
    pub patch_header: Cow<'a, str>,
}

impl Hunk<'_> {
    /// First seven hex digits of the hash, the display form.
    pub fn short_sha(&self) -> &str {
        &self.sha_hex[..7]
    }

    /// Inclusive line range on the stable side of `mode`.
    ///
    /// Zero-count hunks (pure insertions/deletions) span one line.
    pub fn display_range(&self, mode: DiffMode) -> (u32, u32) {
        let (start, count) = match mode {
            DiffMode::WorktreeRelative => (self.new_start, self.new_count),
            DiffMode::HeadRelative => (self.old_start, self.old_count),
        };
        (start, start + count.max(1) - 1)
    }

    /// One-line description: the `@@` context label when present, the first
    /// changed line otherwise.
    pub fn summary(&self) -> &str {
        if !self.context.is_empty() {
            self.context
        } else {
            self.diff_lines.lines().next().unwrap_or("")
        }
    }

    /// Body lines (everything after the `@@` header).
    pub fn body_lines(&self) -> impl Iterator<Item = &str> {
        self.raw_lines.lines().skip(1)
    }
}

/// Compute the canonical hunk hash.
///
/// `SHA1(file_path || 0x00 || decimal(stable_line) || 0x00 || diff_lines)`,
/// rendered as lower-case hex. Byte-for-byte reproducibility of this
/// construction is a hard requirement.
pub fn hunk_sha(file_path: &str, stable_line: u32, diff_lines: &str) -> String {
    let mut hasher = Sha1::new();
    hasher.update(file_path.as_bytes());
    hasher.update([0u8]);
    hasher.update(stable_line.to_string().as_bytes());
    hasher.update([0u8]);
    hasher.update(diff_lines.as_bytes());
    hex::encode(hasher.finalize())
}

/// Parse a full `git diff` byte stream into hunks.
///
/// Binary, submodule (`160000`), mode-only, and rename-only sections yield
/// no hunks. A malformed `@@` header aborts only that hunk; parsing resumes
/// at the next `@@` or `diff --git` line.
pub fn parse_diff(text: &str, mode: DiffMode) -> Vec<Hunk<'_>> {
    let mut cursor = Cursor::new(text);
    let mut hunks = Vec::new();
    while let Some(line) = cursor.peek() {
        if line.starts_with("diff --git ") {
            parse_file_section(text, &mut cursor, mode, false, &mut hunks);
        } else {
            cursor.advance();
        }
    }
    hunks
}

/// Parse the synthetic diff of one untracked file (`git diff --no-index`
/// against `/dev/null`), flagging every hunk as untracked.
///
/// Untracked diffs are worktree-relative by construction.
pub fn parse_untracked_diff(text: &str) -> Vec<Hunk<'_>> {
    let mut cursor = Cursor::new(text);
    let mut hunks = Vec::new();
    while let Some(line) = cursor.peek() {
        if line.starts_with("diff --git ") {
            parse_file_section(text, &mut cursor, DiffMode::WorktreeRelative, true, &mut hunks);
        } else {
            cursor.advance();
        }
    }
    hunks
}

/// Line cursor over the diff text. Slices, never copies.
struct Cursor<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(text: &'a str) -> Self {
        Self { text, pos: 0 }
    }

    /// Byte offset of the start of the next unread line.
    fn offset(&self) -> usize {
        self.pos
    }

    /// Current line without its newline, or None at end of input.
    fn peek(&self) -> Option<&'a str> {
        if self.pos >= self.text.len() {
            return None;
        }
        let rest = &self.text[self.pos..];
        Some(match rest.find('\n') {
            Some(idx) => &rest[..idx],
            None => rest,
        })
    }

    /// The line after the current one, if any.
    fn peek_second(&self) -> Option<&'a str> {
        let rest = &self.text[self.pos..];
        let first_end = rest.find('\n')?;
        let tail = &rest[first_end + 1..];
        if tail.is_empty() {
            return None;
        }
        Some(match tail.find('\n') {
            Some(idx) => &tail[..idx],
            None => tail,
        })
    }

    /// Consume and return the current line.
    fn advance(&mut self) -> Option<&'a str> {
        let line = self.peek()?;
        self.pos += line.len();
        if self.pos < self.text.len() {
            self.pos += 1; // the newline itself
        }
        Some(line)
    }
}

/// Extended file-header flags collected before the first hunk.
#[derive(Default)]
struct SectionFlags {
    is_new_file: bool,
    is_deleted_file: bool,
    is_rename: bool,
    is_copy: bool,
    is_binary: bool,
    is_submodule: bool,
}

fn parse_file_section<'a>(
    text: &'a str,
    cursor: &mut Cursor<'a>,
    mode: DiffMode,
    untracked: bool,
    out: &mut Vec<Hunk<'a>>,
) {
    let header_start = cursor.offset();
    let git_line = match cursor.advance() {
        Some(line) => line,
        None => return,
    };
    let git_paths = parse_git_header_paths(git_line);

    let mut flags = SectionFlags::default();
    loop {
        let Some(line) = cursor.peek() else { break };
        if line.starts_with("diff --git ") || line.starts_with("@@") || line.starts_with("--- ") {
            break;
        }
        if line.starts_with("new file mode ") {
            flags.is_new_file = true;
        } else if line.starts_with("deleted file mode ") {
            flags.is_deleted_file = true;
        } else if line.starts_with("rename from ") || line.starts_with("rename to ") {
            flags.is_rename = true;
        } else if line.starts_with("copy from ") || line.starts_with("copy to ") {
            flags.is_copy = true;
        } else if line.starts_with("old mode ")
            || line.starts_with("new mode ")
            || line.starts_with("similarity index ")
            || line.starts_with("dissimilarity index ")
        {
            // mode / similarity metadata, nothing to record
        } else if let Some(rest) = line.strip_prefix("index ") {
            if rest.ends_with(" 160000") {
                flags.is_submodule = true;
            }
        } else if line.starts_with("Binary files ") || line.starts_with("GIT binary patch") {
            flags.is_binary = true;
        } else {
            break;
        }
        cursor.advance();
    }
    let ext_end = cursor.offset();

    if flags.is_binary || flags.is_submodule {
        skip_section(cursor);
        return;
    }

    // `---`/`+++` pair; absent for empty new/deleted files and metadata-only
    // sections.
    let mut minus_path: Option<&str> = None;
    let mut plus_path: Option<&str> = None;
    let mut minus_start: Option<usize> = None;
    let mut header_end: Option<usize> = None;
    if cursor.peek().is_some_and(|l| l.starts_with("--- ")) {
        minus_start = Some(cursor.offset());
        let minus_line = cursor.advance().unwrap_or_default();
        minus_path = minus_line.strip_prefix("--- ");
        if cursor.peek().is_some_and(|l| l.starts_with("+++ ")) {
            let plus_line = cursor.advance().unwrap_or_default();
            plus_path = plus_line.strip_prefix("+++ ");
            header_end = Some(cursor.offset());
        } else {
            // A lone `---` is not something git emits; drop the section.
            skip_section(cursor);
            return;
        }
    }

    let file_path: Cow<'a, str> = match (plus_path, minus_path) {
        (Some(p), _) if p != "/dev/null" => strip_side_prefix(unquote_c_path(p), "b/"),
        (_, Some(m)) if m != "/dev/null" => strip_side_prefix(unquote_c_path(m), "a/"),
        _ => match &git_paths {
            Some((a, b)) => {
                if flags.is_deleted_file {
                    a.clone()
                } else {
                    b.clone()
                }
            }
            None => {
                skip_section(cursor);
                return;
            }
        },
    };

    let special =
        flags.is_new_file || flags.is_deleted_file || flags.is_rename || flags.is_copy || untracked;

    if header_end.is_none() {
        // Empty new or deleted file: one synthetic hunk with zero counts and
        // a patch header pointing the absent side at /dev/null.
        if flags.is_new_file || flags.is_deleted_file {
            let old_side = if flags.is_new_file {
                "/dev/null".to_string()
            } else {
                format!("a/{}", file_path)
            };
            let new_side = if flags.is_deleted_file {
                "/dev/null".to_string()
            } else {
                format!("b/{}", file_path)
            };
            let patch_header = format!(
                "{}--- {}\n+++ {}\n",
                &text[header_start..ext_end],
                old_side,
                new_side
            );
            let sha_hex = hunk_sha(&file_path, 0, "");
            out.push(Hunk {
                file_path,
                old_start: 0,
                old_count: 0,
                new_start: 0,
                new_count: 0,
                context: "",
                raw_lines: "",
                diff_lines: String::new(),
                sha_hex,
                is_new_file: flags.is_new_file,
                is_deleted_file: flags.is_deleted_file,
                is_untracked: untracked,
                patch_header: Cow::Owned(patch_header),
            });
        }
        return;
    }

    let patch_start = if special {
        header_start
    } else {
        minus_start.unwrap_or(header_start)
    };
    let patch_header: Cow<'a, str> = Cow::Borrowed(&text[patch_start..header_end.unwrap_or(ext_end)]);

    while let Some(line) = cursor.peek() {
        if line.starts_with("@@") {
            match parse_hunk(text, cursor, mode, &file_path, &flags, untracked, &patch_header) {
                Ok(Some(hunk)) => out.push(hunk),
                Ok(None) => {}
                Err(()) => skip_to_resume_point(cursor),
            }
        } else {
            break;
        }
    }
}

/// Consume everything up to the next `diff --git` line.
fn skip_section(cursor: &mut Cursor<'_>) {
    while let Some(line) = cursor.peek() {
        if line.starts_with("diff --git ") {
            break;
        }
        cursor.advance();
    }
}

/// After a malformed hunk, resume at the next `@@` or `diff --git`.
fn skip_to_resume_point(cursor: &mut Cursor<'_>) {
    while let Some(line) = cursor.peek() {
        if line.starts_with("@@") || line.starts_with("diff --git ") {
            break;
        }
        cursor.advance();
    }
}

#[allow(clippy::too_many_arguments)]
fn parse_hunk<'a>(
    text: &'a str,
    cursor: &mut Cursor<'a>,
    mode: DiffMode,
    file_path: &Cow<'a, str>,
    flags: &SectionFlags,
    untracked: bool,
    patch_header: &Cow<'a, str>,
) -> Result<Option<Hunk<'a>>, ()> {
    let hunk_start = cursor.offset();
    let header = cursor.advance().ok_or(())?;
    let (old_start, old_count, new_start, new_count, context) = parse_hunk_header(header)?;

    let mut diff_lines = String::new();
    let mut change_count = 0usize;
    let mut body_end = cursor.offset();
    loop {
        let Some(line) = cursor.peek() else { break };
        let first = line.as_bytes().first().copied();
        let is_body = matches!(first, Some(b' ') | Some(b'+') | Some(b'-') | Some(b'\\'));
        // An empty line is ambiguous: context only when another body line
        // follows, otherwise it terminates the hunk.
        let empty_context = line.is_empty()
            && cursor.peek_second().is_some_and(|next| {
                matches!(
                    next.as_bytes().first().copied(),
                    Some(b' ') | Some(b'+') | Some(b'-') | Some(b'\\')
                )
            });
        if !is_body && !empty_context {
            break;
        }
        cursor.advance();
        body_end = cursor.offset();
        match first {
            Some(b'+') | Some(b'-') => {
                if !diff_lines.is_empty() {
                    diff_lines.push('\n');
                }
                diff_lines.push_str(line);
                change_count += 1;
            }
            Some(b'\\') => {
                if !diff_lines.is_empty() {
                    diff_lines.push('\n');
                }
                diff_lines.push_str(line);
            }
            _ => {}
        }
    }

    if change_count == 0 {
        return Ok(None);
    }

    let stable = mode.stable_line(old_start, new_start);
    let sha_hex = hunk_sha(file_path, stable, &diff_lines);
    Ok(Some(Hunk {
        file_path: file_path.clone(),
        old_start,
        old_count,
        new_start,
        new_count,
        context,
        raw_lines: &text[hunk_start..body_end],
        diff_lines,
        sha_hex,
        is_new_file: flags.is_new_file,
        is_deleted_file: flags.is_deleted_file,
        is_untracked: untracked,
        patch_header: patch_header.clone(),
    }))
}

/// Parse `@@ -o[,oc] +n[,nc] @@[ context]`.
fn parse_hunk_header(line: &str) -> Result<(u32, u32, u32, u32, &str), ()> {
    let rest = line.strip_prefix("@@ -").ok_or(())?;
    let close = rest.find(" @@").ok_or(())?;
    let ranges = &rest[..close];
    let tail = &rest[close + 3..];
    let context = tail.strip_prefix(' ').unwrap_or(tail);

    let (old_part, new_part) = ranges.split_once(' ').ok_or(())?;
    let new_part = new_part.strip_prefix('+').ok_or(())?;
    let (old_start, old_count) = parse_range(old_part)?;
    let (new_start, new_count) = parse_range(new_part)?;
    Ok((old_start, old_count, new_start, new_count, context))
}

/// Parse `10,5` or `10` (count omitted means 1). Overflow is a parse error.
fn parse_range(range: &str) -> Result<(u32, u32), ()> {
    match range.split_once(',') {
        Some((start, count)) => Ok((
            start.parse::<u32>().map_err(|_| ())?,
            count.parse::<u32>().map_err(|_| ())?,
        )),
        None => Ok((range.parse::<u32>().map_err(|_| ())?, 1)),
    }
}

/// Strip a leading `a/` or `b/` from an (already unquoted) diff path.
fn strip_side_prefix<'a>(path: Cow<'a, str>, prefix: &str) -> Cow<'a, str> {
    match path {
        Cow::Borrowed(p) => Cow::Borrowed(p.strip_prefix(prefix).unwrap_or(p)),
        Cow::Owned(p) => match p.strip_prefix(prefix) {
            Some(stripped) => Cow::Owned(stripped.to_string()),
            None => Cow::Owned(p),
        },
    }
}

/// Unescape a C-style quoted path (`"…"` with `\t`, `\n`, `\\`, `\"`, and
/// 3-digit octal escapes). Unquoted paths pass through unchanged.
pub fn unquote_c_path(s: &str) -> Cow<'_, str> {
    if s.len() < 2 || !s.starts_with('"') || !s.ends_with('"') {
        return Cow::Borrowed(s);
    }
    let inner = s[1..s.len() - 1].as_bytes();
    let mut bytes = Vec::with_capacity(inner.len());
    let mut i = 0;
    while i < inner.len() {
        if inner[i] == b'\\' && i + 1 < inner.len() {
            let escape = inner[i + 1];
            i += 2;
            match escape {
                b'n' => bytes.push(b'\n'),
                b't' => bytes.push(b'\t'),
                b'r' => bytes.push(b'\r'),
                b'a' => bytes.push(0x07),
                b'b' => bytes.push(0x08),
                b'f' => bytes.push(0x0c),
                b'v' => bytes.push(0x0b),
                b'\\' => bytes.push(b'\\'),
                b'"' => bytes.push(b'"'),
                b'0'..=b'7' => {
                    let mut value = u32::from(escape - b'0');
                    let mut digits = 1;
                    while digits < 3 && i < inner.len() && (b'0'..=b'7').contains(&inner[i]) {
                        value = value * 8 + u32::from(inner[i] - b'0');
                        i += 1;
                        digits += 1;
                    }
                    bytes.push(value as u8);
                }
                other => {
                    bytes.push(b'\\');
                    bytes.push(other);
                }
            }
        } else {
            bytes.push(inner[i]);
            i += 1;
        }
    }
    Cow::Owned(String::from_utf8_lossy(&bytes).into_owned())
}

/// Parse `diff --git a/<p> b/<p>`, returning both paths without their
/// `a/`/`b/` prefixes.
///
/// In a non-rename context both sides carry the identical path, so unquoted
/// lines split at the symmetric midpoint; quoted paths are unescaped first.
fn parse_git_header_paths(line: &str) -> Option<(Cow<'_, str>, Cow<'_, str>)> {
    let rest = line.strip_prefix("diff --git ")?;

    if rest.starts_with('"') {
        let first_end = find_closing_quote(rest)?;
        let first = &rest[..=first_end];
        let remainder = rest.get(first_end + 2..)?;
        let a = strip_side_prefix(unquote_c_path(first), "a/");
        let b = strip_side_prefix(unquote_c_path(remainder), "b/");
        return Some((a, b));
    }

    // Symmetric midpoint: "a/X b/X" with both sides equal.
    let n = rest.len();
    if n >= 5 && n % 2 == 1 {
        let mid = n / 2;
        if rest.as_bytes()[mid] == b' '
            && rest.starts_with("a/")
            && rest[mid + 1..].starts_with("b/")
            && rest[2..mid] == rest[mid + 3..]
        {
            return Some((Cow::Borrowed(&rest[2..mid]), Cow::Borrowed(&rest[mid + 3..])));
        }
    }

    // Renames and copies: split at the last " b/" occurrence, which also
    // covers paths containing spaces.
    if let Some(idx) = rest.rfind(" b/") {
        let a = rest[..idx].strip_prefix("a/").unwrap_or(&rest[..idx]);
        let b = &rest[idx + 3..];
        return Some((Cow::Borrowed(a), Cow::Borrowed(b)));
    }

    // One side quoted, the other not.
    let idx = rest.rfind(" \"")?;
    let a = strip_side_prefix(unquote_c_path(&rest[..idx]), "a/");
    let b = strip_side_prefix(unquote_c_path(&rest[idx + 1..]), "b/");
    Some((a, b))
}

/// Index of the closing quote of a leading quoted token, escape-aware.
fn find_closing_quote(s: &str) -> Option<usize> {
    let bytes = s.as_bytes();
    if bytes.first() != Some(&b'"') {
        return None;
    }
    let mut i = 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'"' => return Some(i),
            _ => i += 1,
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_wt(text: &str) -> Vec<Hunk<'_>> {
        parse_diff(text, DiffMode::WorktreeRelative)
    }

    #[test]
    fn hash_construction_is_reproducible() {
        // SHA1("src/main" || 0x00 || "10" || 0x00 || "+added line\n-removed line")
        assert_eq!(
            hunk_sha("src/main", 10, "+added line\n-removed line"),
            "9e4afd8976fc3aa1208d54980086b2242fbc4b4d"
        );
        assert_eq!(
            hunk_sha("src/main", 10, "+added line\n-removed line"),
            hunk_sha("src/main", 10, "+added line\n-removed line"),
        );
    }

    #[test]
    fn parse_simple_modify() {
        let diff = "diff --git a/hello.txt b/hello.txt\n\
                    index 5ab2f8a..de98044 100644\n\
                    --- a/hello.txt\n\
                    +++ b/hello.txt\n\
                    @@ -1,2 +1,3 @@\n \
                    first line\n \
                    second line\n\
                    +third line\n";
        let hunks = parse_wt(diff);
        assert_eq!(hunks.len(), 1);
        let h = &hunks[0];
        assert_eq!(h.file_path, "hello.txt");
        assert_eq!((h.old_start, h.old_count, h.new_start, h.new_count), (1, 2, 1, 3));
        assert_eq!(h.diff_lines, "+third line");
        assert_eq!(h.sha_hex, "138f67d97d6f895aebd717778331c22166c350bb");
        assert_eq!(h.short_sha(), "138f67d");
        assert!(!h.is_new_file && !h.is_deleted_file && !h.is_untracked);
        // Plain modifies re-apply with just the ---/+++ prelude.
        assert_eq!(h.patch_header, "--- a/hello.txt\n+++ b/hello.txt\n");
        assert!(h.raw_lines.starts_with("@@ -1,2 +1,3 @@\n"));
        assert!(h.raw_lines.ends_with("+third line\n"));
    }

    #[test]
    fn parse_is_deterministic() {
        let diff = "diff --git a/a.txt b/a.txt\n\
                    --- a/a.txt\n\
                    +++ b/a.txt\n\
                    @@ -1,3 +1,3 @@\n \
                    alpha\n\
                    -beta\n\
                    +BETA\n \
                    gamma\n";
        let first: Vec<String> = parse_wt(diff).iter().map(|h| format!("{:?}", h)).collect();
        let second: Vec<String> = parse_wt(diff).iter().map(|h| format!("{:?}", h)).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn stable_line_side_depends_on_mode() {
        let diff = "diff --git a/a.txt b/a.txt\n\
                    --- a/a.txt\n\
                    +++ b/a.txt\n\
                    @@ -2,1 +5,1 @@\n\
                    -beta\n\
                    +BETA\n";
        let wt = parse_diff(diff, DiffMode::WorktreeRelative);
        let head = parse_diff(diff, DiffMode::HeadRelative);
        assert_eq!(wt[0].sha_hex, hunk_sha("a.txt", 5, "-beta\n+BETA"));
        assert_eq!(head[0].sha_hex, hunk_sha("a.txt", 2, "-beta\n+BETA"));
    }

    #[test]
    fn hashes_survive_peer_staging() {
        // Three hunks; staging the middle one shifts the old side of the
        // remainder but leaves the worktree side alone.
        let before = "diff --git a/f.txt b/f.txt\n\
                      --- a/f.txt\n\
                      +++ b/f.txt\n\
                      @@ -1,1 +1,2 @@\n \
                      one\n\
                      +uno\n\
                      @@ -10,1 +11,2 @@\n \
                      ten\n\
                      +diez\n\
                      @@ -20,1 +22,2 @@\n \
                      twenty\n\
                      +veinte\n";
        let after = "diff --git a/f.txt b/f.txt\n\
                     --- a/f.txt\n\
                     +++ b/f.txt\n\
                     @@ -1,1 +1,2 @@\n \
                     one\n\
                     +uno\n\
                     @@ -21,1 +22,2 @@\n \
                     twenty\n\
                     +veinte\n";
        let h_before = parse_wt(before);
        let h_after = parse_wt(after);
        assert_eq!(h_before.len(), 3);
        assert_eq!(h_after.len(), 2);
        assert_eq!(h_before[0].sha_hex, h_after[0].sha_hex);
        assert_eq!(h_before[2].sha_hex, h_after[1].sha_hex);
    }

    #[test]
    fn c_quoted_paths_are_unescaped() {
        let diff = "diff --git \"a/dir\\twith\\ttab.txt\" \"b/dir\\twith\\ttab.txt\"\n\
                    --- \"a/dir\\twith\\ttab.txt\"\n\
                    +++ \"b/dir\\twith\\ttab.txt\"\n\
                    @@ -1,1 +1,1 @@\n\
                    -old\n\
                    +x\n";
        let hunks = parse_wt(diff);
        assert_eq!(hunks.len(), 1);
        assert_eq!(hunks[0].file_path, "dir\twith\ttab.txt");
    }

    #[test]
    fn octal_escapes_decode() {
        assert_eq!(unquote_c_path("\"caf\\303\\251.txt\""), "café.txt");
        assert_eq!(unquote_c_path("\"a\\\"b\""), "a\"b");
        assert_eq!(unquote_c_path("plain.txt"), "plain.txt");
    }

    #[test]
    fn new_file_section() {
        let diff = "diff --git a/notes.md b/notes.md\n\
                    new file mode 100644\n\
                    index 0000000..3b18e51\n\
                    --- /dev/null\n\
                    +++ b/notes.md\n\
                    @@ -0,0 +1,2 @@\n\
                    +alpha\n\
                    +beta\n";
        let hunks = parse_wt(diff);
        assert_eq!(hunks.len(), 1);
        let h = &hunks[0];
        assert!(h.is_new_file);
        assert_eq!(h.file_path, "notes.md");
        assert_eq!((h.old_start, h.old_count), (0, 0));
        assert_eq!(h.sha_hex, hunk_sha("notes.md", 1, "+alpha\n+beta"));
        // New files need the whole extended header to re-apply standalone.
        assert!(h.patch_header.starts_with("diff --git a/notes.md b/notes.md\n"));
        assert!(h.patch_header.ends_with("+++ b/notes.md\n"));
    }

    #[test]
    fn deleted_file_section() {
        let diff = "diff --git a/old.txt b/old.txt\n\
                    deleted file mode 100644\n\
                    index 3b18e51..0000000\n\
                    --- a/old.txt\n\
                    +++ /dev/null\n\
                    @@ -1,1 +0,0 @@\n\
                    -gone\n";
        let hunks = parse_wt(diff);
        assert_eq!(hunks.len(), 1);
        assert!(hunks[0].is_deleted_file);
        assert_eq!(hunks[0].file_path, "old.txt");
        assert_eq!((hunks[0].new_start, hunks[0].new_count), (0, 0));
    }

    #[test]
    fn empty_new_file_yields_synthetic_hunk() {
        let diff = "diff --git a/empty.txt b/empty.txt\n\
                    new file mode 100644\n\
                    index 0000000..e69de29\n";
        let hunks = parse_wt(diff);
        assert_eq!(hunks.len(), 1);
        let h = &hunks[0];
        assert_eq!(h.file_path, "empty.txt");
        assert_eq!((h.old_count, h.new_count), (0, 0));
        assert!(h.diff_lines.is_empty());
        assert!(h.raw_lines.is_empty());
        assert_eq!(h.sha_hex, "b02cd0b8efe9d28e9022249c0f444e31671fe010");
        assert!(h.patch_header.contains("--- /dev/null\n+++ b/empty.txt\n"));
        assert!(h.patch_header.starts_with("diff --git a/empty.txt b/empty.txt\n"));
    }

    #[test]
    fn empty_deleted_file_points_new_side_at_dev_null() {
        let diff = "diff --git a/empty.txt b/empty.txt\n\
                    deleted file mode 100644\n\
                    index e69de29..0000000\n";
        let hunks = parse_wt(diff);
        assert_eq!(hunks.len(), 1);
        assert!(hunks[0].is_deleted_file);
        assert!(hunks[0]
            .patch_header
            .contains("--- a/empty.txt\n+++ /dev/null\n"));
    }

    #[test]
    fn binary_sections_are_skipped() {
        let diff = "diff --git a/img.png b/img.png\n\
                    index 1111111..2222222 100644\n\
                    Binary files a/img.png and b/img.png differ\n\
                    diff --git a/a.txt b/a.txt\n\
                    --- a/a.txt\n\
                    +++ b/a.txt\n\
                    @@ -1,1 +1,1 @@\n\
                    -x\n\
                    +y\n";
        let hunks = parse_wt(diff);
        assert_eq!(hunks.len(), 1);
        assert_eq!(hunks[0].file_path, "a.txt");
    }

    #[test]
    fn submodule_sections_are_skipped() {
        let diff = "diff --git a/vendor/lib b/vendor/lib\n\
                    index abc1234..def5678 160000\n\
                    --- a/vendor/lib\n\
                    +++ b/vendor/lib\n\
                    @@ -1 +1 @@\n\
                    -Subproject commit abc\n\
                    +Subproject commit def\n";
        assert!(parse_wt(diff).is_empty());
    }

    #[test]
    fn mode_only_sections_yield_no_hunks() {
        let diff = "diff --git a/run.sh b/run.sh\n\
                    old mode 100644\n\
                    new mode 100755\n";
        assert!(parse_wt(diff).is_empty());
    }

    #[test]
    fn rename_only_sections_yield_no_hunks() {
        let diff = "diff --git a/old.rs b/new.rs\n\
                    similarity index 100%\n\
                    rename from old.rs\n\
                    rename to new.rs\n";
        assert!(parse_wt(diff).is_empty());
    }

    #[test]
    fn rename_with_edit_keeps_full_prelude() {
        let diff = "diff --git a/old.rs b/new.rs\n\
                    similarity index 85%\n\
                    rename from old.rs\n\
                    rename to new.rs\n\
                    index abc1234..def5678 100644\n\
                    --- a/old.rs\n\
                    +++ b/new.rs\n\
                    @@ -1,1 +1,1 @@\n\
                    -fn old() {}\n\
                    +fn new() {}\n";
        let hunks = parse_wt(diff);
        assert_eq!(hunks.len(), 1);
        assert_eq!(hunks[0].file_path, "new.rs");
        assert!(hunks[0].patch_header.contains("rename from old.rs\n"));
    }

    #[test]
    fn zero_context_diff_parses() {
        let diff = "diff --git a/a.txt b/a.txt\n\
                    --- a/a.txt\n\
                    +++ b/a.txt\n\
                    @@ -3,0 +4,1 @@ fn main()\n\
                    +inserted\n";
        let hunks = parse_wt(diff);
        assert_eq!(hunks.len(), 1);
        assert_eq!(hunks[0].old_count, 0);
        assert_eq!(hunks[0].context, "fn main()");
    }

    #[test]
    fn empty_line_is_context_only_before_more_body() {
        // First blank line has body after it (context); second terminates.
        let diff = "diff --git a/a.txt b/a.txt\n\
                    --- a/a.txt\n\
                    +++ b/a.txt\n\
                    @@ -1,3 +1,4 @@\n \
                    x\n\
                    \n\
                    +y\n\
                    \n\
                    not part of the diff\n";
        let hunks = parse_wt(diff);
        assert_eq!(hunks.len(), 1);
        assert!(hunks[0].raw_lines.ends_with("+y\n"));
    }

    #[test]
    fn malformed_hunk_header_aborts_only_that_hunk() {
        let diff = "diff --git a/a.txt b/a.txt\n\
                    --- a/a.txt\n\
                    +++ b/a.txt\n\
                    @@ -nonsense +junk @@\n \
                    stray\n\
                    @@ -1,1 +1,1 @@\n\
                    -x\n\
                    +y\n";
        let hunks = parse_wt(diff);
        assert_eq!(hunks.len(), 1);
        assert_eq!(hunks[0].diff_lines, "-x\n+y");
    }

    #[test]
    fn count_overflow_aborts_only_that_hunk() {
        let diff = "diff --git a/a.txt b/a.txt\n\
                    --- a/a.txt\n\
                    +++ b/a.txt\n\
                    @@ -99999999999,1 +1,1 @@\n\
                    -x\n\
                    +y\n\
                    @@ -5,1 +5,1 @@\n\
                    -p\n\
                    +q\n";
        let hunks = parse_wt(diff);
        assert_eq!(hunks.len(), 1);
        assert_eq!(hunks[0].old_start, 5);
    }

    #[test]
    fn context_only_hunk_is_dropped() {
        let diff = "diff --git a/a.txt b/a.txt\n\
                    --- a/a.txt\n\
                    +++ b/a.txt\n\
                    @@ -1,2 +1,2 @@\n \
                    one\n \
                    two\n";
        assert!(parse_wt(diff).is_empty());
    }

    #[test]
    fn no_newline_marker_joins_diff_lines() {
        let diff = "diff --git a/a.txt b/a.txt\n\
                    --- a/a.txt\n\
                    +++ b/a.txt\n\
                    @@ -1,1 +1,1 @@\n\
                    -old\n\
                    +new\n\
                    \\ No newline at end of file\n";
        let hunks = parse_wt(diff);
        assert_eq!(hunks[0].diff_lines, "-old\n+new\n\\ No newline at end of file");
    }

    #[test]
    fn untracked_diff_flags_hunks() {
        let diff = "diff --git a/scratch.txt b/scratch.txt\n\
                    new file mode 100644\n\
                    index 0000000..9daeafb\n\
                    --- /dev/null\n\
                    +++ b/scratch.txt\n\
                    @@ -0,0 +1 @@\n\
                    +test\n";
        let hunks = parse_untracked_diff(diff);
        assert_eq!(hunks.len(), 1);
        assert!(hunks[0].is_untracked);
        assert!(hunks[0].is_new_file);
    }

    #[test]
    fn multiple_files_keep_file_order() {
        let diff = "diff --git a/a.txt b/a.txt\n\
                    --- a/a.txt\n\
                    +++ b/a.txt\n\
                    @@ -1,1 +1,1 @@\n\
                    -x\n\
                    +y\n\
                    diff --git a/b.txt b/b.txt\n\
                    --- a/b.txt\n\
                    +++ b/b.txt\n\
                    @@ -1,1 +1,1 @@\n\
                    -p\n\
                    +q\n";
        let hunks = parse_wt(diff);
        assert_eq!(hunks.len(), 2);
        assert_eq!(hunks[0].file_path, "a.txt");
        assert_eq!(hunks[1].file_path, "b.txt");
    }

    #[test]
    fn display_range_treats_zero_count_as_one_line() {
        let diff = "diff --git a/a.txt b/a.txt\n\
                    --- a/a.txt\n\
                    +++ b/a.txt\n\
                    @@ -3,2 +3,0 @@\n\
                    -one\n\
                    -two\n";
        let hunks = parse_wt(diff);
        assert_eq!(hunks[0].display_range(DiffMode::WorktreeRelative), (3, 3));
        assert_eq!(hunks[0].display_range(DiffMode::HeadRelative), (3, 4));
    }
}
