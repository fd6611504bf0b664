//! The cached-id env file.
//!
//! A line-oriented `KEY=VALUE` file:
//!
//! ```text
//! OPENAI_API_KEY="sk-..."
//! ASSISTANT_ID="asst_abc"
//! THREAD_ID="thread_abc"
//! VECTOR_STORE_ID="vs_abc"
//! DEFAULT_MODEL="gpt-4o-mini"
//! ```
//!
//! Values may be wrapped in double or single quotes; the quoting of each key is
//! remembered and re-applied when the key is rewritten. Every line keeps its
//! position, and lines that were not touched are written back exactly as they
//! were read.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::{ConfigError, Result};

/// Default env file name, relative to the working directory.
pub const DEFAULT_ENV_FILE: &str = ".env";

// ─────────────────────────────────────────────────────────────────────────────
// Keys
// ─────────────────────────────────────────────────────────────────────────────

/// Keys the client reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnvKey {
    ApiKey,
    AssistantId,
    ThreadId,
    VectorStoreId,
    DefaultModel,
}

impl EnvKey {
    /// All recognized keys, in template order.
    pub const ALL: [EnvKey; 5] = [
        EnvKey::ApiKey,
        EnvKey::AssistantId,
        EnvKey::ThreadId,
        EnvKey::VectorStoreId,
        EnvKey::DefaultModel,
    ];

    /// The variable name as written in the file.
    pub fn as_str(&self) -> &'static str {
        match self {
            EnvKey::ApiKey => "OPENAI_API_KEY",
            EnvKey::AssistantId => "ASSISTANT_ID",
            EnvKey::ThreadId => "THREAD_ID",
            EnvKey::VectorStoreId => "VECTOR_STORE_ID",
            EnvKey::DefaultModel => "DEFAULT_MODEL",
        }
    }

    /// Look up a key by its variable name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == name)
    }
}

impl fmt::Display for EnvKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Parsed file
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
enum Line {
    Pair(Pair),
    /// Blank lines, comments and anything that is not a `KEY=VALUE` pair.
    Verbatim(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Pair {
    key: String,
    value: String,
    quote: Option<char>,
    /// The line as read; dropped once the value changes.
    raw: Option<String>,
    /// `"\r"` for CRLF files, kept when the line is rewritten.
    eol: &'static str,
}

impl Pair {
    fn render(&self) -> String {
        if let Some(raw) = &self.raw {
            return raw.clone();
        }
        match self.quote {
            Some(q) => format!("{}={q}{}{q}{}", self.key, self.value, self.eol),
            None => format!("{}={}{}", self.key, self.value, self.eol),
        }
    }
}

/// An env file held in memory, in original line order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvFile {
    lines: Vec<Line>,
    trailing_newline: bool,
}

impl Default for EnvFile {
    fn default() -> Self {
        Self {
            lines: Vec::new(),
            trailing_newline: true,
        }
    }
}

impl EnvFile {
    /// The file written when none exists: every recognized key, empty and quoted.
    pub fn template() -> Self {
        let mut file = Self::default();
        for key in EnvKey::ALL {
            file.set(key.as_str(), "");
        }
        file
    }

    /// Parse file contents. Never fails; lines that are not pairs are kept as-is.
    pub fn parse(text: &str) -> Self {
        if text.is_empty() {
            return Self::default();
        }

        let trailing_newline = text.ends_with('\n');
        let body = text.strip_suffix('\n').unwrap_or(text);

        let lines = body
            .split('\n')
            .enumerate()
            .map(|(idx, line)| parse_line(idx + 1, line))
            .collect();

        Self {
            lines,
            trailing_newline,
        }
    }

    /// Serialize back to file contents.
    pub fn render(&self) -> String {
        let mut out = self
            .lines
            .iter()
            .map(|line| match line {
                Line::Pair(pair) => pair.render(),
                Line::Verbatim(raw) => raw.clone(),
            })
            .collect::<Vec<_>>()
            .join("\n");
        if self.trailing_newline && !self.lines.is_empty() {
            out.push('\n');
        }
        out
    }

    /// Get the raw value for a key. When a key repeats, the last one wins.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs()
            .filter(|p| p.key == key)
            .last()
            .map(|p| p.value.as_str())
    }

    /// Get a recognized key's value, treating an empty value as unset.
    pub fn value(&self, key: EnvKey) -> Option<&str> {
        self.get(key.as_str()).filter(|v| !v.is_empty())
    }

    /// Set a value, keeping the key's position and quoting.
    ///
    /// Keys not yet in the file are appended with double quotes.
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        let mut found = false;

        for line in &mut self.lines {
            if let Line::Pair(pair) = line
                && pair.key == key
            {
                found = true;
                if pair.value != value {
                    pair.value = value.clone();
                    pair.raw = None;
                }
            }
        }

        if !found {
            let eol = self.pairs().last().map_or("", |p| p.eol);
            self.lines.push(Line::Pair(Pair {
                key: key.to_string(),
                value,
                quote: Some('"'),
                raw: None,
                eol,
            }));
        }
    }

    /// Keys in file order (duplicates included).
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.pairs().map(|p| p.key.as_str())
    }

    fn pairs(&self) -> impl Iterator<Item = &Pair> {
        self.lines.iter().filter_map(|line| match line {
            Line::Pair(pair) => Some(pair),
            Line::Verbatim(_) => None,
        })
    }
}

fn parse_line(line_no: usize, raw: &str) -> Line {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Line::Verbatim(raw.to_string());
    }

    let Some((key, value)) = trimmed.split_once('=') else {
        tracing::warn!(line = line_no, "env file line has no '=', keeping it as-is");
        return Line::Verbatim(raw.to_string());
    };

    let key = key.trim();
    if key.is_empty() {
        tracing::warn!(line = line_no, "env file line has an empty key, keeping it as-is");
        return Line::Verbatim(raw.to_string());
    }

    let value = value.trim();
    let (value, quote) = strip_quotes(value);

    Line::Pair(Pair {
        key: key.to_string(),
        value: value.to_string(),
        quote,
        raw: Some(raw.to_string()),
        eol: if raw.ends_with('\r') { "\r" } else { "" },
    })
}

fn strip_quotes(value: &str) -> (&str, Option<char>) {
    for q in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(q) && value.ends_with(q) {
            return (&value[1..value.len() - 1], Some(q));
        }
    }
    (value, None)
}

// ─────────────────────────────────────────────────────────────────────────────
// Store
// ─────────────────────────────────────────────────────────────────────────────

/// Reads and rewrites the env file at a fixed path.
#[derive(Debug, Clone)]
pub struct EnvStore {
    path: PathBuf,
}

impl EnvStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the template if the file does not exist yet.
    ///
    /// Returns `true` if the file was created.
    pub fn ensure_exists(&self) -> Result<bool> {
        if self.path.exists() {
            return Ok(false);
        }
        self.save(&EnvFile::template())?;
        tracing::info!(path = %self.path.display(), "created env file from template");
        Ok(true)
    }

    /// Load and parse the file.
    pub fn load(&self) -> Result<EnvFile> {
        let contents = std::fs::read_to_string(&self.path).map_err(|e| ConfigError::ReadFile {
            path: self.path.display().to_string(),
            source: e,
        })?;
        Ok(EnvFile::parse(&contents))
    }

    /// Rewrite the whole file.
    pub fn save(&self, file: &EnvFile) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::WriteFile {
                path: parent.display().to_string(),
                source: e,
            })?;
        }

        std::fs::write(&self.path, file.render()).map_err(|e| ConfigError::WriteFile {
            path: self.path.display().to_string(),
            source: e,
        })
    }

    /// Merge `updates` into the file on disk and write it back.
    ///
    /// Keys not mentioned are left untouched. Returns the file as written.
    pub fn update<'a, I>(&self, updates: I) -> Result<EnvFile>
    where
        I: IntoIterator<Item = (EnvKey, &'a str)>,
    {
        let mut file = self.load()?;
        for (key, value) in updates {
            file.set(key.as_str(), value);
        }
        self.save(&file)?;
        tracing::debug!(path = %self.path.display(), "env file updated");
        Ok(file)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const SAMPLE: &str = "OPENAI_API_KEY=\"sk-test\"\n\
                          ASSISTANT_ID=\"asst_X\"\n\
                          THREAD_ID=thread_1\n\
                          \n\
                          # local notes\n\
                          EXTRA_FLAG='on'\n\
                          VECTOR_STORE_ID=\"vs_1\"\n\
                          DEFAULT_MODEL=\"gpt-4o-mini\"\n";

    #[test]
    fn test_template_contents() {
        assert_eq!(
            EnvFile::template().render(),
            "OPENAI_API_KEY=\"\"\nASSISTANT_ID=\"\"\nTHREAD_ID=\"\"\nVECTOR_STORE_ID=\"\"\nDEFAULT_MODEL=\"\"\n"
        );
    }

    #[test]
    fn test_parse_strips_quotes() {
        let file = EnvFile::parse(SAMPLE);
        assert_eq!(file.get("OPENAI_API_KEY"), Some("sk-test"));
        assert_eq!(file.get("THREAD_ID"), Some("thread_1"));
        assert_eq!(file.get("EXTRA_FLAG"), Some("on"));
        assert_eq!(file.value(EnvKey::AssistantId), Some("asst_X"));
    }

    #[test]
    fn test_round_trip_is_byte_identical() {
        for text in [
            SAMPLE,
            "A=1",
            "A = spaced \n\nB=\"x\"\r\n",
            "not a pair\nA=1\n=novalue\n",
            "",
        ] {
            assert_eq!(EnvFile::parse(text).render(), text);
        }
    }

    #[test]
    fn test_set_keeps_order_and_quoting() {
        let mut file = EnvFile::parse(SAMPLE);
        file.set("THREAD_ID", "thread_2");
        file.set("ASSISTANT_ID", "asst_Y");
        file.set("EXTRA_FLAG", "off");

        let expected = SAMPLE
            .replace("THREAD_ID=thread_1", "THREAD_ID=thread_2")
            .replace("ASSISTANT_ID=\"asst_X\"", "ASSISTANT_ID=\"asst_Y\"")
            .replace("EXTRA_FLAG='on'", "EXTRA_FLAG='off'");
        assert_eq!(file.render(), expected);
    }

    #[test]
    fn test_set_same_value_keeps_raw_line() {
        let mut file = EnvFile::parse("A =  1\n");
        file.set("A", "1");
        assert_eq!(file.render(), "A =  1\n");
    }

    #[test]
    fn test_set_keeps_crlf_line_endings() {
        let mut file = EnvFile::parse("A=\"1\"\r\nB=2\r\n");
        file.set("A", "3");
        file.set("B", "4");
        file.set("DEFAULT_MODEL", "gpt-4o");
        assert_eq!(
            file.render(),
            "A=\"3\"\r\nB=4\r\nDEFAULT_MODEL=\"gpt-4o\"\r\n"
        );
    }

    #[test]
    fn test_set_appends_unknown_key() {
        let mut file = EnvFile::parse("A=1\n");
        file.set("DEFAULT_MODEL", "gpt-4o");
        assert_eq!(file.render(), "A=1\nDEFAULT_MODEL=\"gpt-4o\"\n");
    }

    #[test]
    fn test_empty_value_is_unset() {
        let file = EnvFile::template();
        assert_eq!(file.get("THREAD_ID"), Some(""));
        assert_eq!(file.value(EnvKey::ThreadId), None);
    }

    #[test]
    fn test_malformed_lines_are_kept() {
        let file = EnvFile::parse("garbage\n=x\nA=1\n");
        assert_eq!(file.keys().collect::<Vec<_>>(), vec!["A"]);
        assert_eq!(file.render(), "garbage\n=x\nA=1\n");
    }

    #[test]
    fn test_duplicate_key_last_wins_and_set_updates_all() {
        let mut file = EnvFile::parse("A=1\nA=2\n");
        assert_eq!(file.get("A"), Some("2"));
        file.set("A", "3");
        assert_eq!(file.render(), "A=3\nA=3\n");
    }

    #[test]
    fn test_key_from_name() {
        assert_eq!(EnvKey::from_name("THREAD_ID"), Some(EnvKey::ThreadId));
        assert_eq!(EnvKey::from_name("NOPE"), None);
    }

    #[test]
    fn test_ensure_exists_writes_template_once() {
        let dir = TempDir::new().unwrap();
        let store = EnvStore::new(dir.path().join(".env"));

        assert!(store.ensure_exists().unwrap());
        fs::write(store.path(), "A=1\n").unwrap();
        assert!(!store.ensure_exists().unwrap());
        assert_eq!(fs::read_to_string(store.path()).unwrap(), "A=1\n");
    }

    #[test]
    fn test_load_missing_file() {
        let store = EnvStore::new("/nonexistent/dir/.env");
        assert!(matches!(store.load(), Err(ConfigError::ReadFile { .. })));
    }

    #[test]
    fn test_update_rewrites_only_named_keys() {
        let dir = TempDir::new().unwrap();
        let store = EnvStore::new(dir.path().join(".env"));
        fs::write(store.path(), SAMPLE).unwrap();

        store.update([(EnvKey::AssistantId, "asst_new")]).unwrap();

        let written = fs::read_to_string(store.path()).unwrap();
        assert_eq!(
            written,
            SAMPLE.replace("ASSISTANT_ID=\"asst_X\"", "ASSISTANT_ID=\"asst_new\"")
        );
    }

    #[test]
    fn test_update_without_changes_is_byte_identical() {
        let dir = TempDir::new().unwrap();
        let store = EnvStore::new(dir.path().join(".env"));
        fs::write(store.path(), SAMPLE).unwrap();

        store.update(Vec::<(EnvKey, &str)>::new()).unwrap();
        assert_eq!(fs::read_to_string(store.path()).unwrap(), SAMPLE);
    }
}
