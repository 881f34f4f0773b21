// src/mapping/config_file.rs
use crate::error::Result;
use std::fs;
use std::path::{Path, PathBuf};

/// A token together with the 1-based line it came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    pub line: usize,
}

/// Splits a plain-text configuration file into tokens.
///
/// Everything after the comment character on a line is ignored; tokens are
/// separated by any of the delimiter characters or by line breaks.
pub struct ConfigTokenizer {
    path: PathBuf,
    tokens: std::vec::IntoIter<Token>,
}

impl ConfigTokenizer {
    pub const COMMENT: char = '#';
    pub const WHITESPACE: &'static str = " \t";
    pub const MAP_DELIMITERS: &'static str = ", \t";

    pub fn open(path: impl AsRef<Path>, delimiters: &str) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        Ok(Self::from_content(path, &content, delimiters))
    }

    /// Tokenize `content` as if it had been read from `path`
    pub fn from_content(path: impl Into<PathBuf>, content: &str, delimiters: &str) -> Self {
        let mut tokens = Vec::new();
        for (index, line) in content.lines().enumerate() {
            let line_text = match line.find(Self::COMMENT) {
                Some(pos) => &line[..pos],
                None => line,
            };
            tokens.extend(
                line_text
                    .split(|c: char| delimiters.contains(c) || c == '\r')
                    .filter(|s| !s.is_empty())
                    .map(|s| Token {
                        text: s.to_string(),
                        line: index + 1,
                    }),
            );
        }
        ConfigTokenizer {
            path: path.into(),
            tokens: tokens.into_iter(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn next_token(&mut self) -> Option<Token> {
        self.tokens.next()
    }
}
