use crate::token::TokenKind;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

/// Error raised while opening a save archive or extracting its `gamestate` entry.
#[derive(Debug)]
pub enum ArchiveError {
    /// The zip container itself could not be opened or read.
    ArchiveBad(String),
    /// The archive has no entry literally named `gamestate`.
    EntryMissing,
    /// The `gamestate` entry is not valid UTF-8.
    DecodeBad(std::str::Utf8Error),
}

impl Display for ArchiveError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ArchiveError::ArchiveBad(message) => write!(f, "ArchiveBad: {}", message),
            ArchiveError::EntryMissing => write!(f, "EntryMissing: no 'gamestate' entry in archive"),
            ArchiveError::DecodeBad(err) => write!(f, "DecodeBad: {}", err),
        }
    }
}

impl std::error::Error for ArchiveError {}

/// Error raised while tokenizing or parsing a document.
#[derive(Debug)]
pub enum DocumentError {
    /// The tokenizer could not advance at `offset`; `excerpt` is a short slice of the
    /// surrounding input for diagnosis.
    LexStuck { offset: usize, line: usize, excerpt: String },
    /// A key was expected but a different token kind was found.
    ExpectKey { line: usize, found: TokenKind },
    /// `=` was expected but a different token kind was found.
    ExpectEqual { line: usize, found: TokenKind },
    /// A literal or `{` was expected but a different token kind was found.
    ExpectValue { line: usize, found: TokenKind },
    /// The token stream ended before the current production could complete.
    UnexpectedEof { line: usize },
}

impl Display for DocumentError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            DocumentError::LexStuck { offset, line, excerpt } => write!(
                f,
                "LexStuck: cannot advance at byte offset {} (line {}): {:?}",
                offset, line, excerpt
            ),
            DocumentError::ExpectKey { line, found } => {
                write!(f, "ExpectKey: line {}: expected a string or integer key, found {}", line, found)
            }
            DocumentError::ExpectEqual { line, found } => {
                write!(f, "ExpectEqual: line {}: expected '=', found {}", line, found)
            }
            DocumentError::ExpectValue { line, found } => write!(
                f,
                "ExpectValue: line {}: expected a literal or '{{', found {}",
                line, found
            ),
            DocumentError::UnexpectedEof { line } => {
                write!(f, "UnexpectedEof: line {}: input ended before production completed", line)
            }
        }
    }
}

impl std::error::Error for DocumentError {}

/// The per-file error descriptor yielded by the dispatcher in place of a parse tree.
#[derive(Debug)]
pub enum SaveParseError {
    Archive(ArchiveError),
    Document(DocumentError),
}

impl Display for SaveParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            SaveParseError::Archive(err) => Display::fmt(err, f),
            SaveParseError::Document(err) => Display::fmt(err, f),
        }
    }
}

impl std::error::Error for SaveParseError {}

impl From<ArchiveError> for SaveParseError {
    fn from(err: ArchiveError) -> Self {
        SaveParseError::Archive(err)
    }
}

impl From<DocumentError> for SaveParseError {
    fn from(err: DocumentError) -> Self {
        SaveParseError::Document(err)
    }
}

/// A `SaveParseError` together with the file it was produced for, as yielded by the dispatcher.
#[derive(Debug)]
pub struct SaveFileError {
    pub path: PathBuf,
    pub error: SaveParseError,
}

impl Display for SaveFileError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path.display(), self.error)
    }
}

impl std::error::Error for SaveFileError {}
