//! `clausewitz-doc` is a tokenizer and recursive-descent parser for the plain-text save-document
//! format used by Clausewitz-engine grand strategy games, plus a small pipeline for finding save
//! files on disk and parsing a batch of them in parallel.
//!
//! # Overview
//!
//! A save document is a flat text format built from three pieces: scalars (integers, floats, and
//! bare or quoted strings), `{ ... }` blocks that are either sequences or mappings depending on
//! their contents, and `key = value` pairs. There is no distinguished root container — the top
//! level of a document is itself a sequence of `key = value` pairs running to end of input. The
//! format additionally merges repeated keys at the same mapping level into a growing sequence (see
//! [`Mapping::insert_or_merge`]) rather than letting the later occurrence shadow the earlier one.
//!
//! # Example
//!
//! ```
//! use clausewitz_doc::{parse_document, Key, Lexer, Node};
//!
//! let text = "name=\"Stellar Empire\"\nplanets={ 1 2 3 }\n";
//! let root = parse_document(Lexer::new(text)).unwrap();
//! assert_eq!(root.get(&Key::String("name".into())), Some(&Node::String("Stellar Empire".into())));
//! assert_eq!(
//!     root.get(&Key::String("planets".into())),
//!     Some(&Node::Sequence(vec![Node::Integer(1), Node::Integer(2), Node::Integer(3)]))
//! );
//! ```
//!
//! # Pipeline
//!
//! [`SavePathMonitor`] finds candidate save files under a directory tree and remembers which ones
//! have already been handed off; [`ParallelDispatcher`] turns a batch of paths into a stream of
//! `(game_identifier, outcome)` pairs, reading each archive, tokenizing and parsing its
//! `gamestate` entry on a worker pool, and isolating per-file failures so one bad save does not
//! stop the batch.

mod archive;
mod dispatch;
mod error;
mod excerpt;
mod lexer;
mod monitor;
mod node;
mod parser;
mod token;

pub use archive::read_gamestate;
pub use dispatch::{DispatchItem, DispatcherConfig, ParallelDispatcher};
pub use error::{ArchiveError, DocumentError, SaveFileError, SaveParseError};
pub use lexer::Lexer;
pub use monitor::{game_identifier, MonitorConfig, SavePathMonitor};
pub use node::{Key, Mapping, Node};
pub use parser::parse_document;
pub use token::{Token, TokenKind};

use std::path::Path;

/// Read, tokenize, and parse the `gamestate` entry of the save archive at `path` in one step.
/// Equivalent to calling [`read_gamestate`], [`Lexer::new`], and [`parse_document`] in sequence,
/// composing their errors into a single [`SaveParseError`].
pub fn parse_save_file(path: &Path) -> Result<Mapping, SaveParseError> {
    let text = read_gamestate(path)?;
    let root = parse_document(Lexer::new(&text))?;
    Ok(root)
}
