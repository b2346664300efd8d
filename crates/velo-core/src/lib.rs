//! # Velo Core Library
//!
//! This crate provides the note-index synchronization engine for Velo: an
//! in-memory index of plain-text notes stored as files in a directory
//! tree, kept consistent with concurrent filesystem changes and searchable
//! by substring over titles and contents.
//!
//! ## Architecture
//!
//! - **Notebook** (`notebook`): the owning collection, mutation API, and
//!   path/title validation
//! - **Note** (`note`): one note backed by one file, with read-through
//!   contents and modification time
//! - **Search** (`search`): the pluggable matching strategy
//! - **Watcher** (`watcher`): the bridge translating filesystem events
//!   into index mutations
//! - **Config** (`config`): configuration management
//!
//! ## Example
//!
//! ```rust,no_run
//! use velo_core::{Config, Notebook};
//!
//! let notebook = Notebook::open(&Config::default())?;
//! notebook.add("groceries.txt")?;
//! for note in notebook.search("groceries") {
//!     println!("{}: {}", note.title(), note.contents());
//! }
//! notebook.close();
//! # Ok::<(), velo_core::VeloError>(())
//! ```

pub mod config;
pub mod error;
pub mod note;
pub mod notebook;
pub mod search;

mod watcher;

// Re-export commonly used types
pub use config::Config;
pub use error::{Result, VeloError};
pub use note::Note;
pub use notebook::Notebook;
pub use search::{BruteForce, SearchStrategy};
