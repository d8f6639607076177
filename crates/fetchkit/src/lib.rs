//! # fetchkit
//!
//! Blocking fetch and filesystem services for resources that download
//! files.
//!
//! - [`Fetcher`] opens a byte stream for an http(s) URI; [`HttpFetcher`]
//!   does it over the network, [`MockFetcher`] from memory.
//! - [`FileSystem`] creates directories, writes streams to disk, sets
//!   permissions and deletes files; [`LocalFs`] uses `std::fs`.
//!
//! Errors keep transport failures ([`Error::Status`], [`Error::Transport`], [`Error::Read`])
//! apart from filesystem ones ([`Error::Io`]); see [`ErrorCategory`].
//!
//! ## Example
//!
//! ```no_run
//! use fetchkit::{FileSystem, Fetcher, HttpFetcher, LocalFs};
//! use std::path::Path;
//!
//! let fetcher = HttpFetcher::new();
//! let mut body = fetcher.open("https://example.com/tool.tar.gz").unwrap();
//! LocalFs.write_from(Path::new("/tmp/tool.tar.gz"), &mut body).unwrap();
//! ```

#![warn(missing_docs)]

pub mod error;
pub mod fetch;
pub mod fs;

pub use error::{Error, ErrorCategory, Result};
pub use fetch::{
    DEFAULT_USER_AGENT, Fetcher, HttpFetcher, MockFetcher, MockResponse, check_http_uri,
};
pub use fs::{FileSystem, LocalFs};
