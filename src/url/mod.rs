//! URL handling module for geomirror
//!
//! This module maps remote URLs onto the local mirror tree and back. URLs are
//! treated as verbatim string identities throughout the crate: no
//! normalization is performed, so `http://` and `https://` variants of the
//! same resource remain distinct.

mod dest;
mod rebuild;

// Re-export main functions
pub use dest::{
    destination_dir, ensure_directory_url, file_name, host_component, parent_directory_url,
};
pub use rebuild::url_from_relative_path;
