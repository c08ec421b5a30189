use std::path::{Component, Path};

/// Reconstitutes the remote URL a mirrored file was downloaded from.
///
/// The path must be relative to the mirror root: its first component is taken
/// as the host and the remainder as the remote path. The original scheme
/// cannot be recovered from disk, so `https` is assumed.
///
/// Returns None for paths with fewer than two components, which cannot have
/// come from a mirrored download.
pub fn url_from_relative_path(rel: &Path) -> Option<String> {
    let mut components = rel.components().filter_map(|c| match c {
        Component::Normal(part) => part.to_str(),
        _ => None,
    });

    let host = components.next()?;
    let rest: Vec<&str> = components.collect();
    if rest.is_empty() {
        return None;
    }

    Some(format!("https://{}/{}", host, rest.join("/")))
}
