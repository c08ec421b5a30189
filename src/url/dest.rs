use crate::UrlError;
use std::path::{Path, PathBuf};
use url::Url;

/// Maps a remote URL onto the local directory that mirrors its remote parent.
///
/// The host (with its explicit port, when present) becomes the top-level
/// folder under `output_root`; the remaining path segments become nested
/// folders. When the URL names a file (final segment contains a dot and the
/// URL has no trailing separator) that final segment is dropped.
///
/// # Arguments
///
/// * `output_root` - Root of the local mirror tree
/// * `url` - The remote URL to map
///
/// # Returns
///
/// * `Ok(PathBuf)` - The destination directory for this URL
/// * `Err(UrlError)` - The URL could not be parsed or has no host
pub fn destination_dir(output_root: &Path, url: &str) -> Result<PathBuf, UrlError> {
    let parsed = Url::parse(url)?;
    let host = host_component(&parsed).ok_or_else(|| UrlError::MissingHost(url.to_string()))?;

    let segments: Vec<&str> = parsed
        .path()
        .split('/')
        .filter(|s| !s.is_empty())
        .collect();

    let keep = match segments.last() {
        Some(last) if last.contains('.') && !url.ends_with('/') => segments.len() - 1,
        Some(_) => segments.len(),
        None => 0,
    };

    let mut dir = output_root.join(host);
    for segment in &segments[..keep] {
        dir.push(segment);
    }

    Ok(dir)
}

/// Host portion of a URL including an explicit port, e.g. `127.0.0.1:8080`.
pub fn host_component(url: &Url) -> Option<String> {
    let host = url.host_str()?;
    match url.port() {
        Some(port) => Some(format!("{host}:{port}")),
        None => Some(host.to_string()),
    }
}

/// Final path segment of a URL, if it names a file.
///
/// Returns None when the URL ends with a separator (a directory).
pub fn file_name(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let name = parsed.path_segments()?.last()?;
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

/// The directory URL enclosing `url`, keeping a trailing separator.
pub fn parent_directory_url(url: &str) -> String {
    match url.rfind('/') {
        Some(idx) => url[..=idx].to_string(),
        None => url.to_string(),
    }
}

/// Appends a trailing separator to URLs that name a directory without one.
///
/// A URL whose final path segment carries an extension is left alone.
pub fn ensure_directory_url(url: &str) -> String {
    if url.ends_with('/') {
        return url.to_string();
    }

    let basename_has_dot = match Url::parse(url) {
        Ok(parsed) => parsed
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .map(|last| last.contains('.'))
            .unwrap_or(false),
        Err(_) => false,
    };

    if basename_has_dot {
        url.to_string()
    } else {
        format!("{url}/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_destination_for_directory_url() {
        let dir = destination_dir(Path::new("/tmp/out"), "https://example.org/data/2024/").unwrap();
        assert_eq!(dir, Path::new("/tmp/out/example.org/data/2024"));
    }

    #[test]
    fn test_destination_drops_file_name() {
        let dir =
            destination_dir(Path::new("/tmp/out"), "https://example.org/data/file1.csv").unwrap();
        assert_eq!(dir, Path::new("/tmp/out/example.org/data"));
    }

    #[test]
    fn test_destination_keeps_dotted_segment_with_trailing_slash() {
        let dir =
            destination_dir(Path::new("/tmp/out"), "https://example.org/v1.2/data/").unwrap();
        assert_eq!(dir, Path::new("/tmp/out/example.org/v1.2/data"));
    }

    #[test]
    fn test_destination_includes_explicit_port() {
        let dir = destination_dir(Path::new("/tmp/out"), "http://127.0.0.1:8080/data/").unwrap();
        assert_eq!(dir, Path::new("/tmp/out/127.0.0.1:8080/data"));
    }

    #[test]
    fn test_destination_for_host_root() {
        let dir = destination_dir(Path::new("/tmp/out"), "https://example.org/").unwrap();
        assert_eq!(dir, Path::new("/tmp/out/example.org"));
    }

    #[test]
    fn test_destination_rejects_hostless_url() {
        let result = destination_dir(Path::new("/tmp/out"), "file:///etc/passwd");
        assert!(matches!(result, Err(UrlError::MissingHost(_))));
    }

    #[test]
    fn test_file_name_of_file_url() {
        assert_eq!(
            file_name("https://example.org/data/file1.csv"),
            Some("file1.csv".to_string())
        );
    }

    #[test]
    fn test_file_name_of_directory_url() {
        assert_eq!(file_name("https://example.org/data/"), None);
        assert_eq!(file_name("https://example.org/"), None);
    }

    #[test]
    fn test_parent_directory_url() {
        assert_eq!(
            parent_directory_url("http://example.org/data/file1.csv"),
            "http://example.org/data/"
        );
    }

    #[test]
    fn test_parent_directory_url_of_directory_is_itself() {
        assert_eq!(
            parent_directory_url("http://example.org/data/"),
            "http://example.org/data/"
        );
    }

    #[test]
    fn test_ensure_directory_url_appends_slash() {
        assert_eq!(
            ensure_directory_url("https://example.org/data"),
            "https://example.org/data/"
        );
    }

    #[test]
    fn test_ensure_directory_url_keeps_existing_slash() {
        assert_eq!(
            ensure_directory_url("https://example.org/data/"),
            "https://example.org/data/"
        );
    }

    #[test]
    fn test_ensure_directory_url_leaves_file_urls_alone() {
        assert_eq!(
            ensure_directory_url("https://example.org/data/file1.csv"),
            "https://example.org/data/file1.csv"
        );
    }
}
