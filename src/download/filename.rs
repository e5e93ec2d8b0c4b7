//! Destination resolution for downloads.
//!
//! Derives the output path from the explicit destination argument and the
//! response's Content-Disposition header.

use std::path::{Path, PathBuf};

/// Resolves the destination path for a download.
///
/// Priority order:
/// 1. An explicit destination that is not a directory is used as-is.
/// 2. An explicit directory is joined with the Content-Disposition filename.
/// 3. With no explicit destination, the Content-Disposition filename alone.
///
/// Returns `None` when no usable filename can be resolved, or when the
/// resolved path is itself a directory (including paths written with a
/// trailing separator).
pub(crate) fn resolve_destination(
    explicit: Option<&Path>,
    content_disposition: Option<&str>,
) -> Option<PathBuf> {
    let header_name = content_disposition
        .and_then(parse_content_disposition)
        .map(|name| sanitize_filename(&name))
        .filter(|name| !name.trim_matches('_').is_empty());

    let resolved = match explicit {
        Some(path) if path.is_dir() => path.join(header_name?),
        Some(path) => path.to_path_buf(),
        None => PathBuf::from(header_name?),
    };

    if resolved.is_dir() || ends_with_separator(&resolved) {
        return None;
    }
    Some(resolved)
}

fn ends_with_separator(path: &Path) -> bool {
    path.to_str()
        .is_some_and(|s| s.ends_with(['/', std::path::MAIN_SEPARATOR]))
}

/// Pulls the attachment filename out of a Content-Disposition value.
///
/// The extended `filename*=` form (RFC 5987, percent-encoded) wins over the
/// plain `filename=` form, which may be quoted or bare. Returns `None` when
/// neither parameter is present.
pub(crate) fn parse_content_disposition(header: &str) -> Option<String> {
    // filename*=charset'lang'percent-encoded-name
    if let Some(pos) = header.find("filename*=") {
        let value = header[pos + 10..].trim();
        if let Some(quote_pos) = value.find("''") {
            let encoded = &value[quote_pos + 2..];
            let end = encoded.find(';').unwrap_or(encoded.len());
            if let Ok(decoded) = urlencoding::decode(encoded[..end].trim()) {
                return Some(decoded.into_owned());
            }
        }
    }

    let pos = header.find("filename=")?;
    let value = header[pos + 9..].trim();
    if let Some(quoted) = value.strip_prefix('"') {
        let end = quoted.find('"')?;
        return Some(quoted[..end].to_string());
    }
    let end = value.find(';').unwrap_or(value.len());
    let filename = value[..end].trim();
    if filename.is_empty() {
        None
    } else {
        Some(filename.to_string())
    }
}

/// Makes a server-provided name safe to use as a local filename.
///
/// Path separators, the punctuation Windows refuses, and control characters
/// all become underscores; a name reduced to nothing becomes `"_"`.
pub(crate) fn sanitize_filename(name: &str) -> String {
    let sanitized: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    if sanitized.is_empty() {
        "_".to_string()
    } else {
        sanitized
    }
}
