use std::fmt::{Display, Formatter};

/// The file name component of an object key.
#[derive(Debug, Clone, Copy)]
pub enum FileName<'a> {
    /// `{hash}_{size}.{format}`
    Variant {
        hash: &'a str,
        size_name: &'a str,
        format: &'a str,
    },

    /// `{hash}{ext}`, the extension includes its leading dot.
    Original { hash: &'a str, ext: &'a str },
}

impl<'a> Display for FileName<'a> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Variant {
                hash,
                size_name,
                format,
            } => write!(f, "{}_{}.{}", hash, size_name, format),
            Self::Original { hash, ext } => write!(f, "{}{}", hash, ext),
        }
    }
}

/// Joins the optional root path with the file name.
pub fn to_key(root_path: Option<&str>, name: &FileName) -> String {
    match root_path.filter(|p| !p.is_empty()) {
        Some(root) => format!("{}/{}", root, name),
        None => name.to_string(),
    }
}

#[inline]
pub fn to_url(base_url: &str, key: &str) -> String {
    format!("{}/{}", base_url, key)
}

/// The exact inverse of `to_url`.
///
/// Returns `None` for URLs which do not live under `base_url`, those
/// objects are not owned by this store.
pub fn to_key_from_url<'a>(base_url: &str, url: &'a str) -> Option<&'a str> {
    url.strip_prefix(base_url)?.strip_prefix('/')
}

/// An explicitly configured base URL is used verbatim, otherwise
/// the store's own public URL is.
pub fn resolve_base_url(explicit: Option<&str>, store_default: impl FnOnce() -> String) -> String {
    match explicit {
        Some(url) => url.to_string(),
        None => store_default(),
    }
}
