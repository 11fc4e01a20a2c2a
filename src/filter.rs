//! URL screening against the configured extension allow-list.

use url::Url;

/// Outcome of screening a submitted URL list
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FilterOutcome {
    /// URLs whose extension is allowed, in input order
    pub accepted: Vec<String>,
    /// Extension of every rejected URL, in input order (duplicates kept)
    pub rejected_extensions: Vec<String>,
}

impl FilterOutcome {
    /// Summary message reported back to the submitter
    pub fn summary(&self) -> String {
        if self.rejected_extensions.is_empty() {
            return "files ok".to_string();
        }
        format!("files ok; skipped: {}", self.rejected_extensions.join(", "))
    }
}

/// Extension of the last path segment, including the leading dot, in its
/// original case.
///
/// The path is taken from the parsed URL so query strings and fragments are
/// ignored; strings that do not parse as URLs are treated as plain paths.
/// Returns an empty string when there is no extension.
pub fn url_extension(raw: &str) -> String {
    let path = match Url::parse(raw) {
        Ok(url) => url.path().to_string(),
        Err(_) => raw.to_string(),
    };

    let name = path.rsplit('/').next().unwrap_or("");
    match name.rfind('.') {
        Some(idx) => name[idx..].to_string(),
        None => String::new(),
    }
}

/// Partition `urls` into accepted and rejected by lower-cased extension.
///
/// `allowed` entries are expected to be lower case with a leading dot, as
/// produced by [`crate::Config::normalized`].
pub fn filter_urls<S: AsRef<str>>(urls: &[S], allowed: &[String]) -> FilterOutcome {
    let mut outcome = FilterOutcome::default();

    for url in urls {
        let url = url.as_ref();
        let ext = url_extension(url).to_lowercase();
        if allowed.iter().any(|a| *a == ext) {
            outcome.accepted.push(url.to_string());
        } else {
            outcome.rejected_extensions.push(ext);
        }
    }

    outcome
}
