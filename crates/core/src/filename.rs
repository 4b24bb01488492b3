//! Human-readable download names derived from source URLs.

use std::sync::LazyLock;

use regex::Regex;
use url::Url;

/// Name used whenever a URL cannot be turned into something nicer.
pub const FALLBACK_FILENAME: &str = "page";

const MAX_FILENAME_LEN: usize = 100;

static DISALLOWED: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^A-Za-z0-9-]").expect("static regex"));
static DISALLOWED_HOST: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^a-z0-9.-]").expect("static regex"));
static HYPHEN_RUNS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"-{2,}").expect("static regex"));

/// Derive a file stem (no extension) from a URL.
///
/// `https://www.Example.com/foo/bar/` becomes `example.com-foo-bar`. Returns
/// [`FALLBACK_FILENAME`] when the input is not a URL or has no host.
pub fn generate_filename_from_url(url: &str) -> String {
    derive(url).unwrap_or_else(|| FALLBACK_FILENAME.to_string())
}

fn derive(url: &str) -> Option<String> {
    let parsed = Url::parse(url.trim()).ok()?;
    let host = parsed.host_str()?.to_lowercase();
    let host = host.strip_prefix("www.").unwrap_or(&host);
    let host = DISALLOWED_HOST.replace_all(host, "");
    let host = host.trim_matches(['-', '.']);
    if host.is_empty() {
        return None;
    }

    let path = parsed.path().replace('/', "-");
    let path = DISALLOWED.replace_all(&path, "");
    let path = HYPHEN_RUNS.replace_all(&path, "-");
    let path = path.trim_matches('-');

    let mut name = if path.is_empty() { host.to_string() } else { format!("{host}-{path}") };
    // host is punycode and the path is ASCII by now, so byte truncation is safe
    name.truncate(MAX_FILENAME_LEN);
    let trimmed = name.trim_end_matches('-').len();
    name.truncate(trimmed);
    Some(name)
}
