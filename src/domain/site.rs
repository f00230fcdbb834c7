use url::{ParseError, Url};

/// Lower-cased host of `url` with a leading `www.` removed.
///
/// A bare domain such as `acme.com/pricing` is read as a host. Returns an empty
/// string when nothing host-like can be found.
pub fn canonical_host(url: &str) -> String {
    let url = url.trim();
    let host = match Url::parse(url) {
        Ok(parsed_url) => parsed_url.host_str().unwrap_or("").to_lowercase(),
        Err(ParseError::RelativeUrlWithoutBase) => bare_host(url),
        Err(_) => "".to_string(),
    };

    match host.strip_prefix("www.") {
        Some(h) => h.to_string(),
        None => host,
    }
}

fn bare_host(url: &str) -> String {
    if url.starts_with(['/', '#', '?']) {
        return "".to_string();
    }
    let host = url.split(['/', '?', '#']).next().unwrap_or("");

    match host.is_empty() || host.contains(char::is_whitespace) {
        true => "".to_string(),
        false => host.to_lowercase(),
    }
}

/// True when `link` lives on the same site as `root`, subdomains included.
pub fn same_site(root: &str, link: &str) -> bool {
    let root_host = canonical_host(root);
    let link_host = canonical_host(link);

    if root_host.is_empty() || link_host.is_empty() {
        return false;
    }

    root_host == link_host || link_host.ends_with(&format!(".{}", root_host))
}

/// Identity key for a discovered page: scheme, canonical host, port, path and query.
/// The fragment and any trailing slash are dropped.
pub fn canonical_link(url: &str) -> String {
    match Url::parse(url.trim()) {
        Ok(parsed_url) => {
            let host = canonical_host(url);
            let port = match parsed_url.port() {
                Some(p) => format!(":{}", p),
                None => "".to_string(),
            };
            let path = parsed_url.path().trim_end_matches('/');
            let query = match parsed_url.query() {
                Some(q) if !q.is_empty() => format!("?{}", q),
                _ => "".to_string(),
            };

            format!("{}://{}{}{}{}", parsed_url.scheme(), host, port, path, query)
        }
        Err(_) => url.trim().to_string(),
    }
}

pub fn is_http_url(url: &str) -> bool {
    let lowered = url.trim().to_lowercase();
    lowered.starts_with("http://") || lowered.starts_with("https://")
}
