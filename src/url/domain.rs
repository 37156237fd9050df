use url::Url;

/// Returns the network location (`host[:port]`) of a URL
///
/// Default ports are omitted by the URL parser, so `https://example.com:443/`
/// and `https://example.com/` share the same network location.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use sumi_sweep::url::netloc;
///
/// let url = Url::parse("http://Example.com:8080/path").unwrap();
/// assert_eq!(netloc(&url), Some("example.com:8080".to_string()));
/// ```
pub fn netloc(url: &Url) -> Option<String> {
    let host = url.host_str()?;
    Some(match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    })
}

/// Returns the origin (`scheme://host[:port]`) of a URL, used to key robots.txt
pub fn origin_of(url: &Url) -> Option<String> {
    netloc(url).map(|loc| format!("{}://{}", url.scheme(), loc))
}

/// Checks whether two URLs share the same network location
///
/// This is the in-domain test: subdomains and other ports are different domains.
pub fn is_same_domain(a: &Url, b: &Url) -> bool {
    match (netloc(a), netloc(b)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}
