//! URL helper functions

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::config::SiteConfig;

/// Everything but unreserved characters is encoded inside a path segment
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Generate a URL with the root path
///
/// # Examples
/// ```ignore
/// url_for(&config, "/post/hello") // -> "/blog/post/hello"
/// ```
pub fn url_for(config: &SiteConfig, path: &str) -> String {
    let root = config.root.trim_end_matches('/');
    let path = path.trim_start_matches('/');

    if path.is_empty() {
        format!("{}/", root)
    } else {
        format!("{}/{}", root, path)
    }
}

/// Generate a full URL including the domain
///
/// # Examples
/// ```ignore
/// full_url_for(&config, "/user/ada") // -> "https://example.com/blog/user/ada"
/// ```
pub fn full_url_for(config: &SiteConfig, path: &str) -> String {
    let base = config.url.trim_end_matches('/');
    format!("{}{}", base, url_for(config, path))
}

/// Encode a slug as one URL path segment
pub fn encode_segment(slug: &str) -> String {
    utf8_percent_encode(slug, PATH_SEGMENT).to_string()
}

/// Route of an article page
pub fn post_path(slug: &str) -> String {
    format!("/post/{}", encode_segment(slug))
}

/// Route of an author page
pub fn author_path(slug: &str) -> String {
    format!("/user/{}", encode_segment(slug))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> SiteConfig {
        SiteConfig {
            url: "https://example.com".to_string(),
            root: "/blog/".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_url_for() {
        let config = test_config();
        assert_eq!(url_for(&config, "/post/hello"), "/blog/post/hello");
        assert_eq!(url_for(&config, ""), "/blog/");
    }

    #[test]
    fn test_routes_encode_slug() {
        assert_eq!(post_path("learning-rust"), "/post/learning-rust");
        assert_eq!(author_path("ada_l.v2~x"), "/user/ada_l.v2~x");
        assert_eq!(
            post_path(r#"x" onmouseover="alert(1)"#),
            "/post/x%22%20onmouseover%3D%22alert%281%29"
        );
        assert_eq!(post_path("../a/b"), "/post/..%2Fa%2Fb");
    }

    #[test]
    fn test_full_url_for() {
        let config = test_config();
        assert_eq!(
            full_url_for(&config, &author_path("ada")),
            "https://example.com/blog/user/ada"
        );
    }
}
