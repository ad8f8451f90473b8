//! URL helpers for building service endpoints.

/// Strip trailing slashes so endpoint paths can be appended safely.
///
/// # Examples
///
/// ```
/// use lilith::utils::url::normalize_base_url;
///
/// assert_eq!(normalize_base_url("http://localhost:5000/"), "http://localhost:5000");
/// assert_eq!(normalize_base_url("http://localhost:5000"), "http://localhost:5000");
/// ```
pub fn normalize_base_url(base_url: &str) -> String {
    base_url.trim_end_matches('/').to_string()
}

/// Join an endpoint path onto a base URL with exactly one slash between.
///
/// # Examples
///
/// ```
/// use lilith::utils::url::construct_api_url;
///
/// assert_eq!(
///     construct_api_url("http://localhost:5000/", "/api/chat"),
///     "http://localhost:5000/api/chat"
/// );
/// ```
pub fn construct_api_url(base_url: &str, endpoint: &str) -> String {
    let normalized_base = normalize_base_url(base_url);
    let endpoint = endpoint.trim_start_matches('/');
    format!("{normalized_base}/{endpoint}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_every_trailing_slash() {
        assert_eq!(
            normalize_base_url("https://lilith.example.com/app///"),
            "https://lilith.example.com/app"
        );
        assert_eq!(normalize_base_url("///"), "");
        assert_eq!(normalize_base_url(""), "");
    }

    #[test]
    fn construct_handles_slashes_on_both_sides() {
        for (base, endpoint) in [
            ("http://localhost:5000", "api/sessions/current"),
            ("http://localhost:5000/", "api/sessions/current"),
            ("http://localhost:5000", "/api/sessions/current"),
            ("http://localhost:5000//", "//api/sessions/current"),
        ] {
            assert_eq!(
                construct_api_url(base, endpoint),
                "http://localhost:5000/api/sessions/current"
            );
        }
    }

    #[test]
    fn construct_keeps_base_path_prefix() {
        assert_eq!(
            construct_api_url("https://example.com/lilith/", "login"),
            "https://example.com/lilith/login"
        );
    }
}
