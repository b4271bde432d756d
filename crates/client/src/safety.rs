//! Redaction of outbound request details before they reach logs or tool results.
//!
//! Catalog filters travel in the query string and consoles are sometimes addressed with
//! credentials in the URL; neither should be echoed back to an agent.

use url::Url;

#[must_use]
pub fn redact_url(url: &Url) -> String {
    let mut u = url.clone();
    // Best-effort: drop credentials + query + fragment.
    let _ = u.set_username("");
    let _ = u.set_password(None);
    u.set_query(None);
    u.set_fragment(None);
    u.to_string()
}

#[must_use]
pub fn sanitize_reqwest_error(e: &reqwest::Error) -> String {
    let mut msg = e.to_string();
    if let Some(u) = e.url() {
        msg = msg.replace(u.as_str(), &redact_url(u));
    }
    msg
}

/// Host part of a console URL for error messages, without credentials or path.
#[must_use]
pub fn display_host(host: &str) -> String {
    match Url::parse(host) {
        Ok(u) => match (u.host_str(), u.port()) {
            (Some(h), Some(p)) => format!("{}://{h}:{p}", u.scheme()),
            (Some(h), None) => format!("{}://{h}", u.scheme()),
            _ => host.to_string(),
        },
        Err(_) => host.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redacts_credentials_and_query() {
        let url = Url::parse("https://admin:pw@qradar.local/api/help/endpoints?filter=path%3D%27x%27")
            .expect("url");
        assert_eq!(redact_url(&url), "https://qradar.local/api/help/endpoints");
    }

    #[test]
    fn display_host_strips_userinfo() {
        assert_eq!(
            display_host("https://admin:pw@qradar.local:8443"),
            "https://qradar.local:8443"
        );
        assert_eq!(display_host("not a url"), "not a url");
    }
}
