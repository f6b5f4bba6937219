use rand::seq::SliceRandom;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, USER_AGENT};

/// Pool of browser User-Agent strings for rotation
pub const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/90.0.4430.93 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/89.0.4389.82 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/88.0.4324.150 Safari/537.36",
];

/// Default User-Agent when rotation is disabled
pub fn default_user_agent() -> String {
    format!("livecheck/{}", env!("CARGO_PKG_VERSION"))
}

/// Pick a random browser User-Agent
pub fn random_user_agent() -> &'static str {
    USER_AGENTS
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(USER_AGENTS[0])
}

/// Build request headers for a liveness probe
///
/// # Examples
///
/// ```
/// use livecheck::checker::headers::build_probe_headers;
///
/// let headers = build_probe_headers("Mozilla/5.0");
/// assert_eq!(headers["user-agent"], "Mozilla/5.0");
/// ```
pub fn build_probe_headers(user_agent: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();

    let user_agent = HeaderValue::from_str(user_agent)
        .unwrap_or_else(|_| HeaderValue::from_static("livecheck"));
    headers.insert(USER_AGENT, user_agent);
    headers.insert(ACCEPT, HeaderValue::from_static("*/*"));
    headers.insert(
        ACCEPT_LANGUAGE,
        HeaderValue::from_static("zh-CN,zh;q=0.9,en-US;q=0.8,en;q=0.7"),
    );

    headers
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_user_agent_from_pool() {
        for _ in 0..20 {
            assert!(USER_AGENTS.contains(&random_user_agent()));
        }
    }

    #[test]
    fn test_build_probe_headers() {
        let headers = build_probe_headers(USER_AGENTS[0]);
        assert_eq!(headers.get(USER_AGENT).unwrap(), USER_AGENTS[0]);
        assert_eq!(headers.get(ACCEPT).unwrap(), "*/*");
    }

    #[test]
    fn test_invalid_user_agent_falls_back() {
        let headers = build_probe_headers("bad\nvalue");
        assert_eq!(headers.get(USER_AGENT).unwrap(), "livecheck");
    }
}
