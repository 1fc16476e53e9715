use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub api_url: String,
    pub api_token: Option<String>,
    pub events_url: String,
    pub page_limit: usize,
    pub debounce_ms: u64,
    pub sound: bool,
    pub demo: bool,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let api_url = env::var("KDS_API_URL").unwrap_or_else(|_| "http://localhost:3000/".into());
        let api_token = env::var("KDS_API_TOKEN").ok();
        let events_url =
            env::var("KDS_EVENTS_URL").unwrap_or_else(|_| "ws://localhost:3000/events/kitchen".into());
        let page_limit = env::var("KDS_PAGE_LIMIT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(100);
        let debounce_ms = env::var("KDS_DEBOUNCE_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(200);
        let sound = env::var("KDS_SOUND").map(|v| flag(&v)).unwrap_or(true);
        let demo = env::var("KDS_DEMO").map(|v| flag(&v)).unwrap_or(false);
        Ok(Self {
            api_url,
            api_token,
            events_url,
            page_limit,
            debounce_ms,
            sound,
            demo,
        })
    }
}

fn flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_accept_the_usual_spellings() {
        assert!(flag("1"));
        assert!(flag("true"));
        assert!(flag("YES"));
        assert!(flag(" on "));
        assert!(!flag("0"));
        assert!(!flag("off"));
        assert!(!flag(""));
    }
}
