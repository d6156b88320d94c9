//! Outbound existence probes for external hyperlinks.
//!
//! Each URL is probed independently with its own timeout; probes run on a
//! bounded rayon pool so one slow host cannot hold up the others. Network
//! failures never propagate: they become broken-link outcomes.

use crate::config::LinkConfig;
use rayon::prelude::*;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkStatus {
    /// Final response status below 400
    Reachable { status: u16 },
    /// Final response status of 400 or above
    HttpError { status: u16 },
    /// Still redirecting after the configured limit
    TooManyRedirects { status: u16 },
    /// Connection failure, timeout, DNS error or malformed URL
    Unreachable { reason: String },
}

impl LinkStatus {
    pub fn is_broken(&self) -> bool {
        !matches!(self, LinkStatus::Reachable { .. })
    }

    pub fn describe(&self, url: &str) -> String {
        match self {
            LinkStatus::Reachable { status } => format!("URL: {url} - HTTP {status}"),
            LinkStatus::HttpError { status } => format!("URL: {url} - HTTP {status}"),
            LinkStatus::TooManyRedirects { status } => {
                format!("URL: {url} - Too many redirects (last status {status})")
            }
            LinkStatus::Unreachable { reason } => format!("URL: {url} - Connection error: {reason}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkCheck {
    pub url: String,
    pub status: LinkStatus,
}

pub trait LinkProber: Send + Sync {
    fn probe(&self, url: &str) -> LinkStatus;
}

/// HEAD requests through a shared `ureq` agent.
pub struct HttpLinkProber {
    agent: ureq::Agent,
}

impl HttpLinkProber {
    pub fn new(config: &LinkConfig) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(config.timeout_secs))
            .redirects(config.max_redirects)
            .user_agent(&config.user_agent)
            .build();
        Self { agent }
    }
}

impl LinkProber for HttpLinkProber {
    fn probe(&self, url: &str) -> LinkStatus {
        let response = self
            .agent
            .head(url)
            .set(
                "Accept",
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            )
            .set("Accept-Language", "en-US,en;q=0.5")
            .call();

        match response {
            Ok(response) => classify_status(response.status()),
            Err(ureq::Error::Status(status, _)) => classify_status(status),
            Err(ureq::Error::Transport(transport)) => LinkStatus::Unreachable {
                reason: transport.to_string(),
            },
        }
    }
}

fn classify_status(status: u16) -> LinkStatus {
    match status {
        400.. => LinkStatus::HttpError { status },
        300..=399 => LinkStatus::TooManyRedirects { status },
        _ => LinkStatus::Reachable { status },
    }
}

/// Probe every URL, at most `max_concurrent` at a time. Output is sorted by URL.
pub fn probe_all(prober: &dyn LinkProber, urls: &[String], max_concurrent: usize) -> Vec<LinkCheck> {
    let check = |url: &String| LinkCheck {
        url: url.clone(),
        status: prober.probe(url),
    };

    let mut checks: Vec<LinkCheck> = if urls.len() > 1 {
        match rayon::ThreadPoolBuilder::new()
            .num_threads(max_concurrent.max(1))
            .build()
        {
            Ok(pool) => pool.install(|| urls.par_iter().map(check).collect()),
            Err(e) => {
                log::warn!("Link probe pool unavailable ({e}), probing sequentially");
                urls.iter().map(check).collect()
            }
        }
    } else {
        urls.iter().map(check).collect()
    };

    checks.sort_by(|a, b| a.url.cmp(&b.url));
    checks
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedProber {
        statuses: HashMap<String, LinkStatus>,
        calls: AtomicUsize,
    }

    impl LinkProber for FixedProber {
        fn probe(&self, url: &str) -> LinkStatus {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.statuses
                .get(url)
                .cloned()
                .unwrap_or(LinkStatus::Reachable { status: 200 })
        }
    }

    #[test]
    fn test_classify_status() {
        assert_eq!(classify_status(200), LinkStatus::Reachable { status: 200 });
        assert_eq!(classify_status(404), LinkStatus::HttpError { status: 404 });
        assert_eq!(classify_status(503), LinkStatus::HttpError { status: 503 });
        assert!(classify_status(301).is_broken());
    }

    #[test]
    fn test_probe_all_sorted_and_complete() {
        let prober = FixedProber {
            statuses: HashMap::from([(
                "https://b.example/missing".to_string(),
                LinkStatus::HttpError { status: 404 },
            )]),
            calls: AtomicUsize::new(0),
        };
        let urls = vec![
            "https://c.example".to_string(),
            "https://b.example/missing".to_string(),
            "https://a.example".to_string(),
        ];

        let checks = probe_all(&prober, &urls, 2);
        let order: Vec<&str> = checks.iter().map(|c| c.url.as_str()).collect();
        assert_eq!(
            order,
            vec!["https://a.example", "https://b.example/missing", "https://c.example"]
        );
        assert_eq!(checks.iter().filter(|c| c.status.is_broken()).count(), 1);
        assert_eq!(prober.calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_unreachable_description() {
        let status = LinkStatus::Unreachable {
            reason: "timed out".to_string(),
        };
        assert!(status.is_broken());
        assert_eq!(
            status.describe("https://x.example"),
            "URL: https://x.example - Connection error: timed out"
        );
    }
}
