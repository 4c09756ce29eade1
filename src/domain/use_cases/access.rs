use std::collections::HashSet;

use url::Url;

/// Referer allow-list for image fetches.
#[derive(Debug, Clone)]
pub struct AccessGuard {
    allow_all: bool,
    hosts: HashSet<String>,
}

impl AccessGuard {
    /// `*` anywhere in `entries` turns the guard off.
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut allow_all = false;
        let mut hosts = HashSet::new();

        for entry in entries {
            let entry = entry.as_ref().trim().to_ascii_lowercase();
            match entry.as_str() {
                "" => {}
                "*" => allow_all = true,
                _ => {
                    hosts.insert(entry);
                }
            }
        }

        AccessGuard { allow_all, hosts }
    }

    pub fn allows_all(&self) -> bool {
        self.allow_all
    }

    /// Missing or unparsable referers are only accepted when everything is.
    pub fn allows(&self, referer: Option<&str>) -> bool {
        if self.allow_all {
            return true;
        }

        referer
            .and_then(referer_host)
            .is_some_and(|host| self.hosts.contains(&host))
    }
}

/// Host part of a referer URL, lower-cased and without port.
pub fn referer_host(referer: &str) -> Option<String> {
    Url::parse(referer.trim())
        .ok()?
        .host_str()
        .map(|host| host.to_ascii_lowercase())
}
