//! Compiled crawl profiles and URL admissibility
//!
//! A [`Profile`] is the immutable, compiled form of a `[[profile]]` config
//! entry: parsed seed URLs, compiled patterns, and the seed domain derived
//! from the first seed. It is created once at startup and shared read-only
//! with exactly one profile crawler.

use crate::config::ProfileEntry;
use crate::ConfigError;
use regex::Regex;
use url::Url;

/// Immutable per-profile crawl settings
#[derive(Debug)]
pub struct Profile {
    /// Unique profile name
    pub name: String,

    /// Parsed seed URLs, in config order
    pub seeds: Vec<Url>,

    /// Number of breadth-first rounds to run
    pub depth: u32,

    /// Exclusion patterns; a match rejects the URL outright
    exclude: Vec<Regex>,

    /// Inclusion patterns; when non-empty, a URL must match one
    include: Vec<Regex>,

    /// Restrict discovered links to the seed domain
    same_domain: bool,

    /// Host of the first seed URL
    seed_domain: String,
}

impl Profile {
    /// Compiles a config entry into a profile
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when a seed does not parse or a pattern does
    /// not compile. Validation normally catches both earlier; this guards
    /// profiles constructed directly in code.
    pub fn from_entry(entry: &ProfileEntry) -> Result<Self, ConfigError> {
        let seeds = entry
            .locations
            .iter()
            .map(|loc| {
                Url::parse(loc).map_err(|e| ConfigError::InvalidUrl(format!("{}: {}", loc, e)))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let seed_domain = seeds
            .first()
            .and_then(|url| url.host_str())
            .ok_or_else(|| {
                ConfigError::InvalidUrl(format!("profile '{}' has no usable seed host", entry.name))
            })?
            .to_lowercase();

        let compile = |patterns: &[String]| {
            patterns
                .iter()
                .map(|p| Regex::new(p).map_err(|e| ConfigError::InvalidPattern(e.to_string())))
                .collect::<Result<Vec<_>, _>>()
        };

        Ok(Self {
            name: entry.name.clone(),
            seeds,
            depth: entry.depth,
            exclude: compile(&entry.filter)?,
            include: compile(&entry.matches)?,
            same_domain: entry.same_domain,
            seed_domain,
        })
    }

    /// Decides whether a discovered URL may enter the frontier
    ///
    /// Decision order, first match wins:
    /// 1. Any exclusion pattern matches: reject.
    /// 2. Any inclusion pattern matches: accept.
    /// 3. Inclusion patterns exist but none matched: reject.
    /// 4. Same-domain is set and the host differs from the seed domain: reject.
    /// 5. Accept.
    ///
    /// Pure function over immutable state; safe to call from concurrent
    /// fetch completions.
    pub fn is_admissible(&self, url: &str) -> bool {
        if self.exclude.iter().any(|re| re.is_match(url)) {
            return false;
        }

        if self.include.iter().any(|re| re.is_match(url)) {
            return true;
        }

        if !self.include.is_empty() {
            return false;
        }

        if self.same_domain {
            let host = Url::parse(url)
                .ok()
                .and_then(|u| u.host_str().map(|h| h.to_lowercase()));
            if host.as_deref() != Some(self.seed_domain.as_str()) {
                return false;
            }
        }

        true
    }

    /// Host of the first seed URL, lowercased
    pub fn seed_domain(&self) -> &str {
        &self.seed_domain
    }
}
