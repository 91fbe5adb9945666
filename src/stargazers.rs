// src/stargazers.rs

use crate::error::{Result, SimDevError};
use indexmap::IndexMap;
use reqwest::blocking::Client;
use reqwest::header::AUTHORIZATION;
use serde_json::Value;
use std::collections::{BTreeSet, HashMap};
use std::time::Duration;
use url::Url;

const API_ROOT: &str = "https://api.github.com";
const PER_PAGE: u32 = 100;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const TIMEOUT_BACKOFF: Duration = Duration::from_secs(5);
const MAX_TIMEOUT_RETRIES: u32 = 5;

pub const DEFAULT_TOP_SIZE: usize = 100;

/// Source of GitHub REST responses
pub trait GithubApi {
    fn get_json(&self, url: &Url) -> Result<Value>;
}

/// Blocking GitHub REST client
pub struct GithubClient {
    client: Client,
    token: Option<String>,
}

impl GithubClient {
    pub fn new(token: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("sim-dev-search/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(GithubClient { client, token })
    }
}

impl GithubApi for GithubClient {
    fn get_json(&self, url: &Url) -> Result<Value> {
        let mut attempt = 0;
        loop {
            let mut request = self.client.get(url.clone());
            if let Some(token) = &self.token {
                request = request.header(AUTHORIZATION, format!("token {}", token));
            }

            match request.send() {
                Ok(response) => return Ok(response.json()?),
                Err(e) if e.is_timeout() && attempt < MAX_TIMEOUT_RETRIES => {
                    attempt += 1;
                    tracing::warn!(
                        "Request to {} timed out, waiting for {} seconds...",
                        url,
                        TIMEOUT_BACKOFF.as_secs()
                    );
                    std::thread::sleep(TIMEOUT_BACKOFF);
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}

/// Ranks repositories by how many stargazers of the given repositories also starred them
pub struct StargazersTopExtractor<A> {
    api: A,
    top_size: usize,
    max_pages: u32,
    stargazers_limit: Option<usize>,
}

impl<A: GithubApi> StargazersTopExtractor<A> {
    pub fn new(api: A) -> Self {
        StargazersTopExtractor {
            api,
            top_size: DEFAULT_TOP_SIZE,
            max_pages: u32::MAX,
            stargazers_limit: None,
        }
    }

    pub fn with_top_size(mut self, top_size: usize) -> Self {
        self.top_size = top_size;
        self
    }

    pub fn with_max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = max_pages;
        self
    }

    /// Only the first `limit` stargazers (by login) are asked for their stars
    pub fn with_stargazers_limit(mut self, limit: usize) -> Self {
        self.stargazers_limit = Some(limit);
        self
    }

    /// Repository URL -> star count among the stargazers, most starred first,
    /// equal counts by URL.
    pub fn repositories_top(&self, repos: &[String]) -> Result<IndexMap<String, u64>> {
        let mut stargazers = BTreeSet::new();
        for repo in repos {
            stargazers.extend(self.stargazers(repo)?);
        }
        tracing::info!("Collected {} stargazers from {} repositories", stargazers.len(), repos.len());

        let starred = self.starred_repositories(&stargazers)?;
        let mut ranked: Vec<(String, u64)> = starred.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked.truncate(self.top_size);
        Ok(ranked.into_iter().collect())
    }

    pub fn stargazers(&self, repo_url: &str) -> Result<BTreeSet<String>> {
        let base = stargazers_endpoint(repo_url)?;
        let mut logins = BTreeSet::new();
        self.for_each_page(&base, |users| {
            logins.extend(users.iter().filter_map(|user| user["login"].as_str()).map(String::from));
        })?;
        tracing::debug!("{} has {} stargazers", repo_url, logins.len());
        Ok(logins)
    }

    fn starred_repositories(&self, stargazers: &BTreeSet<String>) -> Result<HashMap<String, u64>> {
        let limit = self.stargazers_limit.unwrap_or(usize::MAX);
        let mut counts: HashMap<String, u64> = HashMap::new();

        for login in stargazers.iter().take(limit) {
            let base = Url::parse(&format!("{}/users/{}/starred", API_ROOT, login))?;
            self.for_each_page(&base, |repos| {
                for url in repos.iter().filter_map(|repo| repo["html_url"].as_str()) {
                    *counts.entry(url.to_string()).or_insert(0) += 1;
                }
            })?;
        }
        Ok(counts)
    }

    /// Feeds every page of a paginated listing to `visit`. Stops at an empty
    /// page, at a non-list page (GitHub's error objects), or after `max_pages`.
    fn for_each_page(&self, base: &Url, mut visit: impl FnMut(&[Value])) -> Result<()> {
        for page in 1..=self.max_pages {
            let mut url = base.clone();
            url.query_pairs_mut()
                .append_pair("page", &page.to_string())
                .append_pair("per_page", &PER_PAGE.to_string());

            match self.api.get_json(&url)? {
                Value::Array(items) if !items.is_empty() => visit(items.as_slice()),
                Value::Array(_) => break,
                other => {
                    if let Some(message) = other.get("message").and_then(Value::as_str) {
                        tracing::warn!("GitHub API stopped pagination of {}: {}", base, message);
                    }
                    break;
                }
            }
        }
        Ok(())
    }
}

/// `https://github.com/<owner>/<repo>` -> `https://api.github.com/repos/<owner>/<repo>/stargazers`
pub fn stargazers_endpoint(repo_url: &str) -> Result<Url> {
    let invalid = || SimDevError::InvalidRepositoryUrl(repo_url.to_string());
    let parsed = Url::parse(repo_url).map_err(|_| invalid())?;
    if parsed.host_str() != Some("github.com") {
        return Err(invalid());
    }

    let segments: Vec<&str> = parsed
        .path_segments()
        .map(|s| s.filter(|segment| !segment.is_empty()).collect())
        .unwrap_or_default();
    let [owner, repo] = segments.as_slice() else {
        return Err(invalid());
    };
    let repo = repo.trim_end_matches(".git");

    Ok(Url::parse(&format!("{}/repos/{}/{}/stargazers", API_ROOT, owner, repo))?)
}
