use url::Url;

use crate::site::SiteProfile;

/// Where a release-notes URL points, decided by host fragments in the raw URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    GitHubRelease,
    Wiki,
    Docs,
    LegacyDocs,
    Unknown,
}

impl Source {
    pub fn classify(url: &str) -> Self {
        if url.contains("github.com") {
            Source::GitHubRelease
        } else if url.contains("jsoftware.com") {
            Source::Wiki
        } else if url.contains("dyalog.com") {
            if url.contains("docs.dyalog.com") {
                Source::Docs
            } else {
                Source::LegacyDocs
            }
        } else {
            Source::Unknown
        }
    }

    /// Site profile for HTML sources; `None` for the API and unknown sources.
    pub fn profile(self) -> Option<&'static SiteProfile> {
        match self {
            Source::Wiki => Some(&SiteProfile::WIKI),
            Source::Docs => Some(&SiteProfile::DOCS),
            Source::LegacyDocs => Some(&SiteProfile::LEGACY_DOCS),
            Source::GitHubRelease | Source::Unknown => None,
        }
    }
}

/// A release page of the form `https://github.com/<owner>/<repo>/releases/tag/<tag>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitHubRelease {
    pub owner: String,
    pub repo: String,
    pub tag: String,
}

impl GitHubRelease {
    pub fn parse(url: &str) -> Option<Self> {
        let parsed = Url::parse(url).ok()?;
        if parsed.scheme() != "https" || parsed.host_str() != Some("github.com") {
            return None;
        }
        let segments: Vec<&str> = parsed.path_segments()?.collect();
        match segments.as_slice() {
            [owner, repo, "releases", "tag", tag @ ..]
                if !owner.is_empty() && !repo.is_empty() && !tag.is_empty() =>
            {
                let tag = tag.join("/");
                (!tag.is_empty()).then(|| GitHubRelease {
                    owner: owner.to_string(),
                    repo: repo.to_string(),
                    tag,
                })
            }
            _ => None,
        }
    }

    pub fn api_url(&self, api_base: &str) -> String {
        format!(
            "{}/repos/{}/{}/releases/tags/{}",
            api_base.trim_end_matches('/'),
            self.owner,
            self.repo,
            self.tag
        )
    }
}
