use std::sync::Arc;

use harvest_logging::{harvest_debug, harvest_error, harvest_info, harvest_warn};
use serde::Deserialize;

use crate::config::ReleasesConfig;
use crate::decode::decode_page;
use crate::fetch::Fetcher;
use crate::persist::{NotesCache, ReleaseRecord};
use crate::site::{extract_notes, SiteProfile};
use crate::source::{GitHubRelease, Source};
use crate::{HarvestEvent, NotesError, ProgressSink, EMPTY_RELEASE_SENTINEL};

pub const DEFAULT_GITHUB_API_BASE: &str = "https://api.github.com";
const GITHUB_ACCEPT: &str = "application/vnd.github.v3+json";

#[derive(Debug, Deserialize)]
struct ReleasePayload {
    #[serde(default)]
    body: Option<String>,
}

/// Fetches release notes one URL at a time and records them in a [`NotesCache`].
pub struct Harvester {
    fetcher: Arc<dyn Fetcher>,
    github_api_base: String,
}

impl Harvester {
    pub fn new(fetcher: Arc<dyn Fetcher>) -> Self {
        Self {
            fetcher,
            github_api_base: DEFAULT_GITHUB_API_BASE.to_string(),
        }
    }

    pub fn with_github_api_base(mut self, base: impl Into<String>) -> Self {
        self.github_api_base = base.into();
        self
    }

    /// Fetch every configured version in order, storing one record per version.
    ///
    /// Per-version failures are stored as sentinel notes; the run never aborts.
    pub async fn harvest(
        &self,
        config: &ReleasesConfig,
        cache: &mut NotesCache,
        sink: &dyn ProgressSink,
    ) {
        sink.emit(HarvestEvent::Started);

        for (language_key, versions) in &config.releases {
            let Some(language) = config.languages.get(language_key) else {
                harvest_error!("No language entry for release list {:?}", language_key);
                continue;
            };
            harvest_info!("Fetching {} releases", language.name);
            sink.emit(HarvestEvent::LanguageStarted {
                name: language.name.clone(),
            });

            for version in versions {
                let Some(url) = language.release_url(version) else {
                    harvest_warn!("No URL for {} {}", language.name, version);
                    sink.emit(HarvestEvent::VersionSkipped {
                        version: version.clone(),
                        reason: "No URL found".to_string(),
                    });
                    continue;
                };

                sink.emit(HarvestEvent::VersionStarted {
                    version: version.clone(),
                });
                let notes = self.fetch_notes(&url).await;
                sink.emit(HarvestEvent::VersionFinished {
                    version: version.clone(),
                    chars: notes.chars().count(),
                });

                cache.insert(
                    language_key,
                    ReleaseRecord {
                        language: language.name.clone(),
                        version: version.clone(),
                        url,
                        notes,
                    },
                );
            }
        }
    }

    /// Notes for a single URL, or the sentinel describing why there are none.
    pub async fn fetch_notes(&self, url: &str) -> String {
        let source = Source::classify(url);
        harvest_debug!("Routing {} as {:?}", url, source);

        let result = match source {
            Source::GitHubRelease => self.github_notes(url).await,
            Source::Unknown => Err(NotesError::UnknownSource),
            html_source => match html_source.profile() {
                Some(profile) => self.page_notes(url, profile).await,
                None => Err(NotesError::UnknownSource),
            },
        };
        into_notes(url, result)
    }

    /// Fetch an HTML page and convert it with `profile`, regardless of host.
    pub async fn fetch_page_notes(&self, url: &str, profile: &SiteProfile) -> String {
        into_notes(url, self.page_notes(url, profile).await)
    }

    async fn github_notes(&self, url: &str) -> Result<String, NotesError> {
        let release = GitHubRelease::parse(url).ok_or(NotesError::InvalidGitHubUrl)?;
        let api_url = release.api_url(&self.github_api_base);
        let output = self.fetcher.fetch(&api_url, Some(GITHUB_ACCEPT)).await?;

        let payload: ReleasePayload = serde_json::from_slice(&output.bytes)
            .map_err(|err| NotesError::Payload(err.to_string()))?;
        Ok(payload
            .body
            .filter(|body| !body.is_empty())
            .unwrap_or_else(|| EMPTY_RELEASE_SENTINEL.to_string()))
    }

    async fn page_notes(&self, url: &str, profile: &SiteProfile) -> Result<String, NotesError> {
        let output = self.fetcher.fetch(url, None).await?;
        let page = decode_page(&output.bytes, output.metadata.content_type.as_deref())
            .map_err(|err| NotesError::Decode(err.to_string()))?;
        harvest_debug!(
            "Decoded {} as {} for the {} profile",
            url,
            page.encoding_label,
            profile.name
        );
        extract_notes(&page.html, profile)
    }
}

fn into_notes(url: &str, result: Result<String, NotesError>) -> String {
    match result {
        Ok(notes) => notes,
        Err(err) => {
            harvest_warn!("Release notes for {} unavailable: {}", url, err);
            err.sentinel()
        }
    }
}
