//! Release notes engine: fetching, HTML to Markdown conversion and the notes cache.
mod config;
mod convert;
mod decode;
mod fetch;
mod harvest;
mod persist;
mod site;
mod source;
mod types;

pub use config::{expand_template, ConfigError, LanguageSpec, ReleasesConfig};
pub use convert::{collapse_blank_lines, flattened_text, inline_markdown, render_blocks};
pub use decode::{decode_page, DecodeError, DecodedPage};
pub use fetch::{FetchSettings, Fetcher, ReqwestFetcher};
pub use harvest::{Harvester, DEFAULT_GITHUB_API_BASE};
pub use persist::{ensure_output_dir, write_atomically, NotesCache, PersistError, ReleaseRecord};
pub use site::{extract_notes, BlockLayout, SiteProfile};
pub use source::{GitHubRelease, Source};
pub use types::{
    FailureKind, FetchError, FetchMetadata, FetchOutput, HarvestEvent, NotesError,
    NullProgressSink, ProgressSink, EMPTY_RELEASE_SENTINEL, INVALID_GITHUB_URL_SENTINEL,
    NOT_FOUND_SENTINEL, UNKNOWN_SOURCE_SENTINEL,
};
