//! Scout engine: page fetching, collaborators and the show catalog driver.
mod catalog;
mod decode;
mod events;
mod fetch;
mod index;
mod library;
mod manifest;
mod page;
mod stream;
mod submit;

pub use catalog::{CatalogDriver, CatalogError, CatalogSettings, RunSummary, ShowEntry, ShowOutcome, ShowReport};
pub use decode::{decode_page, DecodeError, DecodedPage};
pub use events::{CatalogEvent, LogProgressSink, ProgressSink};
pub use fetch::{FetchError, FetchSettings, FetchedPage, Fetcher, ReqwestFetcher};
pub use index::{resolve_show_link, IndexError};
pub use library::{LibraryClient, LibraryError, PlexLibrary, PlexSettings};
pub use manifest::{ManifestSubmitter, MANIFEST_FILENAME};
pub use page::HtmlPage;
pub use stream::{episode_stream, CrawlItem};
pub use submit::{
    DownloadRequest, DownloadSubmitter, JDownloaderSettings, JDownloaderSubmitter, SubmissionError,
};
