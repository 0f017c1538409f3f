use std::collections::VecDeque;

use futures_util::stream::{self, Stream};
use scout_core::{update, CrawlEffect, CrawlMsg, CrawlStop, DownloadableEpisode, ShowCrawl};
use scout_logging::scout_debug;
use tokio_util::sync::CancellationToken;

use crate::{DecodedPage, FetchError, FetchedPage, Fetcher, HtmlPage};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrawlItem {
    Episode(DownloadableEpisode),
    /// Always the last item of a stream.
    Finished {
        stop: CrawlStop,
        pages: usize,
        emitted: usize,
    },
}

struct StreamState<'a> {
    fetcher: &'a dyn Fetcher,
    crawl: Option<ShowCrawl>,
    pending: VecDeque<CrawlEffect>,
    cancel: CancellationToken,
}

/// Lazily crawls one show, yielding its emittable episodes in page order.
///
/// A page is fetched only once every episode of the previous page has been
/// consumed. The stream ends after a single [`CrawlItem::Finished`].
pub fn episode_stream<'a>(
    fetcher: &'a dyn Fetcher,
    crawl: ShowCrawl,
    entry_url: &str,
    cancel: CancellationToken,
) -> impl Stream<Item = CrawlItem> + Send + 'a {
    let (crawl, effects) = update::<HtmlPage>(
        crawl,
        CrawlMsg::Start {
            entry_url: entry_url.to_string(),
        },
    );
    let state = StreamState {
        fetcher,
        crawl: Some(crawl),
        pending: effects.into(),
        cancel,
    };
    stream::unfold(state, |mut state| async move {
        let item = state.next_item().await?;
        Some((item, state))
    })
}

impl StreamState<'_> {
    async fn next_item(&mut self) -> Option<CrawlItem> {
        loop {
            match self.pending.pop_front()? {
                CrawlEffect::Emit(episode) => return Some(CrawlItem::Episode(episode)),
                CrawlEffect::Finished(stop) => {
                    let crawl = self.crawl.as_ref()?;
                    return Some(CrawlItem::Finished {
                        stop,
                        pages: crawl.pages_processed(),
                        emitted: crawl.emitted(),
                    });
                }
                CrawlEffect::FetchPage { url } => {
                    let fetched = tokio::select! {
                        biased;
                        _ = self.cancel.cancelled() => None,
                        result = self.fetcher.fetch(&url) => Some(result),
                    };
                    let crawl = self.crawl.take()?;
                    let (crawl, effects) = match fetched {
                        None => update::<HtmlPage>(crawl, CrawlMsg::Cancelled),
                        Some(result) => apply_fetch(crawl, url, result),
                    };
                    self.crawl = Some(crawl);
                    self.pending.extend(effects);
                }
            }
        }
    }
}

fn apply_fetch(
    crawl: ShowCrawl,
    url: String,
    result: Result<FetchedPage, FetchError>,
) -> (ShowCrawl, Vec<CrawlEffect>) {
    let decoded = result.map_err(|err| err.to_string()).and_then(|fetched| {
        DecodedPage::from_fetch(&fetched)
            .map(|decoded| (fetched.final_url, decoded))
            .map_err(|err| err.to_string())
    });

    match decoded {
        Ok((final_url, decoded)) => {
            scout_debug!("{}: loaded {} ({})", crawl.show_name(), final_url, decoded.encoding_label);
            let page = HtmlPage::parse(&decoded.html);
            update(
                crawl,
                CrawlMsg::PageLoaded {
                    url,
                    final_url,
                    page: &page,
                },
            )
        }
        Err(reason) => update::<HtmlPage>(crawl, CrawlMsg::FetchFailed { url, reason }),
    }
}
