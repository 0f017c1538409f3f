use scout_core::PageQuery;
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IndexError {
    #[error("show {0:?} is not listed in the catalog index")]
    ShowNotListed(String),
    #[error("index entry for {0:?} has no link")]
    MissingHref(String),
    #[error("index link {href:?} cannot be resolved against {base}")]
    InvalidLink { href: String, base: String },
}

/// Finds a show's catalog entry page on the site's show index.
///
/// The anchor text must equal the display name exactly (surrounding whitespace aside).
pub fn resolve_show_link<P: PageQuery>(
    page: &P,
    index_url: &str,
    show_name: &str,
) -> Result<String, IndexError> {
    let anchor = page
        .select("a")
        .into_iter()
        .find(|anchor| page.text(*anchor).trim() == show_name)
        .ok_or_else(|| IndexError::ShowNotListed(show_name.to_string()))?;

    let href = page
        .attr(anchor, "href")
        .map(|href| href.trim().to_string())
        .filter(|href| !href.is_empty())
        .ok_or_else(|| IndexError::MissingHref(show_name.to_string()))?;

    let invalid = || IndexError::InvalidLink {
        href: href.clone(),
        base: index_url.to_string(),
    };
    match Url::parse(&href) {
        Ok(url) => Ok(url.into()),
        Err(_) => Url::parse(index_url)
            .map_err(|_| invalid())?
            .join(&href)
            .map(Into::into)
            .map_err(|_| invalid()),
    }
}
