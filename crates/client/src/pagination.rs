//! Sequential iteration over linked list responses.
//!
//! Each page body may carry `"links": [{"rel": "next", "href": ...}]`.
//! Iteration follows `next` until it is absent.

use crate::service::{ResponseBody, ServiceClient};
use cloudlb_core::{CloudLbError, CloudLbResult};
use serde::Deserialize;
use std::collections::HashSet;
use url::Url;

/// One fetched page: where it came from and its undecoded body.
#[derive(Debug, Clone)]
pub struct Page {
    url: Url,
    body: ResponseBody,
}

#[derive(Deserialize)]
struct PageLinks {
    #[serde(default)]
    links: Vec<Link>,
}

#[derive(Deserialize)]
struct Link {
    href: String,
    rel: String,
}

impl Page {
    pub fn new(url: Url, body: ResponseBody) -> Self {
        Self { url, body }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn body(&self) -> &ResponseBody {
        &self.body
    }

    /// Resolves the `next` link against this page's URL, if present.
    pub fn next_url(&self) -> CloudLbResult<Option<Url>> {
        let links: PageLinks = self.body.extract_into()?;
        links
            .links
            .into_iter()
            .find(|link| link.rel == "next")
            .map(|link| {
                self.url.join(&link.href).map_err(|e| {
                    CloudLbError::Decode(format!("invalid next link '{}': {e}", link.href))
                })
            })
            .transpose()
    }
}

/// Lazily fetches pages starting from an initial URL.
///
/// ```ignore
/// Pager::new(&client, url)
///     .each_page(|page| {
///         let items = extract(&page)?;
///         Ok(!items.is_empty())
///     })
///     .await?;
/// ```
pub struct Pager<'a> {
    client: &'a ServiceClient,
    initial: Url,
}

impl<'a> Pager<'a> {
    pub fn new(client: &'a ServiceClient, initial: Url) -> Self {
        Self { client, initial }
    }

    /// Calls `handler` for every page in order.
    ///
    /// `Ok(true)` continues, `Ok(false)` stops early, `Err` aborts and is
    /// returned as-is. A `next` link pointing at any page already visited
    /// ends iteration.
    pub async fn each_page<F>(self, mut handler: F) -> CloudLbResult<()>
    where
        F: FnMut(Page) -> CloudLbResult<bool>,
    {
        let mut visited = HashSet::new();
        let mut next = Some(self.initial);
        let mut fetched = 0usize;

        while let Some(url) = next.take() {
            visited.insert(url.clone());
            let body = self.client.get(url.clone()).await?;
            let page = Page::new(url, body);
            fetched += 1;

            let following = page.next_url()?.filter(|link| {
                let repeat = visited.contains(link);
                if repeat {
                    tracing::warn!(url = %link, "next link revisits a fetched page");
                }
                !repeat
            });
            if !handler(page)? {
                tracing::debug!(pages = fetched, "pagination stopped by handler");
                return Ok(());
            }
            next = following;
        }

        tracing::debug!(pages = fetched, "pagination complete");
        Ok(())
    }

    /// Fetches every page.
    pub async fn all_pages(self) -> CloudLbResult<Vec<Page>> {
        let mut pages = Vec::new();
        self.each_page(|page| {
            pages.push(page);
            Ok(true)
        })
        .await?;
        Ok(pages)
    }
}
