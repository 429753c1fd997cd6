use tracing::{debug, warn};

use crate::{GitLabClient, SdkError};

/// How a paged listing ended
#[derive(Debug)]
pub enum PageEnd {
    /// An empty page was returned: the collection is complete
    Exhausted,
    /// Requesting `page` failed; every later page is missing
    Failed { page: u32, error: SdkError },
}

/// Everything a paged listing produced
#[derive(Debug)]
pub struct Paged<T> {
    pub items: Vec<T>,
    /// Number of page requests issued, retries not counted
    pub pages_requested: u32,
    pub end: PageEnd,
}

impl<T> Paged<T> {
    pub fn is_complete(&self) -> bool {
        matches!(self.end, PageEnd::Exhausted)
    }

    pub fn failure(&self) -> Option<(u32, &SdkError)> {
        match &self.end {
            PageEnd::Exhausted => None,
            PageEnd::Failed { page, error } => Some((*page, error)),
        }
    }

    pub fn into_items(self) -> Vec<T> {
        self.items
    }
}

impl GitLabClient {
    /// Walk `path` page by page (starting at 1) until a page comes back empty
    ///
    /// A short page does not end the walk; only an empty one does. A request
    /// that still fails after retries stops the walk and is reported through
    /// [`PageEnd::Failed`] together with the items gathered so far.
    pub async fn fetch_all<T: serde::de::DeserializeOwned>(&self, path: &str) -> Paged<T> {
        let mut items = Vec::new();
        let mut page = 1;

        loop {
            match self.get_page::<T>(path, page).await {
                Ok(batch) if batch.is_empty() => {
                    debug!(path, pages = page, items = items.len(), "Listing exhausted");
                    return Paged {
                        items,
                        pages_requested: page,
                        end: PageEnd::Exhausted,
                    };
                }
                Ok(batch) => {
                    items.extend(batch);
                    page += 1;
                }
                Err(error) => {
                    warn!(
                        path,
                        page,
                        items = items.len(),
                        error = %error,
                        "Listing truncated by failed page request"
                    );
                    return Paged {
                        items,
                        pages_requested: page,
                        end: PageEnd::Failed { page, error },
                    };
                }
            }
        }
    }
}
