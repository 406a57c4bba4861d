//! Cursor pagination
//!
//! VPC collections return a `next.href` link whose `start` query parameter
//! is the cursor for the following page. `Pager` issues list calls until a
//! page comes back without `next`.

use std::future::Future;
use std::marker::PhantomData;

use crate::error::Result;

/// Maximum number of items requested per page
pub const PAGE_LIMIT: u32 = 50;

/// A page of a paginated collection
pub trait Paginated {
    type Item;

    /// Cursor for the following page, if any
    fn next_start(&self) -> Option<String>;

    fn into_items(self) -> Vec<Self::Item>;
}

/// Extract the `start` cursor from a `next` link
pub fn start_token(href: &str) -> Option<String> {
    let url = reqwest::Url::parse(href).ok()?;
    url.query_pairs()
        .find(|(key, _)| key == "start")
        .map(|(_, value)| value.into_owned())
}

/// Drives a list call across every page of a collection
pub struct Pager<P, F> {
    fetch: F,
    start: Option<String>,
    exhausted: bool,
    _page: PhantomData<fn() -> P>,
}

impl<P, F, Fut> Pager<P, F>
where
    P: Paginated,
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = Result<P>>,
{
    /// `fetch` is called with the cursor of the page to load (`None` for the first)
    pub fn new(fetch: F) -> Self {
        Self {
            fetch,
            start: None,
            exhausted: false,
            _page: PhantomData,
        }
    }

    pub fn has_next(&self) -> bool {
        !self.exhausted
    }

    /// Load the next page, or `None` once the collection is exhausted
    pub async fn next_page(&mut self) -> Result<Option<Vec<P::Item>>> {
        if self.exhausted {
            return Ok(None);
        }
        let page = (self.fetch)(self.start.take()).await?;
        self.start = page.next_start();
        self.exhausted = self.start.is_none();
        Ok(Some(page.into_items()))
    }

    /// Accumulate every remaining page
    pub async fn collect_all(mut self) -> Result<Vec<P::Item>> {
        let mut items = Vec::new();
        while let Some(page) = self.next_page().await? {
            items.extend(page);
        }
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClientError;
    use std::sync::Mutex;

    struct TestPage {
        items: Vec<u32>,
        next: Option<String>,
    }

    impl Paginated for TestPage {
        type Item = u32;

        fn next_start(&self) -> Option<String> {
            self.next.as_deref().and_then(start_token)
        }

        fn into_items(self) -> Vec<u32> {
            self.items
        }
    }

    fn page_for(start: Option<&str>) -> TestPage {
        let base = "https://us-south.iaas.cloud.ibm.com/v1/vpcs/v1/dns_resolution_bindings";
        match start {
            None => TestPage {
                items: vec![1, 2],
                next: Some(format!("{}?limit=2&start=page2", base)),
            },
            Some("page2") => TestPage {
                items: vec![3, 4],
                next: Some(format!("{}?start=page3&limit=2", base)),
            },
            _ => TestPage {
                items: vec![5],
                next: None,
            },
        }
    }

    #[test]
    fn start_token_from_href() {
        assert_eq!(
            start_token("https://us-south.iaas.cloud.ibm.com/v1/vpcs?limit=50&start=r006-abc"),
            Some("r006-abc".to_string())
        );
        assert_eq!(
            start_token("https://us-south.iaas.cloud.ibm.com/v1/vpcs?limit=50"),
            None
        );
        assert_eq!(start_token("not a url"), None);
    }

    #[tokio::test]
    async fn collects_every_page() {
        let calls = Mutex::new(Vec::new());
        let pager = Pager::new(|start: Option<String>| {
            calls.lock().unwrap().push(start.clone());
            let page = page_for(start.as_deref());
            async move { Ok::<_, ClientError>(page) }
        });

        let items = pager.collect_all().await.unwrap();
        assert_eq!(items, vec![1, 2, 3, 4, 5]);
        assert_eq!(
            *calls.lock().unwrap(),
            vec![None, Some("page2".to_string()), Some("page3".to_string())]
        );
    }

    #[tokio::test]
    async fn stops_after_last_page() {
        let mut pager = Pager::new(|_start: Option<String>| async {
            Ok::<_, ClientError>(TestPage {
                items: vec![7],
                next: None,
            })
        });

        assert!(pager.has_next());
        assert_eq!(pager.next_page().await.unwrap(), Some(vec![7]));
        assert!(!pager.has_next());
        assert_eq!(pager.next_page().await.unwrap(), None);
    }

    #[tokio::test]
    async fn propagates_fetch_error() {
        let pager = Pager::new(|_start: Option<String>| async {
            Err::<TestPage, _>(ClientError::Config("boom".to_string()))
        });
        assert!(pager.collect_all().await.is_err());
    }
}
