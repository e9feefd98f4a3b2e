use crate::{FetchError, Page, PageRequest};

/// Remote source of list pages.
///
/// `Query` carries the screen-specific parameters (folder, chat, patient).
/// Implementations must tolerate being dropped mid-request.
#[async_trait::async_trait]
pub trait PageFetcher: Send + Sync {
    type Query: Send + Sync + 'static;
    type Item: Send + 'static;

    async fn fetch(
        &self,
        query: &Self::Query,
        request: PageRequest,
    ) -> Result<Page<Self::Item>, FetchError>;
}
