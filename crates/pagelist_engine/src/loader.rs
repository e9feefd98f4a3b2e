use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::{Duration, Instant};

use pagelist_logging::{pagelist_debug, pagelist_warn};
use tokio_util::sync::CancellationToken;

use crate::{FetchError, LoadEvent, Page, PageFetcher, PageRequest, PagingSettings};

enum LoaderCommand<Q> {
    Load {
        query: Q,
        request: PageRequest,
        generation: u64,
    },
    Cancel,
}

/// Event tagged with the load that produced it.
type Tagged<T> = (u64, LoadEvent<T>);

/// Runs page fetches for one list, at most one at a time.
///
/// Starting a load cancels the previous one; a cancelled fetch never reports
/// back. Results are polled with [`try_recv`](Self::try_recv) or
/// [`recv_timeout`](Self::recv_timeout).
///
/// Every `load` and `cancel` bumps a generation counter. Events from an older
/// generation are dropped on receive, including ones that had already
/// landed in the channel before the newer load was issued.
pub struct PageLoader<F: PageFetcher> {
    cmd_tx: mpsc::Sender<LoaderCommand<F::Query>>,
    event_rx: mpsc::Receiver<Tagged<F::Item>>,
    generation: Arc<AtomicU64>,
}

impl<F> PageLoader<F>
where
    F: PageFetcher + 'static,
{
    pub fn new(fetcher: F, settings: &PagingSettings) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel::<LoaderCommand<F::Query>>();
        let (event_tx, event_rx) = mpsc::channel();
        let fetcher = Arc::new(fetcher);
        let timeout = settings.request_timeout();

        thread::spawn(move || {
            let runtime = tokio::runtime::Runtime::new().expect("tokio runtime");
            let mut in_flight: Option<CancellationToken> = None;
            while let Ok(command) = cmd_rx.recv() {
                if let Some(token) = in_flight.take() {
                    token.cancel();
                }
                match command {
                    LoaderCommand::Load {
                        query,
                        request,
                        generation,
                    } => {
                        let token = CancellationToken::new();
                        in_flight = Some(token.clone());
                        let fetcher = fetcher.clone();
                        let event_tx = event_tx.clone();
                        runtime.spawn(async move {
                            let fetch = Fetch {
                                request,
                                timeout,
                                generation,
                            };
                            run_fetch(fetcher.as_ref(), query, fetch, token, event_tx).await;
                        });
                    }
                    LoaderCommand::Cancel => {
                        pagelist_debug!("Load cancelled by caller");
                    }
                }
            }
        });

        Self {
            cmd_tx,
            event_rx,
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Starts fetching `request`, cancelling whatever was in flight.
    pub fn load(&self, query: F::Query, request: PageRequest) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let _ = self.cmd_tx.send(LoaderCommand::Load {
            query,
            request,
            generation,
        });
    }

    /// Cancels the in-flight fetch, if any, and forgets any unread result.
    pub fn cancel(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        let _ = self.cmd_tx.send(LoaderCommand::Cancel);
    }

    pub fn try_recv(&self) -> Option<LoadEvent<F::Item>> {
        while let Ok((generation, event)) = self.event_rx.try_recv() {
            if self.is_current(generation) {
                return Some(event);
            }
        }
        None
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<LoadEvent<F::Item>> {
        let deadline = Instant::now() + timeout;
        loop {
            let left = deadline.saturating_duration_since(Instant::now());
            let (generation, event) = self.event_rx.recv_timeout(left).ok()?;
            if self.is_current(generation) {
                return Some(event);
            }
        }
    }

    fn is_current(&self, generation: u64) -> bool {
        let current = self.generation.load(Ordering::SeqCst);
        if generation != current {
            pagelist_debug!("Dropped stale result of load #{} (now #{})", generation, current);
        }
        generation == current
    }
}

struct Fetch {
    request: PageRequest,
    timeout: Option<Duration>,
    generation: u64,
}

async fn run_fetch<F: PageFetcher>(
    fetcher: &F,
    query: F::Query,
    fetch: Fetch,
    token: CancellationToken,
    event_tx: mpsc::Sender<Tagged<F::Item>>,
) {
    let Fetch {
        request,
        timeout,
        generation,
    } = fetch;
    pagelist_debug!(
        "Fetching offset={} limit={}",
        request.offset,
        request.limit
    );
    let result = tokio::select! {
        _ = token.cancelled() => {
            pagelist_debug!("Dropped fetch offset={} on cancel", request.offset);
            return;
        }
        result = fetch_with_timeout(fetcher, &query, request, timeout) => result,
    };
    // Lost the race against a cancel that arrived while completing.
    if token.is_cancelled() {
        return;
    }

    let event = match result {
        Ok(page) => LoadEvent::Loaded { request, page },
        Err(error) => {
            pagelist_warn!("Fetch offset={} failed: {}", request.offset, error);
            LoadEvent::Failed { request, error }
        }
    };
    let _ = event_tx.send((generation, event));
}

async fn fetch_with_timeout<F: PageFetcher>(
    fetcher: &F,
    query: &F::Query,
    request: PageRequest,
    timeout: Option<Duration>,
) -> Result<Page<F::Item>, FetchError> {
    match timeout {
        Some(limit) => tokio::time::timeout(limit, fetcher.fetch(query, request))
            .await
            .map_err(|_| FetchError::Timeout)?,
        None => fetcher.fetch(query, request).await,
    }
}
