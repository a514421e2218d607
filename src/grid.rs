use std::num::NonZeroUsize;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::time;
use tracing::{debug, info, warn};

use crate::client::NewsClient;
use crate::config::ModalConfig;
use crate::modal::{CloseRequest, Modal, Timer};
use crate::news::{ApiStatus, NewsItem, NewsResponse};

#[derive(Debug, Clone, PartialEq)]
pub enum Feed {
    Loading,
    Ready(Vec<Arc<NewsItem>>),
    Failed(String),
}

#[derive(Debug, PartialEq)]
pub enum Event {
    NewsLoaded { request: u64, response: NewsResponse },
    StatusProbed(ApiStatus),
    Select(usize),
    Close(CloseRequest),
    Modal(Timer),
    Reload,
}

/// Drives the news grid: loads news when mounted and wires card selection to the detail overlay.
///
/// All state changes happen in [`Grid::handle`] on the owner's task. Background work (fetches,
/// overlay delays) reports back through the event channel returned by [`Grid::new`].
pub struct Grid {
    client: Arc<NewsClient>,
    limit: NonZeroUsize,
    events: mpsc::UnboundedSender<Event>,
    feed: Feed,
    status: ApiStatus,
    modal: Modal<Arc<NewsItem>>,
    request: u64,
    mounted: bool,
}

impl Grid {
    pub fn new(
        client: Arc<NewsClient>,
        limit: NonZeroUsize,
        modal: &ModalConfig,
    ) -> (Self, mpsc::UnboundedReceiver<Event>) {
        let (events, rx) = mpsc::unbounded_channel();

        let grid = Self {
            client,
            limit,
            events,
            feed: Feed::Loading,
            status: ApiStatus::offline(),
            modal: Modal::new(modal),
            request: 0,
            mounted: false,
        };

        (grid, rx)
    }

    pub fn feed(&self) -> &Feed {
        &self.feed
    }

    pub fn status(&self) -> &ApiStatus {
        &self.status
    }

    pub fn modal(&self) -> &Modal<Arc<NewsItem>> {
        &self.modal
    }

    pub fn items(&self) -> &[Arc<NewsItem>] {
        match &self.feed {
            Feed::Ready(items) => items,
            Feed::Loading | Feed::Failed(_) => &[],
        }
    }

    /// Starts loading news and probing the service status.
    pub fn mount(&mut self) {
        self.mounted = true;
        self.reload();

        let client = self.client.clone();
        let events = self.events.clone();

        tokio::spawn(async move {
            let status = client.api_status().await;
            let _ = events.send(Event::StatusProbed(status));
        });
    }

    /// Stops accepting results of background work still in flight.
    pub fn unmount(&mut self) {
        self.mounted = false;
    }

    pub fn reload(&mut self) {
        let request = self.begin_load();
        let client = self.client.clone();
        let events = self.events.clone();
        let limit = self.limit;

        tokio::spawn(async move {
            let response = client.fetch_news(limit).await;
            let _ = events.send(Event::NewsLoaded { request, response });
        });
    }

    fn begin_load(&mut self) -> u64 {
        self.request += 1;
        self.feed = Feed::Loading;
        debug!(request = self.request, "Loading news");

        self.request
    }

    /// Applies an event. Returns whether anything visible changed.
    pub fn handle(&mut self, event: Event) -> bool {
        match event {
            Event::NewsLoaded { request, response } => self.finish_load(request, response),

            Event::StatusProbed(status) => {
                if !self.mounted {
                    return false;
                }

                self.status = status;

                true
            }

            Event::Select(index) => {
                let Some(item) = self.items().get(index).cloned() else {
                    warn!(index, "No news item to select at this position");

                    return false;
                };

                let timer = self.modal.open(item);
                self.schedule(timer);

                true
            }

            Event::Close(request) => {
                let timer = self.modal.request_close(request);
                let changed = timer.is_some();
                self.schedule(timer);

                changed
            }

            Event::Modal(timer) => self.modal.fire(timer),

            Event::Reload => {
                self.reload();

                true
            }
        }
    }

    fn finish_load(&mut self, request: u64, response: NewsResponse) -> bool {
        if !self.mounted || request != self.request {
            debug!(
                request,
                current = self.request,
                "Dropping the news of a superseded request"
            );

            return false;
        }

        self.feed = if response.success {
            info!("Loaded {} news items", response.data.len());

            Feed::Ready(response.data.into_iter().map(Arc::new).collect())
        } else {
            warn!("The news service reported a failure");

            Feed::Failed("Could not load the news".into())
        };

        true
    }

    fn schedule(&self, timer: Option<Timer>) {
        let Some(timer) = timer else {
            return;
        };

        let events = self.events.clone();

        tokio::spawn(async move {
            time::sleep(timer.delay).await;
            let _ = events.send(Event::Modal(timer));
        });
    }
}

#[cfg(test)]
mod tests {
    use url::Url;

    use super::*;
    use crate::config::Config;
    use crate::fallback;
    use crate::modal::Phase;

    fn grid() -> (Grid, mpsc::UnboundedReceiver<Event>) {
        let cfg = Config {
            api_url: Url::parse("http://127.0.0.1:9/api/v1").unwrap(),
            ..Default::default()
        };
        let client = Arc::new(NewsClient::new(&cfg).unwrap());

        Grid::new(client, cfg.news_limit, &cfg.modal)
    }

    fn loaded() -> (Grid, mpsc::UnboundedReceiver<Event>) {
        let (mut grid, rx) = grid();
        grid.mounted = true;
        let request = grid.begin_load();
        assert!(grid.handle(Event::NewsLoaded {
            request,
            response: fallback::news(15),
        }));

        (grid, rx)
    }

    async fn next_timer(rx: &mut mpsc::UnboundedReceiver<Event>) -> Event {
        let event = rx.recv().await.unwrap();
        assert!(matches!(event, Event::Modal(_)), "{event:?}");

        event
    }

    #[tokio::test]
    async fn mount_loads_the_fallback_when_offline() {
        let (mut grid, mut rx) = grid();
        grid.mount();
        assert_eq!(grid.feed(), &Feed::Loading);

        for _ in 0..2 {
            let event = rx.recv().await.unwrap();
            assert!(grid.handle(event));
        }

        assert_eq!(grid.items().len(), 6);
        assert!(!grid.status().online);
    }

    #[tokio::test]
    async fn failed_envelope_shows_an_error() {
        let (mut grid, _rx) = grid();
        grid.mounted = true;
        let request = grid.begin_load();

        let mut response = fallback::news(15);
        response.success = false;
        grid.handle(Event::NewsLoaded { request, response });

        assert!(matches!(grid.feed(), Feed::Failed(_)));
        assert!(grid.items().is_empty());
    }

    #[tokio::test]
    async fn superseded_and_late_results_are_dropped() {
        let (mut grid, _rx) = grid();
        grid.mounted = true;

        let first = grid.begin_load();
        let second = grid.begin_load();
        assert!(!grid.handle(Event::NewsLoaded {
            request: first,
            response: fallback::news(1),
        }));
        assert_eq!(grid.feed(), &Feed::Loading);

        grid.unmount();
        assert!(!grid.handle(Event::NewsLoaded {
            request: second,
            response: fallback::news(1),
        }));
        assert!(!grid.handle(Event::StatusProbed(ApiStatus::offline())));
        assert_eq!(grid.feed(), &Feed::Loading);
    }

    #[tokio::test]
    async fn selecting_out_of_range_does_nothing() {
        let (mut grid, _rx) = loaded();

        assert!(!grid.handle(Event::Select(6)));
        assert_eq!(grid.modal().phase(), Phase::Closed);
    }

    #[tokio::test(start_paused = true)]
    async fn select_opens_and_escape_closes() {
        let (mut grid, mut rx) = loaded();

        assert!(grid.handle(Event::Select(1)));
        assert_eq!(grid.modal().phase(), Phase::Opening);
        assert_eq!(grid.modal().selected().unwrap().id, 6);

        let event = next_timer(&mut rx).await;
        assert!(grid.handle(event));
        assert_eq!(grid.modal().phase(), Phase::Open);

        assert!(grid.handle(Event::Close(CloseRequest::Escape)));
        assert_eq!(grid.modal().phase(), Phase::Closing);

        let event = next_timer(&mut rx).await;
        assert!(grid.handle(event));
        assert_eq!(grid.modal().phase(), Phase::Closed);
        assert!(grid.modal().selected().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn close_right_after_open_still_closes() {
        let (mut grid, mut rx) = loaded();

        grid.handle(Event::Select(0));
        grid.handle(Event::Close(CloseRequest::Button));

        let settle = next_timer(&mut rx).await;
        assert!(!grid.handle(settle));
        assert!(!grid.modal().state().animating);

        let hide = next_timer(&mut rx).await;
        assert!(grid.handle(hide));

        let state = grid.modal().state();
        assert!(!state.visible);
        assert!(!state.animating);
        assert!(state.selected.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn reopening_during_the_exit_transition_wins() {
        let (mut grid, mut rx) = loaded();

        grid.handle(Event::Select(0));
        let settle = next_timer(&mut rx).await;
        grid.handle(settle);
        grid.handle(Event::Close(CloseRequest::Backdrop { on_backdrop: true }));

        time::sleep(std::time::Duration::from_millis(100)).await;
        grid.handle(Event::Select(2));

        // The new enter delay is shorter than what is left of the exit delay.
        let settle = next_timer(&mut rx).await;
        assert!(grid.handle(settle));
        let stale_hide = next_timer(&mut rx).await;
        assert!(!grid.handle(stale_hide));

        assert_eq!(grid.modal().phase(), Phase::Open);
        assert_eq!(grid.modal().selected().unwrap().id, 1);
    }
}
