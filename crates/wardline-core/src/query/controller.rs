// Query controller
//
// All mutable state lives in one `watch` channel. Starting a fetch bumps the
// epoch under the channel lock; a response is applied only if its epoch is
// still current when it arrives. In-flight requests are never aborted, they
// just lose the right to write.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock, Weak};
use std::time::Duration;

use arc_swap::ArcSwapOption;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;
use tracing::debug;
use wardline_api::Page;

use super::scheduler::{Scheduler, TimerHandle, TokioScheduler};
use super::source::{PageQuery, PageSource};
use super::{QueryStatus, QueryView};
use crate::config::ClientConfig;
use crate::error::CoreError;

/// Pacing and sizing for a controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryConfig {
    pub page_size: u32,
    pub debounce: Duration,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            page_size: 12,
            debounce: Duration::from_millis(300),
        }
    }
}

impl From<&ClientConfig> for QueryConfig {
    fn from(config: &ClientConfig) -> Self {
        Self {
            page_size: config.page_size,
            debounce: config.debounce,
        }
    }
}

/// Drives one paged, searchable view.
///
/// Cheaply cloneable. Dropping the last clone cancels any pending debounce
/// timer; responses still in flight are then discarded on arrival.
pub struct QueryController<S: PageSource> {
    inner: Arc<Inner<S>>,
}

impl<S: PageSource> Clone for QueryController<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct Inner<S: PageSource> {
    source: Arc<S>,
    scheduler: Arc<dyn Scheduler>,
    debounce: Duration,
    state: watch::Sender<QueryView<S::Item>>,
    /// The live debounce timer. Only the timer whose entry is still in the
    /// slot may clear it and fetch.
    pending: ArcSwapOption<PendingTimer>,
    timer_seq: AtomicU64,
}

/// Slot entry for a debounce timer. The entry is published before the
/// timer is scheduled, so `handle` is filled in afterwards.
struct PendingTimer {
    seq: u64,
    handle: OnceLock<TimerHandle>,
}

impl<S: PageSource> QueryController<S> {
    /// Controller with Tokio-backed timers. Issues no request until
    /// [`refresh`](Self::refresh) or [`set_search_text`](Self::set_search_text).
    pub fn new(source: S, config: QueryConfig) -> Self {
        Self::with_scheduler(source, config, Arc::new(TokioScheduler))
    }

    pub fn with_scheduler(source: S, config: QueryConfig, scheduler: Arc<dyn Scheduler>) -> Self {
        let (state, _) = watch::channel(QueryView::new(config.page_size.max(1)));
        Self {
            inner: Arc::new(Inner {
                source: Arc::new(source),
                scheduler,
                debounce: config.debounce,
                state,
                pending: ArcSwapOption::empty(),
                timer_seq: AtomicU64::new(0),
            }),
        }
    }

    // ── Observation ──────────────────────────────────────────────────

    pub fn snapshot(&self) -> QueryView<S::Item> {
        self.inner.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<QueryView<S::Item>> {
        self.inner.state.subscribe()
    }

    /// Stream of view snapshots, starting with the current one.
    pub fn updates(&self) -> WatchStream<QueryView<S::Item>> {
        WatchStream::new(self.subscribe())
    }

    /// `true` while a debounced fetch is waiting for its timer.
    pub fn has_pending_search(&self) -> bool {
        self.inner.pending.load().is_some()
    }

    /// Wait until no debounce timer is pending and no fetch is loading,
    /// then return the view.
    pub async fn settled(&self) -> QueryView<S::Item> {
        let mut rx = self.subscribe();
        loop {
            {
                let view = rx.borrow_and_update();
                if !self.has_pending_search() && view.status != QueryStatus::Loading {
                    return view.clone();
                }
            }
            if rx.changed().await.is_err() {
                return self.snapshot();
            }
        }
    }

    // ── Inputs ───────────────────────────────────────────────────────

    /// Record new search text and reset to page 1. The fetch is issued once
    /// no further call arrives within the debounce window; each call
    /// restarts the window.
    pub fn set_search_text(&self, text: impl Into<String>) {
        let text = text.into();
        self.inner.state.send_modify(|view| {
            view.search_text = text;
            view.page = 1;
        });

        self.inner.cancel_pending();
        let seq = self.inner.timer_seq.fetch_add(1, Ordering::SeqCst) + 1;
        let entry = Arc::new(PendingTimer {
            seq,
            handle: OnceLock::new(),
        });
        self.inner.pending.store(Some(Arc::clone(&entry)));

        let weak = Arc::downgrade(&self.inner);
        let handle = self.inner.scheduler.schedule_after(
            self.inner.debounce,
            Box::new(move || Inner::on_timer(&weak, seq)),
        );
        // If the entry was already displaced, dropping it here cancels the timer.
        let _ = entry.handle.set(handle);
    }

    /// Jump to `page` and fetch it immediately. Out-of-range pages
    /// (including any page before the first successful fetch) are ignored;
    /// returns whether a fetch was started.
    pub fn set_page(&self, page: u32) -> bool {
        let total = self.inner.state.borrow().total_pages;
        if page == 0 || page > total {
            debug!(page, total, "ignoring out-of-range page");
            return false;
        }
        self.inner.cancel_pending();
        Inner::start(&self.inner, |view| {
            if page > view.total_pages {
                return false;
            }
            view.page = page;
            true
        })
    }

    /// Re-fetch the current page with the current search text right away.
    pub fn refresh(&self) {
        self.inner.cancel_pending();
        Inner::start(&self.inner, |_| true);
    }

    pub fn next_page(&self) -> bool {
        let page = self.inner.state.borrow().page;
        self.set_page(page.saturating_add(1))
    }

    pub fn previous_page(&self) -> bool {
        let page = self.inner.state.borrow().page;
        self.set_page(page.saturating_sub(1))
    }
}

impl<S: PageSource> Inner<S> {
    fn cancel_pending(&self) {
        let Some(entry) = self.pending.swap(None) else {
            return;
        };
        if let Some(handle) = entry.handle.get() {
            handle.cancel();
        }
    }

    /// Fires the search only if this timer's entry is still in the slot,
    /// removing it in the same atomic step.
    fn on_timer(weak: &Weak<Self>, seq: u64) {
        let Some(inner) = weak.upgrade() else {
            return;
        };
        let current = inner.pending.load_full();
        if current.as_ref().is_none_or(|p| p.seq != seq) {
            return;
        }
        let previous = inner.pending.compare_and_swap(&current, None::<Arc<PendingTimer>>);
        let claimed = matches!((&*previous, &current), (Some(a), Some(b)) if Arc::ptr_eq(a, b));
        if !claimed {
            return;
        }
        Self::start(&inner, |_| true);
    }

    /// Apply `prepare` and, if it accepts, begin a fetch for the resulting
    /// (search, page) under a fresh epoch.
    fn start(this: &Arc<Self>, prepare: impl FnOnce(&mut QueryView<S::Item>) -> bool) -> bool {
        let mut started = None;
        this.state.send_if_modified(|view| {
            if !prepare(view) {
                return false;
            }
            view.epoch += 1;
            view.status = QueryStatus::Loading;
            view.error_message = None;
            started = Some((
                view.epoch,
                PageQuery {
                    search: view.search_text.clone(),
                    page: view.page,
                    page_size: view.page_size,
                },
            ));
            true
        });
        let Some((epoch, query)) = started else {
            return false;
        };

        debug!(epoch, page = query.page, search = %query.search, "fetching page");
        let source = Arc::clone(&this.source);
        let weak = Arc::downgrade(this);
        tokio::spawn(async move {
            let result = source.fetch_page(&query).await;
            if let Some(inner) = weak.upgrade() {
                inner.complete(epoch, query, result);
            }
        });
        true
    }

    fn complete(&self, epoch: u64, query: PageQuery, result: Result<Page<S::Item>, CoreError>) {
        let applied = self.state.send_if_modified(|view| {
            if view.epoch != epoch {
                return false;
            }
            match result {
                Ok(page) => {
                    view.items = Arc::new(page.data);
                    view.total_pages = page.pagination.total_pages;
                    view.status = QueryStatus::Success;
                    view.error_message = None;
                    view.applied = Some(query);
                }
                Err(err) => {
                    view.status = QueryStatus::Error;
                    view.error_message = Some(err.user_message());
                }
            }
            true
        });
        if !applied {
            debug!(epoch, "discarding stale response");
        }
    }
}
