//! The view coordinator: the state machine between user intents and
//! fetches.
//!
//! All intents and fetch completions are handled by one task, strictly one
//! at a time, so the query state never sees concurrent mutation. Fetches
//! run out-of-band; each carries a sequence number and only the most
//! recently issued fetch may publish its result, which is what makes a
//! late response from a superseded fetch harmless.

use std::sync::Arc;

use time::Date;
use tokio::{
    sync::{mpsc, watch},
    task::JoinHandle,
    time::sleep,
};

use crate::{
    Error, FetchError,
    client::TransactionSource,
    config::DashboardConfig,
    models::{FilterOptions, PageResult},
    query::{FilterField, QueryState, SortOrder},
    request,
};

/// Whether a fetch is currently in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewPhase {
    /// Showing the last successful result, or the initial empty state.
    #[default]
    Idle,
    /// A fetch is in flight.
    Loading,
}

/// Everything the presentation surfaces need to render the dashboard.
///
/// Published through a watch channel; each publication replaces the
/// previous snapshot wholesale.
#[derive(Debug, Clone, Default)]
pub struct ViewState {
    /// Whether a fetch is in flight.
    pub phase: ViewPhase,
    /// The selections the displayed page reflects, or will reflect once
    /// the in-flight fetch lands.
    pub query: QueryState,
    /// The universe of valid filter values, once loaded. Stays `None` when
    /// the options fetch failed; the filter panel renders empty.
    pub filter_options: Option<FilterOptions>,
    /// The most recent successfully fetched page. A failed fetch leaves
    /// the previous page in place.
    pub page: Option<PageResult>,
    /// A human-readable notice for the last failure.
    ///
    /// Set for exactly one publication and cleared on the next, so a
    /// notice is shown once rather than lingering.
    pub notice: Option<String>,
}

/// A user edit to the query state.
///
/// Every intent except [Intent::SetPage] resets the page number to 1
/// before the next fetch is issued.
#[derive(Debug, Clone)]
pub enum Intent {
    /// Replace the search term. The resulting fetch is debounced.
    SetSearch(String),
    /// Toggle one value in one filter set.
    ToggleFilterValue(FilterField, String),
    /// Replace both age bounds.
    SetAgeRange(Option<u32>, Option<u32>),
    /// Replace both date bounds.
    SetDateRange(Option<Date>, Option<Date>),
    /// Replace the sort order.
    SetSort(SortOrder),
    /// Jump to another page of the current result set.
    SetPage(u64),
    /// Clear the search term, every filter set and both bound pairs.
    ClearAll,
}

/// A completion event reported back to the coordinator task by the work it
/// spawned.
enum Completion {
    /// The search box stayed quiet for the whole quiet window.
    SearchQuiet { generation: u64 },
    /// A transactions fetch finished.
    PageFetched {
        sequence: u64,
        result: Result<PageResult, FetchError>,
    },
    /// The filter options fetch finished.
    OptionsLoaded(Result<FilterOptions, FetchError>),
}

/// Sends intents to a running [ViewCoordinator].
///
/// Handles are cheap to clone. The coordinator stops once every handle
/// has been dropped.
#[derive(Debug, Clone)]
pub struct DashboardHandle {
    intents: mpsc::UnboundedSender<Intent>,
}

impl DashboardHandle {
    /// Send one intent to the coordinator.
    pub fn apply(&self, intent: Intent) {
        // A failed send means the coordinator has already stopped, which
        // only happens during shutdown.
        let _ = self.intents.send(intent);
    }

    /// Replace the search term. The fetch is issued after the quiet
    /// window elapses with no further edits.
    pub fn set_search(&self, term: impl Into<String>) {
        self.apply(Intent::SetSearch(term.into()));
    }

    /// Toggle one value in one filter set and fetch immediately.
    pub fn toggle_filter_value(&self, field: FilterField, value: impl Into<String>) {
        self.apply(Intent::ToggleFilterValue(field, value.into()));
    }

    /// Replace both age bounds and fetch immediately.
    pub fn set_age_range(&self, min: Option<u32>, max: Option<u32>) {
        self.apply(Intent::SetAgeRange(min, max));
    }

    /// Replace both date bounds and fetch immediately.
    pub fn set_date_range(&self, from: Option<Date>, to: Option<Date>) {
        self.apply(Intent::SetDateRange(from, to));
    }

    /// Replace the sort order and fetch immediately.
    pub fn set_sort(&self, order: SortOrder) {
        self.apply(Intent::SetSort(order));
    }

    /// Jump to another page and fetch immediately.
    pub fn set_page(&self, page: u64) {
        self.apply(Intent::SetPage(page));
    }

    /// Clear search, filters and bounds, and fetch immediately.
    pub fn clear_all(&self) {
        self.apply(Intent::ClearAll);
    }
}

/// The state machine between user intents and API fetches.
pub struct ViewCoordinator<S> {
    source: Arc<S>,
    config: DashboardConfig,
    state: ViewState,
    states: watch::Sender<ViewState>,
    completions: mpsc::UnboundedSender<Completion>,
    /// The sequence number of the most recently issued fetch. Completions
    /// carrying an older number are discarded.
    fetch_sequence: u64,
    /// Invalidates quiet signals from search edits that have since been
    /// superseded or overtaken by an immediate fetch.
    search_generation: u64,
    pending_search: Option<JoinHandle<()>>,
}

impl<S: TransactionSource> ViewCoordinator<S> {
    /// Start the coordinator on its own task.
    ///
    /// Requests the filter options (once for the life of the coordinator)
    /// and issues the initial transactions fetch straight away. Returns a
    /// handle for sending intents and a receiver of published view states.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(
        source: S,
        config: DashboardConfig,
    ) -> (DashboardHandle, watch::Receiver<ViewState>) {
        let (intent_tx, intent_rx) = mpsc::unbounded_channel();
        let (completion_tx, completion_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(ViewState::default());

        let coordinator = Self {
            source: Arc::new(source),
            config,
            state: ViewState::default(),
            states: state_tx,
            completions: completion_tx,
            fetch_sequence: 0,
            search_generation: 0,
            pending_search: None,
        };
        tokio::spawn(coordinator.run(intent_rx, completion_rx));

        (DashboardHandle { intents: intent_tx }, state_rx)
    }

    async fn run(
        mut self,
        mut intents: mpsc::UnboundedReceiver<Intent>,
        mut completions: mpsc::UnboundedReceiver<Completion>,
    ) {
        self.request_filter_options();
        self.issue_fetch();

        loop {
            tokio::select! {
                intent = intents.recv() => match intent {
                    Some(intent) => self.apply_intent(intent),
                    // Every handle is gone; the dashboard is shutting down.
                    None => break,
                },
                Some(completion) = completions.recv() => self.apply_completion(completion),
            }
        }

        if let Some(pending) = self.pending_search.take() {
            pending.abort();
        }
    }

    fn apply_intent(&mut self, intent: Intent) {
        match intent {
            Intent::SetSearch(term) => {
                self.state.query.set_search(term);
                self.schedule_search_fetch();
            }
            Intent::ToggleFilterValue(field, value) => {
                self.state.query.toggle_filter_value(field, &value);
                self.issue_fetch();
            }
            Intent::SetAgeRange(min, max) => {
                self.state.query.set_age_range(min, max);
                self.issue_fetch();
            }
            Intent::SetDateRange(from, to) => {
                self.state.query.set_date_range(from, to);
                self.issue_fetch();
            }
            Intent::SetSort(order) => {
                self.state.query.set_sort(order);
                self.issue_fetch();
            }
            Intent::SetPage(page) => {
                self.state.query.set_page(page);
                self.issue_fetch();
            }
            Intent::ClearAll => {
                self.state.query.clear_all();
                self.issue_fetch();
            }
        }
    }

    fn apply_completion(&mut self, completion: Completion) {
        match completion {
            Completion::SearchQuiet { generation } => {
                // A quiet signal can slip into the queue just before its
                // task is cancelled; the generation check drops it then.
                if generation == self.search_generation {
                    self.pending_search = None;
                    self.issue_fetch();
                } else {
                    tracing::debug!(generation, "ignoring superseded search quiet signal");
                }
            }
            Completion::PageFetched { sequence, result } => {
                if sequence != self.fetch_sequence {
                    tracing::debug!(
                        sequence,
                        current = self.fetch_sequence,
                        "discarding stale fetch result"
                    );
                    return;
                }

                self.state.phase = ViewPhase::Idle;
                match result {
                    Ok(page) => {
                        self.state.page = Some(page);
                    }
                    Err(cause) => {
                        let error = Error::Fetch(cause);
                        tracing::error!("{error}");
                        self.state.notice = Some(error.to_string());
                    }
                }
                self.publish();
            }
            Completion::OptionsLoaded(result) => {
                match result {
                    Ok(options) => {
                        self.state.filter_options = Some(options);
                    }
                    Err(cause) => {
                        let error = Error::OptionsLoad(cause);
                        tracing::error!("{error}");
                        self.state.notice = Some(error.to_string());
                    }
                }
                self.publish();
            }
        }
    }

    /// Start (or restart) the quiet-window timer for the current search
    /// term and publish the edited query so the search box can render it.
    fn schedule_search_fetch(&mut self) {
        if let Some(pending) = self.pending_search.take() {
            pending.abort();
        }
        self.search_generation += 1;
        let generation = self.search_generation;
        let quiet_window = self.config.search_quiet_window;
        let completions = self.completions.clone();
        self.pending_search = Some(tokio::spawn(async move {
            sleep(quiet_window).await;
            let _ = completions.send(Completion::SearchQuiet { generation });
        }));

        self.publish();
    }

    /// Build a request from the current query state and fetch it,
    /// superseding whatever fetch may still be in flight.
    fn issue_fetch(&mut self) {
        if let Some(pending) = self.pending_search.take() {
            // This fetch already carries the latest search text; a
            // debounced fetch landing later would only duplicate it.
            pending.abort();
            self.search_generation += 1;
        }

        self.fetch_sequence += 1;
        let sequence = self.fetch_sequence;
        let pairs = request::build_query(&self.state.query, self.config.page_size);
        tracing::debug!(
            sequence,
            "requesting transactions: {}",
            request::to_query_string(&pairs)
        );

        let source = Arc::clone(&self.source);
        let completions = self.completions.clone();
        tokio::spawn(async move {
            let result = source.fetch_page(pairs).await;
            let _ = completions.send(Completion::PageFetched { sequence, result });
        });

        self.state.phase = ViewPhase::Loading;
        self.publish();
    }

    fn request_filter_options(&self) {
        let source = Arc::clone(&self.source);
        let completions = self.completions.clone();
        tokio::spawn(async move {
            let result = source.fetch_filter_options().await;
            let _ = completions.send(Completion::OptionsLoaded(result));
        });
    }

    fn publish(&mut self) {
        // send_replace keeps publishing even while no receiver is
        // subscribed, e.g. between renders.
        self.states.send_replace(self.state.clone());
        // A notice rides exactly one publication.
        self.state.notice = None;
    }
}

#[cfg(test)]
mod tests {
    use std::{
        collections::VecDeque,
        sync::{Arc, Mutex},
        time::Duration,
    };

    use tokio::{sync::watch, time::sleep};

    use crate::{
        FetchError,
        client::TransactionSource,
        config::DashboardConfig,
        models::{AgeRange, FilterOptions, PageResult},
        query::FilterField,
    };

    use super::{ViewCoordinator, ViewPhase, ViewState};

    struct ScriptedPage {
        delay: Duration,
        /// `Ok` carries a total count used as a marker to tell responses
        /// apart; `Err` carries an HTTP status.
        outcome: Result<u64, u16>,
    }

    fn ok_page(total_count: u64) -> ScriptedPage {
        ScriptedPage {
            delay: Duration::ZERO,
            outcome: Ok(total_count),
        }
    }

    fn delayed_page(total_count: u64, delay_ms: u64) -> ScriptedPage {
        ScriptedPage {
            delay: Duration::from_millis(delay_ms),
            outcome: Ok(total_count),
        }
    }

    fn failed_page(status: u16) -> ScriptedPage {
        ScriptedPage {
            delay: Duration::ZERO,
            outcome: Err(status),
        }
    }

    #[derive(Default)]
    struct ScriptedInner {
        pages: Mutex<VecDeque<ScriptedPage>>,
        options_failure: Mutex<Option<u16>>,
        requests: Mutex<Vec<Vec<(&'static str, String)>>>,
    }

    /// A [TransactionSource] that serves scripted responses in order and
    /// records every request it receives. Responses for an exhausted
    /// script are empty pages.
    #[derive(Clone, Default)]
    struct ScriptedSource {
        inner: Arc<ScriptedInner>,
    }

    impl ScriptedSource {
        fn with_pages(pages: impl IntoIterator<Item = ScriptedPage>) -> Self {
            let source = Self::default();
            source.inner.pages.lock().unwrap().extend(pages);
            source
        }

        fn with_failing_options(status: u16) -> Self {
            let source = Self::default();
            *source.inner.options_failure.lock().unwrap() = Some(status);
            source
        }

        fn request_count(&self) -> usize {
            self.inner.requests.lock().unwrap().len()
        }

        fn request(&self, index: usize) -> Vec<(&'static str, String)> {
            self.inner.requests.lock().unwrap()[index].clone()
        }

        fn request_value(&self, index: usize, key: &str) -> Option<String> {
            self.request(index)
                .into_iter()
                .find(|(pair_key, _)| *pair_key == key)
                .map(|(_, value)| value)
        }
    }

    impl TransactionSource for ScriptedSource {
        async fn fetch_page(
            &self,
            query: Vec<(&'static str, String)>,
        ) -> Result<PageResult, FetchError> {
            self.inner.requests.lock().unwrap().push(query);
            let scripted = self
                .inner
                .pages
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(ok_page(0));

            sleep(scripted.delay).await;

            match scripted.outcome {
                Ok(total_count) => Ok(page_with_total(total_count)),
                Err(status) => Err(FetchError::ErrorStatus {
                    status,
                    body: "scripted failure".to_owned(),
                }),
            }
        }

        async fn fetch_filter_options(&self) -> Result<FilterOptions, FetchError> {
            match *self.inner.options_failure.lock().unwrap() {
                Some(status) => Err(FetchError::ErrorStatus {
                    status,
                    body: "scripted failure".to_owned(),
                }),
                None => Ok(sample_options()),
            }
        }
    }

    fn page_with_total(total_count: u64) -> PageResult {
        PageResult {
            transactions: Vec::new(),
            total_count,
            page: 1,
            page_size: 10,
            total_pages: total_count.div_ceil(10),
            has_next: total_count > 10,
            has_previous: false,
        }
    }

    fn sample_options() -> FilterOptions {
        FilterOptions {
            regions: vec!["North".to_owned(), "South".to_owned()],
            genders: vec!["Female".to_owned(), "Male".to_owned()],
            categories: vec!["Electronics".to_owned()],
            tags: vec!["premium".to_owned()],
            payment_methods: vec!["Cash".to_owned()],
            age_range: AgeRange { min: 18, max: 70 },
        }
    }

    fn quick_config() -> DashboardConfig {
        DashboardConfig {
            search_quiet_window: Duration::from_millis(300),
            ..DashboardConfig::default()
        }
    }

    async fn wait_for(
        states: &mut watch::Receiver<ViewState>,
        predicate: impl Fn(&ViewState) -> bool,
    ) -> ViewState {
        tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                {
                    let state = states.borrow();
                    if predicate(&state) {
                        return state.clone();
                    }
                }
                states
                    .changed()
                    .await
                    .expect("Coordinator stopped before the expected state appeared");
            }
        })
        .await
        .expect("Timed out waiting for a view state")
    }

    async fn wait_for_request_count(source: &ScriptedSource, count: usize) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while source.request_count() < count {
                sleep(Duration::from_millis(1)).await;
            }
        })
        .await
        .unwrap_or_else(|_| {
            panic!(
                "Timed out waiting for request #{count}, got {}",
                source.request_count()
            )
        });
    }

    #[tokio::test]
    async fn startup_fetches_options_and_first_page() {
        let source = ScriptedSource::with_pages([ok_page(21)]);
        let (_handle, mut states) = ViewCoordinator::spawn(source.clone(), quick_config());

        let state = wait_for(&mut states, |state| {
            state.phase == ViewPhase::Idle
                && state.page.is_some()
                && state.filter_options.is_some()
        })
        .await;

        assert_eq!(state.page.unwrap().total_count, 21);
        assert_eq!(source.request_count(), 1);
        assert_eq!(
            source.request_value(0, "sort_by"),
            Some("date_desc".to_owned())
        );
        assert_eq!(source.request_value(0, "page"), Some("1".to_owned()));
        assert_eq!(source.request_value(0, "page_size"), Some("10".to_owned()));
        assert_eq!(source.request_value(0, "search"), None);
    }

    #[tokio::test(start_paused = true)]
    async fn search_edits_within_the_quiet_window_coalesce_into_one_fetch() {
        let source = ScriptedSource::default();
        let (handle, mut states) = ViewCoordinator::spawn(source.clone(), quick_config());
        wait_for(&mut states, |state| state.phase == ViewPhase::Idle).await;

        handle.set_search("a");
        sleep(Duration::from_millis(100)).await;
        handle.set_search("ab");
        sleep(Duration::from_millis(50)).await;
        handle.set_search("abc");
        sleep(Duration::from_millis(400)).await;

        assert_eq!(
            source.request_count(),
            2,
            "only the initial fetch and one debounced fetch should be issued"
        );
        assert_eq!(source.request_value(1, "search"), Some("abc".to_owned()));
        let state = wait_for(&mut states, |state| state.phase == ViewPhase::Idle).await;
        assert_eq!(state.query.search, "abc");
    }

    #[tokio::test(start_paused = true)]
    async fn search_edits_keep_extending_the_quiet_window() {
        let source = ScriptedSource::default();
        let (handle, mut states) = ViewCoordinator::spawn(source.clone(), quick_config());
        wait_for(&mut states, |state| state.phase == ViewPhase::Idle).await;

        // Each edit lands inside the previous window, so no fetch should
        // be issued until 300ms after the last one.
        for term in ["a", "ab", "abc", "abcd"] {
            handle.set_search(term);
            sleep(Duration::from_millis(250)).await;
        }
        assert_eq!(source.request_count(), 1, "no debounced fetch should have fired yet");

        sleep(Duration::from_millis(100)).await;

        assert_eq!(source.request_count(), 2);
        assert_eq!(source.request_value(1, "search"), Some("abcd".to_owned()));
    }

    #[tokio::test(start_paused = true)]
    async fn filter_change_fetches_immediately_and_cancels_the_pending_search_fetch() {
        let source = ScriptedSource::default();
        let (handle, mut states) = ViewCoordinator::spawn(source.clone(), quick_config());
        wait_for(&mut states, |state| state.phase == ViewPhase::Idle).await;

        handle.set_search("ab");
        sleep(Duration::from_millis(100)).await;
        handle.toggle_filter_value(FilterField::Regions, "North");
        wait_for_request_count(&source, 2).await;
        // Run well past the quiet window to catch a debounced duplicate.
        sleep(Duration::from_millis(600)).await;

        assert_eq!(source.request_count(), 2);
        assert_eq!(source.request_value(1, "search"), Some("ab".to_owned()));
        assert_eq!(
            source.request_value(1, "customer_regions"),
            Some("North".to_owned())
        );
    }

    #[tokio::test(start_paused = true)]
    async fn stale_response_is_discarded_in_favor_of_the_newer_fetch() {
        let source = ScriptedSource::with_pages([
            ok_page(0),
            delayed_page(111, 500),
            delayed_page(222, 50),
        ]);
        let (handle, mut states) = ViewCoordinator::spawn(source.clone(), quick_config());
        wait_for(&mut states, |state| state.phase == ViewPhase::Idle).await;

        handle.toggle_filter_value(FilterField::Regions, "North");
        wait_for_request_count(&source, 2).await;
        handle.toggle_filter_value(FilterField::Regions, "South");
        wait_for_request_count(&source, 3).await;

        // Let both responses land; the slow first fetch resolves last.
        sleep(Duration::from_millis(1000)).await;

        let state = wait_for(&mut states, |state| state.phase == ViewPhase::Idle).await;
        assert_eq!(
            state.page.expect("a page should have been published").total_count,
            222,
            "the displayed page should reflect the newer fetch only"
        );
    }

    #[tokio::test]
    async fn failed_fetch_keeps_the_previous_page_and_notices_once() {
        let source = ScriptedSource::with_pages([ok_page(7), failed_page(500), ok_page(9)]);
        let (handle, mut states) = ViewCoordinator::spawn(source.clone(), quick_config());
        wait_for(&mut states, |state| state.page.is_some()).await;

        handle.toggle_filter_value(FilterField::Regions, "North");
        let state = wait_for(&mut states, |state| state.notice.is_some()).await;

        assert_eq!(state.phase, ViewPhase::Idle);
        let notice = state.notice.unwrap();
        assert!(notice.contains("500"), "notice should name the cause: {notice}");
        assert_eq!(
            state.page.expect("previous page should be kept").total_count,
            7
        );

        handle.set_page(2);
        let state = wait_for(&mut states, |state| {
            state.page.as_ref().is_some_and(|page| page.total_count == 9)
        })
        .await;
        assert_eq!(state.notice, None, "a notice should not outlive one publication");
    }

    #[tokio::test]
    async fn page_jump_survives_until_the_next_filter_change() {
        let source = ScriptedSource::default();
        let (handle, mut states) = ViewCoordinator::spawn(source.clone(), quick_config());
        wait_for(&mut states, |state| state.phase == ViewPhase::Idle).await;

        handle.set_page(3);
        wait_for_request_count(&source, 2).await;
        handle.toggle_filter_value(FilterField::Regions, "North");
        wait_for_request_count(&source, 3).await;

        assert_eq!(source.request_value(1, "page"), Some("3".to_owned()));
        assert_eq!(
            source.request_value(2, "page"),
            Some("1".to_owned()),
            "a filter change must reset to the first page"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn failed_options_fetch_leaves_the_panel_empty() {
        let source = ScriptedSource::with_failing_options(503);
        // Delay the first page so the options notice is observable before
        // the page publication replaces it.
        source
            .inner
            .pages
            .lock()
            .unwrap()
            .push_back(delayed_page(5, 100));
        let (_handle, mut states) = ViewCoordinator::spawn(source.clone(), quick_config());

        let state = wait_for(&mut states, |state| state.notice.is_some()).await;
        assert!(
            state.notice.unwrap().contains("filter options"),
            "the notice should say what failed"
        );

        let state = wait_for(&mut states, |state| state.page.is_some()).await;
        assert_eq!(state.filter_options, None);
        assert_eq!(state.page.unwrap().total_count, 5);
    }
}
