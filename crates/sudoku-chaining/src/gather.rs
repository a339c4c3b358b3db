//! Concurrent step gathering.
//!
//! [`StepGatherer`] runs a set of [`StepSearcher`]s against one grid on a
//! rayon pool. The analysis cache is built and prepared synchronously on
//! the calling thread, then shared read-only with every searcher. One parent
//! job fans out a child per searcher; their steps land in priority buckets
//! and are flattened once every child has finished.
//!
//! The returned [`GatherHandle`] can be polled, blocked on, given
//! completion callbacks, or awaited as a [`Future`].

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::mem;
use std::panic::{self, AssertUnwindSafe};
use std::pin::Pin;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::task::{Context, Poll, Waker};

use log::{debug, error, warn};
use rayon::{ThreadPool, ThreadPoolBuilder};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cancel::CancellationToken;
use crate::chaining::cache::AnalysisCache;
use crate::error::ChainingError;
use crate::grid::GridView;
use crate::searchers::{SearchContext, StepSearcher};
use crate::step::Step;

// ==================== Options ====================

/// Where completion callbacks run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContinuationMode {
    /// On the thread that completes the gathering, or on the registering
    /// thread when it has already completed.
    #[default]
    Inline,
    /// Always rescheduled onto the gatherer's pool.
    Pool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatherOptions {
    /// Worker threads; 0 lets rayon pick.
    pub num_threads: usize,
    pub continuation: ContinuationMode,
}

// ==================== Errors ====================

/// A searcher that failed while the others kept running.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearcherFailure {
    pub searcher: String,
    pub error: ChainingError,
}

impl fmt::Display for SearcherFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.searcher, self.error)
    }
}

/// Outcome of a gathering that did not produce steps.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatherError {
    #[error("gathering cancelled")]
    Cancelled,
    #[error("{} searcher(s) failed, first: {}", .0.len(), first_failure(.0))]
    Failed(Vec<SearcherFailure>),
}

impl GatherError {
    /// The first recorded failure, if any.
    pub fn first(&self) -> Option<&SearcherFailure> {
        match self {
            GatherError::Cancelled => None,
            GatherError::Failed(failures) => failures.first(),
        }
    }
}

fn first_failure(failures: &[SearcherFailure]) -> String {
    failures
        .first()
        .map(ToString::to_string)
        .unwrap_or_default()
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

/// What a finished gathering yields.
pub type GatherResult = Result<Vec<Step>, GatherError>;

// ==================== Shared State ====================

type Continuation = Box<dyn FnOnce() + Send + 'static>;

#[derive(Default)]
struct State {
    buckets: BTreeMap<u32, Vec<Step>>,
    failures: Vec<SearcherFailure>,
    outcome: Option<GatherResult>,
    continuations: Vec<Continuation>,
    wakers: Vec<Waker>,
}

struct Shared {
    state: Mutex<State>,
    done: Condvar,
    mode: ContinuationMode,
    pool: Arc<ThreadPool>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn insert(&self, priority: u32, steps: Vec<Step>) {
        self.lock().buckets.entry(priority).or_default().extend(steps);
    }

    fn fail(&self, failure: SearcherFailure) {
        self.lock().failures.push(failure);
    }

    fn complete(&self, token: &CancellationToken) {
        let (continuations, wakers) = {
            let mut state = self.lock();
            let outcome: GatherResult = if token.is_cancelled() {
                Err(GatherError::Cancelled)
            } else if !state.failures.is_empty() {
                Err(GatherError::Failed(mem::take(&mut state.failures)))
            } else {
                let buckets = mem::take(&mut state.buckets);
                Ok(buckets.into_values().flatten().collect())
            };
            debug!(
                "gathering completed: {}",
                match &outcome {
                    Ok(steps) => format!("{} steps", steps.len()),
                    Err(e) => e.to_string(),
                }
            );
            state.outcome = Some(outcome);
            self.done.notify_all();
            (
                mem::take(&mut state.continuations),
                mem::take(&mut state.wakers),
            )
        };
        for waker in wakers {
            waker.wake();
        }
        for continuation in continuations {
            self.dispatch(continuation);
        }
    }

    fn dispatch(&self, continuation: Continuation) {
        match self.mode {
            ContinuationMode::Inline => continuation(),
            ContinuationMode::Pool => self.pool.spawn(continuation),
        }
    }
}

/// Run `f`, turning a panic into [`ChainingError::SearcherPanicked`].
fn guarded<T>(
    searcher: &str,
    f: impl FnOnce() -> Result<T, ChainingError>,
) -> Result<T, ChainingError> {
    panic::catch_unwind(AssertUnwindSafe(f)).unwrap_or_else(|payload| {
        Err(ChainingError::SearcherPanicked {
            searcher: searcher.to_string(),
            message: panic_message(payload.as_ref()),
        })
    })
}

fn run_searcher(
    searcher: &dyn StepSearcher,
    cache: &AnalysisCache,
    token: &CancellationToken,
    shared: &Shared,
) {
    let name = searcher.name().to_string();
    let outcome = token.check().and_then(|()| {
        let ctx = SearchContext::new(cache, token);
        guarded(&name, || searcher.search(&ctx))
    });

    match outcome {
        Ok(steps) => {
            debug!("{}: {} steps", name, steps.len());
            shared.insert(searcher.priority(), steps);
        }
        Err(e) if e.is_cancelled() => debug!("{}: cancelled", name),
        Err(e) => {
            warn!("{}: {}", name, e);
            shared.fail(SearcherFailure {
                searcher: name,
                error: e,
            });
        }
    }
}

// ==================== Gatherer ====================

/// Runs searchers concurrently and merges their steps by priority.
pub struct StepGatherer {
    pool: Arc<ThreadPool>,
    options: GatherOptions,
    searchers: Vec<Arc<dyn StepSearcher>>,
}

impl StepGatherer {
    pub fn new(options: GatherOptions) -> Result<Self, ChainingError> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(options.num_threads)
            .thread_name(|i| format!("step-gatherer-{i}"))
            .panic_handler(|payload| {
                error!("continuation panicked: {}", panic_message(payload.as_ref()))
            })
            .build()
            .map_err(|e| ChainingError::ThreadPool(e.to_string()))?;
        Ok(StepGatherer {
            pool: Arc::new(pool),
            options,
            searchers: Vec::new(),
        })
    }

    pub fn with_searcher(mut self, searcher: Box<dyn StepSearcher>) -> Self {
        self.searchers.push(Arc::from(searcher));
        self
    }

    pub fn with_searchers(self, searchers: Vec<Box<dyn StepSearcher>>) -> Self {
        searchers.into_iter().fold(self, StepGatherer::with_searcher)
    }

    pub fn options(&self) -> &GatherOptions {
        &self.options
    }

    pub fn searcher_count(&self) -> usize {
        self.searchers.len()
    }

    /// Prepare the cache and launch every searcher.
    ///
    /// Configuration errors are returned here, before anything is spawned.
    /// Everything that goes wrong afterwards is reported through the handle.
    pub fn start<G: GridView + ?Sized>(
        &self,
        grid: &G,
        token: &CancellationToken,
    ) -> Result<GatherHandle, ChainingError> {
        for searcher in &self.searchers {
            searcher.validate()?;
        }

        let shared = Arc::new(Shared {
            state: Mutex::new(State::default()),
            done: Condvar::new(),
            mode: self.options.continuation,
            pool: Arc::clone(&self.pool),
        });

        // The cache is read-only once the fan-out starts
        let mut cache = AnalysisCache::new(grid);
        let mut active = Vec::with_capacity(self.searchers.len());
        for searcher in &self.searchers {
            match guarded(searcher.name(), || searcher.prepare(&mut cache, token)) {
                Ok(()) => active.push(Arc::clone(searcher)),
                Err(e) if e.is_cancelled() => debug!("{}: cancelled in prepare", searcher.name()),
                Err(e) => {
                    warn!("{}: prepare failed: {}", searcher.name(), e);
                    shared.fail(SearcherFailure {
                        searcher: searcher.name().to_string(),
                        error: e,
                    });
                }
            }
        }
        let cache = Arc::new(cache);

        debug!("gathering with {} searchers", active.len());
        let task_shared = Arc::clone(&shared);
        let token = token.clone();
        self.pool.spawn(move || {
            rayon::scope(|scope| {
                for searcher in &active {
                    let (cache, token, shared) = (&cache, &token, &task_shared);
                    scope.spawn(move |_| run_searcher(searcher.as_ref(), cache, token, shared));
                }
            });
            task_shared.complete(&token);
        });

        Ok(GatherHandle { shared })
    }

    /// `start` then block until the merged steps are ready.
    pub fn gather<G: GridView + ?Sized>(
        &self,
        grid: &G,
        token: &CancellationToken,
    ) -> Result<GatherResult, ChainingError> {
        Ok(self.start(grid, token)?.wait())
    }
}

// ==================== Handle ====================

/// Handle to a running gathering.
#[derive(Clone)]
pub struct GatherHandle {
    shared: Arc<Shared>,
}

impl GatherHandle {
    pub fn is_completed(&self) -> bool {
        self.shared.lock().outcome.is_some()
    }

    /// Block until every searcher has finished.
    pub fn wait(&self) -> GatherResult {
        let mut state = self.shared.lock();
        loop {
            if let Some(outcome) = &state.outcome {
                return outcome.clone();
            }
            state = self
                .shared
                .done
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// The outcome if already completed.
    pub fn try_result(&self) -> Option<GatherResult> {
        self.shared.lock().outcome.clone()
    }

    /// The error of a completed gathering; `None` while running or on success.
    pub fn error(&self) -> Option<GatherError> {
        match &self.shared.lock().outcome {
            Some(Err(e)) => Some(e.clone()),
            _ => None,
        }
    }

    /// Run `f` once the gathering completes. Runs right away (per the
    /// continuation mode) when it already has.
    pub fn on_completed<F>(&self, f: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let mut state = self.shared.lock();
        if state.outcome.is_none() {
            state.continuations.push(Box::new(f));
            return;
        }
        drop(state);
        self.shared.dispatch(Box::new(f));
    }
}

impl fmt::Debug for GatherHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatherHandle")
            .field("completed", &self.is_completed())
            .finish()
    }
}

impl Future for GatherHandle {
    type Output = GatherResult;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let mut state = self.shared.lock();
        if let Some(outcome) = &state.outcome {
            return Poll::Ready(outcome.clone());
        }
        if !state.wakers.iter().any(|w| w.will_wake(cx.waker())) {
            state.wakers.push(cx.waker().clone());
        }
        Poll::Pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Grid;
    use crate::options::ChainingOptions;
    use crate::searchers::default_searchers;
    use crate::step::{Conclusion, Technique};
    use std::pin::pin;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::mpsc;
    use std::task::Wake;
    use std::thread;
    use std::time::Duration;

    const PUZZLE: &str =
        "530070000600195000098000060800060003400803001700020006060000280000419005000080079";
    const SOLUTION: &str =
        "534678912672195348198342567859761423426853791713924856961537284287419635345286179";

    struct Fixed {
        name: &'static str,
        priority: u32,
        cell: usize,
    }

    impl StepSearcher for Fixed {
        fn name(&self) -> &str {
            self.name
        }
        fn priority(&self) -> u32 {
            self.priority
        }
        fn search(&self, _ctx: &SearchContext<'_>) -> Result<Vec<Step>, ChainingError> {
            Ok(vec![Step::new(
                Technique::NakedSingle,
                vec![Conclusion::Placement {
                    cell: self.cell,
                    digit: 1,
                }],
            )])
        }
    }

    struct Panicking;

    impl StepSearcher for Panicking {
        fn name(&self) -> &str {
            "panicking"
        }
        fn priority(&self) -> u32 {
            1
        }
        fn search(&self, _ctx: &SearchContext<'_>) -> Result<Vec<Step>, ChainingError> {
            panic!("boom")
        }
    }

    struct PanicsInPrepare;

    impl StepSearcher for PanicsInPrepare {
        fn name(&self) -> &str {
            "panics-in-prepare"
        }
        fn priority(&self) -> u32 {
            5
        }
        fn prepare(
            &self,
            _cache: &mut AnalysisCache,
            _token: &CancellationToken,
        ) -> Result<(), ChainingError> {
            panic!("no links")
        }
        fn search(&self, _ctx: &SearchContext<'_>) -> Result<Vec<Step>, ChainingError> {
            unreachable!("search after a failed prepare")
        }
    }

    struct Gate(Arc<AtomicBool>);

    impl StepSearcher for Gate {
        fn name(&self) -> &str {
            "gate"
        }
        fn priority(&self) -> u32 {
            0
        }
        fn search(&self, _ctx: &SearchContext<'_>) -> Result<Vec<Step>, ChainingError> {
            while !self.0.load(Ordering::SeqCst) {
                thread::sleep(Duration::from_millis(1));
            }
            Ok(Vec::new())
        }
    }

    fn fixed(name: &'static str, priority: u32, cell: usize) -> Box<dyn StepSearcher> {
        Box::new(Fixed {
            name,
            priority,
            cell,
        })
    }

    struct ThreadWaker(thread::Thread);

    impl Wake for ThreadWaker {
        fn wake(self: Arc<Self>) {
            self.0.unpark();
        }
    }

    fn block_on<F: Future>(fut: F) -> F::Output {
        let mut fut = pin!(fut);
        let waker = Waker::from(Arc::new(ThreadWaker(thread::current())));
        let mut cx = Context::from_waker(&waker);
        loop {
            match fut.as_mut().poll(&mut cx) {
                Poll::Ready(out) => return out,
                Poll::Pending => thread::park(),
            }
        }
    }

    #[test]
    fn test_default_searchers_on_real_puzzle() {
        let gatherer = StepGatherer::new(GatherOptions::default())
            .unwrap()
            .with_searchers(default_searchers(ChainingOptions::default()));
        let steps = gatherer
            .gather(&Grid::from_string(PUZZLE).unwrap(), &CancellationToken::new())
            .unwrap()
            .unwrap();

        // Singles, then intersections, then chains
        assert_eq!(steps[0].technique, Technique::NakedSingle);
        let first_chain = steps.iter().position(|s| s.technique.is_chain()).unwrap();
        assert!(steps[..first_chain].iter().all(|s| !s.technique.is_chain()));
        assert!(steps[first_chain..].iter().all(|s| s.technique.is_chain()));

        let solution: Vec<u8> = SOLUTION.bytes().map(|b| b - b'0').collect();
        for step in &steps {
            for c in &step.conclusions {
                match c {
                    Conclusion::Placement { cell, digit } => assert_eq!(solution[*cell], *digit),
                    Conclusion::Elimination { cell, digit } => {
                        assert_ne!(solution[*cell], *digit, "{}", step)
                    }
                }
            }
        }
    }

    #[test]
    fn test_solved_grid_gives_empty_result() {
        let gatherer = StepGatherer::new(GatherOptions::default())
            .unwrap()
            .with_searchers(default_searchers(ChainingOptions::advanced()));
        let handle = gatherer
            .start(&Grid::from_string(SOLUTION).unwrap(), &CancellationToken::new())
            .unwrap();
        assert_eq!(handle.wait(), Ok(Vec::new()));
        assert!(handle.is_completed());
        assert_eq!(handle.error(), None);
    }

    #[test]
    fn test_results_flattened_by_priority() {
        let gatherer = StepGatherer::new(GatherOptions {
            num_threads: 4,
            ..GatherOptions::default()
        })
        .unwrap()
        .with_searcher(fixed("late", 30, 3))
        .with_searcher(fixed("early", 10, 1))
        .with_searcher(fixed("middle", 20, 2));
        let steps = gatherer
            .gather(&Grid::empty(), &CancellationToken::new())
            .unwrap()
            .unwrap();
        let cells: Vec<usize> = steps.iter().map(|s| s.conclusions[0].cell()).collect();
        assert_eq!(cells, vec![1, 2, 3]);
    }

    #[test]
    fn test_cancelled_token_completes_with_cancellation() {
        let gatherer = StepGatherer::new(GatherOptions::default())
            .unwrap()
            .with_searchers(default_searchers(ChainingOptions::default()));
        let token = CancellationToken::new();
        token.cancel();
        let handle = gatherer
            .start(&Grid::from_string(PUZZLE).unwrap(), &token)
            .unwrap();
        assert_eq!(handle.wait(), Err(GatherError::Cancelled));
        assert_eq!(handle.error(), Some(GatherError::Cancelled));
    }

    #[test]
    fn test_panic_is_aggregated_after_others_finish() {
        let gatherer = StepGatherer::new(GatherOptions::default())
            .unwrap()
            .with_searcher(fixed("fine", 10, 0))
            .with_searcher(Box::new(Panicking));
        let err = gatherer
            .gather(&Grid::empty(), &CancellationToken::new())
            .unwrap()
            .unwrap_err();
        let GatherError::Failed(failures) = &err else {
            panic!("expected failure, got {err:?}");
        };
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].searcher, "panicking");
        assert_eq!(
            failures[0].error,
            ChainingError::SearcherPanicked {
                searcher: "panicking".into(),
                message: "boom".into()
            }
        );
        assert_eq!(err.first(), Some(&failures[0]));
    }

    #[test]
    fn test_panic_in_prepare_is_reported_through_handle() {
        let gatherer = StepGatherer::new(GatherOptions::default())
            .unwrap()
            .with_searcher(Box::new(PanicsInPrepare))
            .with_searcher(fixed("fine", 10, 0));
        let handle = gatherer
            .start(&Grid::empty(), &CancellationToken::new())
            .unwrap();
        let Err(GatherError::Failed(failures)) = handle.wait() else {
            panic!("expected failure");
        };
        assert_eq!(failures.len(), 1);
        assert_eq!(
            failures[0].error,
            ChainingError::SearcherPanicked {
                searcher: "panics-in-prepare".into(),
                message: "no links".into()
            }
        );
    }

    #[test]
    fn test_invalid_options_rejected_before_start() {
        let options = ChainingOptions {
            max_fish_size: 9,
            ..ChainingOptions::advanced()
        };
        let gatherer = StepGatherer::new(GatherOptions::default())
            .unwrap()
            .with_searchers(default_searchers(options));
        let err = gatherer
            .start(&Grid::empty(), &CancellationToken::new())
            .unwrap_err();
        assert!(matches!(err, ChainingError::InvalidOption { .. }));
    }

    #[test]
    fn test_continuation_registered_before_completion() {
        let release = Arc::new(AtomicBool::new(false));
        let gatherer = StepGatherer::new(GatherOptions::default())
            .unwrap()
            .with_searcher(Box::new(Gate(Arc::clone(&release))));
        let handle = gatherer
            .start(&Grid::empty(), &CancellationToken::new())
            .unwrap();

        let (tx, rx) = mpsc::channel();
        handle.on_completed(move || tx.send(()).unwrap());
        assert!(!handle.is_completed());
        assert!(handle.try_result().is_none());
        assert!(handle.error().is_none());

        release.store(true, Ordering::SeqCst);
        rx.recv_timeout(Duration::from_secs(10)).unwrap();
        assert!(handle.is_completed());
    }

    #[test]
    fn test_inline_continuation_after_completion_runs_on_caller() {
        let gatherer = StepGatherer::new(GatherOptions::default())
            .unwrap()
            .with_searcher(fixed("only", 10, 0));
        let handle = gatherer
            .start(&Grid::empty(), &CancellationToken::new())
            .unwrap();
        handle.wait().unwrap();

        let ran_on = Arc::new(Mutex::new(None));
        let slot = Arc::clone(&ran_on);
        handle.on_completed(move || {
            *slot.lock().unwrap() = Some(thread::current().id());
        });
        assert_eq!(*ran_on.lock().unwrap(), Some(thread::current().id()));
    }

    #[test]
    fn test_pool_continuation_runs_on_worker() {
        let gatherer = StepGatherer::new(GatherOptions {
            num_threads: 2,
            continuation: ContinuationMode::Pool,
        })
        .unwrap()
        .with_searcher(fixed("only", 10, 0));
        let handle = gatherer
            .start(&Grid::empty(), &CancellationToken::new())
            .unwrap();
        handle.wait().unwrap();

        let (tx, rx) = mpsc::channel();
        handle.on_completed(move || {
            tx.send(thread::current().name().map(str::to_string)).unwrap();
        });
        let name = rx.recv_timeout(Duration::from_secs(10)).unwrap().unwrap();
        assert!(name.starts_with("step-gatherer-"), "{name}");
    }

    #[test]
    fn test_handle_is_awaitable() {
        let gatherer = StepGatherer::new(GatherOptions::default())
            .unwrap()
            .with_searcher(fixed("b", 20, 5))
            .with_searcher(fixed("a", 10, 4));
        let handle = gatherer
            .start(&Grid::empty(), &CancellationToken::new())
            .unwrap();
        let steps = block_on(handle.clone()).unwrap();
        assert_eq!(steps.len(), 2);
        assert_eq!(steps[0].conclusions[0].cell(), 4);
        assert_eq!(block_on(handle), Ok(steps));
    }

    #[test]
    fn test_options_from_json() {
        let options: GatherOptions =
            serde_json::from_str(r#"{"continuation":"Pool"}"#).unwrap();
        assert_eq!(options.num_threads, 0);
        assert_eq!(options.continuation, ContinuationMode::Pool);
    }
}
