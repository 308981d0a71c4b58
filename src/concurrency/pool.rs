//! Fixed-size worker pool with a dedicated dispatcher thread
//!
//! Tasks are queued in FIFO order. The dispatcher waits until there is both a
//! queued task and an idle worker, hands the task to the lowest-numbered idle
//! worker and marks it busy. A worker runs its task, marks itself idle again,
//! wakes the dispatcher and records the completion.
//!
//! Which idle worker receives a task is not part of the contract; only that
//! every scheduled task runs exactly once.

use crate::AggregatorError;
use parking_lot::{Condvar, Mutex};
use std::any::Any;
use std::collections::{BTreeSet, VecDeque};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

type Job = Box<dyn FnOnce() + Send + 'static>;

struct Task {
    id: u64,
    job: Job,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WorkerState {
    Idle,
    Busy,
}

/// Everything the dispatcher and the workers coordinate on
struct DispatchState {
    queue: VecDeque<Task>,
    workers: Vec<WorkerState>,
    /// Task handed to each worker but not yet picked up
    assigned: Vec<Option<Task>>,
    finished: bool,
}

/// Scheduled-vs-completed bookkeeping for `wait()`
struct Progress {
    next_id: u64,
    /// Ids of scheduled tasks that have not completed
    pending: BTreeSet<u64>,
}

struct Shared {
    name: String,
    dispatch: Mutex<DispatchState>,
    dispatcher_wakeup: Condvar,
    worker_wakeups: Vec<Condvar>,
    progress: Mutex<Progress>,
    all_done: Condvar,
}

impl Shared {
    fn schedule(&self, job: Job) {
        let id = {
            let mut progress = self.progress.lock();
            let id = progress.next_id;
            progress.next_id += 1;
            progress.pending.insert(id);
            id
        };

        let accepted = {
            let mut state = self.dispatch.lock();
            if state.finished {
                false
            } else {
                state.queue.push_back(Task { id, job });
                true
            }
        };

        if accepted {
            self.dispatcher_wakeup.notify_one();
        } else {
            tracing::warn!("{}: task scheduled after shutdown was dropped", self.name);
            self.complete(id);
        }
    }

    fn complete(&self, id: u64) {
        let mut progress = self.progress.lock();
        let was_oldest = progress.pending.first() == Some(&id);
        progress.pending.remove(&id);
        if was_oldest {
            self.all_done.notify_all();
        }
    }

    fn wait(&self) {
        let mut progress = self.progress.lock();
        let horizon = progress.next_id;
        while progress.pending.first().is_some_and(|&id| id < horizon) {
            self.all_done.wait(&mut progress);
        }
    }

    fn dispatch_loop(&self) {
        let mut state = self.dispatch.lock();
        loop {
            if state.finished {
                return;
            }

            let idle = if state.queue.is_empty() {
                None
            } else {
                state.workers.iter().position(|s| *s == WorkerState::Idle)
            };

            match idle {
                Some(worker_id) => {
                    if let Some(task) = state.queue.pop_front() {
                        state.workers[worker_id] = WorkerState::Busy;
                        state.assigned[worker_id] = Some(task);
                        self.worker_wakeups[worker_id].notify_one();
                    }
                }
                None => self.dispatcher_wakeup.wait(&mut state),
            }
        }
    }

    fn worker_loop(&self, worker_id: usize) {
        loop {
            let task = {
                let mut state = self.dispatch.lock();
                loop {
                    if let Some(task) = state.assigned[worker_id].take() {
                        break task;
                    }
                    if state.finished {
                        return;
                    }
                    self.worker_wakeups[worker_id].wait(&mut state);
                }
            };

            let Task { id, job } = task;
            if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(job)) {
                tracing::error!(
                    "{}: task {} on worker {} panicked: {}",
                    self.name,
                    id,
                    worker_id,
                    panic_message(payload.as_ref())
                );
            }

            self.dispatch.lock().workers[worker_id] = WorkerState::Idle;
            self.dispatcher_wakeup.notify_one();
            self.complete(id);
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "non-string panic payload"
    }
}

/// A pool of `size` reusable worker threads plus one dispatcher thread
///
/// Dropping the pool waits for every scheduled task, then stops and joins all
/// of its threads.
///
/// # Example
///
/// ```
/// use news_aggregator::concurrency::WorkerPool;
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use std::sync::Arc;
///
/// let pool = WorkerPool::new("example", 4).unwrap();
/// let counter = Arc::new(AtomicUsize::new(0));
/// for _ in 0..10 {
///     let counter = Arc::clone(&counter);
///     pool.schedule(move || {
///         counter.fetch_add(1, Ordering::SeqCst);
///     });
/// }
/// pool.wait();
/// assert_eq!(counter.load(Ordering::SeqCst), 10);
/// ```
pub struct WorkerPool {
    shared: Arc<Shared>,
    workers: Vec<JoinHandle<()>>,
    dispatcher: Option<JoinHandle<()>>,
}

impl WorkerPool {
    /// Starts a pool with `size` workers
    ///
    /// Threads are named `<name>-worker-<i>` and `<name>-dispatcher`.
    ///
    /// # Returns
    ///
    /// * `Ok(WorkerPool)` - All threads are running
    /// * `Err(AggregatorError)` - `size` is zero or a thread could not be spawned
    pub fn new(name: &str, size: usize) -> Result<Self, AggregatorError> {
        if size == 0 {
            return Err(AggregatorError::Pool(format!(
                "Cannot create worker pool '{}' with 0 workers",
                name
            )));
        }

        let shared = Arc::new(Shared {
            name: name.to_string(),
            dispatch: Mutex::new(DispatchState {
                queue: VecDeque::new(),
                workers: vec![WorkerState::Idle; size],
                assigned: (0..size).map(|_| None).collect(),
                finished: false,
            }),
            dispatcher_wakeup: Condvar::new(),
            worker_wakeups: (0..size).map(|_| Condvar::new()).collect(),
            progress: Mutex::new(Progress {
                next_id: 0,
                pending: BTreeSet::new(),
            }),
            all_done: Condvar::new(),
        });

        // Built incrementally so that a failed spawn drops (and joins) the
        // threads already started.
        let mut pool = Self {
            shared,
            workers: Vec::with_capacity(size),
            dispatcher: None,
        };

        for worker_id in 0..size {
            let shared = Arc::clone(&pool.shared);
            let thread_name = format!("{}-worker-{}", name, worker_id);
            let handle = thread::Builder::new()
                .name(thread_name.clone())
                .spawn(move || shared.worker_loop(worker_id))
                .map_err(|source| AggregatorError::ThreadSpawn {
                    name: thread_name,
                    source,
                })?;
            pool.workers.push(handle);
        }

        let shared = Arc::clone(&pool.shared);
        let thread_name = format!("{}-dispatcher", name);
        let handle = thread::Builder::new()
            .name(thread_name.clone())
            .spawn(move || shared.dispatch_loop())
            .map_err(|source| AggregatorError::ThreadSpawn {
                name: thread_name,
                source,
            })?;
        pool.dispatcher = Some(handle);

        tracing::debug!("Started worker pool '{}' with {} workers", name, size);
        Ok(pool)
    }

    /// Queues `job` for execution and returns immediately
    ///
    /// A panicking job is logged and counted as completed; it does not take
    /// its worker down.
    pub fn schedule<F>(&self, job: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.shared.schedule(Box::new(job));
    }

    /// Blocks until every task scheduled before this call has finished
    ///
    /// Tasks scheduled after `wait` starts (including ones scheduled by the
    /// tasks being waited on) are not waited for.
    pub fn wait(&self) {
        self.shared.wait();
    }

    /// Returns a cloneable handle that can schedule into this pool from
    /// other threads, including tasks running in another pool
    pub fn handle(&self) -> PoolHandle {
        PoolHandle {
            shared: Arc::clone(&self.shared),
        }
    }

    /// Number of workers
    pub fn size(&self) -> usize {
        self.workers.len()
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.wait();

        self.shared.dispatch.lock().finished = true;
        self.shared.dispatcher_wakeup.notify_all();
        for wakeup in &self.shared.worker_wakeups {
            wakeup.notify_all();
        }

        for worker in self.workers.drain(..) {
            if worker.join().is_err() {
                tracing::error!("{}: worker thread panicked", self.shared.name);
            }
        }
        if let Some(dispatcher) = self.dispatcher.take() {
            if dispatcher.join().is_err() {
                tracing::error!("{}: dispatcher thread panicked", self.shared.name);
            }
        }

        tracing::debug!("Stopped worker pool '{}'", self.shared.name);
    }
}

/// Scheduling-only view of a [`WorkerPool`]
///
/// Holding a handle does not keep the pool's threads alive. Jobs scheduled
/// after the pool has been dropped are discarded with a warning.
#[derive(Clone)]
pub struct PoolHandle {
    shared: Arc<Shared>,
}

impl PoolHandle {
    /// Queues `job` on the pool this handle came from
    pub fn schedule<F>(&self, job: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.shared.schedule(Box::new(job));
    }
}
