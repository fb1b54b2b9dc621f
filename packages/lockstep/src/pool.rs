//! Pool construction and the phase lifecycle.

use std::io;
use std::num::NonZero;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;
use std::{iter, mem, panic};

use many_cpus::ProcessorSet;
use tracing::{debug, trace};

use crate::metrics::PHASE_DURATION_MS;
use crate::{Error, Result, Shared, Task, worker_entrypoint};

const DEFAULT_THREAD_NAME_PREFIX: &str = "lockstep";

type WorkerBody = Box<dyn FnOnce() + Send + 'static>;

/// A fixed set of worker threads that execute tasks in explicitly released phases.
///
/// Each phase follows the same protocol:
///
/// 1. [`submit()`][Self::submit] up to one task per worker. Nothing runs yet.
/// 2. [`release()`][Self::release] hands slot `i` of the queue to worker `i` and wakes the
///    workers that received a task. This does not block.
/// 3. [`wait()`][Self::wait] blocks until every released task has completed and empties the
///    queue for the next phase.
///
/// The worker threads are created once when the pool is built and are reused by every phase, so
/// the interval between `release()` and the return of `wait()` contains task execution and wakeup
/// latency but no thread creation, queue population or teardown.
///
/// Everything the submitting thread wrote before `release()` is visible to the tasks of that
/// phase, and everything the tasks wrote is visible to the caller once `wait()` returns.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicUsize, Ordering};
///
/// use lockstep::{Pool, Task};
/// use new_zealand::nz;
///
/// let mut pool = Pool::new(nz!(4))?;
/// let counter = Arc::new(AtomicUsize::new(0));
///
/// for _ in 0..pool.worker_count().get() {
///     pool.submit(Task::new({
///         let counter = Arc::clone(&counter);
///         move || {
///             counter.fetch_add(1, Ordering::Relaxed);
///         }
///     }))?;
/// }
///
/// pool.release()?;
/// pool.wait()?;
///
/// assert_eq!(counter.load(Ordering::Relaxed), 4);
///
/// pool.shutdown()?;
/// # Ok::<(), lockstep::Error>(())
/// ```
///
/// # Misuse
///
/// Operations invoked out of order (submitting into an in-flight phase, overfilling the queue,
/// waiting without releasing, using the pool after shutdown) return an error describing the
/// violation instead of being queued or ignored. See [`Error::is_usage_violation()`].
///
/// # Limitations
///
/// There is no cancellation and no timeout. A task that never returns makes `wait()` block
/// forever.
///
/// # Lifecycle
///
/// Dropping the pool without calling [`shutdown()`][Self::shutdown] shuts it down implicitly,
/// first waiting for any in-flight phase to complete.
#[derive(Debug)]
pub struct Pool {
    shared: Arc<Shared>,
    join_handles: Vec<JoinHandle<()>>,
    worker_count: NonZero<usize>,
    released_at: Option<Instant>,
    shut_down: bool,
}

impl Pool {
    /// Creates a pool with the given number of worker threads and default settings.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Spawn`] if a worker thread cannot be created. Workers created before the
    /// failure are stopped and joined first.
    pub fn new(worker_count: NonZero<usize>) -> Result<Self> {
        Self::builder().worker_count(worker_count).build()
    }

    /// Creates a builder for configuring the pool.
    #[must_use]
    pub fn builder() -> PoolBuilder {
        PoolBuilder::new()
    }

    /// The number of workers in the pool, fixed for the lifetime of the pool.
    ///
    /// This is also the maximum number of tasks a single phase accepts.
    #[must_use]
    pub fn worker_count(&self) -> NonZero<usize> {
        self.worker_count
    }

    /// The number of tasks submitted into the currently open phase.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.shared.state.lock().queue.pending()
    }

    /// The number of phases released since the pool was created.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.shared.state.lock().generation
    }

    /// Whether a phase has been released and not yet waited for.
    #[must_use]
    pub fn is_in_flight(&self) -> bool {
        self.shared.state.lock().in_flight
    }

    /// Queues a task for the next phase. The task does not start until [`release()`][Self::release].
    ///
    /// # Errors
    ///
    /// Returns [`Error::PhaseInFlight`] if a phase has been released but not yet waited for,
    /// [`Error::QueueFull`] if one task has already been submitted for every worker and
    /// [`Error::ShutDown`] if the pool has been shut down. The task is dropped in all cases.
    pub fn submit(&mut self, task: impl Into<Task>) -> Result<()> {
        self.ensure_running()?;

        let mut state = self.shared.state.lock();

        if state.in_flight {
            return Err(Error::PhaseInFlight);
        }

        state.queue.push(task.into()).map_err(|_task| Error::QueueFull {
            capacity: self.worker_count.get(),
        })
    }

    /// Starts the phase: assigns every submitted task to its worker and wakes those workers.
    ///
    /// Workers without a task stay idle for this phase. This call does not wait for the tasks;
    /// use [`wait()`][Self::wait] for that.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PhaseInFlight`] if the previous phase has not been waited for,
    /// [`Error::EmptyPhase`] if no task was submitted and [`Error::ShutDown`] if the pool has
    /// been shut down.
    pub fn release(&mut self) -> Result<()> {
        self.ensure_running()?;

        let assigned = {
            let mut state = self.shared.state.lock();

            if state.in_flight {
                return Err(Error::PhaseInFlight);
            }

            let assigned = state.queue.assign();

            if assigned == 0 {
                return Err(Error::EmptyPhase);
            }

            state.in_flight = true;
            state.outstanding = assigned;
            state.generation = state.generation.wrapping_add(1);

            trace!(generation = state.generation, assigned, "phase released");

            assigned
        };

        self.released_at = Some(Instant::now());

        // Tasks occupy the leading slots, so exactly the first `assigned` workers have work.
        for wake in self.shared.wake.iter().take(assigned) {
            wake.notify_one();
        }

        Ok(())
    }

    /// Blocks until every task of the in-flight phase has completed, then closes the phase and
    /// empties the queue so the next phase can be submitted.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoPhaseInFlight`] if no phase has been released and
    /// [`Error::ShutDown`] if the pool has been shut down.
    ///
    /// Returns [`Error::TaskPanicked`] if any task of the phase panicked. The phase is closed
    /// nonetheless and the pool remains usable.
    pub fn wait(&mut self) -> Result<()> {
        self.ensure_running()?;

        let panicked = {
            let mut state = self.shared.state.lock();

            if !state.in_flight {
                return Err(Error::NoPhaseInFlight);
            }

            while state.outstanding > 0 {
                self.shared.done.wait(&mut state);
            }

            state.in_flight = false;
            state.queue.clear();

            trace!(generation = state.generation, "phase completed");

            mem::take(&mut state.panicked)
        };

        if let Some(released_at) = self.released_at.take() {
            PHASE_DURATION_MS.with(|e| e.observe_millis(released_at.elapsed()));
        }

        if panicked > 0 {
            return Err(Error::TaskPanicked { count: panicked });
        }

        Ok(())
    }

    /// Runs one complete phase with one task per worker, created by calling `task_factory`
    /// once for each worker.
    ///
    /// This is [`submit()`][Self::submit] for every worker, followed by
    /// [`release()`][Self::release] and [`wait()`][Self::wait].
    ///
    /// # Errors
    ///
    /// Returns the first error reported by the underlying operations.
    pub fn run_phase<F>(&mut self, mut task_factory: F) -> Result<()>
    where
        F: FnMut() -> Task,
    {
        for task in iter::repeat_with(&mut task_factory).take(self.worker_count.get()) {
            self.submit(task)?;
        }

        self.release()?;
        self.wait()
    }

    /// Stops every worker and joins their threads.
    ///
    /// Tasks that were submitted but never released are dropped without running.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PhaseInFlight`] if a phase has been released but not yet waited for and
    /// [`Error::ShutDown`] if the pool has already been shut down.
    pub fn shutdown(&mut self) -> Result<()> {
        self.ensure_running()?;

        if self.is_in_flight() {
            return Err(Error::PhaseInFlight);
        }

        self.stop_workers();
        Ok(())
    }

    fn ensure_running(&self) -> Result<()> {
        if self.shut_down {
            return Err(Error::ShutDown);
        }

        Ok(())
    }

    #[cfg_attr(test, mutants::skip)] // Impractical to test that stuff stops happening.
    fn stop_workers(&mut self) {
        self.shut_down = true;
        self.shared.signal_shutdown();

        let handles = mem::take(&mut self.join_handles);
        let joined = handles.len();

        join_workers(handles);

        self.shared.state.lock().queue.clear();

        debug!(workers = joined, "pool shut down");
    }
}

impl Drop for Pool {
    #[cfg_attr(test, mutants::skip)] // Impractical to test that stuff stops happening.
    fn drop(&mut self) {
        if self.shut_down {
            return;
        }

        if self.is_in_flight() {
            if thread::panicking() {
                // Waiting for the phase may block on the same problem that caused the panic,
                // so the workers are left to exit with the process.
                return;
            }

            // The phase outcome has nobody to report to anymore.
            drop(self.wait());
        }

        self.stop_workers();
    }
}

/// Builder for configuring a [`Pool`].
#[derive(Debug)]
pub struct PoolBuilder {
    worker_count: Option<NonZero<usize>>,
    processors: Option<ProcessorSet>,
    thread_name_prefix: String,
}

impl PoolBuilder {
    fn new() -> Self {
        Self {
            worker_count: None,
            processors: None,
            thread_name_prefix: DEFAULT_THREAD_NAME_PREFIX.to_string(),
        }
    }

    /// Sets the number of worker threads.
    ///
    /// Defaults to the number of processors in the processor set if one is configured via
    /// [`processors()`][Self::processors], otherwise to the number of processors in the default
    /// processor set.
    #[must_use]
    pub fn worker_count(mut self, count: NonZero<usize>) -> Self {
        self.worker_count = Some(count);
        self
    }

    /// Pins each worker thread to one processor of the given set.
    ///
    /// Worker `i` is pinned to the `i`-th processor of the set. With more workers than processors
    /// the assignment wraps around, so some processors host several workers.
    ///
    /// Without this, the operating system is free to schedule worker threads on any processor.
    #[must_use]
    pub fn processors(mut self, processors: ProcessorSet) -> Self {
        self.processors = Some(processors);
        self
    }

    /// Sets the prefix of worker thread names. Worker `i` is named `{prefix}-w{i}`.
    ///
    /// Default is `lockstep`. A prefix containing a NUL byte makes [`build()`][Self::build] fail
    /// with [`Error::InvalidThreadName`].
    #[must_use]
    pub fn thread_name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.thread_name_prefix = prefix.into();
        self
    }

    /// Creates the worker threads and returns the pool, with every worker idle.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidThreadName`] if the thread name prefix contains a NUL byte and
    /// [`Error::Spawn`] if a worker thread cannot be created. Workers created before the failure
    /// are stopped and joined first, so no partially constructed pool remains.
    pub fn build(self) -> Result<Pool> {
        self.build_with(|builder, body| builder.spawn(body))
    }

    /// Builds the pool, creating each worker thread through `spawn`.
    fn build_with<S>(self, mut spawn: S) -> Result<Pool>
    where
        S: FnMut(thread::Builder, WorkerBody) -> io::Result<JoinHandle<()>>,
    {
        if self.thread_name_prefix.contains('\0') {
            return Err(Error::InvalidThreadName {
                prefix: self.thread_name_prefix,
            });
        }

        let worker_count = self.worker_count.unwrap_or_else(|| {
            let processor_count = self
                .processors
                .as_ref()
                .map_or_else(|| ProcessorSet::default().len(), ProcessorSet::len);

            NonZero::new(processor_count)
                .expect("guarded by fact that ProcessorSet is never empty")
        });

        let mut pin_targets = self.processors.as_ref().map(|processors| {
            single_processor_sets(processors)
                .into_iter()
                .cycle()
                .take(worker_count.get())
        });

        let shared = Arc::new(Shared::new(worker_count));
        let mut join_handles = Vec::with_capacity(worker_count.get());

        for worker_index in 0..worker_count.get() {
            let pin_to = pin_targets.as_mut().and_then(Iterator::next);

            let body: WorkerBody = Box::new({
                let shared = Arc::clone(&shared);

                move || {
                    if let Some(processor) = pin_to {
                        processor.pin_current_thread_to();
                    }

                    worker_entrypoint(&shared, worker_index);
                }
            });

            let builder = thread::Builder::new()
                .name(format!("{}-w{worker_index}", self.thread_name_prefix));

            match spawn(builder, body) {
                Ok(handle) => join_handles.push(handle),
                Err(source) => {
                    shared.signal_shutdown();
                    join_workers(join_handles);

                    return Err(Error::Spawn {
                        worker_index,
                        source,
                    });
                }
            }
        }

        debug!(workers = worker_count.get(), "pool started");

        Ok(Pool {
            shared,
            join_handles,
            worker_count,
            released_at: None,
            shut_down: false,
        })
    }
}

/// Splits a processor set into one single-processor set per processor, in set order.
fn single_processor_sets(processors: &ProcessorSet) -> Vec<ProcessorSet> {
    processors
        .processors()
        .iter()
        .map(|processor| {
            let id = processor.id();

            ProcessorSet::builder()
                .filter(move |candidate| candidate.id() == id)
                .take_all()
                .unwrap_or_else(|| processors.clone())
        })
        .collect()
}

fn join_workers(handles: Vec<JoinHandle<()>>) {
    for handle in handles {
        if let Err(payload) = handle.join() {
            // Tasks run inside a panic trap, so a worker thread can only panic if the pool
            // infrastructure itself is broken. That must not go unnoticed.
            panic::resume_unwind(payload);
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use new_zealand::nz;
    use static_assertions::assert_impl_all;

    use super::*;

    assert_impl_all!(Pool: Send);

    #[cfg_attr(miri, ignore)]
    #[test]
    fn new_pool_is_idle() {
        let pool = Pool::new(nz!(2)).unwrap();

        assert_eq!(pool.worker_count().get(), 2);
        assert_eq!(pool.pending(), 0);
        assert_eq!(pool.generation(), 0);
        assert!(!pool.is_in_flight());
    }

    #[cfg_attr(miri, ignore)]
    #[test]
    fn builder_names_threads() {
        let mut pool = Pool::builder()
            .worker_count(nz!(1))
            .thread_name_prefix("kernel")
            .build()
            .unwrap();

        let name = Arc::new(parking_lot::Mutex::new(None));

        pool.submit(Task::new({
            let name = Arc::clone(&name);
            move || {
                *name.lock() = thread::current().name().map(str::to_string);
            }
        }))
        .unwrap();
        pool.release().unwrap();
        pool.wait().unwrap();

        assert_eq!(name.lock().as_deref(), Some("kernel-w0"));
    }

    #[cfg_attr(miri, ignore)]
    #[test]
    fn builder_defaults_to_processor_count() {
        let expected = ProcessorSet::default().len();

        let pool = Pool::builder().build().unwrap();

        assert_eq!(pool.worker_count().get(), expected);
    }

    #[cfg_attr(miri, ignore)]
    #[test]
    fn builder_with_processors_defaults_to_set_size() {
        let processors = ProcessorSet::builder().take(nz!(1)).unwrap();

        let mut pool = Pool::builder().processors(processors).build().unwrap();

        assert_eq!(pool.worker_count().get(), 1);
        pool.run_phase(|| Task::from_fn(|| {})).unwrap();
    }

    #[cfg_attr(miri, ignore)]
    #[test]
    fn pending_counts_submissions() {
        let mut pool = Pool::new(nz!(3)).unwrap();

        pool.submit(Task::from_fn(|| {})).unwrap();
        pool.submit(Task::from_fn(|| {})).unwrap();

        assert_eq!(pool.pending(), 2);

        pool.release().unwrap();
        assert_eq!(pool.pending(), 0);
        assert!(pool.is_in_flight());

        pool.wait().unwrap();
        assert!(!pool.is_in_flight());
        assert_eq!(pool.generation(), 1);
    }

    #[cfg_attr(miri, ignore)]
    #[test]
    fn partial_phase_leaves_remaining_workers_idle() {
        let mut pool = Pool::new(nz!(4)).unwrap();
        let counter = Arc::new(AtomicUsize::new(0));

        for _ in 0..2 {
            pool.submit(Task::new({
                let counter = Arc::clone(&counter);
                move || {
                    counter.fetch_add(1, Ordering::Relaxed);
                }
            }))
            .unwrap();
        }

        pool.release().unwrap();
        pool.wait().unwrap();

        assert_eq!(counter.load(Ordering::Relaxed), 2);
    }

    #[cfg_attr(miri, ignore)]
    #[test]
    fn release_without_tasks_is_rejected() {
        let mut pool = Pool::new(nz!(1)).unwrap();

        assert!(matches!(pool.release(), Err(Error::EmptyPhase)));
        assert!(!pool.is_in_flight());
    }

    #[cfg_attr(miri, ignore)]
    #[test]
    fn release_twice_is_rejected() {
        let mut pool = Pool::new(nz!(1)).unwrap();
        pool.submit(Task::from_fn(|| {})).unwrap();
        pool.release().unwrap();

        assert!(matches!(pool.release(), Err(Error::PhaseInFlight)));

        pool.wait().unwrap();
    }

    #[cfg_attr(miri, ignore)]
    #[test]
    fn wait_without_release_is_rejected() {
        let mut pool = Pool::new(nz!(1)).unwrap();

        assert!(matches!(pool.wait(), Err(Error::NoPhaseInFlight)));

        pool.submit(Task::from_fn(|| {})).unwrap();
        assert!(matches!(pool.wait(), Err(Error::NoPhaseInFlight)));
    }

    #[cfg_attr(miri, ignore)]
    #[test]
    fn overfilled_queue_is_rejected() {
        let mut pool = Pool::new(nz!(2)).unwrap();
        pool.submit(Task::from_fn(|| {})).unwrap();
        pool.submit(Task::from_fn(|| {})).unwrap();

        assert!(matches!(
            pool.submit(Task::from_fn(|| {})),
            Err(Error::QueueFull { capacity: 2 })
        ));
    }

    #[cfg_attr(miri, ignore)]
    #[test]
    fn panicking_task_is_reported_and_pool_stays_usable() {
        let mut pool = Pool::new(nz!(2)).unwrap();

        pool.submit(Task::new(|| panic!("intentional panic"))).unwrap();
        pool.submit(Task::from_fn(|| {})).unwrap();
        pool.release().unwrap();

        assert!(matches!(pool.wait(), Err(Error::TaskPanicked { count: 1 })));
        assert!(!pool.is_in_flight());

        pool.run_phase(|| Task::from_fn(|| {})).unwrap();
        pool.shutdown().unwrap();
    }

    #[cfg_attr(miri, ignore)]
    #[test]
    fn operations_after_shutdown_are_rejected() {
        let mut pool = Pool::new(nz!(1)).unwrap();
        pool.shutdown().unwrap();

        assert!(matches!(pool.submit(Task::from_fn(|| {})), Err(Error::ShutDown)));
        assert!(matches!(pool.release(), Err(Error::ShutDown)));
        assert!(matches!(pool.wait(), Err(Error::ShutDown)));
        assert!(matches!(pool.shutdown(), Err(Error::ShutDown)));
    }

    #[cfg_attr(miri, ignore)]
    #[test]
    fn drop_waits_for_in_flight_phase() {
        let mut pool = Pool::new(nz!(2)).unwrap();
        let counter = Arc::new(AtomicUsize::new(0));

        for _ in 0..2 {
            pool.submit(Task::new({
                let counter = Arc::clone(&counter);
                move || {
                    thread::sleep(Duration::from_millis(20));
                    counter.fetch_add(1, Ordering::Relaxed);
                }
            }))
            .unwrap();
        }

        pool.release().unwrap();
        drop(pool);

        assert_eq!(counter.load(Ordering::Relaxed), 2);
    }

    #[cfg_attr(miri, ignore)]
    #[test]
    fn unreleased_tasks_are_dropped_on_shutdown() {
        let mut pool = Pool::new(nz!(1)).unwrap();
        let marker = Arc::new(());

        pool.submit(Task::new({
            let marker = Arc::clone(&marker);
            move || drop(marker)
        }))
        .unwrap();

        pool.shutdown().unwrap();

        assert_eq!(Arc::strong_count(&marker), 1);
    }

    #[test]
    fn thread_name_prefix_with_nul_is_rejected() {
        let result = Pool::builder()
            .worker_count(nz!(1))
            .thread_name_prefix("bad\0name")
            .build();

        assert!(matches!(
            result,
            Err(Error::InvalidThreadName { ref prefix }) if prefix == "bad\0name"
        ));
    }

    #[cfg_attr(miri, ignore)]
    #[test]
    fn failed_spawn_joins_workers_already_started() {
        let exited = Arc::new(AtomicUsize::new(0));

        let result = Pool::builder().worker_count(nz!(5)).build_with({
            let exited = Arc::clone(&exited);
            let mut attempts = 0_usize;

            move |builder, body| {
                if attempts == 2 {
                    return Err(io::Error::other("out of threads"));
                }

                attempts = attempts.wrapping_add(1);
                let exited = Arc::clone(&exited);

                builder.spawn(move || {
                    body();
                    exited.fetch_add(1, Ordering::Relaxed);
                })
            }
        });

        assert!(matches!(result, Err(Error::Spawn { worker_index: 2, .. })));

        // Both started workers have been joined by the time the error is returned.
        assert_eq!(exited.load(Ordering::Relaxed), 2);
    }

    #[cfg_attr(miri, ignore)]
    #[test]
    fn shutdown_joins_every_worker() {
        for worker_count in [nz!(1), nz!(2), nz!(5)] {
            let started = Arc::new(AtomicUsize::new(0));
            let exited = Arc::new(AtomicUsize::new(0));

            let mut pool = Pool::builder()
                .worker_count(worker_count)
                .build_with({
                    let started = Arc::clone(&started);
                    let exited = Arc::clone(&exited);

                    move |builder, body| {
                        let started = Arc::clone(&started);
                        let exited = Arc::clone(&exited);

                        builder.spawn(move || {
                            started.fetch_add(1, Ordering::Relaxed);
                            body();
                            exited.fetch_add(1, Ordering::Relaxed);
                        })
                    }
                })
                .unwrap();

            pool.run_phase(|| Task::from_fn(|| {})).unwrap();
            pool.shutdown().unwrap();

            assert_eq!(started.load(Ordering::Relaxed), worker_count.get());
            assert_eq!(exited.load(Ordering::Relaxed), worker_count.get());
        }
    }

    #[cfg_attr(miri, ignore)]
    #[test]
    fn processor_set_splits_into_single_processors() {
        let processors = ProcessorSet::default();

        let singles = single_processor_sets(&processors);

        assert_eq!(singles.len(), processors.len());

        for (single, processor) in singles.iter().zip(processors.processors().iter()) {
            assert_eq!(single.len(), 1);
            assert_eq!(single.processors().first().id(), processor.id());
        }
    }

    /// The processors the calling thread may run on, in the kernel's list notation.
    #[cfg(target_os = "linux")]
    fn allowed_processors_of_current_thread() -> String {
        use std::fs;

        let status = fs::read_to_string("/proc/thread-self/status").unwrap();

        status
            .lines()
            .find_map(|line| line.strip_prefix("Cpus_allowed_list:"))
            .unwrap()
            .trim()
            .to_string()
    }

    #[cfg(target_os = "linux")]
    #[cfg_attr(miri, ignore)]
    #[test]
    fn each_worker_is_pinned_to_its_own_processor() {
        let processors = ProcessorSet::default();

        // One worker more than there are processors, so the last one wraps around to the first.
        let mut expected: Vec<String> = processors
            .processors()
            .iter()
            .map(|processor| processor.id().to_string())
            .collect();
        expected.push(expected.first().unwrap().clone());

        let mut pool = Pool::builder()
            .worker_count(NonZero::new(expected.len()).unwrap())
            .processors(processors)
            .build()
            .unwrap();

        let observed = Arc::new(parking_lot::Mutex::new(vec![String::new(); expected.len()]));

        for worker_index in 0..expected.len() {
            pool.submit(Task::new({
                let observed = Arc::clone(&observed);
                move || {
                    if let Some(slot) = observed.lock().get_mut(worker_index) {
                        *slot = allowed_processors_of_current_thread();
                    }
                }
            }))
            .unwrap();
        }

        pool.release().unwrap();
        pool.wait().unwrap();
        pool.shutdown().unwrap();

        assert_eq!(*observed.lock(), expected);
    }
}
