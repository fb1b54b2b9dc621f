use std::any::type_name;
use std::fmt;
use std::sync::Arc;

/// One unit of work executed by one worker during one phase.
///
/// A task takes no arguments and returns nothing. Any context the work needs travels inside the
/// task itself: it is a plain function that needs no context at all, a closure that captures its
/// context by value, or a reference to a closure shared by every task of the phase.
///
/// Only [`Task::new()`] allocates. Submitting the same work to every worker phase after phase
/// is best done with [`Task::from_fn()`] or [`Task::shared()`].
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicUsize, Ordering};
///
/// use lockstep::Task;
///
/// fn kernel() {}
///
/// let plain = Task::from_fn(kernel);
///
/// let counter = Arc::new(AtomicUsize::new(0));
/// let with_context = Task::new({
///     let counter = Arc::clone(&counter);
///     move || {
///         counter.fetch_add(1, Ordering::Relaxed);
///     }
/// });
///
/// let body = Arc::new(kernel);
/// let first = Task::shared(&body);
/// let second = Task::shared(&body);
/// # drop((plain, with_context, first, second));
/// ```
pub struct Task {
    body: Body,
}

enum Body {
    Fn(fn()),
    Boxed(Box<dyn FnOnce() + Send + 'static>),
    Shared(Arc<dyn Fn() + Send + Sync + 'static>),
}

impl Task {
    /// Creates a task from a closure, which carries its own context.
    #[must_use]
    pub fn new<F>(f: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self {
            body: Body::Boxed(Box::new(f)),
        }
    }

    /// Creates a task from a plain function. This does not allocate.
    #[must_use]
    pub fn from_fn(f: fn()) -> Self {
        Self { body: Body::Fn(f) }
    }

    /// Creates a task that calls a closure shared with other tasks.
    ///
    /// The task holds one more reference to `f`; this does not allocate.
    #[must_use]
    pub fn shared<F>(f: &Arc<F>) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        let f: Arc<dyn Fn() + Send + Sync + 'static> = Arc::<F>::clone(f);

        Self {
            body: Body::Shared(f),
        }
    }

    pub(crate) fn run(self) {
        match self.body {
            Body::Fn(f) => f(),
            Body::Boxed(f) => f(),
            Body::Shared(f) => f(),
        }
    }
}

impl From<fn()> for Task {
    fn from(f: fn()) -> Self {
        Self::from_fn(f)
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.body {
            Body::Fn(_) => "fn",
            Body::Boxed(_) => "closure",
            Body::Shared(_) => "shared",
        };

        f.debug_struct(type_name::<Self>())
            .field("kind", &kind)
            .finish_non_exhaustive()
    }
}
