use super::core::Runtime;
use super::handle::Handle;

/// Builder for configuring and creating a [`Runtime`].
///
/// # Examples
///
/// ```rust
/// use ae_task::RuntimeBuilder;
///
/// let runtime = RuntimeBuilder::new()
///     .event_interval(32)
///     .timer_capacity(64)
///     .build();
/// ```
pub struct RuntimeBuilder {
    /// Spawned futures polled per tick before timers are checked again.
    event_interval: usize,

    /// Initial capacity of the spawned-task slab.
    task_capacity: usize,

    /// Initial capacity of the timer heap.
    timer_capacity: usize,

    /// Whether `block_on` reports stalls instead of parking forever.
    detect_stalls: bool,
}

impl RuntimeBuilder {
    /// Creates a new `RuntimeBuilder` with default configuration.
    ///
    /// By default the runtime polls up to 64 spawned futures per tick,
    /// preallocates room for 16 tasks and 16 timers, and detects stalls.
    pub fn new() -> Self {
        Self {
            event_interval: 64,
            task_capacity: 16,
            timer_capacity: 16,
            detect_stalls: true,
        }
    }

    /// Sets how many spawned futures are polled before due timers are fired
    /// again.
    ///
    /// # Panics
    ///
    /// Panics if `n == 0`.
    pub fn event_interval(mut self, n: usize) -> Self {
        assert!(n > 0, "event_interval must be > 0");

        self.event_interval = n;
        self
    }

    /// Sets the initial capacity for spawned futures.
    pub fn task_capacity(mut self, n: usize) -> Self {
        self.task_capacity = n;
        self
    }

    /// Sets the initial capacity for pending timers.
    pub fn timer_capacity(mut self, n: usize) -> Self {
        self.timer_capacity = n;
        self
    }

    /// Enables or disables stall detection in
    /// [`Runtime::block_on`](super::Runtime::block_on).
    ///
    /// With detection disabled, a future that nothing can wake any more parks
    /// the thread until some other thread wakes it.
    pub fn detect_stalls(mut self, enabled: bool) -> Self {
        self.detect_stalls = enabled;
        self
    }

    /// Builds the runtime with the configured options.
    pub fn build(self) -> Runtime {
        let handle = Handle::new(self.task_capacity, self.timer_capacity);
        Runtime::from_parts(handle, self.event_interval, self.detect_stalls)
    }
}

impl Default for RuntimeBuilder {
    fn default() -> Self {
        Self::new()
    }
}
