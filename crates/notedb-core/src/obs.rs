//! Metrics sink boundary.
//!
//! Engine logic never touches counter state directly; all instrumentation
//! flows through MetricsEvent and MetricsSink. Recording never fails and
//! never alters engine results.

use std::cell::RefCell;

thread_local! {
    static STATE: RefCell<Counters> = RefCell::new(Counters::default());
    static SINK_OVERRIDE: RefCell<Option<*const dyn MetricsSink>> = const { RefCell::new(None) };
}

///
/// Counters
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Counters {
    pub alloc_calls: u64,
    pub values_read: u64,
    pub values_written: u64,
    pub index_inserts: u64,
    pub index_removes: u64,
    pub buckets_scanned: u64,
    pub entities_scanned: u64,
}

///
/// MetricsEvent
///

#[derive(Clone, Copy, Debug)]
pub enum MetricsEvent {
    Alloc,
    ValuesRead { count: u64 },
    ValueWritten,
    IndexDelta { inserts: u64, removes: u64 },
    IndexScan { buckets: u64, entities: u64 },
}

///
/// MetricsSink
///

pub trait MetricsSink {
    fn record(&self, event: MetricsEvent);
}

/// GlobalMetricsSink
/// Default process-local sink that writes into thread-local counter state.
/// Acts as the concrete sink when no scoped override is installed.

struct GlobalMetricsSink;

impl MetricsSink for GlobalMetricsSink {
    fn record(&self, event: MetricsEvent) {
        STATE.with(|cell| {
            let mut m = cell.borrow_mut();
            match event {
                MetricsEvent::Alloc => {
                    m.alloc_calls = m.alloc_calls.saturating_add(1);
                }
                MetricsEvent::ValuesRead { count } => {
                    m.values_read = m.values_read.saturating_add(count);
                }
                MetricsEvent::ValueWritten => {
                    m.values_written = m.values_written.saturating_add(1);
                }
                MetricsEvent::IndexDelta { inserts, removes } => {
                    m.index_inserts = m.index_inserts.saturating_add(inserts);
                    m.index_removes = m.index_removes.saturating_add(removes);
                }
                MetricsEvent::IndexScan { buckets, entities } => {
                    m.buckets_scanned = m.buckets_scanned.saturating_add(buckets);
                    m.entities_scanned = m.entities_scanned.saturating_add(entities);
                }
            }
        });
    }
}

const GLOBAL_METRICS_SINK: GlobalMetricsSink = GlobalMetricsSink;

pub(crate) fn record(event: MetricsEvent) {
    let override_ptr = SINK_OVERRIDE.with(|cell| *cell.borrow());
    if let Some(ptr) = override_ptr {
        // SAFETY:
        // Preconditions:
        // - `ptr` was produced from a valid `&dyn MetricsSink` in
        //   `with_metrics_sink`.
        // - `with_metrics_sink` always restores the previous pointer before
        //   returning, including unwind paths via `Guard::drop`.
        // - `record` is synchronous and never stores `ptr` beyond this call.
        //
        // Aliasing:
        // - Only a shared reference is materialized, matching the shared
        //   borrow used to install the override.
        unsafe { (&*ptr).record(event) };
    } else {
        GLOBAL_METRICS_SINK.record(event);
    }
}

/// Snapshot the current thread's counters for endpoint/test plumbing.
#[must_use]
pub fn metrics_report() -> Counters {
    STATE.with(|cell| *cell.borrow())
}

/// Reset all counters on the current thread.
pub fn metrics_reset_all() {
    STATE.with(|cell| {
        *cell.borrow_mut() = Counters::default();
    });
}

/// Run a closure with a temporary metrics sink override.
pub fn with_metrics_sink<T>(sink: &dyn MetricsSink, f: impl FnOnce() -> T) -> T {
    struct Guard(Option<*const dyn MetricsSink>);

    impl Drop for Guard {
        fn drop(&mut self) {
            SINK_OVERRIDE.with(|cell| {
                *cell.borrow_mut() = self.0;
            });
        }
    }

    // SAFETY:
    // - `sink_ptr` is installed only for this dynamic scope.
    // - `Guard` always restores the previous slot on all exits, including
    //   panic.
    // - `record` only dereferences synchronously and never persists the
    //   pointer.
    let sink_ptr = unsafe { std::mem::transmute::<&dyn MetricsSink, *const dyn MetricsSink>(sink) };
    let prev = SINK_OVERRIDE.with(|cell| {
        let mut slot = cell.borrow_mut();
        slot.replace(sink_ptr)
    });
    let _guard = Guard(prev);

    f()
}

///
/// TESTS
///
