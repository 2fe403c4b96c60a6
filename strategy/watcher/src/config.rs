//! Configuration types for the watch service.

use std::sync::Arc;

use domain::{Notifier, PositionNotifier, PositionSource};

/// How positions found during a check reach the subject.
///
/// A deployment picks one shape; the two are never mixed.
#[derive(Clone)]
pub enum Dispatcher {
    /// One call carrying every position of the subject
    Batched(Arc<dyn Notifier>),
    /// One concurrent call per position, failing fast on the first error
    PerPosition(Arc<dyn PositionNotifier>),
}

/// Configuration for WatchService (collaborators only; the interval comes with each subject).
#[derive(Clone)]
pub struct WatchServiceConfig {
    /// Source queried for the subject's wallets, possibly an aggregate
    pub source: Arc<dyn PositionSource>,
    /// Sink receiving the positions
    pub dispatcher: Dispatcher,
}
