//! Operation queue and sync engine
//!
//! One [`OperationQueue`] per data family. Submissions are stamped and
//! appended without touching the network; a background worker drains the
//! pending set in batches and matches server acknowledgements back by
//! operation identifier.

pub mod pending;
pub mod ports;
pub mod queue;

pub use pending::PendingSet;
pub use ports::{ApiRequest, ApiTransport, DeliveryPolicy, OperationCodec};
pub use queue::{OperationQueue, QueueWorker, SyncOutcome};
