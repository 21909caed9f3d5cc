pub mod consumer;
pub mod dispatcher;
pub mod lease;
pub mod producer;

pub use consumer::{DeliveryOutcome, QueueConsumer};
pub use dispatcher::{Dispatched, Dispatcher};
pub use lease::LeaseRenewal;
pub use producer::enqueue;
