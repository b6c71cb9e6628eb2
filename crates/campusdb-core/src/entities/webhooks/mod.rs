//! Webhook delivery bookkeeping.
//!
//! Delivery attempts to external endpoints are recorded per event, with a
//! recency index over completed deliveries. The [`CircuitBreaker`] guards
//! the dispatcher against endpoints that keep failing.

mod breaker;
mod indexes;
mod model;
mod store;

pub use breaker::{BreakerConfig, CircuitBreaker};
pub use indexes::webhooks_binding;
pub use model::{DeliveryStatus, WebhookDelivery};
pub use store::WebhookStore;
