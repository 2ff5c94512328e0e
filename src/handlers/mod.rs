pub mod events;
pub mod health;

pub use events::{
    RECEIVED_MESSAGE, ReceiveResponse, SearchParams, SearchResponse, receive_event, search_events,
};
pub use health::{HealthStatus, ServiceHealth, health_check};
