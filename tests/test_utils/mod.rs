pub mod channel_publisher;

pub mod fixtures;

pub use channel_publisher::{ChannelPublisher, next_payload};
