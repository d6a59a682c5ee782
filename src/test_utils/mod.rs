//! Shared test doubles.

mod recording_publisher;

pub(crate) use recording_publisher::{Published, RecordingPublisher, next_publish, wait_until};
