//! # AppKit Bus - Notifications Between Subsystems
//!
//! Two delivery mechanisms:
//!
//! - **Event bus**: a broadcast channel carrying [`AppKitEvent`]s. Used for
//!   lifecycle and analytics events that any number of consumers may tail.
//! - **Observer lists**: synchronous callback lists returning an
//!   [`ObserverHandle`]. Used where a subsystem exposes "subscribe to my
//!   state" to its owner.
//!
//! ```text
//! ┌──────────────┐    emit()     ┌──────────────┐  subscribe()  ┌──────────────┐
//! │ ak-03 / ak-05│ ────────────▶ │  Event Bus   │ ────────────▶ │   Consumer   │
//! └──────────────┘               └──────────────┘               └──────────────┘
//! ```

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod events;
pub mod observer;
pub mod publisher;
pub mod subscriber;

// Re-export main types
pub use events::{AppKitEvent, EventFilter, EventTopic, SiwxEventProperties, TrackEvent};
pub use observer::{ObserverHandle, Observers};
pub use publisher::{EventPublisher, InMemoryEventBus};
pub use subscriber::{EventStream, Subscription, SubscriptionError};

/// Maximum events to buffer per subscriber before lagging.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 256;
