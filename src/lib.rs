// Main library file for the destination gallery

// Static data and session state
pub mod catalog;
pub mod session;

// Rendering and the surfaces it draws on
pub mod display;
pub mod render;

// Interaction and time
pub mod controller;
pub mod input;
pub mod random;
pub mod runtime;
pub mod scheduler;

pub mod config;
pub mod error;

// Re-export key types for convenience
pub use catalog::{Catalog, DestinationId, DestinationRecord, WeatherEffect};
pub use config::GalleryConfig;
pub use controller::{GalleryController, GallerySnapshot};
pub use display::{
    BookingPhase, CardView, CardVisual, DisplaySurface, MemorySurface, ModalContent,
    Notification, NotificationKind, TracingSurface,
};
pub use error::GalleryError;
pub use input::{CardTarget, ModalTarget, Shortcut, SweepKind, UserAction};
pub use random::RandomSource;
pub use render::RenderEngine;
pub use runtime::{GalleryClient, GalleryHandle, GalleryRuntime};
pub use scheduler::{Scheduler, TimerEvent, TimerHandle, VirtualClock};
pub use session::{BookingHistoryEntry, BookingRecord, SessionState};
