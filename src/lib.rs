//! # Ridepool - Conversational Ride Reservations for Rust
//!
//! Ridepool is a Rust library for running a conversational ride-reservation
//! bot. It walks each user through a short dialogue (route, ride mode, time,
//! payment), persists the finished reservation, and pairs pooled riders
//! whose trips are compatible.
//!
//! ## Features
//!
//! - 🚕 **Guided Dialogue**: Per-user state machine from route to payment,
//!   with quick-reply buttons on the choice steps
//! - 👥 **Ride Matching**: Logistic-regression compatibility scoring over
//!   distance, time difference, and payment method; or exact origin+time
//!   matching for deployments without coordinates
//! - 📍 **Location Resolution**: Static place table with a graceful
//!   unknown-location fallback
//! - 💾 **Pluggable Storage**: In-memory default behind an async repository
//!   trait
//! - ⚡ **Concurrent Sessions**: Turns for different users run in parallel;
//!   turns for the same user serialize on a per-user lock
//! - 🦀 **Type-Safe**: Draft stages are encoded in the type system, so an
//!   out-of-order reservation cannot be represented
//!
//! ## Quick Start
//!
//! ```
//! use ridepool::{RideBot, UserId};
//!
//! #[tokio::main]
//! async fn main() -> ridepool::Result<()> {
//!     let bot = RideBot::builder().build();
//!     let user = UserId::from("U1");
//!
//!     // Four turns: route, mode, time, payment
//!     bot.handle_message(&user, "台北車站 到 松山機場").await?;
//!     bot.handle_message(&user, "choose pooled").await?;
//!     bot.handle_message(&user, "reserve 15:30").await?;
//!     let reply = bot.handle_message(&user, "pay cash").await?;
//!
//!     assert!(reply.text.contains("Reservation complete"));
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                   RideBot                       │
//! │  ┌──────────────┐  ┌──────────────┐            │
//! │  │   Dialogue   │  │  DraftStore  │            │
//! │  │  - Classify  │  │  - Per-user  │            │
//! │  │  - Advance   │  │    locking   │            │
//! │  └──────────────┘  └──────────────┘            │
//! │  ┌──────────────────────────────────┐          │
//! │  │         MatchEngine              │          │
//! │  │  - Classifier  - ExactOriginTime │          │
//! │  └──────────────────────────────────┘          │
//! │  ┌──────────────────────────────────┐          │
//! │  │    ReservationRepository         │          │
//! │  │  - Memory (default)              │          │
//! │  └──────────────────────────────────┘          │
//! └─────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Overview
//!
//! - [`dialogue`]: The conversation controller and its vocabulary
//! - [`session`]: Per-user draft slots with owned locking
//! - [`reservation`]: Draft stages, routes, time parsing, records
//! - [`matching`]: Pooled-ride matching strategies
//! - [`classifier`]: Logistic-regression compatibility model
//! - [`geo`]: Place table and haversine distance
//! - [`repository`]: Async persistence trait and the in-memory backend
//! - [`error`]: Error types and result aliases

// Core type definitions
pub mod types;

// Error types
pub mod error;

// Location resolution
pub mod geo;

// Compatibility model
pub mod classifier;

// Reservation data model
pub mod reservation;

// Storage backends
pub mod repository;

// Per-user draft sessions
pub mod session;

// Matching engine
pub mod matching;

// Dialogue controller
pub mod dialogue;

pub use classifier::{CompatibilityClassifier, FeatureVector};
pub use dialogue::{BotConfig, QuickReply, Reply, RideBot, RideBotBuilder, Vocabulary};
pub use error::{BotError, DialogueError, Result, StorageError, StorageResult};
pub use geo::{distance_km, resolve, Coordinates};
pub use matching::{MatchEngine, MatchStrategy};
pub use repository::{MemoryRepository, ReservationRepository};
pub use reservation::{
    minutes_since_midnight, parse_time, DraftStage, NewReservation, ReservationDraft,
    ReservationRecord, RideMode, RouteLeg,
};
pub use session::{DraftGuard, DraftStore};
pub use types::{RecordId, UserId};
