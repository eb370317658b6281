//! Recommendation-engine adapter.
//!
//! # Overview
//! `Recommendations` is the method-per-operation interface callers program
//! against. `RecombeeAdapter` implements it on top of `recomm_core`, executing
//! the signed requests through a `Transport` (blocking `ureq` by default).
//!
//! ```no_run
//! use recomm_adapter::{config::Settings, telemetry, RecombeeAdapter, Recommendations};
//! use recomm_core::InteractionOptions;
//!
//! let settings = Settings::load()?;
//! telemetry::init(&settings.logging);
//! let engine = RecombeeAdapter::from_settings(&settings.engine);
//! engine.add_purchase("user-1", "item-1", &InteractionOptions::at("2024-01-01T00:00:00Z"))?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod config;
pub mod recombee;
pub mod recommendations;
pub mod telemetry;
pub mod transport;

pub use recombee::RecombeeAdapter;
pub use recommendations::Recommendations;
pub use transport::{Transport, UreqTransport};
