//! Fan-out orchestrator for unreliable text-generation providers.
//!
//! This crate provides the [`Orchestrator`] type, which sends one user
//! message to every enabled provider at once and returns whatever succeeds.
//!
//! # Features
//!
//! - Per-provider circuit breakers in an injectable [`CircuitBreakerRegistry`]
//! - Bounded exponential-backoff retry with a per-call timeout
//! - A static fallback hierarchy that reroutes a failed provider's call to a
//!   healthy substitute
//! - Failures become degraded outcomes, never errors
//! - Optional cancellation via `CancellationToken`
//! - [`TurnProcessor`] to persist outcomes and run pattern analysis in the
//!   background
//!
//! # Architecture
//!
//! ```text
//! User message + enabled providers + credentials
//!          ↓
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      ORCHESTRATOR                           │
//! │                                                             │
//! │  one task per provider (tokio::spawn)                       │
//! │         ↓                                                   │
//! │  RetryExecutor ── asks CircuitBreakerRegistry per attempt   │
//! │         ↓ terminal failure                                  │
//! │  FallbackRouter ── next healthy provider not yet tried      │
//! │         ↓ nothing left                                      │
//! │  degraded ProviderOutcome carrying the error text           │
//! └─────────────────────────────────────────────────────────────┘
//!          ↓
//! Vec<ProviderOutcome>  (match by `provider`, not by position)
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use orchestrator::{render_outcome, Orchestrator};
//! use provider_core::{Credentials, Provider};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let orchestrator = Orchestrator::from_env()?;
//!     let credentials = Credentials::from_env();
//!
//!     let outcomes = orchestrator
//!         .dispatch("Explain backpressure", &[], &Provider::ALL, &credentials)
//!         .await;
//!
//!     for outcome in &outcomes {
//!         println!("{}: {}", outcome.provider, render_outcome(outcome));
//!     }
//!     Ok(())
//! }
//! ```

mod circuit_breaker;
mod config;
mod error;
mod fallback;
mod formatting;
mod orchestrator;
mod retry;
mod turn;

pub use circuit_breaker::{CircuitBreakerRegistry, CircuitBreakerState, CircuitState};
pub use config::{CircuitBreakerConfig, OrchestratorConfig, RetryPolicy};
pub use error::OrchestratorError;
pub use fallback::{fallback_order, FallbackRouter};
pub use formatting::{render_outcome, render_outcomes};
pub use orchestrator::{Orchestrator, CANCELLED_TEXT};
pub use retry::{RetryAttempt, RetryExecutor};
pub use turn::{TurnProcessor, TurnResult, DEFAULT_HISTORY_LIMIT};

// Re-export for convenience
pub use tokio_util::sync::CancellationToken;
