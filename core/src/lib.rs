//! Client-side data-access core for a trip-planning service.
//!
//! # Overview
//! A fluent [`QueryBuilder`] turns chained configuration calls into single
//! HTTP requests against a PostgREST-style backend and normalizes the
//! responses into a uniform data-or-error [`Outcome`]. The core never
//! touches the network (host-does-IO pattern): it builds [`HttpRequest`]
//! values and interprets [`HttpResponse`] values, and the caller supplies
//! the transport that runs the round-trip.
//!
//! # Design
//! - [`Client`] is stateless — it holds only the injected [`ClientConfig`].
//! - Each logical request gets its own builder, consumed exactly once by
//!   `build`/`execute`; builders are never shared across logical flows.
//! - Only HTTP 409 is interpreted (unique-constraint conflict); all other
//!   statuses pass their body through as data.
//! - [`itinerary`] and [`dedup`] carry the small client-side helpers that
//!   ship alongside the data-access core and do not touch the network.

pub mod client;
pub mod config;
pub mod dedup;
pub mod error;
pub mod http;
pub mod itinerary;
pub mod query;
pub mod response;
pub mod types;

pub use client::Client;
pub use config::ClientConfig;
pub use dedup::{find_duplicate, SaveGuard};
pub use error::{QueryError, UNIQUE_VIOLATION};
pub use http::{HttpMethod, HttpRequest, HttpResponse, TransportError};
pub use itinerary::{parse_itinerary, ItineraryDay, ItineraryItem};
pub use query::{Order, QueryBuilder};
pub use response::{interpret, Outcome};
pub use types::{NewPlan, Plan, PlanPatch};
