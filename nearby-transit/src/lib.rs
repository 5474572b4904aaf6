//! Nearby public-transport stations and live departures.
//!
//! Looks up stops around a point via the VBB `transport.rest` API, ranks
//! them by distance, and keeps per-station departure lists with a short
//! cache, "load more" paging and request cancellation.

pub mod domain;
pub mod favorites;
pub mod preferences;
pub mod stations;
pub mod storage;
pub mod vbb;
