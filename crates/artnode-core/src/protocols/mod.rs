//! Protocol codecs.
//!
//! Each protocol follows a layered structure:
//! - `layout`: byte offsets and ranges (source of truth)
//! - `reader` / `writer`: safe byte access and protocol conventions
//! - `parser` / `encoder`: domain-level decoding and encoding (no direct
//!   byte indexing)
//! - `error`: explicit, actionable errors
//!
//! Codecs are pure and contain no I/O; the engine and transport layers
//! handle sockets, captures and state.

pub mod artnet;
