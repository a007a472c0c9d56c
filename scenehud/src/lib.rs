//! # scenehud - Live Scene Lifecycle HUD
//!
//! scenehud is an on-device diagnostic overlay for scene-based UI hosts: it
//! intercepts scene lifecycle calls (load, appear, disappear, reparent),
//! derives the normalized "did present" / "did dismiss" milestones from the
//! noisy raw stream, and displays everything in a live scrolling log drawn in
//! an auxiliary terminal overlay.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      Scene Host (demo app)                      │
//! │        push / pop / present / dismiss / detach / churn          │
//! └───────────────────────┬─────────────────────────────────────────┘
//!                         │ lifecycle dispatch (method table)
//!                         ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    scenehud (This Crate)                        │
//! │                                                                 │
//! │  ┌──────────────┐   ┌──────────────┐   ┌──────────────┐         │
//! │  │  Installed   │──▶│  Normalizer  │──▶│   Fan-out    │         │
//! │  │    Taps      │   │ (milestones) │   │    (bus)     │         │
//! │  └──────────────┘   └──────┬───────┘   └──────┬───────┘         │
//! │                            │                  │                 │
//! │                            ▼                  ├──▶ Registry     │
//! │                     ┌──────────────┐          ├──▶ Overlay TUI  │
//! │                     │ Weak Metadata│          └──▶ Export       │
//! │                     │    Table     │                            │
//! │                     └──────────────┘                            │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Structure
//!
//! ### Core Pipeline Modules
//!
//! - [`host`]: the scene base type, tree, and named-slot method table, the
//!   single dispatch point replacements are installed into
//! - [`tracking`]: installation, normalization, the weak metadata table, the
//!   fan-out bus, and the presented-scene registry
//!   - `installer`: replace the four target methods at startup, exactly once
//!   - `normalizer`: per-scene state machine deriving at-most-once milestones
//!   - `metadata`: weak side table with periodic sweep reclamation
//!   - `fanout`: insertion-ordered delivery to independent subscribers
//!   - `registry`: ordering invariants (fatal on violation) and the dump
//!
//! ### UI and Data Modules
//!
//! - [`overlay`]: ratatui overlay on its own thread, fed by a bounded channel
//! - [`notes`]: log data model and the cross-thread message types
//! - [`export`]: JSON dump of the captured note log
//! - [`platform`]: off-thread platform signals, redispatched before use
//! - [`scenario`]: scripted tours and the interactive demo driver
//! - [`cli`]: command-line argument parsing
//! - [`domain`]: newtypes and structured errors
//!
//! ## Threading
//!
//! One designated thread runs the host, the taps, the normalizer, and the
//! metadata table; nothing in the tracking path blocks, suspends, or takes a
//! lock; there is no concurrent mutation to guard against. The overlay runs
//! on its own thread behind a bounded channel (slow consumers drop notes,
//! they never stall lifecycle dispatch), and the platform monitor's signals
//! are redispatched onto the designated thread before they touch the tracker.
//!
//! ## Error Taxonomy
//!
//! - Configuration errors (missing target method, repeated install): fatal at
//!   startup, surfaced through `anyhow` with a non-zero exit code.
//! - Ordering violations in the normalized stream (duplicate present,
//!   dismiss without present): programming errors, always `panic!`.
//! - Raw signals failing a transition guard, platform payloads, ignored note
//!   kinds: expected noise, silently dropped (and counted).

// Expose modules for testing
pub mod cli;
pub mod domain;
pub mod export;
pub mod host;
pub mod notes;
pub mod overlay;
pub mod platform;
pub mod scenario;
pub mod tracking;
