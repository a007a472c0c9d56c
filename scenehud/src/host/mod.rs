//! Demo scene host
//!
//! A miniature UI scene framework standing in for the host toolkit this tool
//! observes. It owns the live scene tree and issues every lifecycle call
//! serially on the designated thread, always through the method table, so an
//! installed replacement sees exactly what the base implementation sees.
//!
//! The host exists to generate realistic lifecycle traffic (pushes, pops,
//! modal presentation, container teardown, slot churn); it carries no demo
//! content of its own.

pub mod scene;
pub mod table;

pub use scene::{Scene, SceneDelegate, SceneHost, SceneRef};
pub use table::{methods, MethodArgs, MethodImpl, MethodTable};
