//! # Platform Signal Channel
//!
//! One low-level inbound channel for platform-level events that originate
//! outside the scene host. Signals are produced on their own thread and
//! carry nothing trustworthy beyond their kind (no sender, no payload), so
//! only the [`NoteKind`] crosses the channel.
//!
//! The designated thread drains the channel in its main loop and hands each
//! kind to the tracker there, never on the monitor thread: all tracking
//! state stays single-threaded.

use std::io;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::Sender;
use log::debug;
use scenehud_common::NoteKind;

/// Fixed cadence for the demo monitor: rotation noise (ignored by default)
/// arrives more often than the mute switch.
const CADENCE: [(Duration, NoteKind); 3] = [
    (Duration::from_millis(3500), NoteKind::OrientationChanged),
    (Duration::from_millis(2500), NoteKind::MuteSwitchChanged),
    (Duration::from_millis(1500), NoteKind::OrientationChanged),
];

/// Spawn the monitor thread. It exits on its own once the receiving side of
/// `tx` is gone.
///
/// # Errors
///
/// Thread spawn failure.
pub fn spawn_monitor(tx: Sender<NoteKind>) -> io::Result<JoinHandle<()>> {
    thread::Builder::new().name("platform-monitor".to_string()).spawn(move || {
        loop {
            for (delay, kind) in CADENCE {
                thread::sleep(delay);
                debug!("platform signal: {kind}");
                if tx.send(kind).is_err() {
                    return;
                }
            }
        }
    })
}
