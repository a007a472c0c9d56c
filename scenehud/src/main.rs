//! # scenehud - Main Entry Point
//!
//! Supports two operational modes:
//! - **Live overlay** (default): the demo host runs its scenario while the
//!   overlay displays the note stream; keys drive further host operations
//! - **Headless** (`--headless --export log.json`): scripted run, notes
//!   printed to stdout, log dumped as JSON at exit
//!
//! Everything that touches tracking state runs on this thread; the overlay
//! lives on its own thread behind a bounded channel.

use anyhow::{Context, Result};
use clap::Parser;
use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use log::warn;
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fs::File;
use std::io::{self, BufWriter};
use std::rc::Rc;
use std::time::{Duration, Instant};

use crossterm::tty::IsTty;

use scenehud::cli::{Args, ScenarioArg};
use scenehud::export::LogExporter;
use scenehud::host::SceneHost;
use scenehud::notes::{OverlayMsg, UiCommand};
use scenehud::overlay;
use scenehud::platform;
use scenehud::scenario::{self, Driver, Step};
use scenehud::tracking::{
    display_note, display_stats, install_lifecycle_taps, KindFilter, PresentedRegistry, Tracker,
};
use scenehud_common::{NoteKind, OVERLAY_CHANNEL_BOUND};

// Exit codes
const EXIT_SUCCESS: i32 = 0;
const EXIT_ERROR: i32 = 1;
const EXIT_USAGE: i32 = 2;

fn main() {
    env_logger::init();
    std::process::exit(match run() {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            let code = exit_code_for(&e);
            eprintln!("error: {e}");
            code
        }
    });
}

fn exit_code_for(err: &anyhow::Error) -> i32 {
    let msg = err.to_string().to_lowercase();
    if msg.contains("unknown note kind") || msg.contains("not a terminal") {
        EXIT_USAGE
    } else {
        EXIT_ERROR
    }
}

/// Interactive overlay keys map straight onto demo steps.
fn step_for(cmd: UiCommand) -> Option<Step> {
    match cmd {
        UiCommand::Push => Some(Step::Push),
        UiCommand::Pop => Some(Step::Pop),
        UiCommand::PresentModal => Some(Step::PresentModal),
        UiCommand::DismissModal => Some(Step::DismissModal),
        UiCommand::DetachRoot => Some(Step::DetachRoot),
        UiCommand::Churn => Some(Step::Churn),
        UiCommand::RequestDump | UiCommand::Quit => None,
    }
}

#[tokio::main(flavor = "current_thread")]
async fn run() -> Result<()> {
    let args = Args::parse();
    let quiet = args.quiet;
    let ignored = args.ignored_kinds()?;

    // Pre-flight: the overlay needs a real terminal
    if !args.headless && !io::stdout().is_tty() {
        return Err(scenehud::domain::OverlayError::NotATerminal.into());
    }

    if !quiet {
        println!("scenehud v{}", env!("CARGO_PKG_VERSION"));
        println!("sweep threshold: {}", args.sweep_threshold);
    }

    // ── Phase 1: Host, tracker, registry ────────────────────────────────
    let mut host = SceneHost::new();
    let tracker = Rc::new(RefCell::new(Tracker::new(args.sweep_threshold)));
    if args.export.is_some() {
        tracker.borrow_mut().set_exporter(LogExporter::new(ignored.clone()));
    }

    let registry = Rc::new(RefCell::new(PresentedRegistry::new()));
    {
        let registry = Rc::clone(&registry);
        tracker.borrow_mut().subscribe(
            KindFilter::Only(vec![NoteKind::DidPresent, NoteKind::DidDismiss]),
            Box::new(move |n| registry.borrow_mut().observe(n)),
        );
    }

    // ── Phase 2: Install lifecycle taps (before any scene exists) ───────
    install_lifecycle_taps(&host.table(), &tracker)
        .context("Failed to install lifecycle taps")?;

    // ── Phase 3: Outputs (overlay thread or headless printer) ───────────
    let dropped = Rc::new(Cell::new(0u64));
    let mut overlay_tx: Option<Sender<OverlayMsg>> = None;
    let mut overlay_join = None;
    let mut cmd_rx: Option<Receiver<UiCommand>> = None;

    if args.headless {
        let ignored_print = ignored.clone();
        tracker.borrow_mut().subscribe(
            KindFilter::All,
            Box::new(move |n| {
                if !ignored_print.contains(&n.note.kind) {
                    display_note(&n.note);
                }
            }),
        );
    } else {
        let (msg_tx, msg_rx) = bounded(OVERLAY_CHANNEL_BOUND);
        let (cmd_tx, command_rx) = bounded(64);
        let ignored_overlay = ignored.clone();
        overlay_join =
            Some(std::thread::spawn(move || overlay::run_live(msg_rx, cmd_tx, ignored_overlay)));

        // Bridge: non-blocking send, drop (and count) if the overlay is slow
        let tx = msg_tx.clone();
        let drop_count = Rc::clone(&dropped);
        tracker.borrow_mut().subscribe(
            KindFilter::All,
            Box::new(move |n| {
                if let Err(TrySendError::Full(_)) = tx.try_send(OverlayMsg::Note(n.note.clone())) {
                    drop_count.set(drop_count.get() + 1);
                }
            }),
        );
        overlay_tx = Some(msg_tx);
        cmd_rx = Some(command_rx);
    }

    // ── Phase 4: Platform signal monitor (own thread, redispatched) ─────
    let (platform_tx, platform_rx) = bounded(16);
    let _monitor =
        platform::spawn_monitor(platform_tx).context("Failed to spawn platform monitor")?;

    // ── Phase 5: Main loop ──────────────────────────────────────────────
    let mut driver = Driver::new();
    let mut steps: VecDeque<Step> = match args.scenario {
        ScenarioArg::Tour => scenario::tour(),
        ScenarioArg::Churn => scenario::churn(),
        ScenarioArg::Interactive => VecDeque::new(),
    };

    let mut interval = tokio::time::interval(Duration::from_millis(100));
    let step_ticks: u64 = if args.headless { 2 } else { 12 };
    let mut ticks: u64 = 0;
    let started = Instant::now();
    let duration_limit = (args.duration > 0).then(|| Duration::from_secs(args.duration));

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let mut exit_reason = "interrupted";
    'main: loop {
        if let Some(limit) = duration_limit {
            if started.elapsed() >= limit {
                exit_reason = "duration limit reached";
                break;
            }
        }

        tokio::select! {
            _ = interval.tick() => {
                ticks += 1;

                // Overlay commands
                if let Some(rx) = &cmd_rx {
                    while let Ok(cmd) = rx.try_recv() {
                        match cmd {
                            UiCommand::Quit => {
                                exit_reason = "quit";
                                break 'main;
                            }
                            UiCommand::RequestDump => {
                                if let Some(tx) = &overlay_tx {
                                    let _ = tx.try_send(OverlayMsg::Dump(registry.borrow().dump()));
                                }
                            }
                            cmd => {
                                if let Some(step) = step_for(cmd) {
                                    driver.apply(&mut host, step);
                                }
                            }
                        }
                    }
                }

                // Platform signals, redispatched here onto the designated thread
                while let Ok(kind) = platform_rx.try_recv() {
                    tracker.borrow_mut().platform_signal(kind);
                }

                // Scripted scenario
                if ticks % step_ticks == 0 {
                    if let Some(step) = steps.pop_front() {
                        driver.apply(&mut host, step);
                    } else if args.headless {
                        exit_reason = "scenario complete";
                        break;
                    }
                }

                // Status updates
                if ticks % 5 == 0 {
                    if let Some(tx) = &overlay_tx {
                        let _ = tx.try_send(OverlayMsg::Stats {
                            stats: tracker.borrow().stats(),
                            dropped: dropped.get(),
                        });
                    }
                }
                if args.headless && ticks % 100 == 0 {
                    display_stats(&tracker.borrow().stats());
                }
            }
            _ = &mut ctrl_c => {
                break;
            }
        }
    }

    // Close the overlay's channel, then wait for it to restore the terminal
    drop(overlay_tx);
    if let Some(handle) = overlay_join {
        if let Ok(Err(e)) = handle.join() {
            warn!("overlay exited with error: {e}");
        }
    }

    // Presented-scene report and summary
    if !quiet {
        println!("{}", registry.borrow().dump());
    }
    let stats = tracker.borrow().stats();
    if !quiet || args.headless {
        eprintln!(
            "\n{}: {:.1}s, {} notes (presented: {}, dismissed: {}, live: {}, noise: {}, sweeps: {}, dropped: {})",
            exit_reason,
            started.elapsed().as_secs_f64(),
            stats.notes_published,
            stats.presented,
            stats.dismissed,
            stats.live(),
            stats.guard_noops,
            stats.sweeps,
            dropped.get(),
        );
    }

    // Export note log if enabled
    if let Some(path) = &args.export {
        if let Some(exporter) = tracker.borrow_mut().take_exporter() {
            let file = File::create(path).context("Failed to create export file")?;
            exporter
                .export(BufWriter::new(file), &stats)
                .context("Failed to export note log")?;
            if !quiet {
                println!("saved: {}", path.display());
            }
        }
    }

    Ok(())
}
