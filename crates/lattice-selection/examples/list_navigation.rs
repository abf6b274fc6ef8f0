//! A scripted walk through the list/detail flow on the wall clock.
//!
//! The main loop plays the part of a UI event loop: it pumps the scheduler,
//! and between pumps it issues the selections a user would make.
//!
//! Run with: cargo run -p lattice-selection --example list_navigation

use std::thread;
use std::time::{Duration, Instant};

use lattice_selection::{DetailAction, LoadPhase, LoaderConfig, SelectionLoader};
use lattice_selection_core::SharedTaskScheduler;

fn pump_until<F>(scheduler: &SharedTaskScheduler, mut done: F)
where
    F: FnMut() -> bool,
{
    let started = Instant::now();
    while !done() && started.elapsed() < Duration::from_secs(5) {
        scheduler.process_ready();
        let wait = scheduler
            .time_until_next()
            .unwrap_or(Duration::from_millis(10))
            .min(Duration::from_millis(10));
        thread::sleep(wait);
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter("lattice_selection=debug,lattice_selection_core=trace")
        .init();

    let config = LoaderConfig::from_toml_str("load_delay_ms = 300")?;
    let scheduler: SharedTaskScheduler = SharedTaskScheduler::default();
    let loader = SelectionLoader::from_config(&config, scheduler.clone())?;

    loader.phase_changed().connect(|phase| match phase {
        LoadPhase::Empty => println!("  [list]"),
        LoadPhase::Loading(id) => println!("  [{id}: loading...]"),
        LoadPhase::Loaded(id, count) => println!("  [{id}: count = {count}]"),
    });
    loader
        .row_committed()
        .connect(|(id, count)| println!("  committed {count} into {id}"));

    let rows = loader.rows();
    let (first, second) = (rows[0].id, rows[1].id);

    println!("Tap the first row, then change your mind:");
    loader.select(first);
    thread::sleep(Duration::from_millis(100));
    loader.select(second);
    pump_until(&scheduler, || !loader.phase().is_loading());

    println!("Bump the counter twice and go back:");
    loader.send_detail(DetailAction::Increment);
    loader.send_detail(DetailAction::Increment);
    loader.deselect();

    println!("Rows now:");
    for row in loader.rows() {
        println!("  {} -> {}", row.id, row.count);
    }

    Ok(())
}
