//! Headless run of the tray table.
//!
//! `hospy [config.json]` loads the optional configuration, sets up the
//! starting table, and replays a short scripted drag of the card into the
//! middle slot.

use std::process::ExitCode;

use hospy::prelude::*;

fn drag_script() -> Vec<PointerFrame> {
    let mut frames = vec![
        PointerFrame::released(Vec2::new(250.0, 220.0)),
        PointerFrame::held(Vec2::new(250.0, 220.0)),
    ];
    for step in 1..=10 {
        let t = step as f32 / 10.0;
        frames.push(PointerFrame::held(
            Vec2::new(250.0, 220.0).lerp(Vec2::new(560.0, 60.0), t),
        ));
    }
    frames.push(PointerFrame::released(Vec2::new(560.0, 60.0)));
    frames
}

fn run() -> hospy::Result<()> {
    let config = match std::env::args().nth(1) {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::default(),
    };
    hospy::logging::init_logger(&config.log)?;

    let mut table = None;
    let mut game = Game::new(config)?.setup(|registry| {
        table = Some(prefab::setup_tray_table(registry)?);
        Ok(())
    })?;

    let mut platform = HeadlessPlatform::new(drag_script());
    game.run(&mut platform);

    if let Some(table) = table {
        let held_by = game
            .registry()
            .get(table.card)
            .and_then(|card| card.get::<SnapsToSlot>())
            .and_then(|snaps| snaps.held_by);
        match held_by {
            Some(slot) => log::info!("card {} rests in slot {slot}", table.card),
            None => log::info!("card {} is not in a slot", table.card),
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("hospy: {e}");
            ExitCode::FAILURE
        }
    }
}
