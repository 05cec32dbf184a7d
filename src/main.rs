use anyhow::Context;
use tilekit::config::load_tileset;

const USAGE: &str = "Usage: tilekit <tileset.yaml> [step_ms] [steps]";

fn main() -> anyhow::Result<()> {
    env_logger::init();
    #[cfg(feature = "profile")]
    let _guard = init_profiling();

    let mut args = std::env::args().skip(1);
    let path = args.next().context(USAGE)?;
    let step_ms: u32 = match args.next() {
        Some(arg) => arg.parse().context(USAGE)?,
        None => 100,
    };
    let steps: u32 = match args.next() {
        Some(arg) => arg.parse().context(USAGE)?,
        None => 10,
    };

    let mut tileset = load_tileset(&path).with_context(|| format!("Failed to load tileset '{path}'"))?;
    log::info!(
        "Loaded tileset '{}': {} tiles, {} terrains",
        tileset.name,
        tileset.tile_count(),
        tileset.terrain_count(),
    );

    // Plays animations forward, reporting the tiles that need redrawing
    for step in 1..=steps {
        let changed = tileset.advance_animations(step_ms);
        if changed.is_empty() {
            continue;
        }
        for id in changed {
            let Some(frame_tile) = tileset.current_frame_tile(id) else { continue };
            let elapsed_ms = u64::from(step) * u64::from(step_ms);
            log::info!("{elapsed_ms}ms: tile {id} shows tile {}", frame_tile.id());
        }
    }
    Ok(())
}

#[cfg(feature = "profile")]
fn init_profiling() -> tracing_chrome::FlushGuard {
    use tracing_subscriber::prelude::*;
    let (chrome_layer, guard) = tracing_chrome::ChromeLayerBuilder::new().build();
    tracing_subscriber::registry().with(chrome_layer).init();
    guard
}
