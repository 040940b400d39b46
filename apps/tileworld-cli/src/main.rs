mod render;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tileworld_common::{MapObject, Rect, TileType};
use tileworld_kernel::{MapConfig, MapOrchestrator, ObjectEvent, Placement, StoreBackend, StoreConfig};
use tileworld_store::{InMemorySpatialStore, SpatialStore};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::render::{MapSummary, render_objects, render_window, status_report};

#[derive(Parser)]
#[command(name = "tileworld-cli", about = "Seed, inspect and edit tileworld maps")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// YAML map configuration; built-in defaults when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the configured map width
    #[arg(long)]
    width: Option<i32>,

    /// Override the configured map height
    #[arg(long)]
    height: Option<i32>,

    /// Override the configured region count
    #[arg(long)]
    regions: Option<u32>,

    /// Skip the configured fills and placements
    #[arg(long)]
    no_seed: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and crate info
    Info,
    /// Print a map summary, the terrain, and the object list
    Show {
        /// Left column of the rendered window
        #[arg(long, default_value = "0")]
        x: i32,
        /// Top row of the rendered window
        #[arg(long, default_value = "0")]
        y: i32,
        /// Window width; whole map when omitted
        #[arg(long)]
        w: Option<i32>,
        /// Window height; whole map when omitted
        #[arg(long)]
        h: Option<i32>,
    },
    /// Try to place an object on the seeded map
    Place {
        id: String,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
        /// Terrain to write under the object once placed
        #[arg(long)]
        occupy: Option<TileType>,
    },
    /// List objects overlapping a rectangle (whole map by default)
    Objects {
        /// Corners as x1 y1 x2 y2
        #[arg(long, num_args = 4, value_names = ["X1", "Y1", "X2", "Y2"], allow_negative_numbers = true)]
        area: Option<Vec<i32>>,
    },
    /// List regions touched by an area given as origin and size
    Regions {
        x: i32,
        y: i32,
        w: i32,
        h: i32,
    },
    /// Print the region containing a tile
    RegionAt { x: i32, y: i32 },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();

    if let Commands::Info = cli.command {
        println!("tileworld-cli v{}", env!("CARGO_PKG_VERSION"));
        println!("regions: {}", tileworld_regions::crate_info());
        println!("store: {}", tileworld_store::crate_info());
        println!(
            "redis backend: {}",
            if cfg!(feature = "redis") { "enabled" } else { "disabled" }
        );
        return Ok(());
    }

    let config = load_config(&cli)?;
    let store = open_store(&config.store)?;
    let mut map = tileworld_kernel::build_map(&config, store).context("building map")?;
    map.subscribe(|event| match event {
        ObjectEvent::Created(o) => debug!(%o, "created"),
        ObjectEvent::Updated(o) => debug!(%o, "updated"),
        ObjectEvent::Deleted(id) => debug!(id = id.as_str(), "deleted"),
    });

    if !cli.no_seed {
        let report = tileworld_kernel::seed_map(&map, &config).context("seeding map")?;
        for (id, rejection) in &report.rejected {
            println!("seed: {id} not placed: {rejection}");
        }
        info!(placed = report.placed.len(), "map seeded");
        if config.show_map_on_start && !matches!(cli.command, Commands::Show { .. }) {
            print!("{}", status_report(&map)?);
        }
    }

    match cli.command {
        Commands::Info => {}
        Commands::Show { x, y, w, h } => {
            println!("{}", MapSummary::of(&map));
            let window = window(&map, x, y, w, h)?;
            print!("{}", render_window(&map, window)?);
            let objects = map
                .objects()
                .objects_in_rect(&full_map(&map)?)?;
            println!("Objects ({}):", objects.len());
            print!("{}", render_objects(&objects));
        }
        Commands::Place {
            id,
            x,
            y,
            width,
            height,
            occupy,
        } => {
            let obj = MapObject::new(id, x, y, width, height);
            match map.try_place_object(&obj, occupy)? {
                Placement::Placed => println!("placed {obj}"),
                Placement::Rejected(rejection) => println!("rejected {obj}: {rejection}"),
            }
        }
        Commands::Objects { area } => {
            let area = match area.as_deref() {
                None => full_map(&map)?,
                Some(&[x1, y1, x2, y2]) => Rect::from_corners(x1, y1, x2, y2),
                Some(_) => anyhow::bail!("--area takes four values: x1 y1 x2 y2"),
            };
            let objects = map.objects().objects_in_rect(&area)?;
            println!("Objects in {area} ({}):", objects.len());
            print!("{}", render_objects(&objects));
        }
        Commands::Regions { x, y, w, h } => {
            for region in map.get_regions_in_area(x, y, w, h) {
                println!("{} (id {}): {}", region.name(), region.id(), region.bounds());
            }
        }
        Commands::RegionAt { x, y } => {
            let id = map.get_region_id(x, y)?;
            let region = map.get_region_by_id(id)?;
            println!("({x}, {y}) is in {} (id {id}): {}", region.name(), region.bounds());
        }
    }

    Ok(())
}

fn load_config(cli: &Cli) -> anyhow::Result<MapConfig> {
    let mut config = match &cli.config {
        Some(path) => MapConfig::load(path).with_context(|| format!("loading {}", path.display()))?,
        None => MapConfig::default(),
    };
    if let Some(width) = cli.width {
        config.width = width;
    }
    if let Some(height) = cli.height {
        config.height = height;
    }
    if let Some(regions) = cli.regions {
        config.region_count = regions;
    }
    config.validate()?;
    Ok(config)
}

fn open_store(config: &StoreConfig) -> anyhow::Result<Arc<dyn SpatialStore>> {
    match config.backend {
        StoreBackend::Memory => Ok(Arc::new(InMemorySpatialStore::new())),
        #[cfg(feature = "redis")]
        StoreBackend::Redis => {
            let store = tileworld_store::RedisSpatialStore::open(&config.redis_url)
                .with_context(|| format!("connecting to {}", config.redis_url))?;
            Ok(Arc::new(store))
        }
        #[cfg(not(feature = "redis"))]
        StoreBackend::Redis => {
            anyhow::bail!("redis backend requested but tileworld-cli was built without the `redis` feature")
        }
    }
}

fn full_map(map: &MapOrchestrator) -> anyhow::Result<Rect> {
    Rect::from_origin_size(0, 0, map.width(), map.height()).context("empty map")
}

fn window(map: &MapOrchestrator, x: i32, y: i32, w: Option<i32>, h: Option<i32>) -> anyhow::Result<Rect> {
    let w = w.unwrap_or(map.width());
    let h = h.unwrap_or(map.height());
    Rect::from_origin_size(x, y, w, h).with_context(|| format!("invalid window {w}x{h} at ({x}, {y})"))
}
