use std::path::PathBuf;

use clap::Args;
use colored::Colorize;
use comfy_table::{ContentArrangement, Table};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use vw_core::{Background, Entity, EntityKind, Point, StaticImageStore, WorldModel};
use vw_simulation::{SimConfig, SimEventKind, Simulation};

/// Largest grid the demo world will allocate.
const MAX_CELLS: usize = 1 << 24;

#[derive(Debug, Args)]
pub struct SimulateArgs {
    /// Grid height in cells
    #[arg(long, default_value = "20")]
    pub rows: usize,

    /// Grid width in cells
    #[arg(long, default_value = "30")]
    pub cols: usize,

    /// Number of miners to place
    #[arg(long, default_value = "4")]
    pub miners: usize,

    /// Number of ore veins to place
    #[arg(long, default_value = "3")]
    pub veins: usize,

    /// Number of blacksmiths to place
    #[arg(long, default_value = "2")]
    pub smiths: usize,

    /// Number of obstacles to place
    #[arg(long, default_value = "12")]
    pub obstacles: usize,

    /// Number of driver steps
    #[arg(short = 'n', long, default_value = "100")]
    pub steps: u64,

    /// Simulated milliseconds per driver step
    #[arg(long, default_value = "250")]
    pub step_ms: u64,

    /// RNG seed (overrides the config file)
    #[arg(short, long)]
    pub seed: Option<u64>,

    /// Delay multiplier (overrides the config file)
    #[arg(long)]
    pub time_scale: Option<f64>,

    /// JSON file with simulation settings
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Print an ASCII map of the final grid
    #[arg(short, long)]
    pub map: bool,

    /// Show all events (not just summary)
    #[arg(short, long)]
    pub verbose: bool,
}

pub fn run(args: &SimulateArgs) -> Result<(), String> {
    let mut config = match &args.config {
        Some(path) => super::load_config(path)?,
        None => SimConfig::default().with_max_events(500),
    };
    if let Some(seed) = args.seed {
        config = config.with_seed(seed);
    }
    if let Some(scale) = args.time_scale {
        config = config.with_time_scale(scale);
    }
    config.validate().map_err(|e| e.to_string())?;

    let mut sim = demo_world(args, config)?;
    tracing::info!(
        rows = args.rows,
        cols = args.cols,
        live = sim.world().live_count(),
        "demo world ready"
    );

    let dispatched = sim
        .run(args.steps, args.step_ms)
        .map_err(|e| format!("simulation error: {e}"))?;

    // Header
    println!(
        "  {} {}x{} {}",
        "Simulation".bold(),
        args.rows,
        args.cols,
        format!(
            "({} steps of {}ms, seed={}, scale={})",
            args.steps,
            args.step_ms,
            sim.config().seed,
            sim.config().time_scale
        )
        .dimmed()
    );
    println!(
        "  {dispatched} actions dispatched, {} events logged, clock at {}ms",
        sim.events().len(),
        sim.now()
    );
    println!();

    if verbose_log(args, &sim) {
        println!();
    }

    // Census
    println!("  {}", "Census".bold().underline());
    println!();
    let census = sim.census();
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Kind", "Live", "Pending"]);
    for kind in EntityKind::ALL {
        let pending: usize = sim
            .world()
            .entities()
            .filter(|(_, e)| e.kind == kind)
            .map(|(id, _)| sim.scheduler().pending_count(id))
            .sum();
        table.add_row(vec![
            kind.to_string(),
            census.get(&kind).copied().unwrap_or(0).to_string(),
            pending.to_string(),
        ]);
    }
    println!("{table}");
    println!();

    if args.map {
        println!("  {}", "Map".bold().underline());
        println!();
        for line in render_map(sim.world()).lines() {
            println!("  {line}");
        }
        println!();
    }

    Ok(())
}

/// Print the event log when asked to. Returns whether anything was printed.
fn verbose_log(args: &SimulateArgs, sim: &Simulation) -> bool {
    if !args.verbose {
        return false;
    }
    println!("  {}", "Event Log".bold().underline());
    println!();
    for event in sim.events().events() {
        let time_label = format!("[t {:>7}]", event.time).dimmed();
        let desc = colorize_event(&event.kind, &event.description);
        println!("  {time_label} {desc}");
    }
    if sim.events().is_empty() {
        println!("  {}", "(no events)".dimmed());
    }
    true
}

/// A world of the requested size, populated at seeded random cells, with
/// every entity's actions already queued.
fn demo_world(args: &SimulateArgs, config: SimConfig) -> Result<Simulation, String> {
    if args.rows == 0 || args.cols == 0 {
        return Err(format!("grid must be non-empty, got {}x{}", args.rows, args.cols));
    }
    let cells = args
        .rows
        .checked_mul(args.cols)
        .filter(|cells| *cells <= MAX_CELLS)
        .ok_or_else(|| {
            format!(
                "grid of {}x{} exceeds the {MAX_CELLS}-cell limit",
                args.rows, args.cols
            )
        })?;
    let wanted = [args.miners, args.veins, args.smiths, args.obstacles]
        .into_iter()
        .try_fold(0_usize, usize::checked_add)
        .filter(|wanted| *wanted <= cells)
        .ok_or_else(|| format!("requested entities do not fit on a {}x{} grid", args.rows, args.cols))?;

    let images = StaticImageStore::new()
        .with_frames(EntityKind::MinerNotFull.sprite_key(), 4)
        .with_frames(EntityKind::OreBlob.sprite_key(), 12)
        .with_frames(EntityKind::Quake.sprite_key(), 6);
    let mut rng = StdRng::seed_from_u64(config.seed.wrapping_add(1));
    let world = WorldModel::try_new(args.rows, args.cols, Background::new("grass"))
        .map_err(|e| e.to_string())?;
    let mut sim = Simulation::new(world, config, images);

    let mut free: Vec<Point> = (0..args.rows)
        .flat_map(|y| (0..args.cols).map(move |x| Point::new(x as i32, y as i32)))
        .collect();
    free.shuffle(&mut rng);
    let mut free = free.into_iter();
    let mut next_cell = || free.next().ok_or_else(|| "ran out of free cells".to_string());

    let mut placed = Vec::with_capacity(wanted);
    for i in 0..args.obstacles {
        placed.push(Entity::obstacle(
            format!("obstacle_{i}"),
            next_cell()?,
            sim.frames(EntityKind::Obstacle),
        ));
    }
    for i in 0..args.smiths {
        placed.push(Entity::blacksmith(
            format!("blacksmith_{i}"),
            next_cell()?,
            sim.frames(EntityKind::Blacksmith),
        ));
    }
    for i in 0..args.veins {
        placed.push(Entity::vein(
            format!("vein_{i}"),
            next_cell()?,
            rng.random_range(4_000..12_000),
            sim.frames(EntityKind::Vein),
        ));
    }
    for i in 0..args.miners {
        placed.push(Entity::miner_not_full(
            format!("miner_{i}"),
            rng.random_range(2..5),
            next_cell()?,
            rng.random_range(600..1_200),
            rng.random_range(100..200),
            sim.frames(EntityKind::MinerNotFull),
        ));
    }

    for entity in placed {
        sim.spawn(entity).map_err(|e| e.to_string())?;
    }
    Ok(sim)
}

fn glyph(kind: EntityKind) -> char {
    match kind {
        EntityKind::MinerFull => 'M',
        EntityKind::MinerNotFull => 'm',
        EntityKind::Ore => 'o',
        EntityKind::OreBlob => 'b',
        EntityKind::Quake => '*',
        EntityKind::Vein => 'V',
        EntityKind::Blacksmith => 'B',
        EntityKind::Obstacle => '#',
    }
}

/// One line per row, one character per cell; `.` is empty.
fn render_map(world: &WorldModel) -> String {
    let mut out = String::with_capacity(world.num_rows() * (world.num_cols() + 1));
    for y in 0..world.num_rows() {
        for x in 0..world.num_cols() {
            let cell = world
                .occupant(Point::new(x as i32, y as i32))
                .and_then(|id| world.entity(id))
                .map_or('.', |e| glyph(e.kind));
            out.push(cell);
        }
        out.push('\n');
    }
    out
}

fn colorize_event(kind: &SimEventKind, description: &str) -> colored::ColoredString {
    match kind {
        SimEventKind::Spawned { .. } => description.green(),
        SimEventKind::Removed { .. } => description.red(),
        SimEventKind::Moved { .. } => description.normal(),
        SimEventKind::Transformed { .. } => description.cyan(),
        SimEventKind::Mined { .. } => description.yellow(),
        SimEventKind::Erupted { .. } => description.red().bold(),
    }
}
