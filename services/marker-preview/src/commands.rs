//! Subcommand implementations.

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use marker_common::{IconRef, MarkerConfig, MarkerId, MarkerOptions, MarkerSpec, Variant};
use renderer::MarkerBuilder;
use transition::{transition_steps, FixedDisplay, MarkersController, MemorySurface, SurfaceEvent};

/// Upper bound on simulated ticks, far beyond any configured duration.
const MAX_TICKS: usize = 100_000;

#[derive(clap::Args, Debug)]
pub struct SpecArgs {
    /// Label text
    #[arg(long, default_value = "")]
    pub label: String,

    /// Counter badge text
    #[arg(long)]
    pub counter: Option<String>,

    /// SVG file drawn as the marker icon
    #[arg(long)]
    pub icon: Option<PathBuf>,

    /// Draw the pointer below the bubble
    #[arg(long)]
    pub pointer: bool,

    #[arg(long)]
    pub selected: bool,

    #[arg(long)]
    pub visualized: bool,

    /// Use the special variant colours
    #[arg(long)]
    pub special: bool,
}

impl SpecArgs {
    fn to_spec(&self) -> Result<MarkerSpec> {
        let mut spec = MarkerSpec::new(self.label.as_str())
            .with_pointer(self.pointer)
            .selected(self.selected)
            .visualized(self.visualized);
        if let Some(counter) = &self.counter {
            spec = spec.with_counter(counter.as_str());
        }
        if let Some(path) = &self.icon {
            spec = spec.with_icon(read_icon(path)?);
        }
        if self.special {
            spec = spec.with_variant(Variant::Special);
        }
        Ok(spec)
    }
}

fn read_icon(path: &Path) -> Result<IconRef> {
    let svg = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read icon {}", path.display()))?;
    Ok(IconRef::new(svg))
}

#[derive(clap::Args, Debug)]
pub struct RenderArgs {
    #[command(flatten)]
    pub spec: SpecArgs,

    /// Output PNG path
    #[arg(short, long)]
    pub out: PathBuf,

    /// Also write the element tree as JSON
    #[arg(long)]
    pub layout_json: Option<PathBuf>,
}

#[derive(clap::Args, Debug)]
pub struct TransitionArgs {
    /// Label before the transition
    #[arg(long)]
    pub from: String,

    /// Label after the transition
    #[arg(long)]
    pub to: String,

    #[arg(long)]
    pub from_counter: Option<String>,

    #[arg(long)]
    pub to_counter: Option<String>,

    #[arg(long)]
    pub pointer: bool,

    #[arg(long)]
    pub selected: bool,

    /// Display refresh rate used to size the frame sequence
    #[arg(long, default_value = "60")]
    pub refresh_hz: f32,

    /// Directory for frame PNGs
    #[arg(long)]
    pub out_dir: Option<PathBuf>,

    /// Write the simulation summary as JSON
    #[arg(long)]
    pub summary_json: Option<PathBuf>,
}

impl TransitionArgs {
    fn specs(&self) -> (MarkerSpec, MarkerSpec) {
        let base = |label: &str, counter: &Option<String>| {
            let spec = MarkerSpec::new(label)
                .with_pointer(self.pointer)
                .selected(self.selected);
            match counter {
                Some(c) => spec.with_counter(c.as_str()),
                None => spec,
            }
        };
        (
            base(&self.from, &self.from_counter),
            base(&self.to, &self.to_counter),
        )
    }
}

pub fn render(config: &MarkerConfig, density: f32, args: &RenderArgs) -> Result<()> {
    let spec = args.spec.to_spec()?;
    let mut builder = MarkerBuilder::from_config(config, density)?;

    if let Some(path) = &args.layout_json {
        let json = builder.layout(&spec).to_json()?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        info!(path = %path.display(), "Wrote layout");
    }

    let image = builder.build(&spec)?;
    image
        .write_png(&args.out)
        .with_context(|| format!("Failed to write {}", args.out.display()))?;
    info!(
        path = %args.out.display(),
        width = image.width(),
        height = image.height(),
        "Rendered marker"
    );
    Ok(())
}

/// What a simulated transition did on the surface.
#[derive(Debug, Default, Serialize)]
pub struct SimulationSummary {
    pub outcome: String,
    pub direction: Option<String>,
    pub frame_count: usize,
    pub ticks: usize,
    pub placements: usize,
    pub removals: usize,
    pub rejections: usize,
    pub peak_live: usize,
    pub final_live: usize,
    pub cache_hits: u64,
    pub cache_misses: u64,
}

impl SimulationSummary {
    fn count_events(&mut self, events: &[SurfaceEvent]) {
        for event in events {
            match event {
                SurfaceEvent::Placed { .. } => self.placements += 1,
                SurfaceEvent::Removed(_) => self.removals += 1,
                SurfaceEvent::Rejected => self.rejections += 1,
                SurfaceEvent::Alpha { .. } => {}
            }
        }
    }
}

pub fn transition(config: &MarkerConfig, density: f32, args: &TransitionArgs) -> Result<()> {
    let (start, end) = args.specs();
    let mut builder = MarkerBuilder::from_config(config, density)?;
    let frame_count = config.transition.frame_count(args.refresh_hz);

    if let Some(dir) = &args.out_dir {
        write_frames(&mut builder, &start, &end, frame_count, dir)?;
    }

    let display = FixedDisplay {
        refresh_rate_hz: args.refresh_hz,
        density,
    };
    let summary = simulate(builder, config, &display, start, end, frame_count)?;
    info!(
        outcome = %summary.outcome,
        direction = ?summary.direction,
        frames = summary.frame_count,
        placements = summary.placements,
        removals = summary.removals,
        peak_live = summary.peak_live,
        "Simulated transition"
    );

    if let Some(path) = &args.summary_json {
        let json = serde_json::to_string_pretty(&summary)?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write {}", path.display()))?;
    }
    Ok(())
}

fn write_frames(
    builder: &mut MarkerBuilder,
    start: &MarkerSpec,
    end: &MarkerSpec,
    frame_count: usize,
    dir: &Path,
) -> Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create {}", dir.display()))?;

    builder.build(start)?.write_png(dir.join("frame_00.png"))?;
    let frames = builder.build_transition_frames(start, end, &transition_steps(frame_count))?;
    for (i, frame) in frames.iter().enumerate() {
        let path = dir.join(format!("frame_{:02}.png", i + 1));
        frame.write_png(&path)?;
        debug!(path = %path.display(), width = frame.width(), height = frame.height(), "Wrote frame");
    }
    info!(dir = %dir.display(), frames = frames.len() + 1, "Wrote transition frames");
    Ok(())
}

fn simulate(
    builder: MarkerBuilder,
    config: &MarkerConfig,
    display: &FixedDisplay,
    start: MarkerSpec,
    end: MarkerSpec,
    frame_count: usize,
) -> Result<SimulationSummary> {
    let mut controller = MarkersController::new(
        builder,
        MemorySurface::new(),
        config.transition.clone(),
        display,
    );
    let id = MarkerId::from("preview");
    let mut now = Instant::now();

    controller.add_marker(MarkerOptions::new(id.clone(), start), now)?;
    // Let any fade-in finish so only the transition shows up in the counts.
    while controller.is_busy() {
        now += config.transition.fade_duration().max(Duration::from_millis(1));
        controller.tick(now);
    }
    controller.surface_mut().take_events();

    let outcome = controller.change_marker(MarkerOptions::new(id.clone(), end), now)?;
    let mut summary = SimulationSummary {
        outcome: format!("{:?}", outcome),
        direction: controller
            .animator()
            .direction(&id)
            .map(|d| format!("{:?}", d)),
        frame_count,
        peak_live: controller.surface().live_count(),
        ..Default::default()
    };

    let interval = Duration::from_secs_f32(1.0 / display.refresh_rate_hz.max(1.0));
    while controller.is_busy() {
        if summary.ticks >= MAX_TICKS {
            warn!(ticks = summary.ticks, "Transition did not finish; giving up");
            break;
        }
        now += interval;
        controller.tick(now);
        summary.ticks += 1;
        summary.peak_live = summary.peak_live.max(controller.surface().live_count());
    }

    summary.count_events(controller.surface().events());
    summary.final_live = controller.surface().live_count();
    let stats = controller.builder().cache().stats();
    summary.cache_hits = stats.hits;
    summary.cache_misses = stats.misses;
    Ok(summary)
}
