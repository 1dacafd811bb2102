use std::io::Write;
use std::path::{Path, PathBuf};

use grievance_core::breakdown::slice_label;
use grievance_core::timeline::narration::{format_amount, format_period};
use grievance_core::{
    LoadError, Position, Renderer, ScrollCoordinator, Viewport, VizConfigExt, aggregate,
    columns_for_width, parse_breakdowns, parse_grievances, step_texts,
};

use crate::context::CliContext;
use crate::svg::{SvgBackend, breakdown_svg};

/// Shown in place of the chart when the primary dataset cannot be used.
pub const EMPTY_STATE: &str = "Unable to load grievance data";

async fn read_text(path: &Path) -> Result<String, LoadError> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|source| LoadError::ReadFile {
            path: path.to_path_buf(),
            source,
        })
}

/// Load both datasets concurrently and start a fresh session.
///
/// The summary is optional and independent: its failure only affects the
/// breakdown grid.
pub async fn load(primary: &Path, summary: Option<&Path>, ctx: &CliContext) -> Result<(), String> {
    let summary_read = async {
        match summary {
            Some(path) => Some(read_text(path).await),
            None => None,
        }
    };
    let (primary_text, summary_text) = tokio::join!(read_text(primary), summary_read);

    if let Some(result) = summary_text {
        match result.and_then(|text| parse_breakdowns(&text)) {
            Ok(breakdowns) => {
                println!("Loaded breakdowns for {} shelters", breakdowns.len());
                *ctx.breakdowns.write().await = breakdowns;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to load category summary");
                ctx.breakdowns.write().await.clear();
            }
        }
    }

    let parsed = primary_text.and_then(|text| parse_grievances(&text));
    let (records, report) = match parsed {
        Ok(parsed) => parsed,
        Err(e) => {
            tracing::error!(error = %e, path = %primary.display(), "Failed to load grievances");
            ctx.clear_session().await;
            return Err(format!("{EMPTY_STATE}: {e}\n"));
        }
    };

    let config = ctx.config.read().await.clone();
    let timeline = aggregate(&records, &config.sentinel);
    tracing::info!(
        rows = report.rows_read,
        kept = report.rows_kept,
        dropped = report.dropped(),
        frames = timeline.len(),
        shelters = timeline.registry.len(),
        "Loaded grievance timeline"
    );

    let viewport = ctx.viewport().await;
    let renderer = Renderer::for_timeline(
        SvgBackend::new(viewport, &config.sentinel),
        &timeline,
        &config.scene,
    );
    let mut session = ScrollCoordinator::new(timeline, viewport, &config, renderer);
    if !session.init() {
        println!("{EMPTY_STATE}: no usable rows");
    }
    println!(
        "Loaded {} frames for {} shelters ({} rows dropped)",
        session.timeline().len(),
        session.timeline().registry.len(),
        report.dropped()
    );
    ctx.set_session(session).await;
    Ok(())
}

pub async fn list_frames(ctx: &CliContext) -> Result<(), String> {
    ctx.with_session(|session| {
        let current = session.current_index();
        println!(
            "{:<4} {:<14} {:>10} {:>12} Shelters",
            "#", "Period", "Period", "Cumulative"
        );
        println!("{}", "-".repeat(56));
        for (i, frame) in session.timeline().frames.iter().enumerate() {
            let marker = if i == current { "*" } else { " " };
            println!(
                "{:<4} {:<14} {:>10} {:>12} {}{}",
                i,
                format_period(frame.period),
                format_amount(frame.period_sum),
                format_amount(frame.cumulative_sum),
                frame.nodes.len(),
                marker
            );
        }
    })
    .await
}

pub async fn list_steps(ctx: &CliContext) -> Result<(), String> {
    ctx.with_session(|session| {
        for (i, text) in step_texts(session.timeline()).iter().enumerate() {
            println!("[{i}] {}\n    {}", text.heading, text.body);
        }
    })
    .await
}

pub async fn step(index: usize, ctx: &CliContext) -> Result<(), String> {
    let shown = ctx
        .with_session(|session| {
            session
                .on_step_enter(index)
                .then(|| session.scene().backend().overlay().to_string())
        })
        .await?;
    match shown {
        Some(overlay) => println!("{overlay}"),
        None => println!("No step {index}"),
    }
    Ok(())
}

/// Resize the graphic container to `width` inside a window of
/// `window_width` x `window_height`. The window width picks the step offset
/// and defaults to the container width.
pub async fn resize(
    width: f64,
    window_height: f64,
    window_width: Option<f64>,
    ctx: &CliContext,
) -> Result<(), String> {
    let (viewport, columns, offset) = apply_resize(width, window_height, window_width, ctx).await?;
    println!(
        "Viewport {:.0}x{:.0}, {columns} columns, step offset {offset}",
        viewport.width, viewport.height
    );
    Ok(())
}

async fn apply_resize(
    width: f64,
    window_height: f64,
    window_width: Option<f64>,
    ctx: &CliContext,
) -> Result<(Viewport, u32, f64), String> {
    let layout = ctx.config.read().await.layout.clone();
    let viewport = Viewport::from_container(width, window_height, &layout);
    let window_width = window_width.unwrap_or(width);
    ctx.with_session(|session| {
        session.scene_mut().backend_mut().set_viewport(viewport);
        session.on_resize(viewport);
        (
            viewport,
            columns_for_width(viewport.width, &layout),
            session.step_offset(window_width),
        )
    })
    .await
}

pub async fn hover(shelter: &str, x: f64, y: f64, ctx: &CliContext) -> Result<(), String> {
    let tooltip = ctx
        .with_session(|session| {
            session.hover(shelter, Position::new(x, y));
            session.scene().backend().tooltip().cloned()
        })
        .await?;
    match tooltip {
        Some(tip) => println!(
            "{} | {} @ ({:.0}, {:.0})",
            tip.title, tip.detail, tip.at.x, tip.at.y
        ),
        None => println!("{shelter} is not shown in this frame"),
    }
    Ok(())
}

pub async fn leave(ctx: &CliContext) -> Result<(), String> {
    ctx.with_session(|session| session.leave()).await
}

pub async fn render(out: &Path, ctx: &CliContext) -> Result<(), String> {
    let svg = ctx
        .with_session(|session| session.scene().backend().to_svg())
        .await?;
    write_file(out, svg).await
}

pub async fn breakdown(out: Option<&Path>, ctx: &CliContext) -> Result<(), String> {
    let breakdowns = ctx.breakdowns.read().await.clone();
    if breakdowns.is_empty() {
        println!("No category breakdowns loaded (use `load --summary <file>`)");
        return Ok(());
    }

    for b in &breakdowns {
        let slices: Vec<String> = b.slices.iter().map(slice_label).collect();
        println!("{} ({}): {}", b.shelter, format_amount(b.total), slices.join(", "));
    }

    if let Some(out) = out {
        let viewport = ctx.viewport().await;
        let layout = ctx.config.read().await.layout.clone();
        let columns = columns_for_width(viewport.width, &layout);
        write_file(out, breakdown_svg(&breakdowns, columns)).await?;
    }
    Ok(())
}

pub async fn show_settings(ctx: &CliContext) -> Result<(), String> {
    let config = ctx.config.read().await;
    match grievance_core::VizConfig::config_path() {
        Ok(path) => println!("Config file: {}", path.display()),
        Err(e) => println!("Config file: unavailable ({e})"),
    }
    println!("Sentinel shelter: {}", config.sentinel);
    println!(
        "Radius: {}..{} (floor {}), transition {}ms, exit {}ms",
        config.scene.min_radius,
        config.scene.max_radius,
        config.scene.min_visible_radius,
        config.scene.transition_ms,
        config.scene.exit_ms
    );
    let breakpoints: Vec<String> = config
        .layout
        .breakpoints
        .iter()
        .map(|b| format!("<{}:{}", b.max_width, b.columns))
        .collect();
    println!(
        "Columns: {} else {}",
        breakpoints.join(" "),
        config.layout.max_columns
    );
    println!(
        "Step offset: {} below {}px, else {}",
        config.scroll.narrow_offset, config.scroll.narrow_below, config.scroll.wide_offset
    );
    println!(
        "Data: {} / {}",
        config.data.grievances, config.data.summary
    );
    Ok(())
}

pub fn exit() {
    let _ = write!(std::io::stdout(), "quitting...");
    let _ = std::io::stdout().flush();
}

/// Default dataset paths from the config.
pub async fn default_sources(ctx: &CliContext) -> (PathBuf, PathBuf) {
    let config = ctx.config.read().await;
    (
        PathBuf::from(&config.data.grievances),
        PathBuf::from(&config.data.summary),
    )
}

async fn write_file(out: &Path, contents: String) -> Result<(), String> {
    tokio::fs::write(out, contents)
        .await
        .map_err(|e| format!("Failed to write {}: {e}\n", out.display()))?;
    println!("Wrote {}", out.display());
    Ok(())
}
