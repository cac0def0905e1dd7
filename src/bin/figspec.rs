use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use figspec::{
    Aggregate, GlobalPlotSettings, HistogramOptions, LineLayout, SaveOptions, SeriesStyle, SubplotOptions,
    TimeSeriesOptions, TimeSeriesTable, histogram, line_plot, plot_timeseries, preset, preset_names, subplots,
};
use std::f64::consts::PI;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(
    name = "figspec",
    version,
    about = "Configuration-driven scientific plots: YAML settings in, PNG/SVG out"
)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a line plot, a histogram and a subplot figure.
    Demo(DemoArgs),
    /// Print a named preset as YAML, or write it to a file.
    Preset(PresetArgs),
    /// Plot columns of a CSV file against its date column.
    Timeseries(TimeseriesArgs),
}

#[derive(Args, Debug)]
struct DemoArgs {
    /// Directory for the demo images (created if missing).
    #[arg(long, default_value = "demo_output")]
    outdir: PathBuf,
}

#[derive(Args, Debug)]
struct PresetArgs {
    /// Preset name (default, publication, presentation, nature_style, science_style)
    name: String,
    /// Write the YAML here instead of stdout.
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct TimeseriesArgs {
    /// CSV file with a date column and numeric columns.
    #[arg(long)]
    csv: PathBuf,
    /// Column names separated by comma or semicolon; several are summed unless --aggregate is given.
    #[arg(long)]
    column: String,
    /// Settings file (.yaml, .yml or .json).
    #[arg(long)]
    config: Option<PathBuf>,
    /// Name of the date column.
    #[arg(long, default_value = "DATE")]
    date_column: String,
    /// Combine columns with sum, mean, max or min.
    #[arg(long)]
    aggregate: Option<Aggregate>,
    /// Shade the area under the curve.
    #[arg(long, default_value_t = false)]
    fill: bool,
    /// Draw a separator and label at the start of each ISO week.
    #[arg(long, default_value_t = false)]
    weeks: bool,
    /// Mark the first and last sample with dashed lines.
    #[arg(long, default_value_t = false)]
    boundaries: bool,
    /// Output image (.png or .svg).
    #[arg(long)]
    out: PathBuf,
    #[arg(long, default_value_t = 300)]
    dpi: u32,
}

fn parse_list(s: &str) -> Vec<String> {
    s.split([',', ';'])
        .map(|x| x.trim().to_string())
        .filter(|x| !x.is_empty())
        .collect()
}

fn load_settings(path: &Path) -> Result<GlobalPlotSettings> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    let settings = match ext.as_str() {
        "yaml" | "yml" => GlobalPlotSettings::load_yaml(path),
        "json" => GlobalPlotSettings::load_json(path),
        other => anyhow::bail!("unsupported config format: {other:?} (expected yaml, yml or json)"),
    };
    settings.with_context(|| format!("loading settings from {}", path.display()))
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    match cli.cmd {
        Command::Demo(args) => cmd_demo(args),
        Command::Preset(args) => cmd_preset(args),
        Command::Timeseries(args) => cmd_timeseries(args),
    }
}

/// Sum of twelve evenly spread uniforms, centred: close enough to N(0, 1) for a demo.
fn demo_samples(n: usize) -> Vec<f64> {
    let mut state: u64 = 0x2545_F491_4F6C_DD1D;
    let mut uniform = move || {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        (state >> 11) as f64 / (1u64 << 53) as f64
    };
    (0..n).map(|_| (0..12).map(|_| uniform()).sum::<f64>() - 6.0).collect()
}

fn cmd_demo(args: DemoArgs) -> Result<()> {
    let save = SaveOptions::default().dpi(300);
    let dir = &args.outdir;
    let x: Vec<f64> = (0..400).map(|i| i as f64 / 399.0).collect();
    let sin: Vec<f64> = x.iter().map(|v| (2.0 * PI * v).sin()).collect();
    let cos: Vec<f64> = x.iter().map(|v| (2.0 * PI * v).cos()).collect();

    let settings = GlobalPlotSettings::builder()
        .title("Demo: Line plot")
        .x_label("x")
        .y_label("sin(2πx)")
        .build()?;
    let line = SeriesStyle::builder(sin.iter().copied())
        .x(x.iter().copied())
        .label("sin")
        .color("#0066CC")
        .build()?;
    let (fig, _) = line_plot(line, &settings, &LineLayout::default())?;
    let line_path = fig.save(dir.join("demo_line.png"), &save)?;

    let settings = GlobalPlotSettings::builder()
        .title("Demo: Histogram")
        .x_label("value")
        .y_label("count")
        .build()?;
    let sample = SeriesStyle::builder(demo_samples(1000)).label("N(0,1)").build()?;
    let (fig, _) = histogram(&[sample], &settings, &HistogramOptions::default().bins(30))?;
    let hist_path = fig.save(dir.join("demo_histogram.png"), &save)?;

    let settings = GlobalPlotSettings::builder().title("Demo: Subplots").x_label("x").build()?;
    let opts = SubplotOptions {
        sharex: true,
        titles: vec!["sin".into(), "cos".into()],
        ..Default::default()
    };
    let (mut fig, grid) = subplots(2, 1, &settings, &opts)?;
    for (id, (y, color)) in grid.iter().zip([(&sin, "#0066CC"), (&cos, "#CC3300")]) {
        let series = SeriesStyle::builder(y.iter().copied())
            .x(x.iter().copied())
            .color(color)
            .build()?;
        fig[id].plot(&series)?;
    }
    let sub_path = fig.save(dir.join("demo_subplots.png"), &save)?;

    println!("Demo figures created:");
    for p in [line_path, hist_path, sub_path] {
        println!("  {}", p.display());
    }
    Ok(())
}

fn cmd_preset(args: PresetArgs) -> Result<()> {
    let settings = preset(&args.name).with_context(|| format!("known presets: {}", preset_names().join(", ")))?;
    match args.out {
        Some(path) => {
            settings
                .save_yaml(&path)
                .with_context(|| format!("writing {}", path.display()))?;
            eprintln!("Wrote preset {} to {}", args.name, path.display());
        }
        None => print!("{}", settings.to_yaml_string()?),
    }
    Ok(())
}

fn cmd_timeseries(args: TimeseriesArgs) -> Result<()> {
    let table = TimeSeriesTable::from_csv(&args.csv, &args.date_column)
        .with_context(|| format!("reading {}", args.csv.display()))?;
    let columns = parse_list(&args.column);
    if columns.is_empty() {
        anyhow::bail!("--column needs at least one column name");
    }
    let columns: Vec<&str> = columns.iter().map(String::as_str).collect();
    let settings = args.config.as_deref().map(load_settings).transpose()?;
    let opts = TimeSeriesOptions {
        fill: args.fill,
        week_separators: args.weeks,
        boundary_lines: args.boundaries,
        aggregate: args.aggregate,
        ..Default::default()
    };
    let (fig, _) = plot_timeseries(&table, &columns, settings.as_ref(), &opts)?;
    let path = fig.save(&args.out, &SaveOptions::default().dpi(args.dpi))?;
    eprintln!("Wrote plot to {}", path.display());
    Ok(())
}
