use clap::{
    Parser,
    Subcommand,
};
use serde::Serialize;
use sicquery::{
    aggregate_ions_in_range,
    AbortSignal,
    CacheStats,
    MsSpectrum,
    ScanInfo,
    ScanTracker,
    SpectrumCache,
    SpectrumCacheOptions,
    SpectrumProcessingOptions,
};
use tracing::subscriber::set_global_default;
use tracing_bunyan_formatter::{
    BunyanFormattingLayer,
    JsonStorageLayer,
};
use tracing_subscriber::prelude::*;
use tracing_subscriber::registry::Registry;
use tracing_subscriber::EnvFilter;

fn main() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let formatting_layer = BunyanFormattingLayer::new("sicquery".into(), std::io::stdout);
    let subscriber = Registry::default()
        .with(env_filter)
        .with(JsonStorageLayer)
        .with(formatting_layer);

    set_global_default(subscriber).expect("Setting default subscriber failed");
    let args = Args::parse();

    match args.command {
        Some(Commands::Simulate(args)) => main_simulate(args),
        Some(Commands::WriteTemplate(args)) => main_write_template(args),
        None => {
            println!("No command provided");
        }
    }
}

#[derive(Debug, Parser)]
#[command(version, about = "Selected ion chromatogram extraction demo")]
struct Args {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run a synthetic LC-MS run through the full pipeline and print the SIC
    Simulate(SimulateArgs),
    /// Write a template processing-options JSON file
    WriteTemplate(WriteTemplateArgs),
}

#[derive(Debug, Parser)]
struct SimulateArgs {
    /// Number of scans to generate
    #[arg(long, default_value_t = 500)]
    scans: u32,
    /// Spectra to keep in memory before paging out
    #[arg(long, default_value_t = 100)]
    pool_capacity: usize,
    /// Target m/z values to extract a chromatogram for
    #[arg(long, default_values_t = vec![500.0, 750.0])]
    target_mz: Vec<f64>,
    /// m/z tolerance half width
    #[arg(long, default_value_t = 0.1)]
    tolerance: f64,
}

#[derive(Debug, Parser)]
struct WriteTemplateArgs {
    /// Output path for the template
    #[arg(long, default_value = "sicquery_options.json")]
    output: std::path::PathBuf,
}

#[derive(Debug, Serialize)]
struct SicOutput {
    target_mz: f64,
    scan_numbers: Vec<u32>,
    intensities: Vec<f64>,
}

#[derive(Debug, Serialize)]
struct SimulationOutput {
    traces: Vec<SicOutput>,
    cache_stats: CacheStats,
}

fn main_simulate(args: SimulateArgs) {
    let mut tracker = ScanTracker::new();
    let mut cache = SpectrumCache::new(SpectrumCacheOptions {
        spectra_to_retain_in_memory: args.pool_capacity,
        ..Default::default()
    });
    let options = SpectrumProcessingOptions {
        compress_spectra: true,
        ..Default::default()
    };
    let abort = AbortSignal::new();

    let mut scans = Vec::with_capacity(args.scans as usize);
    for scan_number in 1..=args.scans {
        if abort.is_aborted() {
            tracing::info!("aborted between scans");
            return;
        }
        let spectrum = synthetic_spectrum(scan_number, args.scans, &args.target_mz);
        let mut scan = ScanInfo::new(scan_number, scan_number as f32 * 0.02);
        match tracker.process_and_store_spectrum(&mut scan, spectrum, &mut cache, &options) {
            Ok(()) => scans.push(scan),
            Err(e) => tracing::error!(scan_number, "skipping scan: {}", e),
        }
    }

    let mut traces = Vec::new();
    for target_mz in &args.target_mz {
        let mut out = SicOutput {
            target_mz: *target_mz,
            scan_numbers: Vec::with_capacity(scans.len()),
            intensities: Vec::with_capacity(scans.len()),
        };
        for scan in &scans {
            let intensity = match cache.get_spectrum(scan.scan_number, true) {
                Ok(spectrum) => {
                    aggregate_ions_in_range(spectrum, *target_mz, args.tolerance, false).intensity
                }
                Err(e) => {
                    tracing::warn!(scan_number = scan.scan_number, "scan unavailable: {}", e);
                    0.0
                }
            };
            out.scan_numbers.push(scan.scan_number);
            out.intensities.push(intensity);
        }
        traces.push(out);
    }

    let output = SimulationOutput {
        traces,
        cache_stats: cache.stats(),
    };
    match serde_json::to_string_pretty(&output) {
        Ok(json) => println!("{}", json),
        Err(e) => tracing::error!("failed to serialize output: {}", e),
    }
}

/// A deterministic spectrum: gaussian elution profiles at the target m/z
/// values on top of a low-level comb of background points.
fn synthetic_spectrum(scan_number: u32, total_scans: u32, targets: &[f64]) -> MsSpectrum {
    let mut points: Vec<(f64, f32)> = Vec::new();
    for i in 0..200 {
        let mz = 400.0 + i as f64 * 2.5;
        let background = 1.0 + ((scan_number as f32 * 0.7 + i as f32).sin().abs()) * 3.0;
        points.push((mz, background));
    }
    for (k, target) in targets.iter().enumerate() {
        let apex = total_scans as f32 * (0.3 + 0.4 * (k as f32 / targets.len().max(1) as f32));
        let sigma = total_scans as f32 * 0.03;
        let z = (scan_number as f32 - apex) / sigma;
        let intensity = 50_000.0 * (-0.5 * z * z).exp();
        if intensity > 1.0 {
            points.push((*target, intensity));
        }
    }
    points.sort_by(|a, b| a.0.total_cmp(&b.0));
    let mut spectrum = MsSpectrum::with_capacity(scan_number, points.len());
    for (mz, intensity) in points {
        spectrum.push(mz, intensity);
    }
    spectrum
}

fn main_write_template(args: WriteTemplateArgs) {
    let template = SpectrumProcessingOptions::default();
    match serde_json::to_string_pretty(&template) {
        Ok(json) => {
            if let Err(e) = std::fs::write(&args.output, json) {
                tracing::error!("failed to write {}: {}", args.output.display(), e);
            } else {
                println!("Wrote template to {}", args.output.display());
            }
        }
        Err(e) => tracing::error!("failed to serialize template: {}", e),
    }
}
