// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Entry point for all user interaction, parsed with `clap`.
// All work is delegated to Layer 2 (application).
//
// Three commands are supported:
//   1. `crossval` — k-fold cross-validation of one classifier
//   2. `inspect`  — print data shapes, labels and the topology
//   3. `rerun`    — repeat a crossval run from its saved config
//
// `--backend` picks the tensor backend for either command.
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

pub mod commands;

use anyhow::Result;
use burn::backend::{ndarray::NdArrayDevice, wgpu::WgpuDevice, Autodiff, NdArray, Wgpu};
use clap::Parser;
use commands::{BackendKind, Commands, ExperimentArgs, RerunArgs};

use crate::application::crossval_use_case::{CrossValUseCase, CrossValidationReport};
use crate::infra::{report, run_store::RunStore};

type CpuBackend = Autodiff<NdArray>;
type GpuBackend = Autodiff<Wgpu>;

#[derive(Parser, Debug)]
#[command(
    name = "sentence-cv",
    version = "0.1.0",
    about = "Cross-validate feedforward, fastText and CNN sentence classifiers."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Tensor backend
    #[arg(long, value_enum, default_value_t = BackendKind::Ndarray, global = true)]
    pub backend: BackendKind,
}

impl Cli {
    /// Dispatch to the use case; the CLI only routes, never computes.
    pub fn run(self) -> Result<()> {
        let backend = self.backend;
        match self.command {
            Commands::Crossval(args) => run_crossval(args, backend),
            Commands::Inspect(args)  => run_inspect(args, backend),
            Commands::Rerun(args)    => run_rerun(args, backend),
        }
    }
}

fn run_crossval(args: ExperimentArgs, backend: BackendKind) -> Result<()> {
    tracing::info!("Cross-validating on corpus: {}", args.data.corpus);
    cross_validate(&CrossValUseCase::new(args.into()), backend)?;
    Ok(())
}

fn run_rerun(args: RerunArgs, backend: BackendKind) -> Result<()> {
    let store    = RunStore::new(&args.run_dir);
    let previous = store
        .load_report()
        .map_err(|e| tracing::warn!("No earlier report to compare with: {:#}", e))
        .ok();

    tracing::info!("Repeating run from '{}'", store.dir().display());
    let use_case = CrossValUseCase::from_run_dir(&args.run_dir)?;
    let current  = cross_validate(&use_case, backend)?;

    if let Some(prev) = previous {
        println!("Earlier run: {}", report::summary_line(prev.mean_accuracy, prev.std_accuracy));
        println!("This run:    {}", report::summary_line(current.mean_accuracy, current.std_accuracy));
    }
    Ok(())
}

fn cross_validate(use_case: &CrossValUseCase, backend: BackendKind) -> Result<CrossValidationReport> {
    let report = match backend {
        BackendKind::Ndarray => use_case.execute::<CpuBackend>(&NdArrayDevice::default())?,
        BackendKind::Wgpu    => {
            let device = WgpuDevice::default();
            tracing::info!("Using WGPU device: {:?}", device);
            use_case.execute::<GpuBackend>(&device)?
        }
    };

    tracing::info!(
        "Finished {} folds, mean accuracy {:.4}",
        report.folds.len(),
        report.mean_accuracy
    );
    Ok(report)
}

fn run_inspect(args: ExperimentArgs, backend: BackendKind) -> Result<()> {
    use crate::application::inspect_use_case::InspectUseCase;

    let use_case = InspectUseCase::new(args.into());
    match backend {
        BackendKind::Ndarray => use_case.execute::<NdArray>(&NdArrayDevice::default())?,
        BackendKind::Wgpu    => use_case.execute::<Wgpu>(&WgpuDevice::default())?,
    };
    Ok(())
}
