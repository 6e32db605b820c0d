mod cli;
mod core;
mod grabber;
mod octave;
mod pipelines;
mod sync;
mod validator;
mod worker;

use cli::output::{style, INFO};

use anyhow::{Context, Result};
use cli::commands::{LaunchArgs, ListCommand, RunCommand, ScriptCommand, ValidateCommand, WorkerCommand};
use cli::output::*;
use cli::{Cli, Command};
use core::descriptor::BoutiqueDescriptor;
use core::subjects;
use core::tuning::TuningConfig;
use grabber::InputLayout;
use octave::OctaveRunner;
use pipelines::{Basc, FmriPreprocess, FmriPreprocessBids, Launch, PipelineKind, PreprocessParams, Settings};
use tracing::{error, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::from_args();

    // Initialize logging
    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set logging subscriber")?;

    // Execute command
    match &cli.command {
        Command::Run(cmd) => run_pipeline(cmd).await?,
        Command::Script(cmd) => print_script(cmd)?,
        Command::Validate(cmd) => check_dataset(cmd).await?,
        Command::List(cmd) => list_pipelines(cmd)?,
        Command::Worker(cmd) => run_worker(cmd).await?,
    }

    Ok(())
}

async fn run_pipeline(cmd: &RunCommand) -> Result<()> {
    let settings = Settings::from_env();
    let run_id = uuid::Uuid::new_v4().to_string();
    let started = chrono::Utc::now();

    println!("{}", format_launch(cmd.launch.pipeline, &run_id[..8]));
    println!("{} Input: {}", INFO, style(cmd.launch.input.display()).cyan());
    println!("{} Output: {}", INFO, style(cmd.launch.output.display()).cyan());
    println!("{} Started: {}", INFO, style(started.to_rfc3339()).dim());

    for (flag, value) in &cmd.launch.options {
        println!(
            "{} Option override: {} = {}",
            INFO,
            style(flag).cyan(),
            style(value).dim()
        );
    }

    check_bids_input(cmd).await?;

    let launch = build_launch(&cmd.launch, &settings)?;

    let mut runner = OctaveRunner::new(cmd.octave.clone(), cmd.timeout_secs);
    if cmd.launch.pipeline != PipelineKind::FmriPreprocessBids {
        runner = runner.with_no_gui();
    }

    let clock = std::time::Instant::now();
    let spinner = create_spinner(cmd.launch.pipeline.published_name());
    let result = launch.run(&runner, &settings).await;
    spinner.finish_and_clear();

    match result {
        Ok(()) => {
            println!(
                "\n{} {} completed {} in {}",
                CHECK,
                style(cmd.launch.pipeline.published_name()).bold(),
                style("successfully").green(),
                style(format_duration(clock.elapsed())).dim()
            );
            Ok(())
        }
        Err(e) => {
            println!(
                "\n{} {} {}",
                CROSS,
                style(cmd.launch.pipeline.published_name()).bold(),
                style("failed").red()
            );
            error!("{:#}", e);
            std::process::exit(1);
        }
    }
}

fn print_script(cmd: &ScriptCommand) -> Result<()> {
    let settings = Settings::from_env();
    let launch = build_launch(&cmd.launch, &settings)?;
    print!("{}", launch.script()?.render());
    Ok(())
}

async fn check_dataset(cmd: &ValidateCommand) -> Result<()> {
    let sniffed = match &cmd.input {
        Some(input) => Some((input, grabber::sniff(input)?)),
        None => None,
    };
    let tuning = match &cmd.config {
        Some(path) => Some(TuningConfig::from_file(path, cmd.subject_pad)?),
        None => None,
    };

    if cmd.json {
        let data = serde_json::json!({
            "input": cmd.input,
            "layout": sniffed.as_ref().map(|(_, layout)| layout.name()),
            "tuning_lines": tuning.as_ref().map(TuningConfig::lines),
        });
        println!("{}", serde_json::to_string_pretty(&data)?);
        return Ok(());
    }

    if let Some((input, layout)) = &sniffed {
        println!("{} Input layout: {}", CHECK, style(layout.name()).bold());
        if *layout == InputLayout::Bids {
            let flags = validator::ValidatorFlags {
                ignore_warnings: cmd.ignore_warnings,
                ignore_nifti_headers: cmd.ignore_nifti_headers,
            };
            validator::validate_dataset(input, flags).await?;
        }
    }

    if let Some(tuning) = &tuning {
        println!(
            "{} Tuning file is valid ({} lines)",
            CHECK,
            style(tuning.lines().len()).cyan()
        );
        for line in tuning.lines() {
            println!("  {}", style(line).dim());
        }
    }

    Ok(())
}

fn list_pipelines(cmd: &ListCommand) -> Result<()> {
    if cmd.json {
        let pipelines: Vec<_> = PipelineKind::all()
            .into_iter()
            .map(|kind| {
                serde_json::json!({
                    "kind": kind,
                    "name": kind.published_name(),
                    "function": kind.niak_function(),
                })
            })
            .collect();
        let data = serde_json::json!({ "pipelines": pipelines });
        println!("{}", serde_json::to_string_pretty(&data)?);
        return Ok(());
    }

    println!("{} Supported pipelines:", INFO);
    for kind in PipelineKind::all() {
        println!("  {}", format_pipeline_row(kind));
    }
    Ok(())
}

async fn run_worker(cmd: &WorkerCommand) -> Result<()> {
    println!(
        "{} Attaching worker {} to {}",
        SPINNER,
        style(cmd.worker_id).bold(),
        style(cmd.dir.display()).cyan()
    );

    let mut child = worker::attach_worker(&cmd.dir, cmd.worker_id, cmd.wait_secs).await?;
    let status = child.wait().await.context("waiting for psom_worker.py")?;
    if !status.success() {
        anyhow::bail!("worker exited with {}", status);
    }

    println!("{} Worker {} finished", CHECK, style(cmd.worker_id).bold());
    Ok(())
}

/// Run bids-validator over BIDS inputs before launching
async fn check_bids_input(cmd: &RunCommand) -> Result<()> {
    if cmd.skip_validation {
        println!("{} Skipping dataset validation", WARN);
        return Ok(());
    }

    // Unreadable inputs are reported when the launch is built
    if matches!(grabber::sniff(&cmd.launch.input), Ok(InputLayout::Bids)) {
        let flags = validator::ValidatorFlags {
            ignore_warnings: cmd.ignore_warnings,
            ignore_nifti_headers: cmd.ignore_nifti_headers,
        };
        validator::validate_dataset(&cmd.launch.input, flags).await?;
    }
    Ok(())
}

/// Assemble the launch a command line describes
fn build_launch(args: &LaunchArgs, settings: &Settings) -> Result<Launch> {
    let descriptor = load_descriptor(args)?;
    let table = descriptor.casting_table();

    let launch = match args.pipeline {
        PipelineKind::FmriPreprocess => {
            let mut pipeline = FmriPreprocess::new(
                &args.input,
                &args.output,
                &args.subjects,
                &args.func_hint,
                &args.anat_hint,
            );
            pipeline.apply_cli_options(&table, &args.options)?;
            Launch::FmriPreprocess(pipeline)
        }
        PipelineKind::FmriPreprocessBids => {
            let tuning = match &args.config {
                Some(path) => TuningConfig::from_file(path, args.subject_pad)?,
                None => TuningConfig::default(),
            };
            let params = PreprocessParams::from(&args.preprocess);
            let mut pipeline = FmriPreprocessBids::new(
                &args.input,
                &args.output,
                subjects::unroll(&args.subjects),
                tuning,
                &params,
                args.preprocess.group,
                settings,
            )?;
            pipeline.apply_cli_options(&table, &args.options)?;
            Launch::FmriPreprocessBids(pipeline)
        }
        PipelineKind::Basc => {
            let mut pipeline =
                Basc::new(&args.input, &args.output, &args.subjects, args.min_nb_vol);
            pipeline.apply_cli_options(&table, &args.options)?;
            Launch::Basc(pipeline)
        }
    };

    Ok(launch)
}

fn load_descriptor(args: &LaunchArgs) -> Result<BoutiqueDescriptor> {
    match &args.descriptor {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading descriptor {}", path.display()))?;
            Ok(BoutiqueDescriptor::from_json(&text)?)
        }
        None => Ok(args.pipeline.descriptor()?),
    }
}

fn format_duration(duration: std::time::Duration) -> String {
    let secs = duration.as_secs();
    if secs < 60 {
        format!("{}s", secs)
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
