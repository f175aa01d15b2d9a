use anyhow::{bail, Context};
use clap::Parser;
use serde_json::json;
use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use turing_compose::{
    visualizer::write_dot, ConfigLoader, Limits, MachineFactory, ProgramManager, Status,
    TuringMachine,
};

#[derive(Parser)]
#[command(author, version, about, long_about = None, arg_required_else_help = true)]
struct Cli {
    /// The machine configuration file to execute
    #[arg(short, long, conflicts_with = "builtin")]
    program: Option<PathBuf>,

    /// Run one of the embedded sample configurations instead of a file
    #[arg(short, long)]
    builtin: Option<String>,

    /// Replace the input tape of the configuration
    #[arg(short, long)]
    input: Option<String>,

    /// Write the final tape here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Stop every machine after this many transitions per run
    #[arg(long)]
    max_steps: Option<usize>,

    /// Stop a LOOP machine after this many passes
    #[arg(long)]
    max_passes: Option<usize>,

    /// Write a Graphviz rendering of the final tape to this file
    #[arg(long)]
    dot: Option<PathBuf>,

    /// Print a JSON summary of the run to stderr
    #[arg(short, long)]
    report: bool,

    /// List the embedded sample configurations and exit
    #[arg(short, long)]
    list: bool,

    /// Log each phase and step of the execution
    #[arg(short = 'd', long)]
    debug: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.debug { "trace" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(io::stderr)
        .init();

    if cli.list {
        list_programs()?;
        return Ok(());
    }

    let mut config = match (&cli.program, &cli.builtin) {
        (Some(path), _) => ConfigLoader::load_config(path)
            .with_context(|| format!("Failed to load {}", path.display()))?,
        (None, Some(name)) => ProgramManager::get_program_by_name(name)?,
        (None, None) => bail!("Either --program or --builtin is required"),
    };

    if let Some(input) = &cli.input {
        config.set_input(input);
    }

    let factory = MachineFactory::with_limits(Limits {
        max_steps: cli.max_steps,
        max_passes: cli.max_passes,
    });
    let mut machine = factory.build(config).context("Failed to build machine")?;
    debug!(kind = %machine.kind(), "Machine ready");

    let status = match &cli.output {
        Some(path) => {
            let mut file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            machine.run(&mut file)?
        }
        None => {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            let status = machine.run(&mut out)?;
            writeln!(out)?;
            status
        }
    };
    info!(?status, steps = machine.step_count(), "Run finished");

    if let Some(path) = &cli.dot {
        let mut file =
            File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
        write_dot(machine.tape(), &mut file)?;
    }

    if cli.report {
        eprintln!("{}", serde_json::to_string_pretty(&report(&machine, &status))?);
    }

    if let Some(error) = status.error() {
        bail!("Machine stopped: {error}");
    }

    Ok(())
}

fn list_programs() -> anyhow::Result<()> {
    for name in ProgramManager::list_program_names() {
        let info = ProgramManager::get_program_info(name)?;
        println!(
            "{:<18} {:<12} {} machines, {} transitions, input {:?}",
            info.name, info.kind, info.machine_count, info.transition_count, info.initial_tape
        );
    }

    Ok(())
}

fn report(machine: &TuringMachine, status: &Status) -> serde_json::Value {
    let output = machine.output();

    json!({
        "kind": machine.kind(),
        "halted": status.is_halted(),
        "error": status.error().map(|e| e.to_string()),
        "steps": machine.step_count(),
        "state": output.state(),
        "position": output.position(),
        "tape": output.tape().to_string(),
    })
}
