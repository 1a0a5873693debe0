//! Rhizome CLI — render the import graph of a Python project.

use std::path::PathBuf;
use std::time::Instant;

use clap::{Parser, Subcommand};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use rhizome_core::config::GraphConfig;
use rhizome_core::output::{build_dot, write_json};
use rhizome_core::pipeline;

#[derive(Parser)]
#[command(
    name = "rhizome",
    about = "Rhizome - Map the import structure of a Python project"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyse a Python project and emit a Graphviz DOT graph
    Graph {
        /// Path to the project root
        path: PathBuf,

        /// Name given to the graph and the default output file
        #[arg(short, long, default_value = "rhizome_graph")]
        name: String,

        /// Output DOT file path (defaults to <name>.dot)
        #[arg(short, long)]
        output: Option<String>,

        /// Also write the graph description as JSON next to the DOT file
        #[arg(long)]
        json: bool,

        /// Hide leaf modules that are never imported or import nothing
        #[arg(long)]
        prune: bool,

        /// With --prune, also hide the dead-end fixed point
        #[arg(long)]
        hide_dead_ends: bool,

        /// Show only the module structure, without import edges
        #[arg(long)]
        no_imports: bool,

        /// Hide third-party modules
        #[arg(long)]
        no_3rdparty: bool,

        /// Show standard-library modules
        #[arg(long)]
        show_builtin: bool,

        /// Keep full external module paths instead of collapsing to roots
        #[arg(long)]
        no_summarize_external: bool,

        /// Disable cluster grouping entirely
        #[arg(long)]
        no_clusters: bool,

        /// Only top-level packages become clusters
        #[arg(long)]
        flat_clusters: bool,

        /// Minimum number of submodules for a package to become a cluster
        #[arg(long, default_value = "2")]
        min_cluster_size: usize,

        /// Gitignore-style patterns for files to skip
        #[arg(long)]
        ignore: Vec<String>,

        /// Module routes to hide from the graph
        #[arg(long)]
        hide: Vec<String>,

        /// Write the DOT file even when its content is unchanged
        #[arg(long)]
        force: bool,

        /// Show per-phase timing breakdown
        #[arg(long)]
        verbose: bool,

        /// Suppress all output except errors
        #[arg(long)]
        quiet: bool,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Graph {
            path,
            name,
            output,
            json,
            prune,
            hide_dead_ends,
            no_imports,
            no_3rdparty,
            show_builtin,
            no_summarize_external,
            no_clusters,
            flat_clusters,
            min_cluster_size,
            ignore,
            hide,
            force,
            verbose,
            quiet,
        } => {
            let project_root = path.canonicalize().unwrap_or(path);
            let output_path = output.unwrap_or_else(|| format!("{name}.dot"));

            let config = GraphConfig {
                project_root: project_root.to_string_lossy().to_string(),
                name,
                prune,
                hide_dead_ends,
                render_imports: !no_imports,
                show_3rdparty: !no_3rdparty,
                show_builtin,
                summarize_external: !no_summarize_external,
                use_clusters: !no_clusters,
                use_nested_clusters: !flat_clusters,
                min_cluster_size,
                ignore,
                hide,
            };

            if quiet {
                run_quiet(&config, &output_path, json, force);
            } else {
                run_with_progress(&config, &output_path, json, force, verbose);
            }
        }
    }
}

fn run_quiet(config: &GraphConfig, output_path: &str, json: bool, force: bool) {
    match pipeline::run_pipeline(config, None) {
        Ok(desc) => {
            if let Err(e) = write_outputs(&desc, output_path, json, force) {
                eprintln!("Error writing output: {e}");
                std::process::exit(1);
            }
        }
        Err(e) => {
            eprintln!("Analysis failed: {e}");
            std::process::exit(1);
        }
    }
}

fn run_with_progress(
    config: &GraphConfig,
    output_path: &str,
    json: bool,
    force: bool,
    verbose: bool,
) {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.green} {msg}")
            .unwrap()
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
    );
    pb.set_message("Initialising...");
    pb.enable_steady_tick(std::time::Duration::from_millis(80));

    let progress: pipeline::ProgressCallback = {
        let pb = pb.clone();
        Box::new(move |_name, label| {
            pb.set_message(label.to_string());
        })
    };

    let start = Instant::now();
    let desc = match pipeline::run_pipeline(config, Some(progress)) {
        Ok(d) => d,
        Err(e) => {
            pb.finish_and_clear();
            eprintln!("Analysis failed: {e}");
            std::process::exit(1);
        }
    };
    pb.finish_and_clear();

    println!(
        "\n{}  Rhizome: {}",
        style("✓").green().bold(),
        style(
            std::path::Path::new(&config.project_root)
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default()
        )
        .bold()
    );
    for (label, key) in [
        ("Project:", "project_modules"),
        ("Builtin:", "builtin_modules"),
        ("3rd party:", "3rdparty_modules"),
        ("Nodes:", "visible_nodes"),
        ("Edges:", "import_edges"),
        ("Clusters:", "clusters"),
    ] {
        println!(
            "  {:<14} {}",
            label,
            desc.stats.get(key).unwrap_or(&serde_json::json!(0))
        );
    }

    let duration = start.elapsed();
    println!(
        "  {:<14} {:.1}ms",
        "Duration:",
        duration.as_secs_f64() * 1000.0
    );

    if !desc.diagnostics.is_empty() {
        println!(
            "\n  {} {} diagnostic(s):",
            style("!").yellow().bold(),
            desc.diagnostics.len()
        );
        for diag in &desc.diagnostics {
            println!("    {diag}");
        }
    }

    if verbose {
        if let Some(serde_json::Value::Object(timings)) = desc.metadata.get("phase_timings") {
            println!("\n  Phase Timings:");
            for (phase, secs) in timings {
                if let Some(val) = secs.as_f64() {
                    println!("    {:<14} {:.1}ms", phase, val * 1000.0);
                }
            }
        }
    }

    match write_outputs(&desc, output_path, json, force) {
        Ok(written) => {
            if written {
                println!("\n  {} {}", style("Output written to:").green(), output_path);
            } else {
                println!(
                    "\n  {} {}",
                    style("Output unchanged, skipped:").green(),
                    output_path
                );
            }
        }
        Err(e) => {
            eprintln!("Error writing output: {e}");
            std::process::exit(1);
        }
    }
}

/// Write the DOT file (skipping when unchanged, unless forced) and the JSON
/// description when requested. Returns whether the DOT file was written.
fn write_outputs(
    desc: &rhizome_core::config::GraphDescription,
    output_path: &str,
    json: bool,
    force: bool,
) -> std::io::Result<bool> {
    let dot = build_dot(desc);

    let unchanged = !force
        && std::fs::read_to_string(output_path)
            .map(|prev| prev == dot)
            .unwrap_or(false);

    let written = if unchanged {
        log::debug!("dot string has not changed, skipping render");
        false
    } else {
        if let Some(parent) = std::path::Path::new(output_path).parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(output_path, &dot)?;
        true
    };

    if json {
        let json_path = if let Some(stripped) = output_path.strip_suffix(".dot") {
            format!("{stripped}.json")
        } else {
            format!("{output_path}.json")
        };
        write_json(desc, &json_path)?;
    }

    Ok(written)
}
