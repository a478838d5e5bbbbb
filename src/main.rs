use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use mirrorpick::runner::Runner;
use mirrorpick::sources::{self, MirrorSource};
use mirrorpick::{config, probe, rank, types};

#[derive(Parser)]
#[command(name = "mirrorpick")]
#[command(about = "Find the fastest package mirror by probing real download throughput", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Probe and rank mirrors (e.g., mirrorpick rank debian)
    Rank {
        /// Distribution family (debian, ubuntu, arch, fedora)
        family: String,

        /// How many top mirrors to keep
        #[arg(long, short)]
        top: Option<usize>,

        /// Parallel probe workers
        #[arg(long, short)]
        workers: Option<usize>,

        /// Skip fetching the remote mirror catalog, use the built-in list
        #[arg(long)]
        offline: bool,

        /// Print the ranking as JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Show the merged candidate catalog without probing
    List {
        /// Distribution family
        family: String,

        /// Skip fetching the remote mirror catalog
        #[arg(long)]
        offline: bool,
    },
    /// List supported distribution families
    Families,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Rank {
            family,
            top,
            workers,
            offline,
            json,
        } => handle_rank(&family, top, workers, offline, json).await?,
        Commands::List { family, offline } => handle_list(&family, offline).await?,
        Commands::Families => {
            for family in sources::SUPPORTED_FAMILIES {
                println!("{}", family);
            }
        }
    }

    Ok(())
}

// --- Handlers ---

async fn handle_rank(
    family: &str,
    top: Option<usize>,
    workers: Option<usize>,
    offline: bool,
    json: bool,
) -> Result<()> {
    let source = sources::get_source(family)?;

    let Some(table) = config::family_table(family) else {
        bail!("No mirror table for '{}'. Check your mirrors.json override.", family);
    };
    if table.sample_files.is_empty() {
        bail!("No sample files configured for '{}'.", family);
    }

    let mut options = config::Settings::load().run_options();
    if let Some(top) = top {
        options.top_n = top;
    }
    if let Some(workers) = workers {
        options.workers = workers;
    }
    options.quiet = json;

    let client = probe::build_client(options.timeout)?;
    let catalog = sources::build_catalog(source.as_ref(), &client, offline).await;

    if catalog.is_empty() {
        bail!("No mirror candidates for '{}'.", family);
    }
    if !json {
        println!("Probing {} candidate mirrors...", catalog.len());
    }

    let runner = Runner::new(options);

    // Ctrl-C sets the session flag; in-flight probes notice it at their
    // next checkpoint and the run winds down with partial results.
    let session = runner.session();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\nInterrupted, finishing up with partial results...");
            session.cancel();
        }
    });

    let survivors = runner.run(catalog, &table.sample_files).await?;
    let mut ranked = rank::rank(survivors);
    for result in &mut ranked {
        result.secondary_urls = source.secondary_urls(&result.url);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&ranked)?);
        return Ok(());
    }

    if ranked.is_empty() {
        if runner.session().is_cancelled() {
            bail!("Interrupted before any mirror finished probing.");
        }
        bail!("No mirror completed a single sample. Check your network connection.");
    }

    print_ranking(&ranked, source.as_ref());
    Ok(())
}

fn print_ranking(ranked: &[types::MirrorResult], source: &dyn MirrorSource) {
    println!();
    println!(
        "{:<4} {:>12} {:>8} {:>6}  {:<16} URL",
        "RANK", "SPEED(KB/s)", "TIME(s)", "OK%", "COUNTRY"
    );
    println!("{}", "-".repeat(90));

    for (i, result) in ranked.iter().enumerate() {
        let country: String = result.country.chars().take(16).collect();
        println!(
            "{:<4} {:>12.1} {:>8.2} {:>5.0}%  {:<16} {}",
            i + 1,
            result.avg_speed,
            result.response_time,
            result.success_rate * 100.0,
            country,
            result.url
        );
    }

    println!("{}", "-".repeat(90));
    if let Some(best) = ranked.first() {
        println!(
            "Fastest usable mirror for {}: {} ({:.1} KB/s, score {:.1})",
            source.name(),
            best.url,
            best.avg_speed,
            best.score
        );
        for secondary in &best.secondary_urls {
            println!("  {} archive: {}", secondary.label, secondary.url);
        }
    }
}

async fn handle_list(family: &str, offline: bool) -> Result<()> {
    let source = sources::get_source(family)?;

    let client = probe::build_client(std::time::Duration::from_secs(
        probe::DEFAULT_TIMEOUT_SECS,
    ))?;
    let catalog = sources::build_catalog(source.as_ref(), &client, offline).await;

    println!("{:<20} URL", "COUNTRY");
    println!("{}", "-".repeat(70));
    for candidate in catalog.candidates() {
        let country = if candidate.country.is_empty() {
            "-"
        } else {
            &candidate.country
        };
        println!("{:<20} {}", country, candidate.url);
    }
    println!("{}", "-".repeat(70));
    println!("{} candidates ({} family)", catalog.len(), source.name());

    Ok(())
}
