mod interactive;
mod render;
mod reports;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use colored::Colorize;
use std::fs::File;
use std::io::{self, BufWriter, Write, stdout};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use fortune_game::{
    BatchReport, CatalogData, PlaythroughSession, RewardCatalog, RuleStrategy, StepEvent,
    StepOutcome, Strategy, builtin_strategies, builtin_strategy, entropy_seed, playthrough_seed,
    rng_from_seed, run_batch, verify_sampler,
};

use interactive::{InteractiveGame, prompt_wish};
use render::{board_view, collected_table};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RunAction {
    /// Play the event by hand
    Interactive,
    /// Compare strategies over many automated playthroughs
    Simulation,
    /// Check sampler frequencies against a pool's weights
    Verify,
}

#[derive(Debug, Parser)]
#[command(name = "fortune-sim", version = "0.1.0")]
#[command(about = "Play or simulate the Fortune Hut reward event")]
struct Args {
    /// Catalog JSON file (defaults to the bundled Fortune Hut catalog)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Initial number of tokens
    #[arg(short, long, default_value_t = 100)]
    tokens: u32,

    /// What to do: interactive play, strategy simulation, or sampler verification
    #[arg(short, long, value_enum, default_value_t = RunAction::Simulation)]
    action: RunAction,

    /// Strategy numbers to simulate (space or comma separated, defaults to all)
    #[arg(short, long, num_args = 1..)]
    simulation: Vec<String>,

    /// Playthroughs per strategy
    #[arg(short, long, default_value_t = 1000)]
    rounds: usize,

    /// Wish reward name; prompts for a choice when omitted
    #[arg(short, long)]
    wish: Option<String>,

    /// Seed for reproducible runs; drawn from OS entropy when omitted
    #[arg(long)]
    seed: Option<u64>,

    /// Output report format
    #[arg(long, default_value = "console")]
    #[arg(value_parser = ["json", "markdown", "console"])]
    report: String,

    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,

    /// Prize pool sampled by the verify action
    #[arg(long, default_value = "Main Pool")]
    pool: String,

    /// Number of draws for the verify action
    #[arg(long, default_value_t = 1_000_000)]
    draws: u64,

    /// Pause between steps of verbose playback, in milliseconds
    #[arg(long, default_value_t = 0)]
    delay_ms: u64,

    /// Replay the first playthrough of each strategy step by step
    #[arg(short, long)]
    verbose: bool,

    /// List the built-in strategies and exit
    #[arg(long)]
    list_strategies: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if maybe_list_strategies(&args)? {
        return Ok(());
    }

    let data = load_catalog(args.config.as_deref())?;
    match args.action {
        RunAction::Interactive => run_interactive(&args, &data),
        RunAction::Simulation => run_simulation(&args, &data),
        RunAction::Verify => run_verify(&args, &data),
    }
}

fn maybe_list_strategies(args: &Args) -> Result<bool> {
    if !args.list_strategies {
        return Ok(false);
    }
    let mut output_target = OutputTarget::new(args.output.clone())?;
    writeln!(output_target.writer(), "Available strategies:")?;
    for strategy in builtin_strategies() {
        writeln!(
            output_target.writer(),
            "  {:>2} - {}",
            strategy.id(),
            strategy.name()
        )?;
    }
    output_target.flush_inner()?;
    Ok(true)
}

fn announce_banner() {
    println!("{}", "🏮 Fortune Hut Simulator".bright_cyan().bold());
    println!("{}", "========================".cyan());
}

fn is_console(args: &Args) -> bool {
    args.report == "console"
}

fn load_catalog(path: Option<&Path>) -> Result<CatalogData> {
    match path {
        Some(path) => CatalogData::from_path(path)
            .with_context(|| format!("failed to load catalog {}", path.display())),
        None => CatalogData::bundled().context("bundled catalog is invalid"),
    }
}

fn split_csv(s: &str) -> Vec<String> {
    s.split(',')
        .map(|x| x.trim().to_string())
        .filter(|x| !x.is_empty())
        .collect()
}

fn select_strategies(requested: &[String]) -> Result<Vec<RuleStrategy>> {
    let ids: Vec<String> = requested.iter().flat_map(|s| split_csv(s)).collect();
    if ids.is_empty() || ids.iter().any(|id| id.eq_ignore_ascii_case("all")) {
        return Ok(builtin_strategies());
    }
    ids.iter()
        .map(|id| {
            builtin_strategy(id)
                .with_context(|| format!("unknown strategy '{id}' (see --list-strategies)"))
        })
        .collect()
}

fn resolve_wish(args: &Args, data: &CatalogData) -> Result<String> {
    if let Some(wish) = &args.wish {
        return Ok(wish.clone());
    }
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut out = stdout().lock();
    prompt_wish(&mut input, &mut out, &data.wish_rewards)
}

fn resolve_target(args: &Args, data: &CatalogData) -> Result<RewardCatalog> {
    let wish = resolve_wish(args, data)?;
    data.resolve(&wish)
        .with_context(|| format!("cannot play for wish reward '{wish}'"))
}

fn resolve_seed(args: &Args) -> u64 {
    let seed = args.seed.unwrap_or_else(entropy_seed);
    log::info!("using seed {seed}");
    seed
}

fn run_interactive(args: &Args, data: &CatalogData) -> Result<()> {
    announce_banner();
    let catalog = resolve_target(args, data)?;
    let seed = resolve_seed(args);
    println!("🎲 Seed: {seed}");

    let mut game = InteractiveGame::new(data, &catalog, args.tokens, rng_from_seed(seed))?;
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut out = stdout().lock();
    game.run(&mut input, &mut out)?;

    writeln!(out, "{}", "Final haul".bold())?;
    write!(out, "{}", collected_table(game.state().collected()))?;
    writeln!(out, "Tokens left: {}", game.state().budget().tokens())?;
    writeln!(out, "Actions taken: {}", game.history().len())?;
    Ok(())
}

fn run_simulation(args: &Args, data: &CatalogData) -> Result<()> {
    let strategies = select_strategies(&args.simulation)?;
    if is_console(args) {
        announce_banner();
    }
    let catalog = resolve_target(args, data)?;
    let seed = resolve_seed(args);
    if is_console(args) {
        println!("🎲 Seed: {seed}");
    }

    if args.verbose {
        for strategy in &strategies {
            play_verbose(args, data, &catalog, strategy, seed)?;
        }
    }

    let start_time = Instant::now();
    let strategy_refs: Vec<&dyn Strategy> =
        strategies.iter().map(|s| s as &dyn Strategy).collect();
    let report = run_batch(&catalog, args.tokens, &strategy_refs, args.rounds, seed)?;
    write_reports(args, &report, start_time)
}

fn describe_step(step: &StepOutcome) -> String {
    match &step.event {
        StepEvent::Revealed(outcome) => format!(
            "Step {}: revealed {} for {} tokens ({} left)",
            step.step,
            outcome.reward.key(),
            outcome.cost,
            step.tokens_left
        ),
        StepEvent::Refreshed { cost } => format!(
            "Step {}: refreshed the round for {cost} tokens ({} left)",
            step.step, step.tokens_left
        ),
        StepEvent::Stopped(reason) => format!("Step {}: stopped, {}", step.step, reason.label()),
    }
}

fn play_verbose(
    args: &Args,
    data: &CatalogData,
    catalog: &RewardCatalog,
    strategy: &RuleStrategy,
    seed: u64,
) -> Result<()> {
    let stream = playthrough_seed(seed, strategy.id(), 0);
    let mut session =
        PlaythroughSession::new(catalog, args.tokens, strategy, rng_from_seed(stream))?;
    let mut out = stdout().lock();
    writeln!(
        out,
        "{}",
        format!("▶ Simulation {}: {}", strategy.id(), strategy.name())
            .bright_yellow()
            .bold()
    )?;
    while !session.is_finished() {
        write!(out, "{}", board_view(data, session.state()))?;
        let step = session.advance();
        writeln!(out, "{}", describe_step(&step))?;
        out.flush()?;
        if args.delay_ms > 0 && !step.finished {
            thread::sleep(Duration::from_millis(args.delay_ms));
        }
    }
    Ok(())
}

fn run_verify(args: &Args, data: &CatalogData) -> Result<()> {
    let pool = data
        .pool(&args.pool)
        .with_context(|| format!("no prize pool named '{}'", args.pool))?;
    let seed = resolve_seed(args);
    let mut rng = rng_from_seed(seed);
    let rows = verify_sampler(&pool.items, args.draws, &mut rng)
        .with_context(|| format!("cannot sample pool '{}'", pool.name))?;

    let mut output_target = OutputTarget::new(args.output.clone())?;
    match args.report.as_str() {
        "json" => reports::generate_json_report(&mut output_target, &rows)?,
        "markdown" => reports::generate_verify_markdown_report(
            &mut output_target,
            &pool.name,
            args.draws,
            &rows,
        )?,
        _ => reports::generate_verify_console_report(
            &mut output_target,
            &pool.name,
            args.draws,
            &rows,
        )?,
    }
    output_target.flush_inner()?;
    Ok(())
}

fn write_reports(args: &Args, report: &BatchReport, start_time: Instant) -> Result<()> {
    let mut output_target = OutputTarget::new(args.output.clone())?;
    match args.report.as_str() {
        "json" => reports::generate_json_report(&mut output_target, report)?,
        "markdown" => reports::generate_markdown_report(&mut output_target, report)?,
        _ => {
            reports::generate_console_report(&mut output_target, report)?;
            let duration = start_time.elapsed();
            writeln!(&mut output_target)?;
            writeln!(&mut output_target, "🏁 Total time: {duration:?}")?;
        }
    }
    output_target.flush_inner()?;
    Ok(())
}

enum OutputTarget {
    Stdout(BufWriter<std::io::Stdout>),
    File(BufWriter<File>),
}

impl OutputTarget {
    fn new(path: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = path {
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Self::File(BufWriter::new(file)))
        } else {
            Ok(Self::Stdout(BufWriter::new(stdout())))
        }
    }

    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Self::Stdout(w) => w,
            Self::File(w) => w,
        }
    }

    fn flush_inner(&mut self) -> std::io::Result<()> {
        match self {
            Self::Stdout(w) => w.flush(),
            Self::File(w) => w.flush(),
        }
    }
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.writer().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_inner()
    }
}
