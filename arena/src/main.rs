use anyhow::{bail, Context, Result};
use chess_arena::{
    ArenaConfig, CancelToken, Cli, Command, JsonLinesSink, LogSink, PerftArgs, PlayArgs,
    PromptBuilder, Scheduler,
};
use chess_core::{perft, perft_divide, Game, REFERENCE_CASES};
use clap::Parser;
use std::fs::File;
use std::io::BufWriter;
use std::time::Instant;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Some(Command::Perft(args)) => run_perft(args),
        Some(Command::Play(args)) => play(args),
        None => play(cli.play),
    }
}

fn play(args: PlayArgs) -> Result<()> {
    let config = ArenaConfig::from_args(args).context("invalid configuration")?;

    let game = match &config.start_fen {
        Some(fen) => Game::from_fen(fen).with_context(|| format!("bad start position {fen:?}"))?,
        None => Game::new(),
    }
    .with_rules(config.draw_rules);

    let white = config.white.build(&config.provider).context("white agent")?;
    let black = config.black.build(&config.provider).context("black agent")?;

    let cancel = CancelToken::new();
    let on_interrupt = cancel.clone();
    ctrlc::set_handler(move || on_interrupt.cancel()).context("installing Ctrl-C handler")?;

    let prompts = match config.seed {
        Some(seed) => PromptBuilder::seeded(seed),
        None => PromptBuilder::from_entropy(),
    };

    let mut scheduler = Scheduler::new(game, white, black, config.budget)
        .with_prompts(prompts)
        .with_cancel(cancel)
        .with_sink(Box::new(LogSink));

    if let Some(path) = &config.events {
        let file = File::create(path)
            .with_context(|| format!("creating event log {}", path.display()))?;
        scheduler = scheduler.with_sink(Box::new(JsonLinesSink::new(BufWriter::new(file))));
    }

    let report = scheduler.run();
    if config.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{report}");
    }

    Ok(())
}

fn run_perft(args: PerftArgs) -> Result<()> {
    if args.depth == 0 {
        bail!("perft depth must be at least 1");
    }

    let game = match &args.fen {
        Some(fen) => Game::from_fen(fen).with_context(|| format!("bad position {fen:?}"))?,
        None => Game::new(),
    };
    let state = game.state();
    let fen = game.serialize_position();

    println!("Running perft({})...", args.depth);
    println!("Position: {fen}");

    let start = Instant::now();
    let nodes = if args.divide {
        let results = perft_divide(state, args.depth);
        for (mv, count) in &results {
            println!("{mv}: {count}");
        }
        println!();
        results.iter().map(|(_, count)| count).sum()
    } else {
        perft(state, args.depth)
    };
    let elapsed = start.elapsed();

    println!("Nodes: {nodes}");
    println!("Time: {:.2}s", elapsed.as_secs_f64());
    if elapsed.as_secs_f64() > 0.0 {
        println!("NPS: {:.0}", nodes as f64 / elapsed.as_secs_f64());
    }

    let reference = REFERENCE_CASES
        .iter()
        .find(|case| Game::from_fen(case.fen).is_ok_and(|g| g.serialize_position() == fen));
    if let Some(expected) = reference.and_then(|case| case.expected(args.depth)) {
        let verdict = if expected == nodes { "ok" } else { "MISMATCH" };
        info!(expected, nodes, "reference count");
        println!("Expected: {expected} ({verdict})");
        if expected != nodes {
            bail!("perft mismatch: expected {expected}, got {nodes}");
        }
    }

    Ok(())
}
