mod app;
mod event;

use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::terminal::{
    self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode,
    enable_raw_mode,
};
use crossterm::{execute, queue, style::Print};

use app::{App, Mode};
use event::{AppEvent, EventHandler};
use typequest::config::Config;
use typequest::engine::learn::{LearnDifficulty, LearnEngine};
use typequest::engine::rescue::RescueDifficulty;
use typequest::generator::packs::PackLibrary;
use typequest::session::free_play::FreePlaySession;
use typequest::session::rescue_run::RescueRun;
use typequest::store::json_store::JsonStore;

#[derive(Parser)]
#[command(name = "typequest", version, about = "Typing practice: free play, key drills and rescue mode")]
struct Cli {
    #[arg(short, long, help = "Config file (defaults to the user config dir)")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Type the texts of a pack and track lifetime stats
    Play {
        #[arg(short, long)]
        pack: Option<String>,
    },
    /// Two-minute reaction drill, one letter at a time
    Learn {
        #[arg(short, long, help = "beginner, intermediate or advanced")]
        difficulty: Option<LearnDifficulty>,
    },
    /// Keep the pressure meter down by finishing words
    Rescue {
        #[arg(short, long, help = "easy, medium or hard")]
        difficulty: Option<RescueDifficulty>,
    },
    /// Print lifetime free-play stats
    Stats,
    /// Print recent learn or rescue sessions
    History {
        #[arg(value_enum)]
        mode: HistoryMode,
        #[arg(short, long, default_value_t = 10)]
        limit: usize,
    },
    /// Clear lifetime free-play stats
    ResetStats,
}

#[derive(Clone, Copy, ValueEnum)]
enum HistoryMode {
    Learn,
    Rescue,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("typequest=warn")),
        )
        .init();

    let cli = Cli::parse();
    let library = PackLibrary::load();

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load().unwrap_or_else(|e| {
            tracing::warn!("using default config: {e:#}");
            Config::default()
        }),
    };
    config.validate(&library.ids());

    let store = JsonStore::new().context("failed to open the session archive")?;

    match cli.command {
        Command::Play { pack } => {
            let pack_id = pack.unwrap_or_else(|| config.pack.clone());
            let pack = library
                .find_or_first(&pack_id)
                .cloned()
                .context("no text packs available")?;
            run_interactive(Mode::Play(FreePlaySession::new(pack)), config, store)
        }
        Command::Learn { difficulty } => {
            let difficulty = difficulty.unwrap_or(config.learn_difficulty);
            run_interactive(Mode::Learn(LearnEngine::new(difficulty, 0)), config, store)
        }
        Command::Rescue { difficulty } => {
            let difficulty = difficulty.unwrap_or(config.rescue_difficulty);
            run_interactive(Mode::Rescue(RescueRun::new(difficulty)), config, store)
        }
        Command::Stats => {
            let stats = store.load_stats();
            println!("sessions:      {}", stats.sessions);
            println!("best wpm:      {}", stats.best_wpm);
            println!("average wpm:   {}", stats.average_wpm);
            println!("accuracy:      {}%", stats.accuracy);
            println!("characters:    {}", stats.total_characters);
            match stats.last_played {
                Some(at) => println!("last played:   {}", at.format("%Y-%m-%d %H:%M")),
                None => println!("last played:   never"),
            }
            Ok(())
        }
        Command::History { mode, limit } => {
            print_history(&store, mode, limit);
            Ok(())
        }
        Command::ResetStats => {
            store.reset_stats()?;
            println!("Stats cleared.");
            Ok(())
        }
    }
}

fn print_history(store: &JsonStore, mode: HistoryMode, limit: usize) {
    match mode {
        HistoryMode::Learn => {
            let history = store.load_learn_history();
            let summary = history.summary();
            println!("sessions:      {}", summary.sessions);
            println!("best accuracy: {}%", summary.best_accuracy);
            match summary.best_avg_reaction_ms {
                Some(ms) => println!("best reaction: {ms}ms"),
                None => println!("best reaction: -"),
            }
            match summary.last_session {
                Some(at) => println!("last session:  {}", at.format("%Y-%m-%d %H:%M")),
                None => println!("last session:  never"),
            }
            if !history.sessions.is_empty() {
                println!();
            }
            for s in history.sessions.iter().take(limit) {
                println!(
                    "{}  {:<12}  {:>3} correct  {:>3} misses  avg {:>4}ms  p90 {:>4}ms  hunt {:.2}",
                    s.created_at.format("%Y-%m-%d %H:%M"),
                    s.difficulty,
                    s.totals.correct_targets,
                    s.totals.wrong_key_presses,
                    s.totals.avg_reaction_ms,
                    s.totals.p90,
                    s.totals.hunt_rate
                );
            }
        }
        HistoryMode::Rescue => {
            for s in store.load_rescue_history().sessions.iter().take(limit) {
                println!(
                    "{}  {:<6}  {:<4}  {:>2}/{:<2} words  peak {:>3.0}  {:>3} wpm  {:>3}%",
                    s.created_at.format("%Y-%m-%d %H:%M"),
                    s.difficulty,
                    if s.is_win() { "won" } else { "lost" },
                    s.words_completed,
                    s.word_goal,
                    s.meter_peak,
                    s.wpm,
                    s.accuracy
                );
            }
        }
    }
}

fn run_interactive(mode: Mode, config: Config, store: JsonStore) -> Result<()> {
    let tick_rate = Duration::from_millis(config.tick_ms);
    let mut app = App::new(mode, config, Some(store));

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, Hide)?;

    let events = EventHandler::new(tick_rate);
    let result = run_app(&mut stdout, &mut app, &events);

    execute!(stdout, Show, LeaveAlternateScreen)?;
    disable_raw_mode()?;

    if let Err(err) = result {
        eprintln!("Error: {err:?}");
    }
    Ok(())
}

fn run_app(out: &mut impl Write, app: &mut App, events: &EventHandler) -> Result<()> {
    loop {
        render(out, app)?;
        match events.next()? {
            AppEvent::Key(key) => app.handle_key(key),
            AppEvent::Tick => app.on_tick(),
        }
        if app.should_quit {
            return Ok(());
        }
    }
}

fn render(out: &mut impl Write, app: &App) -> Result<()> {
    let (width, _) = terminal::size().unwrap_or((80, 24));
    queue!(out, Clear(ClearType::All))?;
    for (row, line) in app.status_lines().iter().enumerate() {
        let visible: String = line.chars().take(width as usize).collect();
        queue!(out, MoveTo(1, row as u16 + 1), Print(visible))?;
    }
    out.flush()?;
    Ok(())
}
