use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use quiz_core::model::{CategoryKey, Leaderboard};
use services::{
    AnswerFeedback, AnswerOutcome, Clock, LeaderboardService, QuestionView, QuizLoopService,
    QuizSession, SessionResults, TimeLeft,
};
use storage::repository::Storage;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- play  [options]");
    eprintln!("  cargo run -p app -- board [options]   # show a leaderboard");
    eprintln!("  cargo run -p app -- categories        # list bank categories");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --bank <path>       question bank JSON (default questions.json)");
    eprintln!("  --db <sqlite_url>   leaderboard store (default sqlite:quiz.sqlite3)");
    eprintln!("  --category <name>   play/show only this category");
    eprintln!("  --training          untimed session, no countdown");
    eprintln!("  --name <player>     skip the name prompt");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  QUIZ_DB_URL, QUIZ_BANK_PATH");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Play,
    Board,
    Categories,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "play" => Some(Self::Play),
            "board" => Some(Self::Board),
            "categories" => Some(Self::Categories),
            _ => None,
        }
    }
}

struct Args {
    db_url: String,
    bank_path: PathBuf,
    category: Option<String>,
    training: bool,
    name: Option<String>,
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut db_url = std::env::var("QUIZ_DB_URL")
            .ok()
            .map_or_else(|| "sqlite://quiz.sqlite3".into(), normalize_sqlite_url);
        let mut bank_path = std::env::var("QUIZ_BANK_PATH")
            .ok()
            .map_or_else(|| PathBuf::from("questions.json"), PathBuf::from);
        let mut category = None;
        let mut training = false;
        let mut name = None;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--bank" => {
                    bank_path = PathBuf::from(require_value(args, "--bank")?);
                }
                "--category" => {
                    category = Some(require_value(args, "--category")?);
                }
                "--training" => {
                    training = true;
                }
                "--name" => {
                    name = Some(require_value(args, "--name")?);
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            db_url,
            bank_path,
            category,
            training,
            name,
        })
    }
}

fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| std::path::PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv: Vec<String> = std::env::args().skip(1).collect();

    // Default behavior: play when no subcommand is provided.
    let cmd = match argv.first().map(String::as_str) {
        None => Command::Play,
        Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) if first.starts_with("--") => Command::Play,
        Some(first) => Command::from_arg(first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };

    if !argv.is_empty() && !argv[0].starts_with("--") {
        argv.remove(0);
    }

    let mut iter = argv.into_iter();
    let args = Args::parse(&mut iter).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    // A bank that cannot be loaded is terminal: no session can start.
    let bank = match storage::load_bank(&args.bank_path) {
        Ok(bank) => Arc::new(bank),
        Err(err) => {
            eprintln!(
                "Could not load questions from {}: {err}",
                args.bank_path.display()
            );
            return Err(err.into());
        }
    };

    if cmd == Command::Categories {
        for name in bank.categories() {
            println!("{name}");
        }
        return Ok(());
    }

    // Open + migrate SQLite at startup. Keep this in the binary glue so
    // core/services stay pure.
    prepare_sqlite_file(&args.db_url)?;
    let store = Storage::sqlite(&args.db_url).await?;
    let clock = Clock::system();

    match cmd {
        Command::Play => {
            let quiz = QuizLoopService::new(
                clock,
                bank,
                Arc::clone(&store.leaderboards),
                Arc::clone(&store.players),
            );
            play(&quiz, &args).await
        }
        Command::Board => {
            let boards = LeaderboardService::new(clock, Arc::clone(&store.leaderboards));
            let key = args
                .category
                .as_deref()
                .map_or(CategoryKey::AllCategories, CategoryKey::named);
            let board = boards.board(&key).await?;
            print_board(&key, &board);
            Ok(())
        }
        Command::Categories => unreachable!("handled before storage setup"),
    }
}

enum SessionEnd {
    Completed,
    Abandoned,
}

enum PlayerInput {
    Answer(String),
    Skip,
    Quit,
    TimedOut,
}

async fn play(quiz: &QuizLoopService, args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let mut input = BufReader::new(tokio::io::stdin()).lines();

    match &args.name {
        Some(name) => {
            quiz.set_player_name(name).await?;
        }
        None => {
            let stored = quiz.player_name().await?;
            print!("Player name [{stored}]: ");
            flush_stdout();
            if let Some(line) = input.next_line().await? {
                if !line.trim().is_empty() {
                    quiz.set_player_name(&line).await?;
                }
            }
        }
    }

    loop {
        let mut session = quiz
            .start_session(args.category.as_deref(), args.training)
            .await?;

        match run_session(quiz, &mut session, &mut input).await? {
            SessionEnd::Completed => {
                let results = quiz.finalize(&mut session).await?;
                print_results(&results);
            }
            SessionEnd::Abandoned => {
                quiz.abandon(session);
                return Ok(());
            }
        }

        print!("Play again? [y/N] ");
        flush_stdout();
        let again = input.next_line().await?;
        if !matches!(again.as_deref().map(str::trim), Some("y" | "Y" | "yes")) {
            return Ok(());
        }
    }
}

async fn run_session(
    quiz: &QuizLoopService,
    session: &mut QuizSession,
    input: &mut Lines<BufReader<Stdin>>,
) -> Result<SessionEnd, Box<dyn std::error::Error>> {
    while !session.is_complete() {
        let Some(view) = QuestionView::from_session(session, quiz.now()) else {
            break;
        };
        print_question(&view);

        let timeout = session
            .deadline()
            .map(|deadline| (deadline - quiz.now()).to_std().unwrap_or_default());

        let feedback = match read_player_input(input, timeout).await? {
            PlayerInput::Quit => return Ok(SessionEnd::Abandoned),
            PlayerInput::Skip => {
                println!("Skipped.");
                quiz.skip_current(session).await?;
                continue;
            }
            PlayerInput::TimedOut => session.expire_current()?,
            PlayerInput::Answer(raw) => {
                let answer = resolve_option(&view, &raw);
                session.submit_answer(&answer)?
            }
        };

        print_feedback(&feedback);
        tokio::time::sleep(feedback.outcome.advance_delay()).await;
        quiz.advance(session).await?;
    }

    Ok(SessionEnd::Completed)
}

/// Numeric input selects the numbered option; anything else is taken as a
/// literal answer.
fn resolve_option(view: &QuestionView, raw: &str) -> String {
    let trimmed = raw.trim();
    if let Ok(n) = trimmed.parse::<usize>() {
        if (1..=view.options.len()).contains(&n) {
            return view.options[n - 1].clone();
        }
    }
    trimmed.to_owned()
}

async fn read_player_input(
    input: &mut Lines<BufReader<Stdin>>,
    timeout: Option<std::time::Duration>,
) -> Result<PlayerInput, std::io::Error> {
    let line = match timeout {
        Some(timeout) => match tokio::time::timeout(timeout, input.next_line()).await {
            Ok(line) => line?,
            Err(_elapsed) => return Ok(PlayerInput::TimedOut),
        },
        None => input.next_line().await?,
    };

    let Some(line) = line else {
        // EOF on stdin ends the session like an explicit quit.
        return Ok(PlayerInput::Quit);
    };

    Ok(match line.trim() {
        "q" | "quit" => PlayerInput::Quit,
        "s" | "skip" => PlayerInput::Skip,
        other => PlayerInput::Answer(other.to_owned()),
    })
}

fn print_question(view: &QuestionView) {
    println!();
    println!("[{}] Question {}/{}", view.category, view.number, view.total);
    println!("{}", view.text);
    for (i, option) in view.options.iter().enumerate() {
        println!("  {}. {option}", i + 1);
    }
    match view.time_left {
        TimeLeft::Untimed => println!("(training mode, no timer; s to skip, q to quit)"),
        TimeLeft::Seconds(secs) => {
            println!("({secs} seconds remaining; s to skip, q to quit)");
        }
    }
    print!("> ");
    flush_stdout();
}

fn print_feedback(feedback: &AnswerFeedback) {
    match feedback.outcome {
        AnswerOutcome::Correct => println!("Correct! Score: {}", feedback.score),
        AnswerOutcome::Incorrect => {
            println!("Wrong! The answer was: {}", feedback.correct_answer);
        }
        AnswerOutcome::TimedOut => {
            println!("Time's up! The answer was: {}", feedback.correct_answer);
        }
    }
}

fn print_results(results: &SessionResults) {
    println!();
    println!("{}, here are your results:", results.player);
    println!("  {}/{} ({}%)", results.score, results.total, results.percent);
    println!("  {}", results.tier.message());
    println!("  Badge: {}", results.tier.badge());
    print_board(&results.category, &results.leaderboard);
}

fn print_board(key: &CategoryKey, board: &Leaderboard) {
    println!();
    println!("Top 10: {key}");
    if board.is_empty() {
        println!("  no scores recorded yet");
        return;
    }
    for (rank, entry) in board.entries().iter().enumerate() {
        println!(
            "  {:>2}. {}  {}/{} ({}%)",
            rank + 1,
            entry.name,
            entry.score,
            entry.total,
            entry.percent
        );
    }
}

fn flush_stdout() {
    use std::io::Write;
    let _ = std::io::stdout().flush();
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("services=info".parse().expect("static directive"))
                .add_directive("storage=info".parse().expect("static directive")),
        )
        .init();

    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}
