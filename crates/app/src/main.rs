use std::fmt;
use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;

use lingua_core::exam::ExamEngine;
use lingua_core::lesson::{LessonSession, StepAnswer};
use lingua_core::model::{ExamQuestion, LearnerSettingsDraft, LearnerSettingsError, StepBody};
use lingua_core::scoring::{
    MAX_COHESION_SCORE, MAX_KEYWORD_SCORE, MAX_LENGTH_SCORE, MAX_RESPONSE_SCORE, score_breakdown,
};
use services::{AppServices, Clock, ReviewAnswer, SpeechIo};
use tracing_subscriber::EnvFilter;

mod console;

use console::{ConsoleRecognizer, ConsoleSynthesizer, read_line};

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    MissingCommand,
    MissingOperand { command: &'static str, operand: &'static str },
    UnknownArg(String),
    UnknownCommand(String),
    InvalidIndex { raw: String },
    InvalidDbUrl { raw: String },
    Settings(LearnerSettingsError),
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::MissingCommand => write!(f, "a subcommand is required"),
            ArgsError::MissingOperand { command, operand } => {
                write!(f, "{command} requires <{operand}>")
            }
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::UnknownCommand(cmd) => write!(f, "unknown subcommand: {cmd}"),
            ArgsError::InvalidIndex { raw } => write!(f, "invalid entry number: {raw}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::Settings(err) => write!(f, "{err}"),
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
    eprintln!("  lingua catalog");
    eprintln!("  lingua curriculum");
    eprintln!("  lingua progress");
    eprintln!("  lingua review list");
    eprintln!("  lingua review clear");
    eprintln!("  lingua review answer <n> <text>");
    eprintln!("  lingua lesson <lesson-id>");
    eprintln!("  lingua exam");
    eprintln!("  lingua score            # scores stdin against the mock writing task");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --db <sqlite_url>          default sqlite://lingua.sqlite3");
    eprintln!("  --content <dir>            default ./content");
    eprintln!("  --lang <tag>               default de-DE");
    eprintln!("  --streak-policy <name>     increment | once-per-day");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  LINGUA_DB_URL, LINGUA_CONTENT_DIR, LINGUA_TARGET_LANG, LINGUA_STREAK_POLICY, RUST_LOG");
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Catalog,
    Curriculum,
    Progress,
    ReviewList,
    ReviewClear,
    ReviewAnswer { index: usize, text: String },
    Lesson { id: String },
    Exam,
    Score,
}

impl Command {
    fn from_operands(operands: &[String]) -> Result<Self, ArgsError> {
        let words: Vec<&str> = operands.iter().map(String::as_str).collect();
        match words.as_slice() {
            ["catalog"] => Ok(Self::Catalog),
            ["curriculum"] => Ok(Self::Curriculum),
            ["progress"] => Ok(Self::Progress),
            ["review"] | ["review", "list"] => Ok(Self::ReviewList),
            ["review", "clear"] => Ok(Self::ReviewClear),
            ["review", "answer"] => Err(ArgsError::MissingOperand {
                command: "review answer",
                operand: "n",
            }),
            ["review", "answer", _] => Err(ArgsError::MissingOperand {
                command: "review answer",
                operand: "text",
            }),
            ["review", "answer", raw, rest @ ..] => {
                let index = raw
                    .parse::<usize>()
                    .ok()
                    .filter(|n| *n > 0)
                    .ok_or_else(|| ArgsError::InvalidIndex {
                        raw: (*raw).to_string(),
                    })?;
                Ok(Self::ReviewAnswer {
                    index,
                    text: rest.join(" "),
                })
            }
            ["lesson"] => Err(ArgsError::MissingOperand {
                command: "lesson",
                operand: "lesson-id",
            }),
            ["lesson", id] => Ok(Self::Lesson {
                id: (*id).to_string(),
            }),
            ["exam"] => Ok(Self::Exam),
            ["score"] => Ok(Self::Score),
            [] => Err(ArgsError::MissingCommand),
            _ => Err(ArgsError::UnknownCommand(operands.join(" "))),
        }
    }
}

struct Args {
    command: Command,
    db_url: String,
    content_dir: PathBuf,
    settings: LearnerSettingsDraft,
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut db_url = std::env::var("LINGUA_DB_URL")
            .ok()
            .map_or_else(|| "sqlite://lingua.sqlite3".into(), normalize_sqlite_url);
        let mut content_dir = std::env::var("LINGUA_CONTENT_DIR")
            .map_or_else(|_| PathBuf::from("content"), PathBuf::from);
        let mut settings = LearnerSettingsDraft {
            target_language: std::env::var("LINGUA_TARGET_LANG").ok(),
            streak_policy: std::env::var("LINGUA_STREAK_POLICY").ok(),
        };
        let mut operands = Vec::new();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--content" => content_dir = PathBuf::from(require_value(args, "--content")?),
                "--lang" => settings.target_language = Some(require_value(args, "--lang")?),
                "--streak-policy" => {
                    settings.streak_policy = Some(require_value(args, "--streak-policy")?);
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                flag if flag.starts_with("--") => return Err(ArgsError::UnknownArg(arg)),
                _ => operands.push(arg),
            }
        }

        Ok(Self {
            command: Command::from_operands(&operands)?,
            db_url,
            content_dir,
            settings,
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
            .unwrap_or_else(|_| PathBuf::from("."))
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

//
// ─── COMMANDS ──────────────────────────────────────────────────────────────────
//

fn show_catalog(app: &AppServices) {
    for category in app.content().catalog() {
        println!("{}", category.level);
        for lesson in &category.lessons {
            println!("  {:<16} {} ({} steps)", lesson.id(), lesson.title(), lesson.step_count());
        }
    }
}

async fn show_curriculum(app: &AppServices) -> Result<(), Box<dyn std::error::Error>> {
    for overview in app.curriculum_overview().await? {
        let status = overview.status;
        println!(
            "{}  checkpoints {}/{}{}",
            overview.stage.stage,
            status.cleared,
            status.total,
            if status.is_complete() { "  ✓" } else { "" }
        );
        for goal in &overview.stage.goals {
            println!("  - {goal}");
        }
        if !overview.stage.sample_topics.is_empty() {
            println!("  topics: {}", overview.stage.sample_topics.join(", "));
        }
    }
    Ok(())
}

async fn show_progress(app: &AppServices) -> Result<(), Box<dyn std::error::Error>> {
    let state = app.progress().state().await?;
    println!("XP: {}", state.xp);
    println!("Streak: {}", state.streak);
    match state.last_active_day {
        Some(day) => println!("Last active: {day}"),
        None => println!("Last active: never"),
    }
    Ok(())
}

async fn list_review(app: &AppServices) -> Result<(), Box<dyn std::error::Error>> {
    let entries = app.review_pool().entries().await?;
    if entries.is_empty() {
        println!("Review pool is empty.");
    }
    for (n, entry) in entries.iter().enumerate() {
        println!("{:>3}. [L{}] {}", n + 1, entry.level, entry.prompt_native);
    }
    Ok(())
}

async fn answer_review(
    app: &AppServices,
    index: usize,
    text: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let pool = app.review_pool();
    let entries = pool.entries().await?;
    let Some(entry) = entries.get(index - 1) else {
        return Err(ArgsError::InvalidIndex {
            raw: index.to_string(),
        }
        .into());
    };

    match pool.answer(entry, text).await? {
        ReviewAnswer::Mastered => println!("Correct. Mastered and removed."),
        ReviewAnswer::Promoted { level } => println!("Correct. Now at level {level}."),
        ReviewAnswer::Incorrect => println!("Incorrect. Answer: {}", entry.correct_answer),
        ReviewAnswer::Missing => println!("That entry is no longer in the review pool."),
    }
    Ok(())
}

fn ask_answer(
    app: &AppServices,
    session: &LessonSession,
) -> Result<Option<StepAnswer>, Box<dyn std::error::Error>> {
    let Some(step) = session.current_step() else {
        return Ok(None);
    };
    let progress = session.progress();
    println!();
    println!("[{}/{}] {}", progress.step + 1, progress.total, step.prompt_native());

    let answer = match step.body() {
        StepBody::Mcq { options, .. } => {
            for (n, option) in options.iter().enumerate() {
                println!("  {}. {option}", n + 1);
            }
            let Some(line) = read_line("  > ")? else {
                return Ok(None);
            };
            let choice = line
                .parse::<usize>()
                .ok()
                .and_then(|n| n.checked_sub(1))
                .and_then(|n| options.get(n).cloned())
                .unwrap_or(line);
            StepAnswer::Choice(choice)
        }
        StepBody::Match { pairs } => {
            for (n, pair) in pairs.iter().enumerate() {
                println!("  {}. {} = {}", n + 1, pair.native, pair.target);
            }
            let Some(line) = read_line("  pick a pair > ")? else {
                return Ok(None);
            };
            let index = line.parse::<usize>().unwrap_or(1).saturating_sub(1);
            StepAnswer::MatchPair(index)
        }
        StepBody::Listen => {
            app.lesson_loop().play_prompt(session);
            if read_line("  (enter to continue) ")?.is_none() {
                return Ok(None);
            }
            StepAnswer::Continue
        }
        StepBody::TypeIn { .. } => {
            let Some(line) = read_line("  type > ")? else {
                return Ok(None);
            };
            StepAnswer::Typed(line)
        }
        StepBody::Speak { .. } => {
            if let Some(target) = step.prompt_target() {
                println!("  say: {target}");
            }
            let transcript = match app.lesson_loop().listen_for_answer() {
                Ok(mut capture) => capture.try_result().unwrap_or_default(),
                Err(err) => {
                    tracing::warn!(error = %err, "speech capture unavailable");
                    String::new()
                }
            };
            StepAnswer::Spoken(transcript)
        }
    };
    Ok(Some(answer))
}

async fn run_lesson(app: &AppServices, lesson_id: &str) -> Result<(), Box<dyn std::error::Error>> {
    let lessons = app.lesson_loop();
    let mut session = app.start_lesson(lesson_id)?;
    println!("{} ({})", session.lesson().title(), session.lesson().level());

    while !session.is_finished() {
        let Some(answer) = ask_answer(app, &session)? else {
            println!("Lesson abandoned.");
            return Ok(());
        };
        let result = lessons.answer_current(&mut session, &answer).await?;
        match (result.feedback.correct, &result.feedback.miss) {
            (Some(true), _) => println!("  correct"),
            (Some(false), Some(miss)) => println!("  wrong: {}", miss.correct_answer),
            _ => {}
        }
        if let (Some(done), Some(state)) = (&result.feedback.completion, result.progress) {
            println!();
            println!("Score {}/{}  XP {}  Streak {}", done.score, done.total, state.xp, state.streak);
        }
    }
    Ok(())
}

fn ask_objective(
    questions: &[ExamQuestion],
    play: impl Fn(usize),
) -> std::io::Result<Vec<Option<String>>> {
    let mut choices = Vec::with_capacity(questions.len());
    for (i, question) in questions.iter().enumerate() {
        println!();
        play(i);
        println!("{}", question.prompt);
        for (n, option) in question.options.iter().enumerate() {
            println!("  {}. {option}", n + 1);
        }
        let choice = read_line("  > ")?.and_then(|line| {
            line.parse::<usize>()
                .ok()
                .and_then(|n| n.checked_sub(1))
                .and_then(|n| question.options.get(n).cloned())
        });
        choices.push(choice);
    }
    Ok(choices)
}

async fn run_exam(app: &AppServices) -> Result<(), Box<dyn std::error::Error>> {
    let exam_svc = app.exam();
    let mut engine: ExamEngine = exam_svc.start(app.content().mock_exam().clone())?;

    println!("== Reading ==");
    let reading = ask_objective(engine.reading_questions(), |_| {})?;
    engine.submit_reading(&reading)?;

    println!("== Listening ==");
    let listening = ask_objective(engine.listening_questions(), |i| {
        exam_svc.play_listening(&engine, i);
    })?;
    engine.submit_listening(&listening)?;

    println!("== Writing ==");
    println!("{}", engine.writing_task().prompt);
    let text = read_line("  > ")?.unwrap_or_default();
    engine.submit_writing(&text)?;

    println!("== Speaking ==");
    println!("{}", engine.speaking_task().prompt);
    let capture = exam_svc.start_speaking(&engine)?;
    let report = exam_svc.finish_speaking(&mut engine, capture).await?;

    println!();
    println!("{report}");
    Ok(())
}

fn score_stdin(app: &AppServices) -> Result<(), Box<dyn std::error::Error>> {
    let mut text = String::new();
    std::io::stdin().read_to_string(&mut text)?;

    let content = app.content();
    let exam = content.mock_exam();
    let Some(task) = exam.writing_task() else {
        return Err("mock exam has no writing task".into());
    };
    let score = score_breakdown(&text, &task.keywords, task.min_words);
    println!("Length: {}/{MAX_LENGTH_SCORE}", score.length);
    println!("Keywords: {}/{MAX_KEYWORD_SCORE}", score.keywords);
    println!("Cohesion: {}/{MAX_COHESION_SCORE}", score.cohesion);
    println!("Total: {}/{MAX_RESPONSE_SCORE}", score.total);
    Ok(())
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv = std::env::args().skip(1);
    let parsed = Args::parse(&mut argv).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;
    let settings = parsed.settings.validate().map_err(ArgsError::Settings)?;

    // Open + migrate SQLite at startup. Keep this in the binary glue so core/services stay pure.
    prepare_sqlite_file(&parsed.db_url)?;
    let speech = SpeechIo::new(
        Arc::new(ConsoleSynthesizer),
        Arc::new(ConsoleRecognizer::default()),
    );
    let app = AppServices::new_sqlite(
        &parsed.db_url,
        &parsed.content_dir,
        Clock::default_clock(),
        settings,
        speech,
    )
    .await?;

    match parsed.command {
        Command::Catalog => show_catalog(&app),
        Command::Curriculum => show_curriculum(&app).await?,
        Command::Progress => show_progress(&app).await?,
        Command::ReviewList => list_review(&app).await?,
        Command::ReviewClear => {
            app.review_pool().clear().await?;
            println!("Review pool cleared.");
        }
        Command::ReviewAnswer { index, text } => answer_review(&app, index, &text).await?,
        Command::Lesson { id } => run_lesson(&app, &id).await?,
        Command::Exam => run_exam(&app).await?,
        Command::Score => score_stdin(&app)?,
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}
