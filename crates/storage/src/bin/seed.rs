use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::path::PathBuf;

use quiz_core::model::{Question, QuestionDraft, QuestionId};
use storage::repository::{QuestionRecord, QuestionRepository, Storage, find_duplicates};

#[derive(Debug, Clone)]
struct Args {
    db_url: String,
    file: Option<PathBuf>,
    skip_duplicates: bool,
}

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

impl Args {
    fn parse() -> Result<Self, ArgsError> {
        let mut db_url =
            std::env::var("QUIZ_DB_URL").unwrap_or_else(|_| "sqlite:quiz.sqlite3".into());
        let mut file = None;
        let mut skip_duplicates = false;

        let mut args = std::env::args().skip(1);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(&mut args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = value;
                }
                "--file" => {
                    file = Some(PathBuf::from(require_value(&mut args, "--file")?));
                }
                "--skip-duplicates" => skip_duplicates = true,
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            db_url,
            file,
            skip_duplicates,
        })
    }
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p storage --bin seed -- [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --db <sqlite_url>         SQLite URL (default: sqlite:quiz.sqlite3)");
    eprintln!("  --file <path>             JSON array of questions (default: built-in samples)");
    eprintln!("  --skip-duplicates         Keep only the first question of each duplicate group");
    eprintln!("  -h, --help                Show this help");
    eprintln!();
    eprintln!("Environment (same as flags):");
    eprintln!("  QUIZ_DB_URL");
}

fn sample(
    id: u64,
    prompt: &str,
    options: [&str; 3],
    correct: &str,
    explanation: &str,
) -> QuestionDraft {
    QuestionDraft {
        id: QuestionId::from(id),
        prompt: prompt.to_owned(),
        options: BTreeMap::from([
            ("A".to_string(), options[0].to_owned()),
            ("B".to_string(), options[1].to_owned()),
            ("C".to_string(), options[2].to_owned()),
        ]),
        correct_answer: correct.to_owned(),
        explanation: explanation.to_owned(),
    }
}

fn builtin_samples() -> Vec<QuestionDraft> {
    vec![
        sample(
            1,
            "What does a flashing red traffic light mean?",
            ["Stop, then proceed when safe", "Slow down and proceed", "The light is about to turn green"],
            "A",
            "A flashing red light is treated the same as a stop sign.",
        ),
        sample(
            2,
            "Unless posted otherwise, what is the speed limit in a school zone when children are present?",
            ["15 mph", "25 mph", "35 mph"],
            "B",
            "School zones default to 25 mph while children are present.",
        ),
        sample(
            3,
            "When may you legally drive in a bike lane?",
            ["Whenever traffic is slow", "Within 200 feet of a right turn", "Never"],
            "B",
            "You may enter a bike lane no more than 200 feet before making a right turn.",
        ),
        sample(
            4,
            "What should you do when an emergency vehicle approaches with its siren on?",
            ["Speed up to clear the way", "Stop in your lane", "Pull to the right edge and stop"],
            "C",
            "Drive to the right edge of the road and stop until it has passed.",
        ),
        sample(
            5,
            "A solid yellow line next to a broken yellow line means:",
            [
                "Passing is allowed from the side of the broken line",
                "No passing in either direction",
                "The lane is reserved for carpools",
            ],
            "A",
            "Drivers next to the broken line may pass when it is safe.",
        ),
        sample(
            6,
            "How far ahead should you signal before turning?",
            ["50 feet", "100 feet", "300 feet"],
            "B",
            "Signal at least 100 feet before you turn.",
        ),
        sample(
            7,
            "What is the legal blood alcohol limit for drivers 21 and older?",
            ["0.05%", "0.08%", "0.10%"],
            "B",
            "It is illegal to drive with a BAC of 0.08% or higher.",
        ),
        sample(
            8,
            "When parking uphill with a curb, turn your front wheels:",
            ["Toward the curb", "Away from the curb", "Straight ahead"],
            "B",
            "Turning away from the curb lets the tire catch the curb if the car rolls back.",
        ),
        sample(
            9,
            "What does a triangular red and white sign mean?",
            ["Stop", "Yield", "Do not enter"],
            "B",
            "The downward-pointing triangle is a yield sign.",
        ),
        sample(
            10,
            "When must you use your headlights?",
            ["Only after midnight", "From 30 minutes after sunset to 30 minutes before sunrise", "Only in rain"],
            "B",
            "Headlights are required from 30 minutes after sunset until 30 minutes before sunrise.",
        ),
        sample(
            11,
            "If your rear wheels skid, you should:",
            ["Brake hard", "Steer in the direction you want the car to go", "Accelerate"],
            "B",
            "Steer where you want to go and avoid braking hard.",
        ),
        sample(
            12,
            "You may cross a double solid yellow line to:",
            ["Pass a slow vehicle", "Turn left into a driveway", "Make a U-turn anywhere"],
            "B",
            "You may cross it to turn into or out of a private driveway.",
        ),
    ]
}

fn load_drafts(args: &Args) -> Result<Vec<QuestionDraft>, Box<dyn std::error::Error>> {
    let Some(path) = args.file.as_ref() else {
        return Ok(builtin_samples());
    };
    let raw = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

fn report_duplicates(records: &[QuestionRecord]) -> HashSet<QuestionId> {
    let mut skipped = HashSet::new();
    for group in find_duplicates(records) {
        let ids: Vec<_> = group.iter().map(|r| r.id.as_str()).collect();
        eprintln!("duplicate questions: {}", ids.join(", "));
        skipped.extend(group.iter().skip(1).map(|r| r.id.clone()));
    }
    skipped
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse().map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let mut questions: Vec<Question> = Vec::new();
    for draft in load_drafts(&args)? {
        let id = draft.id.clone();
        match draft.validate() {
            Ok(question) => questions.push(question),
            Err(err) => eprintln!("skipping question {id}: {err}"),
        }
    }

    let records: Vec<_> = questions.iter().map(QuestionRecord::from_question).collect();
    let duplicates = report_duplicates(&records);

    let storage = Storage::sqlite(&args.db_url).await?;
    let mut written = 0_usize;
    for question in &questions {
        if args.skip_duplicates && duplicates.contains(question.id()) {
            continue;
        }
        storage.questions.upsert_question(question).await?;
        written += 1;
    }

    let total = storage.questions.count_questions().await?;
    println!(
        "Seeded {written} questions into {} ({total} in bank)",
        args.db_url
    );

    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
