use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use chutan_core::{
    resolve_choice, Database, Dataset, GradeRange, PartOfSpeech, ProgressStore, QuizConfig,
    QuizFilter, QuizRunner, User, DEFAULT_THRESHOLD,
};

/// Read before falling back to an interactive prompt. Passwords are never
/// taken as command-line arguments.
const PASSWORD_ENV: &str = "CHUTAN_PASSWORD";

#[derive(Parser, Debug)]
#[command(name = "chutan", version, about = "Chutan Knock vocabulary quiz", long_about = None)]
struct Args {
    /// JSON config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Word list (.xlsx or .csv)
    #[arg(long, env = "CHUTAN_DATASET")]
    dataset: Option<PathBuf>,

    /// SQLite database for users and progress
    #[arg(long, env = "CHUTAN_DB")]
    db: Option<PathBuf>,

    /// Questions per quiz
    #[arg(short = 'n', long)]
    questions: Option<usize>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a new user
    Register { username: String },
    /// Log in and play one quiz
    Play {
        username: String,
        /// all, 1, 2, 3 or 1-2
        #[arg(short, long, default_value = "all")]
        grade: String,
        /// Part of speech: 名, 名詞, noun, ... or all
        #[arg(long, default_value = "all")]
        pos: String,
    },
    /// Show cumulative progress
    Stats {
        username: String,
        #[arg(long)]
        json: bool,
    },
}

fn build_config(args: &Args) -> Result<QuizConfig> {
    let mut config = match &args.config {
        Some(path) => QuizConfig::from_json_file(path)?,
        None => QuizConfig::default(),
    };
    if let Some(dataset) = &args.dataset {
        config.dataset_path = dataset.clone();
    }
    if let Some(db) = &args.db {
        config.db_path = db.clone();
    }
    if let Some(n) = args.questions {
        config.question_count = n;
    }
    config.validate()?;
    Ok(config)
}

fn prompt(input: &mut impl BufRead, label: &str) -> Result<String> {
    print!("{}", label);
    io::stdout().flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        bail!("unexpected end of input");
    }
    Ok(line.trim_end_matches(&['\r', '\n'][..]).to_string())
}

fn read_password(input: &mut impl BufRead, from_env: Option<String>) -> Result<String> {
    match from_env {
        Some(p) if !p.is_empty() => Ok(p),
        _ => prompt(input, "Password: "),
    }
}

fn env_password() -> Option<String> {
    std::env::var(PASSWORD_ENV).ok()
}

fn login(db: &Database, input: &mut impl BufRead, username: &str) -> Result<User> {
    let password = read_password(input, env_password())?;
    Ok(db.login(username, &password)?)
}

fn play(
    config: &QuizConfig,
    db: Arc<Database>,
    user: &User,
    filter: QuizFilter,
    input: &mut impl BufRead,
) -> Result<()> {
    let dataset = Dataset::load(&config.dataset_path)?;
    let runner = QuizRunner::new(dataset, db, config);
    let mut rng = rand::thread_rng();
    let mut session = runner.start_quiz(&filter, &mut rng)?;

    while let Some(question) = runner.current_question(&mut session, &mut rng)? {
        println!();
        println!("{} / {}", question.number, question.total);
        println!("「{}」の意味は？", question.word);
        for (i, option) in question.choices.options.iter().enumerate() {
            println!("  {}. {}", i + 1, option);
        }

        let selected = loop {
            let answer = prompt(input, "> ")?;
            match resolve_choice(&answer, &question.choices.options, DEFAULT_THRESHOLD) {
                Some(i) => break question.choices.options[i].clone(),
                None => println!("Enter 1-{} or one of the meanings", question.choices.len()),
            }
        };

        if runner.submit_answer(&mut session, &selected)? {
            println!("正解！");
        } else {
            println!("残念… 正解は「{}」", question.choices.correct_answer);
        }
    }

    let result = runner.finish(&mut session, user.id)?;
    println!();
    println!("結果発表！ スコア： {} / {}", result.score, result.total);
    for miss in result.mistakes() {
        println!("  {}: {} (you chose {})", miss.word, miss.correct, miss.selected);
    }
    Ok(())
}

fn main() -> Result<()> {
    pretty_env_logger::init();
    let args = Args::parse();
    let config = build_config(&args)?;
    log::debug!("config: {:?}", config);

    let db = Arc::new(
        Database::open(&config.db_path)
            .with_context(|| format!("opening database {}", config.db_path.display()))?,
    );
    let stdin = io::stdin();
    let mut input = stdin.lock();

    match &args.command {
        Command::Register { username } => {
            let password = read_password(&mut input, env_password())?;
            let user = db.register(username, &password)?;
            println!("Registered '{}'", user.username);
        }
        Command::Play {
            username,
            grade,
            pos,
        } => {
            let user = login(&db, &mut input, username)?;
            let filter = QuizFilter {
                grade: GradeRange::preset(grade).map_err(anyhow::Error::msg)?,
                part_of_speech: PartOfSpeech::from_label(pos),
            };
            play(&config, db.clone(), &user, filter, &mut input)?;
            println!("{}", db.get_progress(user.id)?);
        }
        Command::Stats { username, json } => {
            let user = login(&db, &mut input, username)?;
            let record = db.get_progress(user.id)?;
            if *json {
                println!("{}", serde_json::to_string_pretty(&record)?);
            } else {
                println!("{}: {}", user.username, record);
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_flag_is_not_accepted() {
        for cmd in ["register", "play", "stats"] {
            let parsed = Args::try_parse_from(["chutan", cmd, "hanako", "--password", "x"]);
            assert!(parsed.is_err(), "{} accepted --password", cmd);
            let parsed = Args::try_parse_from(["chutan", cmd, "hanako", "-p", "x"]);
            assert!(parsed.is_err(), "{} accepted -p", cmd);
        }
        assert!(Args::try_parse_from(["chutan", "play", "hanako", "-g", "1"]).is_ok());
    }

    #[test]
    fn password_from_env_or_prompt() {
        let mut input = io::Cursor::new(b"typed\n".to_vec());
        let from_env = read_password(&mut input, Some("secret".to_string())).unwrap();
        assert_eq!(from_env, "secret");
        assert_eq!(read_password(&mut input, None).unwrap(), "typed");
    }

    #[test]
    fn zero_choice_count_fails_config() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "choice_count": 0 }}"#).unwrap();
        let path = file.path().to_str().unwrap().to_string();
        let args =
            Args::try_parse_from(["chutan", "-c", path.as_str(), "stats", "hanako"]).unwrap();
        assert!(build_config(&args).is_err());
    }
}
