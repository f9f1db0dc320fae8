use std::fmt;
use std::io::{self, BufRead, Write};
use std::sync::Arc;

use quiz_core::model::{Question, QuestionDraft, QuestionId};
use services::{
    CorpusSelector, HttpImageFetcher, HttpQuestionSource, ImageEvent, ImageFetcher,
    InMemoryQuestionSource, QuestionSource, QuizService, ScriptedImageFetcher,
};
use tokio::sync::mpsc;
use ui::QuizVm;
use url::Url;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    UnknownCommand(String),
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::UnknownCommand(cmd) => write!(f, "unknown command: {cmd}"),
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
    eprintln!("  cargo run -p app -- play [--server <url>] [--corpus <path>] [--list <names>] [--label <text>]");
    eprintln!("  cargo run -p app -- demo");
    eprintln!();
    eprintln!("Defaults for play:");
    eprintln!("  --server http://127.0.0.1:5000");
    eprintln!("  --corpus waterfowl.csv");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  QUIZ_SERVER_URL, QUIZ_CORPUS");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Play,
    Demo,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "play" => Some(Self::Play),
            "demo" => Some(Self::Demo),
            _ => None,
        }
    }
}

struct Args {
    server: String,
    selector: CorpusSelector,
    label: Option<String>,
}

impl Args {
    fn parse_play(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut server = std::env::var("QUIZ_SERVER_URL")
            .ok()
            .unwrap_or_else(|| "http://127.0.0.1:5000".into());
        let mut corpus = std::env::var("QUIZ_CORPUS")
            .ok()
            .unwrap_or_else(|| "waterfowl.csv".into());
        let mut custom_list = None;
        let mut label = None;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--server" => server = require_value(args, "--server")?,
                "--corpus" => corpus = require_value(args, "--corpus")?,
                "--list" => custom_list = Some(require_value(args, "--list")?),
                "--label" => label = Some(require_value(args, "--label")?),
                other => return Err(ArgsError::UnknownArg(other.to_owned())),
            }
        }

        let selector = match custom_list {
            Some(names) => CorpusSelector::custom(names),
            None => CorpusSelector::named(corpus),
        };
        Ok(Self {
            server,
            selector,
            label,
        })
    }
}

#[tokio::main]
async fn main() {
    let mut args = std::env::args().skip(1);
    let command = match args.next().as_deref().map(|arg| {
        Command::from_arg(arg).ok_or_else(|| ArgsError::UnknownCommand(arg.to_owned()))
    }) {
        Some(Ok(command)) => command,
        Some(Err(e)) => {
            eprintln!("{e}");
            print_usage();
            std::process::exit(2);
        }
        None => {
            print_usage();
            std::process::exit(2);
        }
    };

    let result = match command {
        Command::Play => {
            let parsed = match Args::parse_play(&mut args) {
                Ok(parsed) => parsed,
                Err(e) => {
                    eprintln!("{e}");
                    print_usage();
                    std::process::exit(2);
                }
            };
            let source: Arc<dyn QuestionSource> =
                Arc::new(HttpQuestionSource::new(parsed.server));
            let fetcher: Arc<dyn ImageFetcher> = Arc::new(HttpImageFetcher::new());
            run_quiz(source, fetcher, parsed.selector, parsed.label).await
        }
        Command::Demo => {
            let source: Arc<dyn QuestionSource> =
                Arc::new(InMemoryQuestionSource::preloaded(demo_questions()));
            let fetcher: Arc<dyn ImageFetcher> = Arc::new(ScriptedImageFetcher::new());
            run_quiz(
                source,
                fetcher,
                CorpusSelector::named("demo"),
                Some("Demo Waterfowl".into()),
            )
            .await
        }
    };

    if let Err(e) = result {
        eprintln!("{e}");
        std::process::exit(1);
    }
}

/// Offline fixtures for the demo command. Served in order, no images, so
/// the placeholder path is what a demo run exercises.
fn demo_questions() -> Vec<Question> {
    let fixtures = [
        ("Canvasback", ["Canvasback", "Redhead", "Scaup"]),
        ("Bufflehead", ["Common Goldeneye", "Bufflehead", "Smew"]),
        ("Northern Pintail", ["Mallard", "Gadwall", "Northern Pintail"]),
    ];
    fixtures
        .into_iter()
        .filter_map(|(answer, options)| {
            QuestionDraft::new(
                answer,
                options.iter().map(|s| (*s).to_owned()).collect(),
                Vec::new(),
            )
            .validate()
            .ok()
        })
        .collect()
}

async fn run_quiz(
    source: Arc<dyn QuestionSource>,
    fetcher: Arc<dyn ImageFetcher>,
    selector: CorpusSelector,
    label: Option<String>,
) -> io::Result<()> {
    let mut quiz = QuizService::new(source);
    let mut vm = QuizVm::new();

    if let Err(e) = quiz.prime(&selector).await {
        vm.show_error(e.to_string());
        println!("Could not load the corpus: {e}");
        return Ok(());
    }

    let (mut id, mut question) = match quiz.start_session(label).await {
        Ok(served) => served,
        Err(e) => {
            vm.show_error(e.to_string());
            println!("Could not start the quiz: {e}");
            return Ok(());
        }
    };
    vm.begin_quiz(quiz.take_label().as_deref());
    println!("{}", vm.title());

    loop {
        vm.present_question(id, &question);
        // Options are selectable right away; images stream in behind them.
        render_options(&vm);
        load_images(&fetcher, id, question.image_urls(), &mut vm).await;
        render_images(&vm);

        take_answer(&mut quiz, &mut vm);

        println!();
        println!("[Enter] next question, q to quit");
        let line = read_line()?;
        if line.trim().eq_ignore_ascii_case("q") {
            quiz.reset_session();
            vm.reset();
            println!("Final {}", vm.score_line());
            return Ok(());
        }

        loop {
            match quiz.advance_question().await {
                Ok(served) => {
                    (id, question) = served;
                    break;
                }
                Err(e) => {
                    vm.show_error(e.to_string());
                    println!("Could not fetch a question: {e}");
                    println!("[Enter] retry, q to quit");
                    if read_line()?.trim().eq_ignore_ascii_case("q") {
                        quiz.reset_session();
                        vm.reset();
                        return Ok(());
                    }
                }
            }
        }
    }
}

/// Probe every image of the question concurrently and feed the results to
/// the view-model as they arrive, in whatever order they complete.
async fn load_images(
    fetcher: &Arc<dyn ImageFetcher>,
    question_id: QuestionId,
    urls: &[Url],
    vm: &mut QuizVm,
) {
    if urls.is_empty() {
        return;
    }
    let (tx, mut rx) = mpsc::channel(urls.len());
    for (index, url) in urls.iter().cloned().enumerate() {
        let tx = tx.clone();
        let fetcher = Arc::clone(fetcher);
        tokio::spawn(async move {
            let probe = fetcher.probe(&url).await;
            let _ = tx
                .send(ImageEvent {
                    question_id,
                    index,
                    probe,
                })
                .await;
        });
    }
    drop(tx);
    while let Some(event) = rx.recv().await {
        vm.apply_image_event(&event);
    }
}

fn render_options(vm: &QuizVm) {
    println!();
    println!("Which bird is this?");
    for (number, option) in vm.options().iter().enumerate() {
        println!("  {}) {}", number + 1, option.label());
    }
}

fn render_images(vm: &QuizVm) {
    match vm.placeholder_text() {
        Some(placeholder) => println!("{placeholder}"),
        None => {
            for url in vm.visible_images() {
                println!("  [image] {url}");
            }
        }
    }
}

fn take_answer(quiz: &mut QuizService, vm: &mut QuizVm) {
    loop {
        print!("> ");
        let _ = io::stdout().flush();
        let Ok(line) = read_line() else {
            return;
        };
        let Some(index) = line
            .trim()
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
        else {
            println!("Pick an option by number.");
            continue;
        };
        let Some(selected) = vm.select_option(index) else {
            println!("Pick an option by number.");
            continue;
        };

        if let Some(outcome) = quiz.submit_answer(&selected) {
            vm.apply_outcome(&outcome);
            vm.set_score(quiz.correct_count(), quiz.incorrect_count());
            if let Some(feedback) = vm.feedback() {
                println!("{}", feedback.text());
                if let Some(reference) = feedback.reference() {
                    println!("  more: {reference}");
                }
            }
            println!("{}", vm.score_line());
        }
        return;
    }
}

fn read_line() -> io::Result<String> {
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line)
}
