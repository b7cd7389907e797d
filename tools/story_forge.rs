/// Story Forge CLI: generate stories, run batches, self-test, lint banks.
///
/// Usage: story_forge [--banks <file>] [--settings <file>] <command>
use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use story_forge::core::assembler::StoryEngine;
use story_forge::core::banks::StoryBanks;
use story_forge::schema::params::{Genre, StoryLength, StoryParams, Tone};
use story_forge::schema::story::Story;

#[derive(Parser)]
#[command(name = "story_forge", version, about = "Offline story generator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Log filter used when RUST_LOG is not set.
    #[arg(long, default_value = "warn", global = true)]
    log_level: String,
    /// Story banks RON file. Defaults to the banks compiled into the binary.
    #[arg(long, global = true)]
    banks: Option<PathBuf>,
    /// Guard settings RON file.
    #[arg(long, global = true)]
    settings: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate one story.
    Generate {
        #[command(flatten)]
        story: StoryArgs,
        /// Print the full story record as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Generate several stories from one base seed and report their scores.
    Batch {
        #[command(flatten)]
        story: StoryArgs,
        #[arg(long, default_value_t = 5)]
        count: usize,
    },
    /// Generate across every genre, tone and seed and check the output.
    SelfTest,
    /// Validate a bank file and print its table sizes.
    Lint {
        /// Bank file to check. Falls back to --banks, then the embedded banks.
        path: Option<PathBuf>,
    },
}

#[derive(Args)]
struct StoryArgs {
    #[arg(long, default_value = "general")]
    genre: Genre,
    #[arg(long, default_value = "serious")]
    tone: Tone,
    #[arg(long, default_value = "medium")]
    length: StoryLength,
    #[arg(long)]
    seed: Option<u64>,
    /// Title used instead of the theme.
    #[arg(long)]
    title: Option<String>,
    /// End the story on a calm line.
    #[arg(long)]
    calm: bool,
}

impl StoryArgs {
    fn params(&self) -> StoryParams {
        StoryParams {
            genre: self.genre,
            tone: self.tone,
            length: self.length,
            seed: self.seed,
            title_hint: self.title.clone(),
            use_backend: false,
            calm_closure: self.calm,
        }
    }
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("warn"))
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn build_engine(cli: &Cli) -> anyhow::Result<StoryEngine> {
    let mut builder = StoryEngine::builder();
    if let Some(path) = &cli.banks {
        builder = builder.banks_path(path);
    }
    if let Some(path) = &cli.settings {
        builder = builder.settings_path(path);
    }
    builder.build().context("failed to build story engine")
}

fn print_story(story: &Story) {
    let title = story.title();
    println!("{}", title);
    println!("{}", "=".repeat(title.chars().count()));
    println!();
    println!("{}", story.text);
    println!();
    println!(
        "seed {}, {} words, uniqueness {:.3} (threshold {:.2}, {})",
        story.seed,
        story.word_count,
        story.uniqueness_score,
        story.threshold,
        if story.passed_guard { "pass" } else { "below" }
    );
}

fn self_test(engine: &StoryEngine) -> anyhow::Result<()> {
    let mut runs = 0usize;
    let mut failures = Vec::new();

    for genre in Genre::ALL {
        for tone in Tone::ALL {
            for length in [StoryLength::Short, StoryLength::Medium] {
                for seed in [None, Some(42), Some(1337)] {
                    runs += 1;
                    let params = StoryParams {
                        genre,
                        tone,
                        length,
                        seed,
                        ..StoryParams::default()
                    };
                    let label = format!("{}/{}/{}/{:?}", genre, tone, length, seed);
                    let story = engine.generate(&params)?;
                    if story.text.len() <= 100 {
                        failures.push(format!("{}: story too short ({} bytes)", label, story.text.len()));
                    }
                    if seed.is_some() && engine.generate(&params)?.text != story.text {
                        failures.push(format!("{}: same seed produced different text", label));
                    }
                }
            }
        }
    }

    for failure in &failures {
        println!("FAIL: {}", failure);
    }
    println!("Self-test: {} runs, {} failures", runs, failures.len());
    if !failures.is_empty() {
        bail!("self-test failed");
    }
    Ok(())
}

fn lint(path: Option<&PathBuf>) -> anyhow::Result<()> {
    let banks = match path {
        Some(path) => StoryBanks::load_from_ron(path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => StoryBanks::embedded()?,
    };

    let mut genres: Vec<_> = banks.names.keys().collect();
    genres.sort();
    println!("Genres: {}", genres.iter().map(|g| g.as_str()).collect::<Vec<_>>().join(", "));
    println!(
        "Themes: {}, desires: {}, stake patterns: {}",
        banks.themes.len(),
        banks.desires.len(),
        banks.stakes.patterns.len()
    );
    println!(
        "Beat prompts: {}, sentence patterns: {}, filler slots: {}",
        banks.beat_prompts.len(),
        banks.sentence_patterns.len(),
        banks.beat_fillers.len() + banks.sentence_fillers.len()
    );

    let problems = banks.problems();
    for problem in &problems {
        println!("ERROR: {}", problem);
    }
    println!("\nSummary: {} errors", problems.len());
    if !problems.is_empty() {
        bail!("bank file has {} problems", problems.len());
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    match &cli.command {
        Commands::Generate { story, json } => {
            let engine = build_engine(&cli)?;
            let story = engine.generate(&story.params())?;
            if *json {
                println!("{}", serde_json::to_string_pretty(&story)?);
            } else {
                print_story(&story);
            }
        }
        Commands::Batch { story, count } => {
            let engine = build_engine(&cli)?;
            let stories = engine.generate_batch(&story.params(), *count)?;
            let passed = stories.iter().filter(|story| story.passed_guard).count();
            for story in &stories {
                println!(
                    "{}\t{:.3}\t{}\t{}",
                    story.seed,
                    story.uniqueness_score,
                    if story.passed_guard { "pass" } else { "below" },
                    story.title()
                );
            }
            info!(count = stories.len(), passed, "batch complete");
            if passed < stories.len() {
                warn!(below = stories.len() - passed, "some stories fell below the uniqueness threshold");
            }
        }
        Commands::SelfTest => {
            let engine = build_engine(&cli)?;
            self_test(&engine)?;
        }
        Commands::Lint { path } => {
            lint(path.as_ref().or(cli.banks.as_ref()))?;
        }
    }

    Ok(())
}
