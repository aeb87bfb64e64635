//! medeval CLI - answer-quality evaluation for a medical chatbot
//!
//! Usage:
//!   medeval init                Write a default .medeval/config.toml
//!   medeval run                 Collect, judge and analyze in one go
//!   medeval collect             Ask the subject system every question
//!   medeval evaluate            Judge previously collected responses
//!   medeval analyze             Mine failures and print recommendations
//!   medeval corpus list         Show the assembled corpus
//!   medeval corpus import <f>   Import free-text questions, one per line
//!   medeval corpus starter      Write a seed corpus of common questions

mod report;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use medeval_agent::{AnthropicOracle, HttpSubject};
use medeval_analysis::ImprovementPlan;
use medeval_core::{EvalConfig, TestCase};
use medeval_metrics::{ArtifactStore, EvaluationFile};
use medeval_runner::{
    run_analysis, run_collection, run_judging, JudgingStage, Pipeline, ResponseCollector,
};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(name = "medeval")]
#[command(author, version, about = "Rubric-based evaluation of medical chatbot answers")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Project root holding .medeval/config.toml
    ///
    /// Relative paths from the config file resolve against it; paths given
    /// as flags resolve against the working directory.
    #[arg(long, global = true, default_value = ".")]
    root: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Overrides shared by every command that runs a stage
#[derive(Args, Clone, Default)]
struct RunOverrides {
    /// Maximum in-flight calls per stage
    #[arg(long)]
    concurrency: Option<usize>,

    /// Directory for generated artifacts
    #[arg(long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// External corpus file to include
    #[arg(long, value_name = "FILE")]
    forum_cases: Option<PathBuf>,

    /// Skip the curated test cases
    #[arg(long)]
    no_curated: bool,

    /// Judge model identifier
    #[arg(long)]
    model: Option<String>,
}

impl RunOverrides {
    fn apply(&self, config: &mut EvalConfig) {
        if let Some(concurrency) = self.concurrency {
            config.run.concurrency = concurrency.max(1);
        }
        if let Some(dir) = &self.output_dir {
            config.run.output_dir = dir.clone();
        }
        if let Some(path) = &self.forum_cases {
            config.run.external_corpus = Some(path.clone());
        }
        if self.no_curated {
            config.run.include_curated = false;
        }
        if let Some(model) = &self.model {
            config.judge.model = model.clone();
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Write the default configuration file
    Init,

    /// Run every stage: collect, evaluate, analyze
    Run {
        #[command(flatten)]
        overrides: RunOverrides,
    },

    /// Collect subject responses for the corpus
    Collect {
        #[command(flatten)]
        overrides: RunOverrides,
    },

    /// Judge the collected responses
    Evaluate {
        #[command(flatten)]
        overrides: RunOverrides,
    },

    /// Analyze the latest evaluation and export an improvement plan
    Analyze {
        /// Directory holding evaluation_results.json
        #[arg(long, value_name = "DIR")]
        output_dir: Option<PathBuf>,
    },

    /// Corpus management
    Corpus {
        #[command(subcommand)]
        action: CorpusCommands,
    },
}

#[derive(Subcommand)]
enum CorpusCommands {
    /// List assembled test cases with per-category counts
    List {
        #[command(flatten)]
        overrides: RunOverrides,
    },

    /// Import questions from a text file, one per line
    Import {
        /// Text file of questions
        file: PathBuf,

        /// Corpus file to append to
        #[arg(long, default_value = "test_data/manual_test_cases.json")]
        output: PathBuf,
    },

    /// Write a seed corpus file of common patient questions
    Starter {
        /// Corpus file to create
        #[arg(long, default_value = "test_data/manual_test_cases.json")]
        output: PathBuf,

        /// Replace the file if it already exists
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging; RUST_LOG wins over --verbose
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Init => cmd_init(&cli.root).await,
        Commands::Run { overrides } => cmd_run(&cli.root, overrides).await,
        Commands::Collect { overrides } => cmd_collect(&cli.root, overrides).await,
        Commands::Evaluate { overrides } => cmd_evaluate(&cli.root, overrides).await,
        Commands::Analyze { output_dir } => cmd_analyze(&cli.root, output_dir).await,
        Commands::Corpus { action } => cmd_corpus(&cli.root, action).await,
    }
}

fn load_config(root: &Path, overrides: &RunOverrides) -> Result<EvalConfig> {
    let mut config = EvalConfig::load_or_default(root).context("Failed to load configuration")?;
    config.run.anchor(root);
    overrides.apply(&mut config);
    Ok(config)
}

fn assemble_corpus(config: &EvalConfig) -> Result<Vec<TestCase>> {
    let cases = medeval_corpus::assemble(
        config.run.include_curated,
        config.run.external_corpus.as_deref(),
    )
    .context("Failed to assemble test corpus")?;

    if cases.is_empty() {
        anyhow::bail!("No test cases loaded. Enable curated cases or pass --forum-cases.");
    }
    Ok(cases)
}

fn oracle(config: &EvalConfig) -> Result<AnthropicOracle> {
    AnthropicOracle::from_settings(&config.judge).context("Failed to set up judge client")
}

fn subject(config: &EvalConfig) -> Result<HttpSubject> {
    HttpSubject::from_settings(&config.subject).context("Failed to set up subject client")
}

fn print_reports(evaluation: &EvaluationFile, plan: &ImprovementPlan) -> Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    report::full(&mut out, evaluation, plan).context("Failed to write report")
}

async fn cmd_init(root: &Path) -> Result<()> {
    let path = EvalConfig::write_default(root).context("Failed to write configuration")?;

    println!("Initialized medeval in {:?}", root);
    println!("Created:");
    println!("  {}", path.display());
    println!("\nNext steps:");
    println!("  1. Point [subject].endpoint at the chatbot under test");
    println!("  2. Export ANTHROPIC_API_KEY for the judge");
    println!("  3. Run 'medeval run'");
    Ok(())
}

async fn cmd_run(root: &Path, overrides: RunOverrides) -> Result<()> {
    let config = load_config(root, &overrides)?;
    let cases = assemble_corpus(&config)?;
    info!("Total test cases: {}", cases.len());

    let store = ArtifactStore::new(&config.run.output_dir);
    let pipeline = Pipeline::new(subject(&config)?, oracle(&config)?, store)
        .with_concurrency(config.run.concurrency);

    let outcome = pipeline.run(&cases).await.context("Evaluation run failed")?;

    print_reports(&outcome.evaluation, &outcome.plan)?;
    println!("\nRun {} complete. Results saved to {:?}", outcome.run_id, config.run.output_dir);
    Ok(())
}

async fn cmd_collect(root: &Path, overrides: RunOverrides) -> Result<()> {
    let config = load_config(root, &overrides)?;
    let cases = assemble_corpus(&config)?;

    let store = ArtifactStore::new(&config.run.output_dir);
    let collector = ResponseCollector::new(subject(&config)?).with_concurrency(config.run.concurrency);
    let responses = run_collection(&collector, &cases, &store)
        .await
        .context("Response collection failed")?;

    println!(
        "Collected {} responses ({} failed)",
        responses.successful, responses.failed
    );
    println!("Use 'medeval evaluate' to judge them");
    Ok(())
}

async fn cmd_evaluate(root: &Path, overrides: RunOverrides) -> Result<()> {
    let config = load_config(root, &overrides)?;
    let store = ArtifactStore::new(&config.run.output_dir);

    let responses = store
        .load_responses()
        .await
        .context("No collected responses. Run 'medeval collect' first")?;

    let stage = JudgingStage::new(oracle(&config)?).with_concurrency(config.run.concurrency);
    let evaluation = run_judging(&stage, &responses, &store)
        .await
        .context("Evaluation failed")?;

    let stdout = std::io::stdout();
    report::overview(&mut stdout.lock(), &evaluation.summary).context("Failed to write report")?;
    println!("\nUse 'medeval analyze' for failure analysis and recommendations");
    Ok(())
}

async fn cmd_analyze(root: &Path, output_dir: Option<PathBuf>) -> Result<()> {
    let overrides = RunOverrides {
        output_dir,
        ..RunOverrides::default()
    };
    let config = load_config(root, &overrides)?;
    let store = ArtifactStore::new(&config.run.output_dir);

    let evaluation = store
        .load_evaluation()
        .await
        .context("Run 'medeval run' or 'medeval evaluate' first")?;

    let plan = run_analysis(&evaluation, &store)
        .await
        .context("Failed to export improvement plan")?;

    print_reports(&evaluation, &plan)?;
    Ok(())
}

async fn cmd_corpus(root: &Path, action: CorpusCommands) -> Result<()> {
    match action {
        CorpusCommands::List { overrides } => {
            let config = load_config(root, &overrides)?;
            let cases = assemble_corpus(&config)?;

            println!("Test Cases ({}):", cases.len());
            for case in &cases {
                println!("  {} [{}] {}", case.id, case.category, case.question);
            }

            println!("\nBy category:");
            for (category, count) in medeval_corpus::category_counts(&cases) {
                println!("  {}: {}", category, count);
            }
        }
        CorpusCommands::Import { file, output } => {
            let text = tokio::fs::read_to_string(&file)
                .await
                .with_context(|| format!("Failed to read {:?}", file))?;
            let added = medeval_corpus::import_text(&text, &output)
                .with_context(|| format!("Failed to update corpus {:?}", output))?;

            println!("Added {} questions to {:?}", added, output);
            println!("Use 'medeval run --forum-cases {}' to include them", output.display());
        }
        CorpusCommands::Starter { output, force } => {
            let written = medeval_corpus::write_starter(&output, force)
                .with_context(|| format!("Failed to write starter corpus {:?}", output))?;

            println!("Created {:?} with {} common patient questions", output, written);
            println!("Use 'medeval corpus import' to add more");
        }
    }
    Ok(())
}
