use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use std::{collections::BTreeSet, path::PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sitae_authoring::{
    document::QuizDocument, link_sync::ObjectiveLinks, models::ObjectiveLevel, services::paths,
    ApiClient, Config, QuizWizard,
};

#[derive(Parser)]
#[command(name = "sitae-author", about = "Author quizzes and objective links against the course backend")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create a quiz, its questions and their options from a JSON document
    CreateQuiz {
        #[arg(long)]
        course: String,
        #[arg(long)]
        topic: String,
        file: PathBuf,
    },
    /// Update a quiz header and append the document's questions to it
    AppendQuestions {
        #[arg(long)]
        course: String,
        #[arg(long)]
        topic: String,
        #[arg(long)]
        quiz: String,
        file: PathBuf,
    },
    /// Make an objective's links equal to exactly the given set
    SyncLinks {
        #[arg(long)]
        level: ObjectiveLevel,
        #[arg(long)]
        parent: String,
        #[arg(long)]
        objective: String,
        #[arg(long, value_delimiter = ',')]
        related: Vec<String>,
    },
    /// Delete one question from a quiz
    DeleteQuestion {
        #[arg(long)]
        quiz: String,
        #[arg(long)]
        question: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cfg = Config::from_env();
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(cfg.log_filter.clone()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let api = ApiClient::from_config(&cfg)?;
    tracing::debug!(base_url = %cfg.api_base_url, "backend configured");

    match cli.command {
        Command::CreateQuiz { course, topic, file } => {
            let doc = QuizDocument::load(&file).await?;
            let mut wizard = QuizWizard::new(course, topic);
            doc.author(&mut wizard)?;
            let report = wizard.submit(&api).await?;
            println!(
                "quiz {} created ({} records written)",
                report.quiz_id,
                report.created + report.updated
            );
        }
        Command::AppendQuestions { course, topic, quiz, file } => {
            let doc = QuizDocument::load(&file).await?;
            let existing = api
                .list_quizzes(&topic)
                .await?
                .into_iter()
                .find(|q| q.id == quiz)
                .with_context(|| format!("quiz {quiz} not found under topic {topic}"))?;
            let mut wizard = QuizWizard::edit(&api, course, topic, &existing).await?;
            doc.author(&mut wizard)?;
            let report = wizard.submit(&api).await?;
            println!(
                "quiz {} updated ({} created, {} updated)",
                report.quiz_id, report.created, report.updated
            );
        }
        Command::SyncLinks { level, parent, objective, related } => {
            let desired: BTreeSet<String> = related
                .into_iter()
                .map(|s| s.trim().to_owned())
                .filter(|s| !s.is_empty())
                .collect();
            if desired.is_empty() {
                bail!("an objective keeps at least one link");
            }
            let report = ObjectiveLinks::new(&api, level, &parent, &objective)
                .sync(&desired)
                .await?;
            println!("{} linked, {} unlinked", report.added.len(), report.removed.len());
        }
        Command::DeleteQuestion { quiz, question } => {
            api.delete_question(&quiz, &question).await?;
            api.invalidate(&paths::quiz_scope(&quiz)).await;
            println!("question {question} deleted");
        }
    }
    Ok(())
}
