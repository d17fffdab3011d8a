use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use client_core::{DocumentSession, HttpDocumentClient, JobOutcome};
use futures::future::join_all;
use shared::domain::{DocumentKind, FeedbackKind, Project, ProjectId, SectionId};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;

use config::{load_settings, normalize_server_url, Settings};

#[derive(Parser, Debug)]
#[command(name = "docgen", about = "Create and generate AI-written documents")]
struct Cli {
    /// Backend base url, overrides config and environment.
    #[arg(long, global = true)]
    server_url: Option<String>,
    /// Bearer token sent with every request.
    #[arg(long, global = true)]
    token: Option<String>,
    /// Config file to read instead of ./docgen.toml.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a project with an outline.
    Create {
        #[arg(long)]
        kind: DocumentKind,
        #[arg(long)]
        title: String,
        #[arg(long)]
        topic: String,
        /// Section or slide title, in order. Repeat for each one.
        #[arg(long = "section", required = true)]
        sections: Vec<String>,
    },
    List,
    Show {
        project_id: i64,
    },
    Delete {
        project_id: i64,
    },
    /// Generate content for one or more sections concurrently.
    Generate {
        project_id: i64,
        #[arg(long = "section", required = true)]
        sections: Vec<i64>,
    },
    GenerateAll {
        project_id: i64,
    },
    Refine {
        project_id: i64,
        section_id: i64,
        #[arg(long)]
        prompt: String,
    },
    Feedback {
        project_id: i64,
        section_id: i64,
        #[arg(long)]
        kind: FeedbackKind,
        #[arg(long)]
        comment: Option<String>,
    },
    Export {
        project_id: i64,
        /// Directory to write into; defaults to the configured download dir.
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },
}

fn resolve_settings(cli: &Cli) -> Result<Settings> {
    let mut settings = load_settings(cli.config.as_deref())?;
    if let Some(url) = &cli.server_url {
        settings.server_url = normalize_server_url(url)?;
    }
    if let Some(token) = &cli.token {
        settings.auth_token = Some(token.clone());
    }
    Ok(settings)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = resolve_settings(&cli)?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&settings.log_filter))
        .init();

    let mut client = HttpDocumentClient::new(settings.server_url.clone());
    if let Some(token) = &settings.auth_token {
        client = client.with_auth_token(token.clone());
    }
    info!(server_url = %settings.server_url, "docgen: using backend");
    let mut session = DocumentSession::new(Arc::new(client));

    match cli.command {
        Command::Create {
            kind,
            title,
            topic,
            sections,
        } => {
            let wizard = session.open_wizard();
            wizard.select_kind(kind)?;
            wizard.advance()?;
            wizard.set_title(title)?;
            wizard.set_topic(topic)?;
            wizard.advance()?;
            for (index, section) in sections.into_iter().enumerate() {
                if index > 0 {
                    wizard.add_section()?;
                }
                wizard.set_section_title(index, section)?;
            }
            let project = session
                .submit_wizard()
                .await
                .context("failed to create project")?;
            println!("created project {}", project.id);
            print_project(&project);
        }
        Command::List => {
            let projects = session.list_projects().await?;
            if projects.is_empty() {
                println!("no projects");
            }
            for project in projects {
                println!(
                    "{:>5}  {}  {}  ({})",
                    project.id,
                    project.document_type,
                    project.title,
                    project.created_at.format("%Y-%m-%d %H:%M")
                );
            }
        }
        Command::Show { project_id } => {
            let project = session.open_project(ProjectId(project_id)).await?;
            print_project(&project);
        }
        Command::Delete { project_id } => {
            session.delete_project(ProjectId(project_id)).await?;
            println!("deleted project {project_id}");
        }
        Command::Generate {
            project_id,
            sections,
        } => {
            session.open_project(ProjectId(project_id)).await?;
            let orchestrator = session.orchestrator();
            let outcomes = join_all(
                sections
                    .iter()
                    .map(|id| orchestrator.generate_one(SectionId(*id))),
            )
            .await;
            for (id, outcome) in sections.iter().zip(outcomes) {
                report(&format!("section {id}"), outcome?);
            }
            if let Some(project) = session.project() {
                print_project(&project);
            }
        }
        Command::GenerateAll { project_id } => {
            let project_id = ProjectId(project_id);
            session.open_project(project_id).await?;
            let outcome = session.orchestrator().generate_all(project_id).await?;
            report("all sections", outcome);
            if let Some(project) = session.project() {
                print_project(&project);
            }
        }
        Command::Refine {
            project_id,
            section_id,
            prompt,
        } => {
            session.open_project(ProjectId(project_id)).await?;
            let section_id = SectionId(section_id);
            let outcome = session
                .orchestrator()
                .refine_one(section_id, &prompt)
                .await?;
            report(&format!("section {section_id}"), outcome);
            if let Some(section) = session.project().and_then(|p| p.section(section_id).cloned()) {
                println!("{}", section.content.unwrap_or_default());
            }
        }
        Command::Feedback {
            project_id,
            section_id,
            kind,
            comment,
        } => {
            session.open_project(ProjectId(project_id)).await?;
            let outcome = session
                .orchestrator()
                .record_feedback(SectionId(section_id), kind, comment.as_deref())
                .await?;
            report(&format!("{kind} for section {section_id}"), outcome);
        }
        Command::Export {
            project_id,
            out_dir,
        } => {
            session.open_project(ProjectId(project_id)).await?;
            let exported = session.export().await?;
            let dir = out_dir.unwrap_or(settings.download_dir);
            tokio::fs::create_dir_all(&dir)
                .await
                .with_context(|| format!("failed to create '{}'", dir.display()))?;
            let path = dir.join(&exported.file_name);
            tokio::fs::write(&path, &exported.bytes)
                .await
                .with_context(|| format!("failed to write '{}'", path.display()))?;
            println!("wrote {} ({} bytes)", path.display(), exported.bytes.len());
        }
    }

    Ok(())
}

fn report(label: &str, outcome: JobOutcome) {
    match outcome {
        JobOutcome::Succeeded => println!("{label}: done"),
        JobOutcome::Busy => println!("{label}: already running"),
        JobOutcome::Failed(message) => eprintln!("{label}: failed: {message}"),
    }
}

fn print_project(project: &Project) {
    let unit = project.document_type.unit_label();
    println!(
        "#{} {} [{}] {}/{} {unit}s generated",
        project.id,
        project.title,
        project.document_type,
        project.generated_count(),
        project.sections.len()
    );
    println!("topic: {}", project.topic);
    for section in &project.sections {
        match &section.content {
            Some(content) => println!("  [{}] {}\n{}\n", section.id, section.title, content),
            None => println!("  [{}] {} (not generated)", section.id, section.title),
        }
    }
}
