use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use findoc_core::{
    AnalysisRecord, AnalysisRequest, Analyzer, DEFAULT_QUERY, DocumentReader, OpenAiBackend,
    persist_record,
};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::runtime::Runtime;
use tracing::info;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(
    name = "findoc-cli",
    version,
    about = "Financial document analysis pipeline"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Analyze a local financial PDF end-to-end.
    Analyze(AnalyzeArgs),
    /// Print the page-marked text the document-reading agents see.
    Extract(ExtractArgs),
}

#[derive(Args, Debug)]
struct AnalyzeArgs {
    /// Path to the PDF to analyze.
    #[arg(long)]
    file: PathBuf,

    /// Analysis request passed to the pipeline.
    #[arg(long, default_value = DEFAULT_QUERY)]
    query: String,

    /// Persist the analysis record under this directory.
    #[arg(long)]
    output_dir: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct ExtractArgs {
    /// Path to the PDF to extract.
    #[arg(long)]
    file: PathBuf,
}

fn main() -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,findoc_core=info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let rt = Runtime::new()?;
    rt.block_on(async move {
        match cli.command {
            Command::Analyze(args) => analyze_command(args).await?,
            Command::Extract(args) => extract_command(args)?,
        }
        Ok::<(), anyhow::Error>(())
    })?;

    Ok(())
}

async fn analyze_command(args: AnalyzeArgs) -> Result<()> {
    info!(file = %args.file.display(), "starting analysis");

    let backend = Arc::new(OpenAiBackend::from_env()?);
    let analyzer = Analyzer::new(backend);

    let request = AnalysisRequest::new(args.query.clone(), args.file.clone());
    let analysis = analyzer.analyze(&request).await?;

    if let Some(dir) = args.output_dir {
        let file_name = args
            .file
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let record = AnalysisRecord::new(
            file_name,
            args.file.display().to_string(),
            args.query,
            analysis.clone(),
        );
        let path = persist_record(&dir, &Uuid::new_v4().to_string(), &record)?;
        info!(path = %path.display(), "analysis record written");
    }

    println!("{}", serde_json::to_string_pretty(&analysis)?);
    Ok(())
}

fn extract_command(args: ExtractArgs) -> Result<()> {
    let text = DocumentReader.read(&args.file)?;
    println!("{text}");
    Ok(())
}
