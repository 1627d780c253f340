mod analyze;
mod collect;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use dotenv::dotenv;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Job titles to search postings for, defaults to the AI engineering titles
    #[clap(long = "title")]
    titles: Vec<String>,

    /// Country the postings should be located in
    #[clap(long, default_value = "Egypt")]
    country: String,

    /// Total number of postings to analyze
    #[clap(long, default_value_t = 20)]
    posts: usize,

    /// Path to the resume PDF
    #[clap(long, default_value = "Resume.pdf")]
    resume: PathBuf,

    /// Directory the artifacts are written to
    #[clap(long, default_value = "outputs")]
    output_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Fetch postings only and cache them as JSON
    Collect {},
    /// Run the full pipeline and write the report
    Analyze {
        /// Reuse a cached postings file instead of querying the search API
        #[clap(long)]
        postings: Option<PathBuf>,
    },
}

const DEFAULT_JOB_TITLES: [&str; 3] = ["AI Engineer", "GenAI Engineer", "Generative AI Engineer"];

#[tokio::main]
async fn main() {
    dotenv().ok();
    env_logger::init();
    let args = Cli::parse();
    let titles = if args.titles.is_empty() {
        DEFAULT_JOB_TITLES
            .into_iter()
            .map(String::from)
            .collect::<Vec<String>>()
    } else {
        args.titles
    };
    match args.command {
        Commands::Collect {} => {
            collect::collect(&titles, &args.country, args.posts, &args.output_dir).await
        }
        Commands::Analyze { postings } => {
            analyze::analyze(
                &titles,
                &args.country,
                args.posts,
                &args.resume,
                &args.output_dir,
                postings.as_deref(),
            )
            .await
        }
    };
}
