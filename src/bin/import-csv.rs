use std::path::PathBuf;

use clap::Parser;
use task_api::import::{import_file, TasksClient};
use task_api::observability::logging;

#[derive(Parser)]
#[command(name = "import-csv")]
#[command(about = "Create one task per row of a CSV file", long_about = None)]
struct Cli {
    /// API base URL.
    #[arg(short, long, default_value = "http://localhost:3333")]
    url: String,

    /// Field delimiter.
    #[arg(short, long, default_value_t = ',')]
    delimiter: char,

    /// File to import; the first line is a header.
    #[arg(default_value = "./tasks.csv")]
    file: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    logging::init_logging("info");

    if !cli.delimiter.is_ascii() {
        return Err(format!("delimiter must be an ASCII character, got {:?}", cli.delimiter).into());
    }
    let delimiter = cli.delimiter as u8;

    let client = TasksClient::new(&cli.url);
    match import_file(&client, &cli.file, delimiter).await {
        Ok(summary) => {
            println!(
                "Import CSV done! {} sent, {} created, {} rejected",
                summary.sent, summary.created, summary.rejected
            );
            Ok(())
        }
        Err(e) => {
            eprintln!("Error on import CSV: {}", e);
            Err(e.into())
        }
    }
}
