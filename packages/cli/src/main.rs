//! Command-line driver: feeds one synthetic request through the engine
//! against a local directory and prints the response.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use url::Url;

use webmount_fs::LocalFs;
use webmount_server::{Request, Router, ServerConfig};

/// Serve a directory through the webmount engine, one request at a time.
#[derive(Parser, Debug)]
#[command(name = "webmount")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory backing the virtual filesystem
    #[arg(long, default_value = ".")]
    root: PathBuf,

    /// Mount route the engine answers under
    #[arg(long, default_value = "/fs")]
    route: String,

    /// Refuse writes: PUT and DELETE fall through unmatched
    #[arg(long)]
    read_only: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// GET a virtual path
    Get {
        /// Virtual path below the mount (e.g. /notes/a.txt)
        path: String,

        /// Ask for the JSON envelope instead of raw contents
        #[arg(long)]
        json: bool,

        /// Ask for an attachment disposition
        #[arg(long)]
        download: bool,
    },
    /// PUT a virtual path
    Put {
        path: String,

        /// File contents (omit for a bodyless PUT)
        #[arg(long)]
        contents: Option<String>,

        /// Create or stamp instead of writing contents
        #[arg(long)]
        touch: bool,

        /// Create a directory instead of a file
        #[arg(long)]
        folder: bool,
    },
    /// DELETE a virtual path
    Delete { path: String },
}

fn request_url(route: &str, path: &str, query: &[&str]) -> Result<Url, url::ParseError> {
    let mut target = format!("http://localhost{}{}", route, path);
    if !query.is_empty() {
        target.push('?');
        target.push_str(&query.join("&"));
    }
    Url::parse(&target)
}

fn build_request(route: &str, command: &Command) -> Result<Request, url::ParseError> {
    match command {
        Command::Get {
            path,
            json,
            download,
        } => {
            let mut query = Vec::new();
            if *json {
                query.push("json");
            }
            if *download {
                query.push("download");
            }
            Request::get(request_url(route, path, &query)?.as_str())
        }
        Command::Put {
            path,
            contents,
            touch,
            folder,
        } => {
            let mut query = Vec::new();
            if *touch {
                query.push("touch");
            }
            if *folder {
                query.push("folder");
            }
            let request = Request::put(request_url(route, path, &query)?.as_str())?;
            Ok(match contents {
                Some(text) => request.with_bytes(text.clone().into_bytes()),
                None => request,
            })
        }
        Command::Delete { path } => {
            Request::delete(request_url(route, path, &[])?.as_str())
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    let fs = match LocalFs::new(args.root.clone()) {
        Ok(fs) => fs,
        Err(e) => {
            eprintln!("Error: cannot open root {}: {}", args.root.display(), e);
            return ExitCode::FAILURE;
        }
    };

    let config = ServerConfig {
        route: args.route.clone(),
        readwrite: !args.read_only,
        ..ServerConfig::default()
    };
    let router = Router::new(config, Arc::new(fs));

    let request = match build_request(&args.route, &args.command) {
        Ok(request) => request,
        Err(e) => {
            eprintln!("Error: bad request path: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match router.handle(request).await {
        Some(response) => {
            println!("{}", response.status);
            for (name, value) in &response.headers {
                println!("{}: {}", name, value.to_str().unwrap_or("<binary>"));
            }
            println!();
            println!("{}", String::from_utf8_lossy(&response.body));
            if response.is_success() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        None => {
            eprintln!("Error: no rule matched (read-only mount or path outside the route)");
            ExitCode::FAILURE
        }
    }
}
