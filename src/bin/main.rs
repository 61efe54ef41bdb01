use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::io::{stdin, stdout};
use tower_lsp_server::{LspService, Server};
use tsclassify::TsClassifyLs;
use tsclassify::analysis::semantic::legend::{token_modifier_names, token_type_name};
use tsclassify::analysis::semantic::{DecodedSemanticToken, decode_spans, legend, split_span};
use tsclassify::document::LineIndex;

/// A Language Server Protocol (LSP) server providing semantic tokens from tsserver
#[derive(Parser)]
#[command(name = "tsclassify")]
#[command(version)]
#[command(about = "A Language Server Protocol (LSP) server providing semantic tokens from tsserver")]
struct Cli {
    /// Log filter written to stderr (e.g. `debug`, `tsclassify::tsserver=trace`)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the semantic tokens legend as JSON
    Legend,
    /// Decode a classification span array against a source file
    Decode {
        /// Source file the spans refer to
        #[arg(long)]
        text: PathBuf,

        /// JSON file holding a flat `[offset, length, classification, ...]` array
        #[arg(long)]
        spans: PathBuf,
    },
}

/// A decoded token with its legend names, as printed by `decode`.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct NamedToken<'a> {
    #[serde(flatten)]
    token: &'a DecodedSemanticToken,
    token_type_name: Option<&'static str>,
    token_modifier_names: Vec<&'static str>,
}

impl<'a> NamedToken<'a> {
    fn new(token: &'a DecodedSemanticToken) -> Self {
        Self {
            token,
            token_type_name: token_type_name(token.token_type),
            token_modifier_names: token_modifier_names(token.token_modifiers),
        }
    }
}

fn init_logging(log_level: Option<&str>) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if let Some(filter) = log_level {
        builder.parse_filters(filter);
    }
    builder.target(env_logger::Target::Stderr).init();
}

fn print_legend() -> Result<(), String> {
    let json = serde_json::to_string_pretty(&legend())
        .map_err(|e| format!("Failed to serialize legend: {}", e))?;
    println!("{}", json);
    Ok(())
}

fn decode(text_path: &Path, spans_path: &Path) -> Result<(), String> {
    let text = std::fs::read_to_string(text_path)
        .map_err(|e| format!("Failed to read {}: {}", text_path.display(), e))?;
    let spans_json = std::fs::read_to_string(spans_path)
        .map_err(|e| format!("Failed to read {}: {}", spans_path.display(), e))?;
    let spans: Vec<u32> = serde_json::from_str(&spans_json)
        .map_err(|e| format!("Failed to parse {}: {}", spans_path.display(), e))?;
    if spans.len() % 3 != 0 {
        log::warn!("Span array length {} is not a multiple of 3", spans.len());
    }

    let index = LineIndex::new(&text);
    let mut tokens = Vec::new();
    for span in decode_spans(&spans) {
        split_span(&span, &index, &mut tokens);
    }

    for token in &tokens {
        let line = serde_json::to_string(&NamedToken::new(token))
            .map_err(|e| format!("Failed to serialize token: {}", e))?;
        println!("{}", line);
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_level.as_deref());

    let result = match cli.command {
        Some(Commands::Legend) => print_legend(),
        Some(Commands::Decode { text, spans }) => decode(&text, &spans),
        None => {
            let stdin = stdin();
            let stdout = stdout();

            let (service, socket) = LspService::new(TsClassifyLs::new);
            Server::new(stdin, stdout, socket).serve(service).await;
            Ok(())
        }
    };

    if let Err(message) = result {
        eprintln!("Error: {}", message);
        std::process::exit(1);
    }
}
