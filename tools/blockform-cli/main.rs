use blockform::prelude::*;
use clap::{Parser, Subcommand};
use std::fs;
use std::io::{self, Write};
use std::time::Instant;
use tracing::info;

/// Resolve workflow block definitions against form inputs
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Fill in a block interactively, prompting for each visible field
    #[arg(short = 'i', long, value_name = "BLOCK_PATH")]
    human: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Resolve a block file against an inputs file and print the tool call
    Resolve {
        /// Path to the block definition JSON file
        block_path: String,
        /// Path to the JSON object holding the raw form values
        inputs_path: String,
    },
    /// Print the fields that are active for the given inputs
    Active {
        block_path: String,
        /// Optional inputs; without them only unconditional fields and defaults apply
        inputs_path: Option<String>,
    },
    /// Compile block files and write them into a schema bundle
    Bundle {
        /// Where to write the bundle
        out_path: String,
        /// Block definition JSON files to include
        #[arg(required = true)]
        block_paths: Vec<String>,
    },
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    match (cli.human, cli.command) {
        (Some(block_path), _) => run_interactive(&block_path),
        (None, Some(Command::Resolve {
            block_path,
            inputs_path,
        })) => run_resolve(&block_path, &inputs_path),
        (None, Some(Command::Active {
            block_path,
            inputs_path,
        })) => run_active(&block_path, inputs_path.as_deref()),
        (None, Some(Command::Bundle {
            out_path,
            block_paths,
        })) => run_bundle(&out_path, &block_paths),
        (None, None) => exit_with_error("Nothing to do. Pass a subcommand or --human <BLOCK_PATH>."),
    }
}

fn init_tracing() {
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into());
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn load_block(block_path: &str) -> CompiledBlock {
    let text = fs::read_to_string(block_path).unwrap_or_else(|e| {
        exit_with_error(&format!("Failed to read block file '{}': {}", block_path, e))
    });
    let schema = BlockFile::from_json(&text)
        .and_then(IntoBlockSchema::into_block_schema)
        .unwrap_or_else(|e| {
            exit_with_error(&format!("Failed to convert block '{}': {}", block_path, e))
        });
    SchemaCompiler::builder(schema)
        .build()
        .compile()
        .unwrap_or_else(|e| exit_with_error(&format!("Invalid block '{}': {}", block_path, e)))
}

fn load_inputs(inputs_path: &str) -> RawInputMap {
    let text = fs::read_to_string(inputs_path).unwrap_or_else(|e| {
        exit_with_error(&format!("Failed to read inputs file '{}': {}", inputs_path, e))
    });
    let document: serde_json::Value = serde_json::from_str(&text)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to parse inputs JSON: {}", e)));
    if !document.is_object() {
        exit_with_error("The inputs file must contain a JSON object");
    }
    raw_inputs_from_json(document)
}

fn run_resolve(block_path: &str, inputs_path: &str) {
    let start = Instant::now();
    let block = load_block(block_path);
    let inputs = load_inputs(inputs_path);

    let outcome = block.resolve(&inputs);
    info!(block = block.block_type(), elapsed = ?start.elapsed(), "resolution finished");
    print_outcome(outcome);
}

fn print_outcome(outcome: std::result::Result<ResolvedParameters, ResolutionErrors>) {
    match outcome {
        Ok(call) => {
            let rendered = serde_json::to_string_pretty(&call)
                .unwrap_or_else(|e| exit_with_error(&format!("Failed to render result: {}", e)));
            println!("{}", rendered);
        }
        Err(errors) => {
            eprintln!("\nResolution failed with {} problem(s):", errors.len());
            for error in errors.iter() {
                eprintln!("  -> {}", error);
            }
            std::process::exit(1);
        }
    }
}

fn run_active(block_path: &str, inputs_path: Option<&str>) {
    let block = load_block(block_path);
    let inputs = inputs_path.map(load_inputs).unwrap_or_default();
    for key in block.active_fields(&inputs) {
        let label = block.field(&key).map(FieldSchema::label).unwrap_or(&key);
        println!("{}\t{}", key, label);
    }
}

fn run_bundle(out_path: &str, block_paths: &[String]) {
    let mut registry = InMemoryRegistry::new();
    for path in block_paths {
        registry
            .insert(load_block(path))
            .unwrap_or_else(|e| exit_with_error(&format!("Cannot add '{}': {}", path, e)));
    }
    let bundle = registry
        .to_bundle()
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to build bundle: {}", e)));
    bundle
        .save(out_path)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to write bundle: {}", e)));
    info!(blocks = registry.len(), path = out_path, "bundle written");
    println!("Wrote {} block(s) to {}", registry.len(), out_path);
}

/// Runs the CLI in an interactive, human-friendly mode with prompts.
fn run_interactive(block_path: &str) {
    let block = load_block(block_path);
    println!("--- Blockform Interactive Mode: {} ---", block.block_type());
    println!("Press enter to leave a field empty.\n");

    let mut inputs = RawInputMap::new();
    let mut answered: Vec<String> = Vec::new();

    loop {
        // Visibility can change after every answer, so recompute each round.
        let next = block
            .active_fields(&inputs)
            .into_iter()
            .find(|key| !answered.contains(key));

        if let Some(key) = next {
            let Some(field) = block.field(&key) else {
                answered.push(key);
                continue;
            };
            let answer = prompt_for_field(field)
                .unwrap_or_else(|e| exit_with_error(&format!("Failed to read input: {}", e)));
            if answer.is_empty() {
                inputs.remove(&key);
            } else {
                inputs.insert(key.clone(), RawValue::Text(answer));
            }
            answered.push(key);
            continue;
        }

        match block.resolve(&inputs) {
            Ok(call) => {
                print_outcome(Ok(call));
                return;
            }
            Err(errors) => {
                println!("\nThe block cannot be resolved yet:");
                for error in errors.iter() {
                    println!("  -> {}", error);
                }
                let retry = prompt_for_input("Fix these fields?", Some("y"))
                    .unwrap_or_else(|e| exit_with_error(&format!("Failed to read input: {}", e)));
                if !retry.eq_ignore_ascii_case("y") {
                    std::process::exit(1);
                }
                let offending: Vec<String> = errors
                    .iter()
                    .flat_map(|e| e.fields())
                    .map(str::to_string)
                    .collect();
                answered.retain(|key| !offending.contains(key));
            }
        }
    }
}

fn prompt_for_field(field: &FieldSchema) -> io::Result<String> {
    let mut text = format!("{} ({})", field.label(), field.value_type);
    if field.required {
        text.push_str(" *");
    }
    if !field.options.is_empty() {
        let ids: Vec<&str> = field.options.iter().map(|o| o.id.as_str()).collect();
        text.push_str(&format!(" [{}]", ids.join("/")));
    }
    prompt_for_input(&text, None)
}

/// A helper function to prompt the user and read a line of input.
fn prompt_for_input(prompt_text: &str, default: Option<&str>) -> io::Result<String> {
    let mut line = String::new();
    let default_prompt = default.map_or("".to_string(), |d| format!(" [default: {}]", d));

    print!("> {}{}: ", prompt_text, default_prompt);
    io::stdout().flush()?;
    io::stdin().read_line(&mut line)?;
    let trimmed = line.trim().to_string();

    if trimmed.is_empty() {
        Ok(default.unwrap_or("").to_string())
    } else {
        Ok(trimmed)
    }
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}
