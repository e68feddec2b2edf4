use clap::Parser;
use formtree::prelude::*;
use serde::Deserialize;
use std::fs;
use std::io::{self, Write};
use std::time::Instant;

// --- JSON Deserialization Structs (Input Format Specific) ---
// These match the exported tree format and are only used here for conversion.

#[derive(Deserialize)]
struct RawTree {
    nodes: Vec<NodeDefinition>,
    #[serde(default)]
    variables: Vec<Variable>,
    #[serde(default)]
    modes: Vec<CalculationMode>,
}

/// A dynamic form tree evaluation CLI
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the tree definition JSON file
    tree_path: Option<String>,
    /// Optional path to a values JSON file (flat map of field values)
    values_path: Option<String>,

    /// Run in interactive mode to be prompted for inputs
    #[arg(short = 'i', long, help = "Run in interactive 'human' mode")]
    human: bool,
}

fn main() {
    let cli = Cli::parse();

    if cli.human {
        run_interactive();
    } else {
        run_non_interactive(cli);
    }
}

fn run_evaluation(tree_path: String, values_path: Option<String>) {
    let total_start = Instant::now();

    // --- 1. File Loading ---
    let load_start = Instant::now();
    let tree_json = fs::read_to_string(&tree_path).unwrap_or_else(|e| {
        exit_with_error(&format!("Failed to read tree file '{}': {}", &tree_path, e))
    });

    let context_data = if let Some(path) = &values_path {
        let values_json = fs::read_to_string(path).unwrap_or_else(|e| {
            exit_with_error(&format!("Failed to read values file '{}': {}", path, e))
        });
        serde_json::from_str(&values_json)
            .unwrap_or_else(|e| exit_with_error(&format!("Failed to parse values JSON: {}", e)))
    } else {
        println!("No values file provided. Evaluating against an empty context.");
        serde_json::Map::new()
    };
    let load_duration = load_start.elapsed();

    // --- 2. Parsing and Assembly ---
    let raw: RawTree = serde_json::from_str(&tree_json)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to parse tree JSON: {}", e)));

    let assemble_start = Instant::now();
    let tree = NodeTree::from_nodes(raw.nodes)
        .unwrap_or_else(|e| exit_with_error(&format!("Tree assembly failed: {}", e)));
    let registry = Registry::new(raw.variables, raw.modes);
    let assemble_duration = assemble_start.elapsed();

    println!(
        "\nTree assembled: {} nodes, {} variables, {} modes in {:?}",
        tree.len(),
        registry.variables().len(),
        registry.modes().len(),
        assemble_duration
    );

    // --- 3. Validation ---
    let session = Session::new(&tree, &registry);
    let findings = session.validate();
    if findings.is_empty() {
        println!("Validation passed.");
    } else {
        println!("Validation found {} issue(s):", findings.len());
        for finding in &findings {
            println!("  -> {}", finding);
        }
    }

    // --- 4. Evaluation ---
    println!("\nRunning Evaluation...");
    let ctx = ValueContext::from_json(&context_data);
    let eval_start = Instant::now();
    let evaluation = session.evaluate_tree(&ctx);
    let eval_duration = eval_start.elapsed();

    // --- 5. Results and Summary ---
    println!("\nEvaluation Finished!");
    println!(
        "  -> Visible nodes: {} of {}",
        evaluation.visible.len(),
        tree.len()
    );
    for result in &evaluation.results {
        let label = tree
            .get(&result.node_id)
            .map(|n| n.label.as_str())
            .unwrap_or("?");
        match &result.outcome {
            Ok(outcome) => println!("  -> {} ({}): {}", result.node_id, label, outcome),
            Err(e) => println!("  -> {} ({}): error: {}", result.node_id, label, e),
        }
    }

    let total_duration = total_start.elapsed();
    println!("\n--- Performance Summary ---");
    println!("File Loading:     {:?}", load_duration);
    println!("Tree Assembly:    {:?}", assemble_duration);
    println!("Evaluation:       {:?}", eval_duration);
    println!("---------------------------");
    println!("Total Execution:  {:?}", total_duration);
    println!();
}

/// Runs the CLI in non-interactive mode, taking all arguments from the command line.
fn run_non_interactive(cli: Cli) {
    let tree_path = cli.tree_path.unwrap_or_else(|| {
        exit_with_error("Tree path is required in non-interactive mode.");
    });
    run_evaluation(tree_path, cli.values_path);
}

/// Runs the CLI in an interactive, human-friendly mode with prompts.
fn run_interactive() {
    println!("--- Formtree Interactive Mode ---");

    let tree_path = prompt_for_input("Enter tree definition path", Some("data/tree.json"));
    let values_path_str = prompt_for_input("Enter values path (optional)", Some("data/values.json"));

    let values_path = if values_path_str.is_empty() {
        None
    } else {
        Some(values_path_str)
    };

    run_evaluation(tree_path, values_path);
}

/// A helper function to prompt the user and read a line of input.
fn prompt_for_input(prompt_text: &str, default: Option<&str>) -> String {
    let mut line = String::new();
    let default_prompt = default.map_or("".to_string(), |d| format!(" [default: {}]", d));

    print!("> {}{}: ", prompt_text, default_prompt);
    io::stdout().flush().unwrap();

    io::stdin()
        .read_line(&mut line)
        .expect("Failed to read line");
    let trimmed = line.trim().to_string();

    if trimmed.is_empty() {
        default.unwrap_or("").to_string()
    } else {
        trimmed
    }
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}
