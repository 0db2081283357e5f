use clap::{Parser, Subcommand};
use std::io::Read;
use std::path::Path;
use tagtree::{NodeData, NodeId, ParseOptions, ParseResult, SerializeOptions, Tree};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tagtree")]
#[command(about = "Parse markup, query it with selectors and write it back out")]
#[command(version)]
struct Cli {
    /// Fail on the first syntax error
    #[arg(long, global = true)]
    strict: bool,

    /// Report syntax errors instead of silently skipping them
    #[arg(long, global = true)]
    collect_errors: bool,

    /// JSON file with parser options ({"collectErrors", "strict", "fragmentContext"})
    #[arg(long, global = true, value_name = "FILE")]
    options: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Re-serialize a file as canonical HTML
    Html {
        /// Input file, or - for stdin
        path: String,

        /// One element per line
        #[arg(long)]
        pretty: bool,

        /// Spaces per nesting level with --pretty
        #[arg(long, default_value_t = 2)]
        indent: usize,
    },

    /// Print the text content of a file
    Text {
        /// Input file, or - for stdin
        path: String,
    },

    /// Print every element matching a selector, one per line
    Query {
        /// Input file, or - for stdin
        path: String,

        /// Selector list, e.g. "ul.nav > li, #main p"
        selector: String,

        /// Print text content instead of markup
        #[arg(long)]
        text: bool,
    },

    /// Report syntax errors without producing output
    Check {
        /// Input file, or - for stdin
        path: String,
    },

    /// Dump the node tree with source spans
    Tree {
        /// Input file, or - for stdin
        path: String,
    },
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let options = match load_options(&cli) {
        Ok(options) => options,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    match &cli.command {
        Command::Html {
            path,
            pretty,
            indent,
        } => cmd_html(path, &options, *pretty, *indent),
        Command::Text { path } => cmd_text(path, &options),
        Command::Query {
            path,
            selector,
            text,
        } => cmd_query(path, &options, selector, *text),
        Command::Check { path } => cmd_check(path, &options),
        Command::Tree { path } => cmd_tree(path, &options),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("TAGTREE_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Options file first, then command-line flags on top.
fn load_options(cli: &Cli) -> Result<ParseOptions, String> {
    let mut options = match &cli.options {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .map_err(|e| format!("reading options {path}: {e}"))?;
            serde_json::from_str(&json).map_err(|e| format!("invalid options {path}: {e}"))?
        }
        None => ParseOptions::default(),
    };

    if cli.strict {
        options.strict = true;
    }
    if cli.collect_errors {
        options.collect_errors = true;
    }
    Ok(options)
}

fn read_source(path: &str) -> String {
    if path == "-" {
        let mut source = String::new();
        if let Err(e) = std::io::stdin().read_to_string(&mut source) {
            eprintln!("Error reading stdin: {e}");
            std::process::exit(1);
        }
        return source;
    }

    let p = Path::new(path);
    if !p.exists() {
        eprintln!("Error: file not found: {path}");
        std::process::exit(1);
    }
    match std::fs::read_to_string(p) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("Error reading {path}: {e}");
            std::process::exit(1);
        }
    }
}

fn parse_or_exit(path: &str, options: &ParseOptions) -> ParseResult {
    let source = read_source(path);
    match tagtree::parse(&source, options) {
        Ok(result) => {
            for e in result.errors() {
                eprintln!("{path}: {e}");
            }
            result
        }
        Err(e) => {
            eprintln!("{path}: {e}");
            std::process::exit(1);
        }
    }
}

fn cmd_html(path: &str, options: &ParseOptions, pretty: bool, indent: usize) {
    let result = parse_or_exit(path, options);
    let html = result.to_html_with(&SerializeOptions { pretty, indent });
    if pretty {
        print!("{html}");
    } else {
        println!("{html}");
    }
}

fn cmd_text(path: &str, options: &ParseOptions) {
    let result = parse_or_exit(path, options);
    println!("{}", result.to_text());
}

fn cmd_query(path: &str, options: &ParseOptions, selector: &str, text: bool) {
    let result = parse_or_exit(path, options);
    for node in result.query(selector) {
        if text {
            println!("{}", node.text_content());
        } else {
            println!("{}", result.outer_html(node.id()));
        }
    }
}

fn cmd_check(path: &str, options: &ParseOptions) {
    let options = ParseOptions {
        collect_errors: true,
        ..options.clone()
    };
    let result = parse_or_exit(path, &options);

    if !result.errors().is_empty() {
        eprintln!("{path}: {} syntax error(s)", result.errors().len());
        std::process::exit(1);
    }

    eprintln!("OK: {path}");
}

fn cmd_tree(path: &str, options: &ParseOptions) {
    let result = parse_or_exit(path, options);
    print!("{}", dump_tree(result.tree()));
}

// =========================================================================
// Tree dump
// =========================================================================

fn dump_tree(tree: &Tree) -> String {
    let mut out = String::new();
    let mut stack = vec![(tree.root(), 0)];

    while let Some((id, depth)) = stack.pop() {
        dump_node(tree, id, depth, &mut out);
        stack.extend(tree.children(id).iter().rev().map(|&child| (child, depth + 1)));
    }
    out
}

fn dump_node(tree: &Tree, id: NodeId, depth: usize, out: &mut String) {
    let node = &tree[id];
    out.push_str(&"  ".repeat(depth));

    match node.data() {
        NodeData::Document => out.push_str("#document"),
        NodeData::Doctype { name, .. } => out.push_str(&format!("<!DOCTYPE {name}>")),
        NodeData::Element(el) => {
            out.push('<');
            out.push_str(&el.tag);
            for (name, value) in el.attributes.iter() {
                out.push_str(&format!(" {name}={value:?}"));
            }
            out.push('>');
        }
        NodeData::Text(text) => out.push_str(&format!("#text {text:?}")),
        NodeData::Comment(text) => out.push_str(&format!("#comment {text:?}")),
    }

    let bound = |index: Option<usize>| index.map_or_else(|| "?".to_string(), |i| i.to_string());
    out.push_str(&format!(
        " [{}..{}]\n",
        bound(node.start_index()),
        bound(node.end_index())
    ));
}
