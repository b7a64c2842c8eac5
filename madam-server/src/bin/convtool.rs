use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use madam_core::edit::{NodeField, NodeKind, non_blank};
use madam_core::validate::validate;
use madam_core::{Action, Choice, ConversationGraph, Secret};
use std::path::{Path, PathBuf};

// cargo run --bin convtool -- check assets/conversation.json
// cargo run --bin convtool -- rename assets/conversation.json served_latte latte
// cargo run --bin convtool -- set assets/conversation.json start sprite_text "Bonjour!"

#[derive(Debug, Parser)]
#[command(name = "convtool", version, about = "Inspect and edit conversation assets")]
struct Args {
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Debug, Subcommand)]
enum Cmd {
    /// Validate an asset, exits non-zero on errors
    Check { file: PathBuf },

    /// List every edge of the graph
    Edges { file: PathBuf },

    /// Rename a node and every reference to it
    Rename {
        file: PathBuf,
        old: String,
        new: String,
        /// Write to this file instead of in place
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Remove a node and clear references to it
    Remove {
        file: PathBuf,
        node: String,
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Add a node from a template
    Add {
        file: PathBuf,
        node: String,
        /// plain, choices or entry
        #[arg(long, default_value = "plain")]
        kind: String,
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Append a choice to a node
    AddChoice {
        file: PathBuf,
        node: String,
        text: String,
        /// Target node (ignored when an action is given)
        #[arg(long)]
        next: Option<String>,
        /// e.g. save_latte, check_espresso, increase_spare, kill, end_conversation
        #[arg(long)]
        action: Option<String>,
        /// Drink handed over when the choice is picked
        #[arg(long)]
        item: Option<String>,
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Append a secret answer to an entry node
    AddSecret {
        file: PathBuf,
        node: String,
        input: String,
        next: String,
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Remove the n-th choice of a node (as numbered by `edges`)
    RemoveChoice {
        file: PathBuf,
        node: String,
        number: usize,
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Remove the n-th secret of an entry node
    RemoveSecret {
        file: PathBuf,
        node: String,
        number: usize,
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Set a text property, an empty value clears the optional ones
    Set {
        file: PathBuf,
        node: String,
        /// sprite_text, sprite_image, prompt_text or default_next_node_id
        field: String,
        value: String,
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    match args.cmd {
        Cmd::Check { file } => {
            let graph = read_graph(&file)?;
            let report = validate(&graph);
            for issue in &report.issues {
                println!("{issue}");
            }
            println!(
                "{} nodes, {} errors, {} warnings",
                graph.len(),
                report.errors().count(),
                report.warnings().count()
            );
            if report.has_errors() {
                bail!("{} is not a valid conversation", file.display());
            }
        }
        Cmd::Edges { file } => {
            let graph = read_graph(&file)?;
            for (id, node) in graph.iter() {
                for edge in node.edges() {
                    println!("{id}: {edge}");
                }
            }
        }
        Cmd::Rename { file, old, new, out } => {
            let mut graph = read_graph(&file)?;
            let count = graph.rename_node(&old, &new)?;
            write_graph(out.as_deref().unwrap_or(&file), &graph)?;
            println!("renamed `{old}` to `{new}`, {count} references updated");
        }
        Cmd::Remove { file, node, out } => {
            let mut graph = read_graph(&file)?;
            let count = graph.remove_node(&node)?;
            write_graph(out.as_deref().unwrap_or(&file), &graph)?;
            println!("removed `{node}`, {count} references cleared");
        }
        Cmd::Add { file, node, kind, out } => {
            let kind = NodeKind::parse(&kind).with_context(|| format!("unknown node kind `{kind}`"))?;
            let mut graph = read_graph(&file)?;
            graph.add_node(&node, kind)?;
            write_graph(out.as_deref().unwrap_or(&file), &graph)?;
            println!("added `{node}`");
        }
        Cmd::AddChoice {
            file,
            node,
            text,
            next,
            action,
            item,
            out,
        } => {
            let action = non_blank(action).map(|a| a.parse::<Action>()).transpose()?;
            let mut graph = read_graph(&file)?;
            graph.add_choice(
                &node,
                Choice {
                    text,
                    item,
                    action,
                    next_node_id: next,
                },
            )?;
            write_graph(out.as_deref().unwrap_or(&file), &graph)?;
            println!("added choice to `{node}`");
        }
        Cmd::AddSecret {
            file,
            node,
            input,
            next,
            out,
        } => {
            let mut graph = read_graph(&file)?;
            graph.add_secret(&node, Secret { input, next_node_id: next })?;
            write_graph(out.as_deref().unwrap_or(&file), &graph)?;
            println!("added secret to `{node}`");
        }
        Cmd::RemoveChoice {
            file,
            node,
            number,
            out,
        } => {
            let mut graph = read_graph(&file)?;
            let removed = graph.remove_choice(&node, position(number)?)?;
            write_graph(out.as_deref().unwrap_or(&file), &graph)?;
            println!("removed choice {:?} from `{node}`", removed.text);
        }
        Cmd::RemoveSecret {
            file,
            node,
            number,
            out,
        } => {
            let mut graph = read_graph(&file)?;
            let removed = graph.remove_secret(&node, position(number)?)?;
            write_graph(out.as_deref().unwrap_or(&file), &graph)?;
            println!("removed secret {:?} from `{node}`", removed.input);
        }
        Cmd::Set {
            file,
            node,
            field,
            value,
            out,
        } => {
            let field = NodeField::parse(&field).with_context(|| format!("unknown field `{field}`"))?;
            let mut graph = read_graph(&file)?;
            graph.set_field(&node, field, &value)?;
            write_graph(out.as_deref().unwrap_or(&file), &graph)?;
            println!("updated `{node}`");
        }
    }

    Ok(())
}

/// Choices and secrets are numbered from 1 on the command line
fn position(number: usize) -> anyhow::Result<usize> {
    number.checked_sub(1).context("numbers start at 1")
}

fn read_graph(path: &Path) -> anyhow::Result<ConversationGraph> {
    let data = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    ConversationGraph::from_json(&data).with_context(|| format!("parsing {}", path.display()))
}

fn write_graph(path: &Path, graph: &ConversationGraph) -> anyhow::Result<()> {
    let mut json = graph.to_json_pretty()?;
    json.push('\n');
    std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))
}
