use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use schemascope_core::{EdgeKind, ItemId, ItemKind, SchemaDocument};
use schemascope_graph::{Direction, GraphBuilder, QueryService, edge_kind_label, section_label};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum EdgeKindArg {
    Inheritance,
    ClassRange,
    ClassSlot,
    SlotRange,
    MapsTo,
}

impl From<EdgeKindArg> for EdgeKind {
    fn from(arg: EdgeKindArg) -> Self {
        match arg {
            EdgeKindArg::Inheritance => EdgeKind::Inheritance,
            EdgeKindArg::ClassRange => EdgeKind::ClassRange,
            EdgeKindArg::ClassSlot => EdgeKind::ClassSlot,
            EdgeKindArg::SlotRange => EdgeKind::SlotRange,
            EdgeKindArg::MapsTo => EdgeKind::MapsTo,
        }
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to a processed schema JSON document
    schema: PathBuf,

    /// Item to describe (class, slot, enum, type, or variable id)
    #[arg(short, long)]
    item: Option<String>,

    /// Restrict printed edges to these kinds
    #[arg(long, value_enum, value_delimiter = ',')]
    edges: Option<Vec<EdgeKindArg>>,

    /// Use the three-panel link policy (class -> slot -> range) instead of
    /// direct class -> range edges
    #[arg(long)]
    three_panel: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let doc = SchemaDocument::from_json_file(&args.schema)
        .with_context(|| format!("loading {}", args.schema.display()))?;
    let graph = GraphBuilder::build(&doc)?;
    tracing::debug!(
        items = graph.item_count(),
        edges = graph.edge_count(),
        "schema graph built"
    );
    let query = QueryService::new(&graph);

    println!(
        "{}: {} items, {} edges",
        args.schema.display(),
        graph.item_count(),
        graph.edge_count()
    );
    for kind in ItemKind::ALL {
        let count = graph.items().filter(|i| i.kind() == kind).count();
        if count > 0 {
            println!("  {:<10} {count}", section_label(kind));
        }
    }

    let Some(raw) = args.item else {
        return Ok(());
    };
    let id = ItemId::from(raw.as_str());
    let info = query
        .item_info(&id)
        .with_context(|| format!("no item named {raw}"))?;

    println!();
    let abstract_tag = if info.is_abstract { ", abstract" } else { "" };
    println!("{} ({}{})", info.name, info.kind_label, abstract_tag);
    if let Some(description) = &info.description {
        println!("  {description}");
    }

    let kinds: Vec<EdgeKind> = match args.edges {
        Some(list) => list.into_iter().map(EdgeKind::from).collect(),
        None => {
            let mut kinds = QueryService::edge_kinds_for_links(args.three_panel);
            kinds.push(EdgeKind::Inheritance);
            kinds
        }
    };
    let (incoming, outgoing) = query.edge_counts(&id, &kinds);
    println!("  {incoming} incoming, {outgoing} outgoing");

    for edge in query.edges_for_item(&id, &kinds) {
        let arrow = match edge.direction {
            Direction::Outgoing => "->",
            Direction::Incoming => "<-",
            Direction::SelfLoop => "<->",
        };
        let label = edge
            .edge
            .label
            .as_deref()
            .map(|l| format!(" [{l}]"))
            .unwrap_or_default();
        let inherited = edge
            .edge
            .inherited_from
            .as_deref()
            .map(|a| format!(" (from {a})"))
            .unwrap_or_default();
        println!(
            "  {} {arrow} {} : {}{label}{inherited}",
            edge.source.name,
            edge.target.name,
            edge_kind_label(edge.edge.kind),
        );
    }

    Ok(())
}
