use std::collections::BTreeSet;
use std::path::Path;

use colored::Colorize;
use serde::Serialize;
use shapetree_fetch::cache_key;
use shapetree_schema::RemoteShapeTree;
use shapetree_server::{schema_fetcher, ServerConfig, ShapeTreeServer};
use shapetree_store::StorageConfig;
use shapetree_types::InstancePath;

use crate::cli::*;

pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Serve(args) => cmd_serve(args).await,
        Command::CheckSchema(args) => cmd_check_schema(args, &cli.format).await,
        Command::CacheKey(args) => cmd_cache_key(args),
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<ServerConfig> {
    Ok(match path {
        Some(path) => ServerConfig::load(path)?,
        None => ServerConfig::default(),
    })
}

async fn cmd_serve(args: ServeArgs) -> anyhow::Result<()> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }
    if let Some(base) = args.base_url {
        config.base_url = Some(base);
    }
    if let Some(root) = args.root {
        config.storage = StorageConfig::Filesystem {
            root,
            base: config.base_url()?,
        };
    }
    let server = ShapeTreeServer::new(config)?;
    println!(
        "{} ShapeTree server on {} ({} storage, root {})",
        "✓".green().bold(),
        server.config().bind_addr.to_string().bold(),
        server.config().storage_kind(),
        server.config().base_url()?.as_str().cyan(),
    );
    server.serve().await?;
    Ok(())
}

/// One schema node as `check-schema` reports it.
#[derive(Debug, Serialize)]
struct NodeReport {
    node: String,
    depth: usize,
    name: Option<String>,
    uri_template: Option<String>,
    expects_type: Option<String>,
    shape: Option<String>,
}

async fn cmd_check_schema(args: CheckSchemaArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(dir) = args.cache_dir {
        config.cache_dir = dir;
    }
    let fetcher = schema_fetcher(&config)?;
    let tree = RemoteShapeTree::fetch(fetcher.as_ref(), &args.url, InstancePath::root()).await?;

    let mut reports = Vec::new();
    let mut seen = BTreeSet::new();
    let mut stack = vec![(tree.resolve_root_node()?, 0usize)];
    while let Some((node, depth)) = stack.pop() {
        if !seen.insert(node.clone()) {
            tracing::warn!(node = %node, "schema node reached twice, not descending again");
            continue;
        }
        let step = tree.step(&node)?;
        let mut children = step.contents.clone();
        children.sort();
        stack.extend(children.into_iter().rev().map(|c| (c, depth + 1)));
        reports.push(NodeReport {
            node: node.to_string(),
            depth,
            name: step.name,
            uri_template: step.uri_template.map(|t| t.to_string()),
            expects_type: step.expects_type.map(|t| t.iri().to_string()),
            shape: step.shape.map(|s| s.to_string()),
        });
    }

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&reports)?),
        OutputFormat::Text => {
            println!("{} {}", "Schema".bold(), args.url.as_str().cyan());
            for r in &reports {
                let label = match (&r.name, &r.uri_template) {
                    (Some(name), _) => name.yellow().to_string(),
                    (None, Some(template)) => template.magenta().to_string(),
                    (None, None) => r.node.dimmed().to_string(),
                };
                let kind = r
                    .expects_type
                    .as_deref()
                    .and_then(|t| t.rsplit('#').next())
                    .unwrap_or("any");
                print!("{}{label} [{kind}]", "  ".repeat(r.depth));
                if let Some(shape) = &r.shape {
                    print!(" validated by {}", shape.blue());
                }
                println!();
            }
        }
    }
    Ok(())
}

fn cmd_cache_key(args: CacheKeyArgs) -> anyhow::Result<()> {
    let key = cache_key(&args.url);
    println!("{}", key.bold());
    if let Some(dir) = args.cache_dir {
        let path = dir.join(&key);
        let state = if path.exists() {
            "cached".green()
        } else {
            "not cached".yellow()
        };
        println!("{} ({state})", path.display());
    }
    Ok(())
}
