use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use url::Url;

#[derive(Parser)]
#[command(
    name = "shapetree",
    about = "ShapeTree-aware LDP server and schema tools",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start the ShapeTree server
    Serve(ServeArgs),
    /// Fetch a schema through the cache and print its contents forest
    CheckSchema(CheckSchemaArgs),
    /// Print the cache entry name for a URL
    CacheKey(CacheKeyArgs),
}

#[derive(Args)]
pub struct ServeArgs {
    /// TOML configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,
    #[arg(long)]
    pub bind: Option<SocketAddr>,
    /// Serve containers from this directory instead of memory
    #[arg(long)]
    pub root: Option<PathBuf>,
    /// Public URL of the root container
    #[arg(long)]
    pub base_url: Option<Url>,
}

#[derive(Args)]
pub struct CheckSchemaArgs {
    /// Schema root node, e.g. `https://example.org/project.ttl#root`
    pub url: Url,
    #[arg(long)]
    pub config: Option<PathBuf>,
    #[arg(long)]
    pub cache_dir: Option<PathBuf>,
}

#[derive(Args)]
pub struct CacheKeyArgs {
    pub url: Url,
    /// Also print where the entry lives under this directory
    #[arg(long)]
    pub cache_dir: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_serve_defaults() {
        let cli = Cli::try_parse_from(["shapetree", "serve"]).unwrap();
        if let Command::Serve(args) = cli.command {
            assert!(args.config.is_none());
            assert!(args.bind.is_none());
            assert!(args.root.is_none());
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_serve_overrides() {
        let cli = Cli::try_parse_from([
            "shapetree",
            "serve",
            "--bind",
            "0.0.0.0:8080",
            "--root",
            "/srv/pods",
            "--base-url",
            "http://pods.example/",
        ])
        .unwrap();
        if let Command::Serve(args) = cli.command {
            assert_eq!(args.bind, Some("0.0.0.0:8080".parse().unwrap()));
            assert_eq!(args.root, Some(PathBuf::from("/srv/pods")));
            assert_eq!(args.base_url.unwrap().as_str(), "http://pods.example/");
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_check_schema() {
        let cli = Cli::try_parse_from([
            "shapetree",
            "check-schema",
            "http://schema.example/project.ttl#root",
            "--format",
            "json",
        ])
        .unwrap();
        assert!(matches!(cli.format, OutputFormat::Json));
        if let Command::CheckSchema(args) = cli.command {
            assert_eq!(args.url.fragment(), Some("root"));
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn rejects_bad_urls() {
        assert!(Cli::try_parse_from(["shapetree", "cache-key", "not a url"]).is_err());
    }

    #[test]
    fn parse_verbose() {
        let cli = Cli::try_parse_from(["shapetree", "-v", "cache-key", "http://x/"]).unwrap();
        assert!(cli.verbose);
    }
}
