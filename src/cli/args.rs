use std::path::PathBuf;

use clap::Args;

#[derive(Args, Debug, Clone)]
pub struct RenderArgs {
    /// Bundle file (JSON)
    pub bundle: PathBuf,

    /// Post to center the view on (defaults to the bundle's pivot)
    #[arg(long, short)]
    pub pivot: Option<String>,

    /// Collapse a post (can be specified multiple times)
    #[arg(long, action = clap::ArgAction::Append)]
    pub collapse: Vec<String>,

    /// Expand a post (can be specified multiple times)
    #[arg(long, action = clap::ArgAction::Append)]
    pub expand: Vec<String>,

    /// Never thread single-reply chains
    #[arg(long)]
    pub no_threading: bool,

    /// Directory of `<loader key>.json` bundles answering loaders
    #[arg(long)]
    pub sources: Option<PathBuf>,

    /// Rounds of visible loaders to expand (overrides loader.max_rounds)
    #[arg(long, requires = "sources")]
    pub load_rounds: Option<u32>,
}

#[derive(Args, Debug, Clone)]
pub struct LinksArgs {
    /// Bundle file (JSON)
    pub bundle: PathBuf,
}
