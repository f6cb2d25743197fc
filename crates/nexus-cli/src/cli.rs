use std::path::PathBuf;

use clap::{Parser, Subcommand};
use nexus_core::models::DraftLine;

#[derive(Parser)]
#[command(name = "nexus")]
#[command(about = "Warehouse dashboard and moveout lists from the command line")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Optional path to a JSON client config file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Load the dashboard for the configured user
    Dashboard {
        /// Ignore cached data and fetch everything
        #[arg(long)]
        refresh: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show pending moveout lists
    Lists {
        /// Show completed lists instead
        #[arg(long)]
        history: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Mark one item of a moveout list as processed
    Process {
        /// Moveout list ID
        list_id: String,
        /// Item ID within the list
        item_id: String,
        /// Quantity moved out
        #[arg(short, long)]
        quantity: u32,
    },
    /// Generate a new moveout list and notify staff
    #[command(alias = "generate")]
    Create {
        /// Line items as ITEM_ID:NAME:IN_STOCK:REQUESTED
        #[arg(required = true, value_parser = parse_draft_line)]
        items: Vec<DraftLine>,
    },
}

/// Parse `ITEM_ID:NAME:IN_STOCK:REQUESTED`.
///
/// The name may itself contain `:`; the id is the first field and the two
/// quantities are the last two.
pub fn parse_draft_line(raw: &str) -> Result<DraftLine, String> {
    let (item_id, rest) = raw
        .split_once(':')
        .ok_or_else(|| format!("expected ITEM_ID:NAME:IN_STOCK:REQUESTED, got '{raw}'"))?;
    let (rest, requested) = rest
        .rsplit_once(':')
        .ok_or_else(|| format!("missing requested quantity in '{raw}'"))?;
    let (name, in_stock) = rest
        .rsplit_once(':')
        .ok_or_else(|| format!("missing stock quantity in '{raw}'"))?;

    let item_id = item_id.trim();
    let name = name.trim();
    if item_id.is_empty() || name.is_empty() {
        return Err(format!("item id and name must not be empty in '{raw}'"));
    }
    let in_stock = in_stock
        .trim()
        .parse::<u32>()
        .map_err(|error| format!("invalid stock quantity in '{raw}': {error}"))?;
    let requested = requested
        .trim()
        .parse::<u32>()
        .map_err(|error| format!("invalid requested quantity in '{raw}': {error}"))?;

    Ok(DraftLine::new(item_id, name, in_stock, requested))
}
