use nexus_core::config::ClientConfig;
use nexus_core::moveout::MoveoutSync;
use nexus_core::notice::Notifier;
use nexus_core::state::RefreshMode;

use crate::commands::common::{build_gateway, format_list_line, print_notices};
use crate::error::CliError;

pub async fn run_lists(config: &ClientConfig, history: bool, json: bool) -> Result<(), CliError> {
    let gateway = build_gateway(config)?;
    let notifier = Notifier::new();
    let mut notices = notifier.subscribe();
    let sync = MoveoutSync::new(gateway, notifier);

    if history {
        sync.toggle_history().await?;
    } else {
        sync.refresh_all(RefreshMode::Visible).await?;
    }
    print_notices(&mut notices);

    let view = sync.snapshot();
    let lists = view.visible_lists();
    if json {
        println!("{}", serde_json::to_string_pretty(lists)?);
    } else if lists.is_empty() {
        println!("No lists.");
    } else {
        for list in lists {
            println!("{}", format_list_line(list));
        }
    }
    Ok(())
}
