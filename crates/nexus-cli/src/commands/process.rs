use nexus_core::config::ClientConfig;
use nexus_core::moveout::ProcessOutcome;
use nexus_core::MoveoutListId;

use crate::commands::common::{build_controller, print_notices};
use crate::error::CliError;

pub async fn run_process(
    config: &ClientConfig,
    list_id: &str,
    item_id: &str,
    quantity: u32,
) -> Result<(), CliError> {
    let (controller, mut notices) = build_controller(config)?;
    controller.load(false).await;

    let list_id = MoveoutListId::new(list_id.trim());
    if !controller.moveouts().open_detail(&list_id) {
        print_notices(&mut notices);
        return Err(CliError::ListNotFound(list_id.to_string()));
    }

    let result = controller.process_item(&list_id, item_id.trim(), quantity).await;
    print_notices(&mut notices);

    match result? {
        ProcessOutcome::StillPending => {
            if let Some(list) = controller.moveout_snapshot().open_list {
                let (done, total) = list.progress();
                println!("Processed {item_id}: {done}/{total} items done on {list_id}");
            }
        }
        ProcessOutcome::ListClosed => println!("Processed {item_id}: list {list_id} is complete"),
        ProcessOutcome::RefreshFailed => {
            println!("Processed {item_id}; list state could not be refreshed");
        }
        ProcessOutcome::Ignored => println!("Another item is already being processed"),
    }
    Ok(())
}
