use nexus_core::config::ClientConfig;
use nexus_core::models::DraftLine;
use nexus_core::moveout::SyncError;

use crate::commands::common::{build_controller, print_notices};
use crate::error::CliError;

pub async fn run_create(config: &ClientConfig, items: Vec<DraftLine>) -> Result<(), CliError> {
    let (controller, mut notices) = build_controller(config)?;
    controller.load(false).await;

    let result = controller.create_list(&items).await;
    print_notices(&mut notices);

    match result {
        Ok(created) => {
            println!("Created moveout list {} with {} items", created.id, items.len());
            Ok(())
        }
        Err(SyncError::Validation(errors)) => {
            for issue in errors.issues() {
                eprintln!("- {issue}");
            }
            Err(SyncError::Validation(errors).into())
        }
        Err(error) => Err(error.into()),
    }
}
