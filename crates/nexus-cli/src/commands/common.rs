use std::path::{Path, PathBuf};
use std::sync::Arc;

use nexus_core::config::ClientConfig;
use nexus_core::dashboard::DashboardController;
use nexus_core::models::MoveoutList;
use nexus_core::notice::{drain, Notice, NoticeLevel, Notifier};
use nexus_core::HttpGateway;
use tokio::sync::broadcast;

use crate::error::CliError;

const CONFIG_FILE_NAME: &str = "config.json";

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("nexus").join(CONFIG_FILE_NAME))
}

/// Explicit path, else the default path when it exists, then environment.
pub fn load_config(explicit: Option<&Path>) -> Result<ClientConfig, CliError> {
    let path = explicit.map(Path::to_path_buf).or_else(default_config_path);
    if let Some(path) = explicit {
        if !path.exists() {
            return Err(CliError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("config file not found: {}", path.display()),
            )));
        }
    }
    Ok(ClientConfig::resolve(path.as_deref())?)
}

pub fn build_gateway(config: &ClientConfig) -> Result<Arc<HttpGateway>, CliError> {
    Ok(Arc::new(HttpGateway::from_config(config)?))
}

pub fn build_controller(
    config: &ClientConfig,
) -> Result<(DashboardController<HttpGateway>, broadcast::Receiver<Notice>), CliError> {
    let gateway = build_gateway(config)?;
    let notifier = Notifier::new();
    let notices = notifier.subscribe();
    let controller = DashboardController::from_config(gateway, config, notifier);
    Ok((controller, notices))
}

/// Print buffered notices to stderr so stdout stays machine-readable.
pub fn print_notices(receiver: &mut broadcast::Receiver<Notice>) {
    for notice in drain(receiver) {
        eprintln!("{}", format_notice(&notice));
    }
}

pub fn format_notice(notice: &Notice) -> String {
    match notice.level {
        NoticeLevel::Info => format!("> {}", notice.text),
        NoticeLevel::Error => format!("! {}", notice.text),
    }
}

pub fn format_list_line(list: &MoveoutList) -> String {
    let (done, total) = list.progress();
    let created = list
        .created_at
        .as_deref()
        .and_then(|raw| raw.get(..10))
        .unwrap_or("-");
    format!(
        "{}  {}  {}  [{}/{}]  {}",
        list.id,
        created,
        list.status,
        done,
        total,
        list.display_title()
    )
}
