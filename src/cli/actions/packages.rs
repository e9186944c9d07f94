use crate::{
    cli::{actions::output, globals::GlobalArgs},
    logistics::packages::{
        NewPackage, PackageStatus, PackageUpdate, PackagesClient, StatusFilter,
    },
    session::RecordId,
};
use anyhow::Result;
use tracing::instrument;

#[derive(Debug)]
pub enum PackageAction {
    List { filter: StatusFilter },
    Mine,
    Deliveries { filter: StatusFilter },
    Create(NewPackage),
    Status { id: RecordId, status: PackageStatus },
    /// `None` lets the backend choose the messenger.
    Assign { id: RecordId, messenger: Option<RecordId> },
    Approve { id: RecordId },
    Reject { id: RecordId },
    Edit { id: RecordId, update: PackageUpdate },
    Qr { id: RecordId },
}

/// Public tracking lookup; uses the stored session when there is one.
///
/// # Errors
/// Returns an error if the package cannot be found.
#[instrument(skip(globals))]
pub async fn track(code: &str, globals: &GlobalArgs) -> Result<()> {
    let store = globals.session_store()?;
    let state = store.get();
    let api = globals.api_client()?;

    let package = PackagesClient::new(&api, state.session()).track(code).await?;
    if globals.json {
        return output::json(&package);
    }
    output::package(&package);
    Ok(())
}

/// # Errors
/// Returns an error if the role is not allowed or the request fails.
#[instrument(skip(globals))]
pub async fn execute(action: PackageAction, globals: &GlobalArgs) -> Result<()> {
    let store = globals.session_store()?;
    let state = store.get();
    let api = globals.api_client()?;
    let client = PackagesClient::new(&api, state.session());

    match action {
        PackageAction::List { filter } => {
            let packages = client.list_all().await?;
            output::packages(globals, &filter.apply(&packages))
        }
        PackageAction::Mine => {
            let packages = client.my_packages().await?;
            output::packages(globals, &StatusFilter::All.apply(&packages))
        }
        PackageAction::Deliveries { filter } => {
            let packages = client.my_deliveries().await?;
            output::packages(globals, &filter.apply(&packages))
        }
        PackageAction::Create(package) => {
            let registered = client.create(&package).await?;
            if globals.json {
                return output::json(&serde_json::json!({
                    "message": registered.message,
                    "tracking_code": registered
                        .tracking_code
                        .as_ref()
                        .or_else(|| registered.package.as_ref().and_then(|p| p.tracking_code.as_ref())),
                }));
            }
            println!(
                "{}",
                registered
                    .message
                    .as_deref()
                    .unwrap_or("Package registered.")
            );
            let code = registered
                .tracking_code
                .as_deref()
                .or_else(|| registered.package.as_ref().and_then(|p| p.tracking_code.as_deref()));
            if let Some(code) = code {
                println!("Tracking code: {code}");
            }
            Ok(())
        }
        PackageAction::Status { id, status } => {
            let ack = client.update_status(&id, status).await?;
            output::ack(&ack, &format!("Package {id} is now {status}."));
            Ok(())
        }
        PackageAction::Assign { id, messenger } => {
            let ack = match &messenger {
                Some(messenger) => client.assign_messenger(&id, messenger).await?,
                None => client.assign_automatic(&id).await?,
            };
            output::ack(&ack, &format!("Messenger assigned to package {id}."));
            Ok(())
        }
        PackageAction::Approve { id } => {
            let ack = client.approve(&id).await?;
            output::ack(&ack, &format!("Package {id} approved."));
            Ok(())
        }
        PackageAction::Reject { id } => {
            let ack = client.reject(&id).await?;
            output::ack(&ack, &format!("Package {id} rejected."));
            Ok(())
        }
        PackageAction::Edit { id, update } => {
            let ack = client.edit(&id, &update).await?;
            output::ack(&ack, &format!("Package {id} updated."));
            Ok(())
        }
        PackageAction::Qr { id } => {
            println!("{}", client.qr_url(&id)?);
            Ok(())
        }
    }
}
