use crate::{
    cli::{actions::output, globals::GlobalArgs},
    logistics::{
        packages::{Package, PackagesClient, StatusFilter},
        reports::ShipmentReport,
    },
    session::{authorize, Capability},
};
use anyhow::Result;
use tracing::instrument;

/// # Errors
/// Returns an error if the role cannot list packages or the request fails.
#[instrument(skip(globals))]
pub async fn execute(filter: StatusFilter, globals: &GlobalArgs) -> Result<()> {
    let store = globals.session_store()?;
    let state = store.get();
    authorize(state.session(), Capability::ViewReports)?;
    let api = globals.api_client()?;

    let packages: Vec<Package> = PackagesClient::new(&api, state.session())
        .list_all()
        .await?
        .into_iter()
        .filter(|package| filter.matches(package.status))
        .collect();

    output::report(globals, &ShipmentReport::from_packages(&packages))
}
