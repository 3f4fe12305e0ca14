//! `sky plugin marketplace` list, add, and remove.

use sky_plugins::Marketplace;
use time::format_description::well_known::Rfc3339;

use super::{Output, Session};
use crate::cli::MarketplaceCommand;
use crate::errors::AppError;
use crate::table::Table;

pub(super) fn run(
    action: MarketplaceCommand,
    session: &Session,
    out: &mut Output<'_>,
) -> Result<i32, AppError> {
    match action {
        MarketplaceCommand::List => list(session, out),
        MarketplaceCommand::Add { name, url } => {
            session
                .store()
                .upsert_marketplace(&Marketplace::new(name.as_str(), url))?;
            writeln!(out.stdout, "marketplace {name} added")?;
            Ok(0)
        }
        MarketplaceCommand::Remove { name } => {
            let removed = session.store().remove_marketplace(&name)?;
            writeln!(out.stdout, "marketplace {} removed", removed.name())?;
            Ok(0)
        }
    }
}

fn list(session: &Session, out: &mut Output<'_>) -> Result<i32, AppError> {
    let marketplaces = session.store().load_marketplaces()?;
    if marketplaces.is_empty() {
        writeln!(out.stdout, "no marketplaces configured")?;
        return Ok(0);
    }

    let mut table = Table::new(["NAME", "URL", "ADDED"]);
    for marketplace in &marketplaces {
        let added = marketplace
            .added_at()
            .and_then(|at| at.format(&Rfc3339).ok())
            .unwrap_or_default();
        table.row([marketplace.name(), marketplace.url(), added.as_str()]);
    }
    table.write_to(out.stdout)?;
    Ok(0)
}
