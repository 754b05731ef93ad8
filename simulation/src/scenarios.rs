//! Scenario driver: runs a fixture through a picker session

use std::sync::Arc;

use anyhow::Context;
use nft_picker_core::RecordingSurface;
use nft_picker_engine::{PickerSession, SourceMode};
use tracing::info;

use crate::fixture::Fixture;
use crate::report::{LoadSnapshot, Report, describe_event};

/// Built-in scenario: a wallet with two collections and a stored selection
pub const DEMO_FIXTURE: &str = include_str!("../fixtures/demo.json");

pub fn demo_fixture() -> anyhow::Result<Fixture> {
    Fixture::from_json(DEMO_FIXTURE).context("built-in demo fixture is invalid")
}

fn snapshot(session: &PickerSession) -> LoadSnapshot {
    let source = match session.mode() {
        SourceMode::Wallet { owner, chain_id } => format!("wallet {} on {}", owner, chain_id),
        SourceMode::Vault {
            minion_filter: Some(minion),
        } => format!("vault {}", minion),
        SourceMode::Vault { minion_filter: None } => "all vaults".to_string(),
    };
    LoadSnapshot {
        source,
        generation: session.generation(),
        catalog: session.catalog().assets().to_vec(),
        collections: session.collections().to_vec(),
        visible: session.visible().to_vec(),
        selected: session.selected().cloned(),
    }
}

/// Mount, load, apply the user actions, and report what happened
pub async fn run_fixture(fixture: &Fixture) -> anyhow::Result<Report> {
    let form = fixture.form();
    let surface = Arc::new(RecordingSurface::new());

    let mut session = PickerSession::mount(
        fixture.config.clone(),
        fixture.sources(),
        form.clone(),
        surface.clone(),
        fixture.mode.clone(),
        None,
    )?;
    let mut loads = Vec::new();

    session.refresh().await?;

    let actions = &fixture.actions;
    if let Some(filter) = &actions.filter {
        session.set_filter(Some(filter.as_str()))?;
    }
    if let Some(index) = actions.pick {
        session.open_picker()?;
        let asset = session
            .pick(index)
            .with_context(|| format!("cannot pick visible asset {}", index))?;
        info!(token_id = %asset.token_id, "Simulated user pick");
    }
    loads.push(snapshot(&session));

    if let Some(mode) = &actions.switch_to {
        session.switch_mode(mode.clone())?;
        session.refresh().await?;
        loads.push(snapshot(&session));
    }

    let report = Report {
        picker_id: session.config().picker_id.clone(),
        loads,
        surface_events: surface.events().iter().map(describe_event).collect(),
        form: form.values(),
        form_batches: form.batches(),
    };
    session.teardown();
    Ok(report)
}
