//! `total` subcommand: runs the static listing scan over a synthetic page.

use anyhow::{anyhow, Context};
use tracing::debug;

use fceplus_dataset::CourseId;
use fceplus_dom::{Document, Location, Node};
use fceplus_engine::{EngineConfig, HostEvent, Session};

use crate::cli::DatasetSource;
use crate::load_dataset;

/// One requested course, with the units the listing would print.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ListingEntry {
    pub course_id: CourseId,
    pub units: Option<f64>,
}

/// Schedule total and the courses counted from declared units.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct TotalReport {
    pub total: f64,
    pub missing: Vec<CourseId>,
}

/// Print the deduplicated total.
pub(crate) async fn handle_total(
    config: &EngineConfig,
    source: &DatasetSource,
    ids: &[String],
) -> anyhow::Result<()> {
    let entries = ids
        .iter()
        .map(|s| parse_entry(s))
        .collect::<anyhow::Result<Vec<_>>>()?;
    debug!(entries = entries.len(), "Summarizing static listing");
    let report = summarize(config, source, &entries).await?;

    println!("total\t{}", report.total);
    for id in &report.missing {
        println!("no data\t{}", id.display_form());
    }
    Ok(())
}

/// Parse `15-780` or `15-780=12`.
pub(crate) fn parse_entry(raw: &str) -> anyhow::Result<ListingEntry> {
    let (id, units) = match raw.split_once('=') {
        Some((id, units)) => {
            let units = units
                .trim()
                .parse::<f64>()
                .with_context(|| format!("bad units in '{}'", raw))?;
            (id, Some(units))
        }
        None => (raw, None),
    };
    let course_id =
        CourseId::parse(id).ok_or_else(|| anyhow!("'{}' is not a course id", id))?;
    Ok(ListingEntry { course_id, units })
}

/// Render the entries as a static schedule page and let a session scan it.
pub(crate) async fn summarize(
    config: &EngineConfig,
    source: &DatasetSource,
    entries: &[ListingEntry],
) -> anyhow::Result<TotalReport> {
    let document = listing_document(config, entries)?;
    let (session, handle) = Session::new(document, config);
    handle.send(HostEvent::DocumentReady);
    handle.send(HostEvent::PageLoad);
    drop(handle);

    let dispatcher = session.run(load_dataset(config, source)).await;
    let aggregate = dispatcher.aggregate();
    Ok(TotalReport {
        total: aggregate.total(),
        missing: aggregate.missing().ids().cloned().collect(),
    })
}

fn listing_document(config: &EngineConfig, entries: &[ListingEntry]) -> anyhow::Result<Document> {
    let marker = config
        .static_listing_markers
        .first()
        .context("no static listing marker configured")?;
    let document = Document::new(Location {
        path: "/".to_string(),
        hash: marker.clone(),
    });

    let body = document.body();
    body.append_child(
        &Node::element("div")
            .with_class("schedule-units-label")
            .with_text("Units"),
    );
    for entry in entries {
        let text = match entry.units {
            Some(units) => format!("{} {} units", entry.course_id.display_form(), units),
            None => entry.course_id.display_form(),
        };
        body.append_child(&Node::element("div").with_class("gwt-appointment").with_text(&text));
    }
    Ok(document)
}
