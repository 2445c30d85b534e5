//! `lookup` subcommand.

use anyhow::{bail, Context};
use tracing::debug;

use fceplus_dataset::{CourseId, Lookup, ReferenceStore};
use fceplus_engine::EngineConfig;

use crate::cli::DatasetSource;
use crate::load_dataset;

/// Print each course's average hours.
pub(crate) async fn handle_lookup(
    config: &EngineConfig,
    source: &DatasetSource,
    ids: &[String],
) -> anyhow::Result<()> {
    let ids = parse_ids(ids)?;
    debug!(courses = ids.len(), "Looking up courses");

    let mut store = ReferenceStore::new();
    match load_dataset(config, source).await {
        Ok(dataset) => store.install(dataset),
        Err(e) => {
            store.mark_failed(&e);
            return Err(e).context("could not load the reference dataset");
        }
    }

    for id in &ids {
        println!("{}", format_lookup(id, store.lookup(id)));
    }
    Ok(())
}

pub(crate) fn parse_ids(raw: &[String]) -> anyhow::Result<Vec<CourseId>> {
    raw.iter()
        .map(|s| match CourseId::parse(s) {
            Some(id) => Ok(id),
            None => bail!("'{}' is not a course id (expected DD-DDD or DDDDD)", s),
        })
        .collect()
}

fn format_lookup(id: &CourseId, lookup: Lookup) -> String {
    match lookup {
        Lookup::Found(hours) => format!("{}\t{}", id.display_form(), hours),
        Lookup::Missing => format!("{}\tno data", id.display_form()),
        Lookup::Unavailable => format!("{}\tunavailable", id.display_form()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ids() {
        let ids = parse_ids(&["15-780".to_string(), "10701".to_string()]).unwrap();
        assert_eq!(ids[0].as_str(), "15780");
        assert_eq!(ids[1].as_str(), "10701");

        let err = parse_ids(&["15-78".to_string()]).unwrap_err();
        assert!(err.to_string().contains("15-78"));
    }

    #[test]
    fn test_format_lookup() {
        let id = CourseId::parse("15780").unwrap();
        assert_eq!(format_lookup(&id, Lookup::Found(10.5)), "15-780\t10.5");
        assert_eq!(format_lookup(&id, Lookup::Missing), "15-780\tno data");
    }
}
