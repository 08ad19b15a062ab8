use ahash::AHashMap;
use tracing::info;

use crate::record::{GeoRecord, MergedRecord, TabularRecord};

/// Result of the region join, with diagnostics on the rows that found no partner.
#[derive(Debug, Clone, Default)]
pub struct Joined {
    pub records: Vec<MergedRecord>,
    pub unmatched_geographic: usize,
    pub unmatched_tabular: usize,
}

/// Inner join on exact region equality.
///
/// Output follows geographic order, then tabular order within one region.
/// Duplicate keys on either side produce one row per matching pair.
pub fn join(geographic: Vec<GeoRecord>, tabular: &[TabularRecord]) -> Joined {
    let mut index: AHashMap<&str, Vec<usize>> = AHashMap::with_capacity(tabular.len());
    for (i, record) in tabular.iter().enumerate() {
        index.entry(record.region.as_str()).or_default().push(i);
    }

    let mut matched = vec![false; tabular.len()];
    let mut out = Joined::default();

    for geo in geographic {
        let Some(partners) = index.get(geo.region.as_str()) else {
            out.unmatched_geographic += 1;
            continue;
        };
        for &i in partners {
            matched[i] = true;
            let t = &tabular[i];
            out.records.push(MergedRecord {
                region: geo.region.clone(),
                metric_geo: geo.value,
                geometry: geo.geometry.clone(),
                year: t.year,
                metric_tabular: t.value,
            });
        }
    }
    out.unmatched_tabular = matched.iter().filter(|m| !**m).count();

    info!(
        target: "join",
        merged = out.records.len(),
        unmatched_geographic = out.unmatched_geographic,
        unmatched_tabular = out.unmatched_tabular,
        "sources joined on region"
    );
    out
}
