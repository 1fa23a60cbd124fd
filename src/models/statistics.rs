use serde::{Deserialize, Serialize};

/// How often a value occurs in the scan-results table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occurrence<T> {
    pub value: T,
    pub occurrences: u64,
}

impl<T> Occurrence<T> {
    pub fn new(value: T, occurrences: u64) -> Self {
        Self { value, occurrences }
    }
}

/// Frequency summary of recorded scan results
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortStatistics {
    /// Number of entries requested for each ranking
    pub limit: usize,

    /// Most frequently observed ports, most common first
    pub top_ports: Vec<Occurrence<i64>>,

    /// Most common service banners, most common first (empty without a banner column)
    pub top_banners: Vec<Occurrence<String>>,

    /// Day with the most recorded open ports (None without a day column or rows)
    pub busiest_day: Option<Occurrence<String>>,
}

impl PortStatistics {
    /// Build statistics from raw rows, ranking by occurrences then value.
    pub fn from_rows<'a, I>(rows: I, limit: usize) -> Self
    where
        I: IntoIterator<Item = (i64, Option<&'a str>, Option<&'a str>)>,
    {
        use std::collections::BTreeMap;

        let mut ports: BTreeMap<i64, u64> = BTreeMap::new();
        let mut banners: BTreeMap<String, u64> = BTreeMap::new();
        let mut days: BTreeMap<String, u64> = BTreeMap::new();

        for (port, banner, day) in rows {
            *ports.entry(port).or_default() += 1;
            if let Some(b) = banner {
                *banners.entry(b.to_string()).or_default() += 1;
            }
            if let Some(d) = day {
                *days.entry(d.to_string()).or_default() += 1;
            }
        }

        Self {
            limit,
            top_ports: rank(ports, limit),
            top_banners: rank(banners, limit),
            busiest_day: rank(days, 1).into_iter().next(),
        }
    }
}

fn rank<T: Ord>(counts: std::collections::BTreeMap<T, u64>, limit: usize) -> Vec<Occurrence<T>> {
    let mut ranked: Vec<Occurrence<T>> = counts
        .into_iter()
        .map(|(value, occurrences)| Occurrence::new(value, occurrences))
        .collect();
    // BTreeMap yields values ascending, so a stable sort keeps ties ordered by value
    ranked.sort_by(|a, b| b.occurrences.cmp(&a.occurrences));
    ranked.truncate(limit);
    ranked
}
