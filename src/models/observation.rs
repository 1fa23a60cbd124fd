use serde::{Deserialize, Serialize};

/// A single port number recorded by a previous scan.
///
/// Values are kept as read from the store; no 0-65535 bound is enforced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PortObservation(i64);

impl PortObservation {
    pub fn new(port: i64) -> Self {
        Self(port)
    }

    /// Raw port value
    pub fn port(&self) -> i64 {
        self.0
    }

    /// Port as a clustering feature
    pub fn as_feature(&self) -> f64 {
        self.0 as f64
    }
}

impl From<i64> for PortObservation {
    fn from(port: i64) -> Self {
        Self(port)
    }
}

/// All observations retrieved by one query, in store order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservationSet {
    observations: Vec<PortObservation>,
}

impl ObservationSet {
    pub fn new(observations: Vec<PortObservation>) -> Self {
        Self { observations }
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PortObservation> {
        self.observations.iter()
    }

    /// Port values in store order
    pub fn ports(&self) -> Vec<i64> {
        self.observations.iter().map(PortObservation::port).collect()
    }
}

impl FromIterator<i64> for ObservationSet {
    fn from_iter<I: IntoIterator<Item = i64>>(iter: I) -> Self {
        Self::new(iter.into_iter().map(PortObservation::new).collect())
    }
}

impl From<Vec<i64>> for ObservationSet {
    fn from(ports: Vec<i64>) -> Self {
        ports.into_iter().collect()
    }
}
