//! Placemarks, locations, and canonical bucket keys.

/// A geographic coordinate in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

impl Location {
    pub fn new(latitude: f64, longitude: f64) -> Location {
        Location {
            latitude,
            longitude,
        }
    }
}

/// A reverse-geocoded place description as reported by the platform.
/// Components may be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Placemark {
    pub country: String,
    pub state: String,
    pub locality: String,
    pub sublocality: String,
}

impl Placemark {
    /// The canonical bucket key of this placemark:
    /// `country/state/locality`, each component normalized. Sublocalities
    /// are tracked inside the bucket's statistics, not in its key, so that
    /// one bucket aggregates across its sublocalities.
    pub fn bucket(&self) -> String {
        format!(
            "{}/{}/{}",
            normalize_component(&self.country),
            normalize_component(&self.state),
            normalize_component(&self.locality)
        )
    }

    /// The normalized sublocality, empty when the placemark has none.
    pub fn normalized_sublocality(&self) -> String {
        normalize_component(&self.sublocality)
    }
}

/// Normalizes one placemark component: case-folds, rewrites separator
/// punctuation and whitespace runs to a single `-`, and strips leading and
/// trailing separators, so spelling variants collapse to one bucket.
pub(crate) fn normalize_component(component: &str) -> String {
    let mut out = String::with_capacity(component.len());
    let mut pending_separator = false;
    for ch in component.chars() {
        if ch.is_alphanumeric() {
            if pending_separator && !out.is_empty() {
                out.push('-');
            }
            pending_separator = false;
            out.extend(ch.to_lowercase());
        } else {
            pending_separator = true;
        }
    }
    out
}
