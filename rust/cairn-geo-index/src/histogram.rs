//! The placemark histogram: per-bucket statistics and top-bucket ranking.

use std::collections::BTreeMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use cairn_common::{Error, Result};
use cairn_store::{ReadView, Store, Transaction};
use log::{debug, warn};

use crate::distance::great_circle_distance;
use crate::placemark::{Location, Placemark};

/// Minimum share of a bucket's observations a sublocality must hold to
/// count towards usefulness.
pub const MIN_SUBLOCALITY_SHARE: f64 = 0.05;

/// Number of qualifying sublocalities that make a bucket's sublocalities
/// useful.
pub const USEFUL_SUBLOCALITY_COUNT: usize = 3;

/// Number of distinct sublocalities beyond which a bucket's sublocalities
/// are useful regardless of individual share.
pub const ALWAYS_USEFUL_SUBLOCALITY_COUNT: usize = 10;

/// Policy knobs for the top-bucket ranking. Both values are policy, not
/// algorithmic constraints.
#[derive(Debug, Clone)]
pub struct HistogramOptions {
    /// Share of buckets (by descending observation count) eligible to be
    /// the top bucket. At least one bucket is always eligible.
    pub top_percentile: f64,
    /// Minimum interval between ranking rescans; between refreshes the
    /// cached ranking is served, trading bounded staleness for avoiding a
    /// full rescan on every query.
    pub refresh_interval: Duration,
}

impl Default for HistogramOptions {
    fn default() -> HistogramOptions {
        HistogramOptions {
            top_percentile: 0.05,
            refresh_interval: Duration::from_secs(60),
        }
    }
}

/// Running statistics of one placemark bucket. Count and coordinate sums
/// are both tracked so that removing an observation is the exact inverse of
/// adding it; storing only the mean would drift.
#[derive(Debug, Clone, Default, bincode::Encode, bincode::Decode)]
struct BucketStats {
    count: u64,
    latitude_sum: f64,
    longitude_sum: f64,
    sublocalities: BTreeMap<String, u64>,
}

impl BucketStats {
    fn centroid(&self) -> Location {
        Location {
            latitude: self.latitude_sum / self.count as f64,
            longitude: self.longitude_sum / self.count as f64,
        }
    }

    /// Sublocalities are useful when at least `USEFUL_SUBLOCALITY_COUNT`
    /// distinct sublocalities each hold at least `MIN_SUBLOCALITY_SHARE` of
    /// the observations, or when at least
    /// `ALWAYS_USEFUL_SUBLOCALITY_COUNT` distinct sublocalities exist.
    fn useful_sublocalities(&self) -> bool {
        if self.sublocalities.len() >= ALWAYS_USEFUL_SUBLOCALITY_COUNT {
            return true;
        }
        if self.count == 0 {
            return false;
        }
        let total = self.count as f64;
        let qualified = self
            .sublocalities
            .values()
            .filter(|&&n| n as f64 / total >= MIN_SUBLOCALITY_SHARE)
            .count();
        qualified >= USEFUL_SUBLOCALITY_COUNT
    }
}

/// The ranking result for a query location.
#[derive(Debug, Clone, PartialEq)]
pub struct TopPlacemark {
    /// Canonical bucket key of the top-ranked bucket.
    pub bucket: String,
    /// Great-circle distance in meters from the query location to the
    /// bucket's centroid.
    pub distance: f64,
    /// Whether the bucket's sublocalities are useful for display.
    pub useful_sublocalities: bool,
}

struct RankedBucket {
    bucket: String,
    centroid: Location,
    useful_sublocalities: bool,
}

struct RankCache {
    refreshed_at: Option<Instant>,
    top: Vec<RankedBucket>,
}

/// A geospatial histogram of observed placemark locations.
///
/// Mutations go through caller transactions so they commit atomically with
/// whatever content change produced the observation. Ranking queries are
/// served from a cache that is recomputed at most once per refresh
/// interval.
pub struct PlacemarkHistogram {
    store: Store,
    options: HistogramOptions,
    rank: Mutex<RankCache>,
}

impl PlacemarkHistogram {
    pub fn new(store: &Store) -> PlacemarkHistogram {
        PlacemarkHistogram::with_options(store, HistogramOptions::default())
    }

    pub fn with_options(store: &Store, options: HistogramOptions) -> PlacemarkHistogram {
        PlacemarkHistogram {
            store: store.clone(),
            options,
            rank: Mutex::new(RankCache {
                refreshed_at: None,
                top: Vec::new(),
            }),
        }
    }

    /// Records one observation of `location` within `placemark`'s bucket:
    /// count, coordinate sums, sublocality tally, and the rank key all move
    /// inside `txn`.
    pub fn add_placemark(
        &self,
        txn: &mut Transaction,
        placemark: &Placemark,
        location: Location,
    ) -> Result<()> {
        let bucket = placemark.bucket();
        let mut stats = self.load_stats(txn, &bucket).unwrap_or_default();
        if stats.count > 0 {
            txn.delete(&rank_key(stats.count, &bucket));
        }

        stats.count += 1;
        stats.latitude_sum += location.latitude;
        stats.longitude_sum += location.longitude;
        let sublocality = placemark.normalized_sublocality();
        if !sublocality.is_empty() {
            *stats.sublocalities.entry(sublocality).or_insert(0) += 1;
        }

        txn.put(&stats_key(&bucket), &encode_stats(&stats, &bucket)?);
        txn.put(&rank_key(stats.count, &bucket), b"");
        Ok(())
    }

    /// Reverses a previous [`add_placemark`](Self::add_placemark) of the
    /// same placemark and location, exactly. A bucket whose count reaches
    /// zero is removed entirely. Removing from an absent or empty bucket is
    /// an `InvalidOperation` error.
    pub fn remove_placemark(
        &self,
        txn: &mut Transaction,
        placemark: &Placemark,
        location: Location,
    ) -> Result<()> {
        let bucket = placemark.bucket();
        let Some(mut stats) = self.load_stats(txn, &bucket).filter(|s| s.count > 0) else {
            return Err(Error::invalid_operation(format!(
                "remove from empty placemark bucket '{bucket}'"
            )));
        };
        txn.delete(&rank_key(stats.count, &bucket));

        stats.count -= 1;
        stats.latitude_sum -= location.latitude;
        stats.longitude_sum -= location.longitude;
        let sublocality = placemark.normalized_sublocality();
        if !sublocality.is_empty() {
            if let Some(tally) = stats.sublocalities.get_mut(&sublocality) {
                *tally = tally.saturating_sub(1);
                if *tally == 0 {
                    stats.sublocalities.remove(&sublocality);
                }
            }
        }

        if stats.count == 0 {
            txn.delete(&stats_key(&bucket));
        } else {
            txn.put(&stats_key(&bucket), &encode_stats(&stats, &bucket)?);
            txn.put(&rank_key(stats.count, &bucket), b"");
        }
        Ok(())
    }

    /// The current centroid of `placemark`'s bucket, if it has any
    /// observations.
    pub fn bucket_centroid(&self, placemark: &Placemark) -> Option<Location> {
        let stats = self.load_stats(&self.store, &placemark.bucket())?;
        (stats.count > 0).then(|| stats.centroid())
    }

    /// Finds the highest-ranked bucket among the buckets within the top
    /// percentile by observation count and returns the great-circle
    /// distance from `location` to its centroid, together with the
    /// sublocality-usefulness flag. Returns `None` when the histogram is
    /// empty. A closer but lower-ranked bucket is never returned.
    ///
    /// The ranking is refreshed first if the refresh interval has elapsed
    /// since the last rescan.
    pub fn distance_to_top_placemark(&self, location: Location) -> Option<TopPlacemark> {
        let mut rank = self.rank.lock().unwrap();
        let stale = match rank.refreshed_at {
            Some(at) => at.elapsed() >= self.options.refresh_interval,
            None => true,
        };
        if stale {
            rank.top = self.scan_ranking();
            rank.refreshed_at = Some(Instant::now());
        }
        rank.top.first().map(|top| TopPlacemark {
            bucket: top.bucket.clone(),
            distance: great_circle_distance(location, top.centroid),
            useful_sublocalities: top.useful_sublocalities,
        })
    }

    /// Forces a ranking rescan, ignoring the refresh interval.
    pub fn refresh_ranking(&self) {
        let mut rank = self.rank.lock().unwrap();
        rank.top = self.scan_ranking();
        rank.refreshed_at = Some(Instant::now());
    }

    /// Walks the rank range in key order (descending count) and culls to
    /// the top percentile of buckets.
    fn scan_ranking(&self) -> Vec<RankedBucket> {
        let mut ordered = Vec::new();
        let mut it = self.store.iter();
        let mut ok = it.seek(RANK_PREFIX.as_bytes());
        while ok {
            let key = it.key().unwrap();
            if !key.starts_with(RANK_PREFIX.as_bytes()) {
                break;
            }
            if let Some(bucket) = parse_rank_key(key) {
                ordered.push(bucket);
            }
            ok = it.next();
        }

        let eligible = ((ordered.len() as f64 * self.options.top_percentile).ceil() as usize)
            .clamp(1, ordered.len().max(1))
            .min(ordered.len());
        ordered.truncate(eligible);
        debug!("ranking refresh: {eligible} eligible buckets");

        ordered
            .into_iter()
            .filter_map(|bucket| {
                let stats = self.load_stats(&self.store, &bucket)?;
                (stats.count > 0).then(|| RankedBucket {
                    centroid: stats.centroid(),
                    useful_sublocalities: stats.useful_sublocalities(),
                    bucket,
                })
            })
            .collect()
    }

    /// Reads and decodes bucket statistics through `view`; corrupt stats
    /// are logged and treated as absent.
    fn load_stats<V: ReadView>(&self, view: &V, bucket: &str) -> Option<BucketStats> {
        let bytes = view.get(&stats_key(bucket))?;
        match bincode::decode_from_slice(&bytes, binc_config()) {
            Ok((stats, _)) => Some(stats),
            Err(e) => {
                warn!("corrupt bucket stats for '{bucket}', treating as absent: {e}");
                None
            }
        }
    }
}

const STATS_PREFIX: &str = "loc/";
const RANK_PREFIX: &str = "locs/";

fn stats_key(bucket: &str) -> Vec<u8> {
    format!("{STATS_PREFIX}{bucket}").into_bytes()
}

/// Rank keys store `u64::MAX - count` zero-padded to 20 digits, so the
/// highest-count bucket sorts first lexicographically, independent of digit
/// length.
fn rank_key(count: u64, bucket: &str) -> Vec<u8> {
    format!("{RANK_PREFIX}{:020}/{bucket}", u64::MAX - count).into_bytes()
}

fn parse_rank_key(key: &[u8]) -> Option<String> {
    let key = std::str::from_utf8(key).ok()?;
    let rest = key.strip_prefix(RANK_PREFIX)?;
    let (_, bucket) = rest.split_once('/')?;
    Some(bucket.to_string())
}

fn encode_stats(stats: &BucketStats, bucket: &str) -> Result<Vec<u8>> {
    bincode::encode_to_vec(stats, binc_config())
        .map_err(|e| Error::invalid_operation(format!("encode bucket '{bucket}': {e}")))
}

fn binc_config() -> impl bincode::config::Config {
    bincode::config::standard().with_fixed_int_encoding()
}
