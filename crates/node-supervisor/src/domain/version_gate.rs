//! Version gate for destructive data wipes
//!
//! Node releases that change the on-disk format bump a per-chain threshold.
//! A wipe is mandatory whenever the threshold is newer than the node version
//! recorded at the last wipe.

use std::cmp::Ordering;
use std::fmt;
use tracing::info;
use wallet_ipc::Chain;

/// Last node version requiring a wipe on `main` and `local`
pub const MAIN_WIPE_THRESHOLD: SemVer = SemVer::new(0, 9, 11);

/// Last node version requiring a wipe on `test`
pub const TEST_WIPE_THRESHOLD: SemVer = SemVer::new(0, 9, 28);

/// Numeric `major.minor.patch` version
///
/// Ordering is numeric per component, so `0.9.9 < 0.9.11`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SemVer {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl SemVer {
    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Parse `1`, `1.2` or `1.2.3`, with an optional `v` prefix.
    ///
    /// Pre-release and build suffixes (`-beta.1`, `+abc`) are ignored.
    /// Returns `None` for anything else.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        let trimmed = trimmed.strip_prefix('v').unwrap_or(trimmed);
        let core = trimmed
            .split(|c| c == '-' || c == '+')
            .next()
            .unwrap_or_default();
        if core.is_empty() {
            return None;
        }

        let mut parts = [0u64; 3];
        let mut count = 0;
        for component in core.split('.') {
            if count == parts.len() || component.is_empty() {
                return None;
            }
            if !component.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            parts[count] = component.parse().ok()?;
            count += 1;
        }

        Some(Self::new(parts[0], parts[1], parts[2]))
    }
}

impl fmt::Display for SemVer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Outcome of a wipe check
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WipeDecision {
    /// Whether a wipe must happen before launch
    pub required: bool,
    /// Threshold used for the chain
    pub threshold: SemVer,
    /// Parsed version of the last wipe, if a valid one exists
    pub last_wiped: Option<SemVer>,
}

/// Pure wipe policy
pub struct VersionGate;

impl VersionGate {
    /// Threshold for a chain
    pub fn threshold(net: Chain) -> SemVer {
        match net {
            Chain::Test => TEST_WIPE_THRESHOLD,
            Chain::Main | Chain::Local => MAIN_WIPE_THRESHOLD,
        }
    }

    /// Decide whether a wipe is required.
    ///
    /// An absent or unparseable `last_wiped_version` sorts below every real
    /// version.
    pub fn evaluate(net: Chain, last_wiped_version: Option<&str>) -> WipeDecision {
        let threshold = Self::threshold(net);
        let last_wiped = last_wiped_version.and_then(SemVer::parse);
        let required = match last_wiped {
            Some(version) => threshold.cmp(&version) == Ordering::Greater,
            None => true,
        };
        WipeDecision {
            required,
            threshold,
            last_wiped,
        }
    }

    /// Decide and log the banner when a wipe is required.
    pub fn is_wipe_required(net: Chain, last_wiped_version: Option<&str>) -> bool {
        let decision = Self::evaluate(net, last_wiped_version);
        if decision.required {
            log_wipe_needed(&decision);
        }
        decision.required
    }
}

fn log_wipe_needed(decision: &WipeDecision) {
    let last = decision
        .last_wiped
        .map(|v| v.to_string())
        .unwrap_or_else(|| "no local record of wiping found".to_string());
    info!(
        threshold = %decision.threshold,
        last_wiped = %last,
        "[NODE VERSION REQUIRES WIPE] last version requiring wipe: {}, last wiped on version: {}",
        decision.threshold,
        last
    );
}
