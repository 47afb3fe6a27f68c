//! Request parameter selection.
//!
//! Selection is a pure function of the policy, the seeded user references
//! and a random source, so it can be exercised without any network I/O.

use crate::users::{UserId, UserRefs};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Page size used by the list policy
pub const LIST_LIMIT: u32 = 50;

/// Offsets are drawn from `[0, LIST_OFFSET_SPAN)` so a full page always fits
/// in the 10 000-row seed data set
pub const LIST_OFFSET_SPAN: u32 = 9950;

/// Page size of the setup fetch
pub const SEED_LIMIT: u32 = 200;

/// Share of mixed iterations routed to read-one
pub const DEFAULT_READ_RATIO: f64 = 0.7;

/// How each iteration picks its request
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Policy {
    /// Fetch one random seeded user
    ReadOne,
    /// Fetch one page at a random offset
    ListPage,
    /// Per-iteration coin flip between read-one and list-page
    Mixed {
        /// Probability of read-one on each iteration
        #[serde(default = "default_read_ratio")]
        read_ratio: f64,
    },
}

fn default_read_ratio() -> f64 {
    DEFAULT_READ_RATIO
}

impl Policy {
    /// Mixed policy with the default 70/30 split
    #[must_use]
    pub const fn mixed() -> Self {
        Self::Mixed {
            read_ratio: DEFAULT_READ_RATIO,
        }
    }

    /// Whether the policy needs user references from the setup phase
    #[must_use]
    pub const fn needs_user_refs(&self) -> bool {
        !matches!(self, Self::ListPage)
    }

    /// Short label for reports
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::ReadOne => "read-one",
            Self::ListPage => "list-page",
            Self::Mixed { .. } => "mixed",
        }
    }
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mixed { read_ratio } => write!(f, "mixed ({:.0}% read)", read_ratio * 100.0),
            other => f.write_str(other.label()),
        }
    }
}

/// Parameters of one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestParams {
    /// `GET /users/{id}`
    ReadOne {
        /// Identifier to fetch
        id: UserId,
    },
    /// `GET /users?limit=..&offset=..`
    ListPage {
        /// Requested page size
        limit: u32,
        /// Requested offset
        offset: u32,
    },
}

impl RequestParams {
    /// Path and query relative to the base URL
    #[must_use]
    pub fn path(&self) -> String {
        match self {
            Self::ReadOne { id } => format!("/users/{id}"),
            Self::ListPage { limit, offset } => format!("/users?limit={limit}&offset={offset}"),
        }
    }

    /// Endpoint name used to group statistics
    #[must_use]
    pub const fn endpoint(&self) -> Endpoint {
        match self {
            Self::ReadOne { .. } => Endpoint::GetUser,
            Self::ListPage { .. } => Endpoint::ListUsers,
        }
    }

    /// Parameters of the setup fetch
    #[must_use]
    pub const fn seed_page() -> Self {
        Self::ListPage {
            limit: SEED_LIMIT,
            offset: 0,
        }
    }
}

/// The two endpoints the runner exercises
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Endpoint {
    /// `GET /users`
    ListUsers,
    /// `GET /users/{id}`
    GetUser,
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ListUsers => write!(f, "GET /users"),
            Self::GetUser => write!(f, "GET /users/{{id}}"),
        }
    }
}

/// Pick the parameters for one iteration.
///
/// `refs` may be `None` only for [`Policy::ListPage`]; for the other policies
/// the runner guarantees setup has produced a non-empty set. Should a caller
/// pass `None` anyway, the draw falls back to a list page.
pub fn select<R: Rng + ?Sized>(policy: Policy, refs: Option<&UserRefs>, rng: &mut R) -> RequestParams {
    match (policy, refs) {
        (Policy::ReadOne, Some(refs)) => read_one(refs, rng),
        (Policy::Mixed { read_ratio }, Some(refs)) => {
            if rng.gen::<f64>() < read_ratio {
                read_one(refs, rng)
            } else {
                list_page(rng)
            }
        }
        _ => list_page(rng),
    }
}

fn read_one<R: Rng + ?Sized>(refs: &UserRefs, rng: &mut R) -> RequestParams {
    RequestParams::ReadOne {
        id: refs.choose(rng).clone(),
    }
}

fn list_page<R: Rng + ?Sized>(rng: &mut R) -> RequestParams {
    RequestParams::ListPage {
        limit: LIST_LIMIT,
        offset: rng.gen_range(0..LIST_OFFSET_SPAN),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn refs(n: usize) -> UserRefs {
        UserRefs::new((0..n).map(|i| UserId::new(i.to_string())).collect()).unwrap()
    }

    #[test]
    fn test_read_one_path() {
        let params = RequestParams::ReadOne {
            id: UserId::new("abc"),
        };
        assert_eq!(params.path(), "/users/abc");
        assert_eq!(params.endpoint(), Endpoint::GetUser);
    }

    #[test]
    fn test_list_page_path() {
        let params = RequestParams::ListPage {
            limit: 50,
            offset: 120,
        };
        assert_eq!(params.path(), "/users?limit=50&offset=120");
        assert_eq!(params.endpoint(), Endpoint::ListUsers);
    }

    #[test]
    fn test_seed_page() {
        assert_eq!(RequestParams::seed_page().path(), "/users?limit=200&offset=0");
    }

    #[test]
    fn test_needs_user_refs() {
        assert!(Policy::ReadOne.needs_user_refs());
        assert!(Policy::mixed().needs_user_refs());
        assert!(!Policy::ListPage.needs_user_refs());
    }

    #[test]
    fn test_policy_display() {
        assert_eq!(Policy::ReadOne.to_string(), "read-one");
        assert_eq!(Policy::ListPage.to_string(), "list-page");
        assert_eq!(Policy::mixed().to_string(), "mixed (70% read)");
    }

    #[test]
    fn test_endpoint_display() {
        assert_eq!(Endpoint::ListUsers.to_string(), "GET /users");
        assert_eq!(Endpoint::GetUser.to_string(), "GET /users/{id}");
    }

    #[test]
    fn test_policy_yaml_shape() {
        let policy: Policy = serde_yaml_ng::from_str("type: mixed\n").unwrap();
        assert_eq!(policy, Policy::mixed());
        let policy: Policy = serde_yaml_ng::from_str("type: read_one\n").unwrap();
        assert_eq!(policy, Policy::ReadOne);
    }

    #[test]
    fn test_list_policy_ignores_refs() {
        let mut rng = StdRng::seed_from_u64(1);
        let params = select(Policy::ListPage, None, &mut rng);
        assert!(matches!(params, RequestParams::ListPage { limit: 50, .. }));
    }

    #[test]
    fn test_read_policy_without_refs_falls_back_to_list() {
        let mut rng = StdRng::seed_from_u64(1);
        let params = select(Policy::ReadOne, None, &mut rng);
        assert!(matches!(params, RequestParams::ListPage { .. }));
    }

    #[test]
    fn test_mixed_ratio_converges() {
        let refs = refs(200);
        let mut rng = StdRng::seed_from_u64(0x5eed);
        let draws = 20_000;
        let reads = (0..draws)
            .filter(|_| {
                matches!(
                    select(Policy::mixed(), Some(&refs), &mut rng),
                    RequestParams::ReadOne { .. }
                )
            })
            .count();
        let ratio = reads as f64 / f64::from(draws);
        assert!((ratio - 0.7).abs() < 0.02, "read ratio {ratio}");
    }

    #[test]
    fn test_mixed_extremes() {
        let refs = refs(3);
        let mut rng = StdRng::seed_from_u64(9);
        for _ in 0..200 {
            assert!(matches!(
                select(Policy::Mixed { read_ratio: 1.0 }, Some(&refs), &mut rng),
                RequestParams::ReadOne { .. }
            ));
            assert!(matches!(
                select(Policy::Mixed { read_ratio: 0.0 }, Some(&refs), &mut rng),
                RequestParams::ListPage { .. }
            ));
        }
    }

    proptest! {
        #[test]
        fn prop_list_offset_in_range(seed in any::<u64>()) {
            let mut rng = StdRng::seed_from_u64(seed);
            match select(Policy::ListPage, None, &mut rng) {
                RequestParams::ListPage { limit, offset } => {
                    prop_assert_eq!(limit, LIST_LIMIT);
                    prop_assert!(offset < LIST_OFFSET_SPAN);
                }
                other => prop_assert!(false, "unexpected {:?}", other),
            }
        }

        #[test]
        fn prop_read_id_comes_from_refs(seed in any::<u64>(), n in 1usize..300) {
            let refs = refs(n);
            let mut rng = StdRng::seed_from_u64(seed);
            match select(Policy::ReadOne, Some(&refs), &mut rng) {
                RequestParams::ReadOne { id } => prop_assert!(refs.as_slice().contains(&id)),
                other => prop_assert!(false, "unexpected {:?}", other),
            }
        }
    }
}
