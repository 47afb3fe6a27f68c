//! User references: identifiers seeded once per run and shared read-only.

use crate::error::{BenchError, BenchResult};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Opaque user identifier.
///
/// The API may hand out UUID strings or integers; both are kept as text and
/// only ever echoed back in `/users/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "RawUserId", into = "String")]
pub struct UserId(String);

#[derive(Deserialize)]
#[serde(untagged)]
enum RawUserId {
    Text(String),
    Int(i64),
}

impl From<RawUserId> for UserId {
    fn from(raw: RawUserId) -> Self {
        match raw {
            RawUserId::Text(s) => Self(s),
            RawUserId::Int(n) => Self(n.to_string()),
        }
    }
}

impl From<UserId> for String {
    fn from(id: UserId) -> Self {
        id.0
    }
}

impl UserId {
    /// Create an identifier from any string-like value
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier text
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Deserialize)]
struct SeedItem {
    id: UserId,
}

/// The part of a `GET /users` page the setup phase cares about
#[derive(Debug, Deserialize)]
pub(crate) struct SeedPage {
    items: Vec<SeedItem>,
}

impl SeedPage {
    pub(crate) fn into_ids(self) -> Vec<UserId> {
        self.items.into_iter().map(|item| item.id).collect()
    }
}

/// Immutable, non-empty, ordered set of user identifiers.
///
/// Cloning is cheap; every VU holds a clone of the same allocation.
#[derive(Debug, Clone)]
pub struct UserRefs(Arc<[UserId]>);

impl UserRefs {
    /// Wrap a list of identifiers, rejecting an empty one
    pub fn new(ids: Vec<UserId>) -> BenchResult<Self> {
        if ids.is_empty() {
            return Err(BenchError::EmptyUserSet);
        }
        Ok(Self(ids.into()))
    }

    /// Sample one identifier uniformly
    pub fn choose<R: Rng + ?Sized>(&self, rng: &mut R) -> &UserId {
        &self.0[rng.gen_range(0..self.0.len())]
    }

    /// Number of identifiers
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; kept for API symmetry with `len`
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Identifiers in seed order
    #[must_use]
    pub fn as_slice(&self) -> &[UserId] {
        &self.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_user_id_from_uuid_string() {
        let id: UserId = serde_json::from_str(r#""5f0c1e8e-0000-4000-8000-000000000001""#).unwrap();
        assert_eq!(id.as_str(), "5f0c1e8e-0000-4000-8000-000000000001");
    }

    #[test]
    fn test_user_id_from_integer() {
        let id: UserId = serde_json::from_str("42").unwrap();
        assert_eq!(id.to_string(), "42");
    }

    #[test]
    fn test_user_id_serializes_as_string() {
        let json = serde_json::to_string(&UserId::new("7")).unwrap();
        assert_eq!(json, r#""7""#);
    }

    #[test]
    fn test_seed_page_projects_ids_in_order() {
        let json = r#"{
            "items": [
                {"id": "a", "email": "a@example.com", "full_name": "A"},
                {"id": "b", "email": "b@example.com", "full_name": "B"}
            ],
            "total": 10000, "limit": 200, "offset": 0
        }"#;
        let page: SeedPage = serde_json::from_str(json).unwrap();
        let ids = page.into_ids();
        assert_eq!(ids, vec![UserId::new("a"), UserId::new("b")]);
    }

    #[test]
    fn test_seed_page_requires_items() {
        assert!(serde_json::from_str::<SeedPage>(r#"{"total": 0}"#).is_err());
    }

    #[test]
    fn test_user_refs_rejects_empty() {
        let err = UserRefs::new(Vec::new()).unwrap_err();
        assert!(matches!(err, BenchError::EmptyUserSet));
    }

    #[test]
    fn test_choose_stays_in_set() {
        let refs = UserRefs::new(vec![UserId::new("x"), UserId::new("y"), UserId::new("z")]).unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..100 {
            let id = refs.choose(&mut rng);
            assert!(refs.as_slice().contains(id));
        }
        assert_eq!(refs.len(), 3);
        assert!(!refs.is_empty());
    }

    #[test]
    fn test_clones_share_storage() {
        let refs = UserRefs::new(vec![UserId::new("only")]).unwrap();
        let clone = refs.clone();
        assert!(std::ptr::eq(refs.as_slice(), clone.as_slice()));
    }
}
