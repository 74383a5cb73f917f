//! Configured service list → deduplicated canonical list.

use crate::services::alias::{AliasTable, UnknownServiceError};
use crate::services::id::ServiceId;

/// Canonical services in first-occurrence order, each exactly once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedServiceSet(Vec<ServiceId>);

impl ResolvedServiceSet {
    pub fn as_slice(&self) -> &[ServiceId] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ServiceId> {
        self.0.iter()
    }

    pub fn contains(&self, id: ServiceId) -> bool {
        self.0.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> IntoIterator for &'a ResolvedServiceSet {
    type Item = &'a ServiceId;
    type IntoIter = std::slice::Iter<'a, ServiceId>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Resolves configured names against an [`AliasTable`].
#[derive(Debug, Clone, Copy)]
pub struct ServiceResolver<'a> {
    aliases: &'a AliasTable,
}

impl<'a> ServiceResolver<'a> {
    pub fn new(aliases: &'a AliasTable) -> Self {
        Self { aliases }
    }

    /// Resolve every name in order.
    ///
    /// The first unknown name aborts resolution. Names that land on an
    /// already-resolved service (`web` then `api`) are dropped silently.
    /// An empty list resolves to an empty set.
    pub fn resolve_all<S: AsRef<str>>(
        &self,
        list: &[S],
    ) -> Result<ResolvedServiceSet, UnknownServiceError> {
        let mut resolved = Vec::with_capacity(list.len());

        for raw in list {
            let raw = raw.as_ref();
            let id = self.aliases.resolve(raw)?;

            if resolved.contains(&id) {
                tracing::debug!(name = raw, service = %id, "Service already resolved, skipping");
                continue;
            }
            resolved.push(id);
        }

        Ok(ResolvedServiceSet(resolved))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve(list: &[&str]) -> Result<Vec<ServiceId>, UnknownServiceError> {
        let table = AliasTable::standard();
        ServiceResolver::new(&table)
            .resolve_all(list)
            .map(|set| set.as_slice().to_vec())
    }

    #[test]
    fn test_web_and_api_collapse_to_one_web() {
        assert_eq!(resolve(&["web", "api"]).unwrap(), vec![ServiceId::Web]);
        assert_eq!(resolve(&["api", "web"]).unwrap(), vec![ServiceId::Web]);
        assert_eq!(
            resolve(&["api", "api", "web", "api"]).unwrap(),
            vec![ServiceId::Web]
        );
    }

    #[test]
    fn test_web_keeps_position_of_first_appearance() {
        assert_eq!(
            resolve(&["worker", "api", "collaboration", "web"]).unwrap(),
            vec![ServiceId::Worker, ServiceId::Web, ServiceId::Collaboration]
        );
    }

    #[test]
    fn test_order_preserved() {
        assert_eq!(
            resolve(&["worker", "collaboration", "worker"]).unwrap(),
            vec![ServiceId::Worker, ServiceId::Collaboration]
        );
    }

    #[test]
    fn test_empty_list_is_valid() {
        assert!(resolve(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_unknown_name_is_fatal() {
        let err = resolve(&["bogus"]).unwrap_err();
        assert_eq!(err.raw, "bogus");

        // Never skipped, even after valid names.
        let err = resolve(&["web", "worker", "bogus", "collaboration"]).unwrap_err();
        assert_eq!(err.raw, "bogus");
    }

    #[test]
    fn test_accepts_owned_strings() {
        let table = AliasTable::standard();
        let configured = vec!["api".to_string(), "admin".to_string()];
        let set = ServiceResolver::new(&table).resolve_all(&configured).unwrap();

        assert_eq!(set.len(), 2);
        assert!(set.contains(ServiceId::Web));
        assert!(set.contains(ServiceId::Admin));
    }
}
