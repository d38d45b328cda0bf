//! Dependency resolution against the deployment registry.

use crate::error::{Result, RomeError};
use crate::registry::{Deployment, DeploymentRegistry};
use alloy_primitives::Address;
use std::collections::BTreeMap;

/// Prerequisites resolved for one run. Immutable once built.
#[derive(Debug, Clone, Default)]
pub struct Resolved {
    entries: BTreeMap<String, Deployment>,
}

impl Resolved {
    pub fn address(&self, name: &str) -> Result<Address> {
        self.entries
            .get(name)
            .map(|d| d.address)
            .ok_or_else(|| RomeError::missing([name]))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Address)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.address))
    }
}

/// Look up every name. Any absent name fails the whole resolution, and the
/// error lists all of them, not just the first.
pub fn resolve(registry: &dyn DeploymentRegistry, names: &[&str]) -> Result<Resolved> {
    let mut entries = BTreeMap::new();
    let mut missing = Vec::new();
    for name in names {
        match registry.find(name)? {
            Some(d) => {
                tracing::debug!(name, address = %d.address, "resolved");
                entries.insert(name.to_string(), d);
            }
            None => missing.push(*name),
        }
    }
    if !missing.is_empty() {
        return Err(RomeError::missing(missing));
    }
    Ok(Resolved { entries })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeChain, MemoryRegistry};
    use alloy_primitives::address;

    const ROME: Address = address!("5fbdb2315678afecb367f032d93f642f64180aa3");
    const AROME: Address = address!("e7f1725e7734ce288f8367e1bb143e90bb3f0512");

    #[test]
    fn resolves_all_names() {
        let chain = FakeChain::new(1337);
        let registry = MemoryRegistry::new(chain.journal_handle())
            .with("Rome", ROME)
            .with("aRome", AROME);
        let resolved = resolve(&registry, &["Rome", "aRome"]).unwrap();
        assert_eq!(resolved.len(), 2);
        assert_eq!(resolved.address("Rome").unwrap(), ROME);
        assert_eq!(resolved.address("aRome").unwrap(), AROME);
    }

    #[test]
    fn missing_names_are_all_reported() {
        let chain = FakeChain::new(1337);
        let registry = MemoryRegistry::new(chain.journal_handle()).with("Rome", ROME);
        let err = resolve(&registry, &["aRome", "Rome", "Distributor"]).unwrap_err();
        match err {
            RomeError::MissingDependency(names) => assert_eq!(names, "aRome, Distributor"),
            other => panic!("unexpected error: {other}"),
        }
        assert!(chain.journal().iter().all(|op| !op.is_state_changing()));
    }

    #[test]
    fn unresolved_lookup_after_resolution_is_missing() {
        let resolved = Resolved::default();
        assert!(resolved.is_empty());
        assert!(matches!(
            resolved.address("Rome"),
            Err(RomeError::MissingDependency(_))
        ));
    }
}
