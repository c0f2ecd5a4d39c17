use crate::sites::{NewsSitePolicy, Outlet, SitePolicy};
use crate::PolicyError;
use std::collections::HashSet;
use std::sync::Arc;

/// The set of site policies a run crawls
///
/// Built once at startup from configuration and handed to the scheduler.
/// Holds no runtime state.
#[derive(Debug, Clone)]
pub struct SiteRegistry {
    policies: Vec<Arc<dyn SitePolicy>>,
}

impl SiteRegistry {
    /// Builds a registry holding every known outlet
    pub fn all() -> Result<Self, PolicyError> {
        let policies = Outlet::ALL
            .into_iter()
            .map(|outlet| NewsSitePolicy::new(outlet).map(|p| Arc::new(p) as Arc<dyn SitePolicy>))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { policies })
    }

    /// Builds a registry from configured site ids
    ///
    /// An empty list selects every known outlet. Unknown or repeated ids are
    /// errors.
    pub fn from_ids<S: AsRef<str>>(ids: &[S]) -> Result<Self, PolicyError> {
        if ids.is_empty() {
            return Self::all();
        }

        let mut policies: Vec<Arc<dyn SitePolicy>> = Vec::with_capacity(ids.len());
        for id in ids {
            let id = id.as_ref();
            let outlet =
                Outlet::from_id(id).ok_or_else(|| PolicyError::UnknownSite(id.to_string()))?;
            policies.push(Arc::new(NewsSitePolicy::new(outlet)?));
        }
        Self::from_policies(policies)
    }

    /// Wraps already-built policies, rejecting duplicate ids
    pub fn from_policies(policies: Vec<Arc<dyn SitePolicy>>) -> Result<Self, PolicyError> {
        let mut seen = HashSet::new();
        for policy in &policies {
            if !seen.insert(policy.id().to_string()) {
                return Err(PolicyError::DuplicateSite(policy.id().to_string()));
            }
        }
        Ok(Self { policies })
    }

    pub fn policies(&self) -> &[Arc<dyn SitePolicy>] {
        &self.policies
    }

    pub fn get(&self, id: &str) -> Option<&Arc<dyn SitePolicy>> {
        self.policies.iter().find(|policy| policy.id() == id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.policies.iter().map(|policy| policy.id())
    }

    pub fn len(&self) -> usize {
        self.policies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }

    pub fn into_policies(self) -> Vec<Arc<dyn SitePolicy>> {
        self.policies
    }
}
