//! Context-keyed model registry.
//!
//! A [`ModelRegistry`] hands out one [`FlowModel`] per [`FlowContext`].
//! The registry is an ordinary value owned by the caller; there is no
//! process-wide instance.

use crate::model::FlowModel;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Key-value settings identifying a job execution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FlowContext(BTreeMap<String, String>);

impl FlowContext {
    /// Creates an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a context from key-value pairs.
    pub fn from_map<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Replaces every entry with the given ones.
    pub fn update<K, V>(&mut self, entries: impl IntoIterator<Item = (K, V)>) -> &mut Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        *self = Self::from_map(entries);
        self
    }

    /// Copies the entries of `other` in; existing keys are replaced only
    /// when `overwrite` is set.
    pub fn merge(&mut self, other: &FlowContext, overwrite: bool) {
        for (key, value) in &other.0 {
            self.insert(key.clone(), value.clone(), overwrite);
        }
    }

    /// Inserts an entry. Returns true if it was stored.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>, overwrite: bool) -> bool {
        let key = key.into();
        if !overwrite && self.0.contains_key(&key) {
            return false;
        }
        self.0.insert(key, value.into());
        true
    }

    /// Returns the value for `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the context has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl fmt::Display for FlowContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{context={")?;
        for (i, (k, v)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{k}={v}")?;
        }
        f.write_str("}}")
    }
}

/// One [`FlowModel`] per context.
#[derive(Debug, Default)]
pub struct ModelRegistry {
    models: Mutex<HashMap<FlowContext, Arc<FlowModel>>>,
}

impl ModelRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the model for `context`, creating it on first use.
    pub fn model(&self, context: &FlowContext) -> Arc<FlowModel> {
        let mut models = self.models.lock();
        if let Some(model) = models.get(context) {
            return Arc::clone(model);
        }
        debug!(context = %context, "model created");
        let model = Arc::new(FlowModel::new());
        models.insert(context.clone(), Arc::clone(&model));
        model
    }

    /// Returns true if a model exists for `context`.
    #[must_use]
    pub fn contains(&self, context: &FlowContext) -> bool {
        self.models.lock().contains_key(context)
    }

    /// Drops the model for `context`, returning it.
    pub fn remove(&self, context: &FlowContext) -> Option<Arc<FlowModel>> {
        self.models.lock().remove(context)
    }

    /// Returns the number of models.
    #[must_use]
    pub fn len(&self) -> usize {
        self.models.lock().len()
    }

    /// Returns true if the registry holds no model.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.models.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FlowConfig;

    #[test]
    fn context_merge_respects_overwrite() {
        let mut a = FlowContext::from_map([("env", "dev"), ("job", "load")]);
        let b = FlowContext::from_map([("env", "prod"), ("run", "7")]);

        a.merge(&b, false);
        assert_eq!(a.get("env"), Some("dev"));
        assert_eq!(a.get("run"), Some("7"));

        a.merge(&b, true);
        assert_eq!(a.get("env"), Some("prod"));
        assert_eq!(a.len(), 3);
    }

    #[test]
    fn context_insert_and_update() {
        let mut ctx = FlowContext::new();
        assert!(ctx.insert("k", "1", false));
        assert!(!ctx.insert("k", "2", false));
        assert!(ctx.insert("k", "3", true));
        assert_eq!(ctx.get("k"), Some("3"));

        ctx.update([("other", "x")]);
        assert_eq!(ctx.get("k"), None);
        assert_eq!(ctx.to_string(), "{context={other=x}}");
    }

    #[test]
    fn equal_contexts_share_a_model() {
        let registry = ModelRegistry::new();
        let a = FlowContext::from_map([("job", "load"), ("env", "dev")]);
        let b = FlowContext::from_map([("env", "dev"), ("job", "load")]);

        let model = registry.model(&a);
        model.new_flow("customers", FlowConfig::new()).unwrap();
        assert!(Arc::ptr_eq(&model, &registry.model(&b)));
        assert!(registry.model(&b).has_flow("customers"));
        assert_eq!(registry.len(), 1);

        let other = registry.model(&FlowContext::new());
        assert!(!Arc::ptr_eq(&model, &other));
        assert_eq!(registry.len(), 2);

        assert!(registry.remove(&a).is_some());
        assert!(!registry.contains(&b));
        assert!(!registry.model(&b).has_flow("customers"));
    }
}
