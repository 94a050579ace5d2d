//! Permission matrix and raw permission overrides

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::ids::{Action, ModuleId};

/// Action grants for a single module
pub type ActionGrants = BTreeMap<Action, bool>;

/// Full module × action grant table for one sub-admin
///
/// A matrix on its own does not know the catalog; completeness (every catalog
/// module present) is established by the normalizer in `growgold-access`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionMatrix(BTreeMap<ModuleId, ActionGrants>);

impl PermissionMatrix {
    /// Create an empty matrix
    pub fn new() -> Self {
        Self::default()
    }

    /// Grant state of one action (absent entries read as `false`)
    pub fn get(&self, module: &ModuleId, action: &Action) -> bool {
        self.0
            .get(module)
            .and_then(|actions| actions.get(action))
            .copied()
            .unwrap_or(false)
    }

    /// Set one action, creating the module entry if needed
    pub fn set(&mut self, module: ModuleId, action: Action, granted: bool) {
        self.0.entry(module).or_default().insert(action, granted);
    }

    /// Action map of a module, if the module is present
    pub fn actions(&self, module: &ModuleId) -> Option<&ActionGrants> {
        self.0.get(module)
    }

    /// Mutable action map of a module, inserting an empty one if absent
    pub fn actions_mut(&mut self, module: ModuleId) -> &mut ActionGrants {
        self.0.entry(module).or_default()
    }

    /// Replace the whole action map of a module
    pub fn replace_module(&mut self, module: ModuleId, actions: ActionGrants) {
        self.0.insert(module, actions);
    }

    pub fn contains_module(&self, module: &ModuleId) -> bool {
        self.0.contains_key(module)
    }

    /// Module ids present in the matrix
    pub fn modules(&self) -> impl Iterator<Item = &ModuleId> {
        self.0.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ModuleId, &ActionGrants)> {
        self.0.iter()
    }

    /// A module counts as enabled when any of its actions is granted
    pub fn is_module_enabled(&self, module: &ModuleId) -> bool {
        self.0
            .get(module)
            .is_some_and(|actions| actions.values().any(|granted| *granted))
    }

    /// Whether any action of any module is granted
    pub fn has_any_grant(&self) -> bool {
        self.0
            .values()
            .any(|actions| actions.values().any(|granted| *granted))
    }

    /// Granted actions of a module, in vocabulary order
    pub fn granted(&self, module: &ModuleId) -> Vec<&Action> {
        self.0
            .get(module)
            .map(|actions| {
                actions
                    .iter()
                    .filter_map(|(action, granted)| granted.then_some(action))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Stable content hash used to correlate audit entries
    pub fn fingerprint(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        for (module, actions) in &self.0 {
            hasher.update(module.as_str().as_bytes());
            hasher.update(b"{");
            for (action, granted) in actions {
                hasher.update(action.as_str().as_bytes());
                hasher.update(if *granted { b"=1;" } else { b"=0;" });
            }
            hasher.update(b"}");
        }
        hasher.finalize().to_hex().to_string()
    }
}

/// JavaScript-style truthiness used to coerce raw grant values
///
/// `null`, `false`, `0` and `""` are false; every other value is true.
pub fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Raw, possibly partial permission input
///
/// Built from arbitrary JSON without ever failing: a non-object document
/// yields no overrides, and a module whose action value is not an object
/// contributes an empty action map.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value", into = "Value")]
pub struct PermissionOverrides(BTreeMap<ModuleId, BTreeMap<Action, Value>>);

impl PermissionOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read overrides leniently from a JSON document
    pub fn from_json(value: &Value) -> Self {
        let Some(modules) = value.as_object() else {
            return Self::default();
        };

        let entries = modules
            .iter()
            .map(|(module, actions)| {
                let actions = actions
                    .as_object()
                    .map(|actions| {
                        actions
                            .iter()
                            .map(|(action, value)| (Action::from(action.as_str()), value.clone()))
                            .collect()
                    })
                    .unwrap_or_default();
                (ModuleId::from(module.as_str()), actions)
            })
            .collect();

        Self(entries)
    }

    /// Set a raw value for one action
    pub fn set(mut self, module: ModuleId, action: Action, value: impl Into<Value>) -> Self {
        self.0.entry(module).or_default().insert(action, value.into());
        self
    }

    /// Grant one action
    pub fn grant(self, module: ModuleId, action: Action) -> Self {
        self.set(module, action, true)
    }

    /// Mention a module without any action values
    pub fn touch(mut self, module: ModuleId) -> Self {
        self.0.entry(module).or_default();
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ModuleId, &BTreeMap<Action, Value>)> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Value> for PermissionOverrides {
    fn from(value: Value) -> Self {
        Self::from_json(&value)
    }
}

impl From<PermissionOverrides> for Value {
    fn from(overrides: PermissionOverrides) -> Self {
        let modules: Map<String, Value> = overrides
            .0
            .into_iter()
            .map(|(module, actions)| {
                let actions: Map<String, Value> = actions
                    .into_iter()
                    .map(|(action, value)| (String::from(action), value))
                    .collect();
                (String::from(module), Value::Object(actions))
            })
            .collect();
        Value::Object(modules)
    }
}

impl From<&PermissionMatrix> for PermissionOverrides {
    fn from(matrix: &PermissionMatrix) -> Self {
        Self(
            matrix
                .iter()
                .map(|(module, actions)| {
                    let actions = actions
                        .iter()
                        .map(|(action, granted)| (action.clone(), Value::Bool(*granted)))
                        .collect();
                    (module.clone(), actions)
                })
                .collect(),
        )
    }
}

impl From<PermissionMatrix> for PermissionOverrides {
    fn from(matrix: PermissionMatrix) -> Self {
        Self::from(&matrix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_truthiness() {
        assert!(!truthy(&Value::Null));
        assert!(!truthy(&json!(0)));
        assert!(!truthy(&json!("")));
        assert!(!truthy(&json!(false)));
        assert!(truthy(&json!("yes")));
        assert!(truthy(&json!(2)));
        assert!(truthy(&json!([])));
        assert!(truthy(&json!({})));
    }

    #[test]
    fn test_overrides_from_loose_json() {
        let overrides = PermissionOverrides::from_json(&json!({
            "faq": { "view": 1, "publish": "yes" },
            "reports": null,
            "dashboard": true
        }));

        let modules: Vec<&ModuleId> = overrides.iter().map(|(m, _)| m).collect();
        assert_eq!(modules.len(), 3);

        let (_, dashboard) = overrides
            .iter()
            .find(|(m, _)| **m == ModuleId::Dashboard)
            .unwrap();
        assert!(dashboard.is_empty());

        assert!(PermissionOverrides::from_json(&json!([1, 2])).is_empty());
    }

    #[test]
    fn test_overrides_deserialize_and_serialize() {
        let overrides: PermissionOverrides =
            serde_json::from_str(r#"{"subAdmin": {"edit": true}}"#).unwrap();
        let expected = PermissionOverrides::new().grant(ModuleId::SubAdmin, Action::Edit);
        assert_eq!(overrides, expected);

        let value = serde_json::to_value(&expected).unwrap();
        assert_eq!(value, json!({"subAdmin": {"edit": true}}));
    }

    #[test]
    fn test_matrix_queries() {
        let mut matrix = PermissionMatrix::new();
        matrix.set(ModuleId::Faq, Action::View, true);
        matrix.set(ModuleId::Faq, Action::Delete, true);
        matrix.set(ModuleId::Dashboard, Action::View, false);

        assert!(matrix.get(&ModuleId::Faq, &Action::View));
        assert!(!matrix.get(&ModuleId::SubAdmin, &Action::View));
        assert!(matrix.is_module_enabled(&ModuleId::Faq));
        assert!(!matrix.is_module_enabled(&ModuleId::Dashboard));
        assert!(matrix.has_any_grant());
        assert_eq!(
            matrix.granted(&ModuleId::Faq),
            vec![&Action::View, &Action::Delete]
        );
    }

    #[test]
    fn test_fingerprint_tracks_content() {
        let mut a = PermissionMatrix::new();
        a.set(ModuleId::Faq, Action::View, true);
        let mut b = a.clone();
        assert_eq!(a.fingerprint(), b.fingerprint());

        b.set(ModuleId::Faq, Action::View, false);
        assert_ne!(a.fingerprint(), b.fingerprint());
        assert_eq!(a.fingerprint().len(), 64);
    }

    #[test]
    fn test_matrix_into_overrides() {
        let mut matrix = PermissionMatrix::new();
        matrix.set(ModuleId::Faq, Action::Add, true);
        let value: Value = PermissionOverrides::from(&matrix).into();
        assert_eq!(value, json!({"faq": {"add": true}}));
    }
}
