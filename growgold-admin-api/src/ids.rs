//! Module and action identifiers
//!
//! Both are closed enums with an `Other` arm so that keys written by an older
//! (or newer) catalog survive a round trip instead of being dropped. The
//! `Other` payload can only be built through the `From` conversions, so a
//! known id such as `"faq"` always lands on its named variant.

use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Raw id carried by the `Other` arms, never one of the known ids
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CustomId(String);

impl CustomId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CustomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

/// Identifier of a manageable area of the admin panel
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ModuleId {
    /// Frequently asked questions
    Faq,
    /// Landing dashboard
    Dashboard,
    /// Sub-admin management
    SubAdmin,
    /// Any id the built-in vocabulary does not know
    Other(CustomId),
}

impl ModuleId {
    /// Wire representation (`"faq"`, `"dashboard"`, `"subAdmin"`, ...)
    pub fn as_str(&self) -> &str {
        match self {
            ModuleId::Faq => "faq",
            ModuleId::Dashboard => "dashboard",
            ModuleId::SubAdmin => "subAdmin",
            ModuleId::Other(id) => id.as_str(),
        }
    }
}

impl From<&str> for ModuleId {
    fn from(id: &str) -> Self {
        match id {
            "faq" => ModuleId::Faq,
            "dashboard" => ModuleId::Dashboard,
            "subAdmin" => ModuleId::SubAdmin,
            other => ModuleId::Other(CustomId(other.to_string())),
        }
    }
}

impl From<String> for ModuleId {
    fn from(id: String) -> Self {
        match id.as_str() {
            "faq" | "dashboard" | "subAdmin" => ModuleId::from(id.as_str()),
            _ => ModuleId::Other(CustomId(id)),
        }
    }
}

impl From<ModuleId> for String {
    fn from(id: ModuleId) -> Self {
        match id {
            ModuleId::Other(id) => id.0,
            known => known.as_str().to_string(),
        }
    }
}

impl FromStr for ModuleId {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(ModuleId::from(s))
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// A fine-grained operation scoped to one module
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Action {
    View,
    Add,
    Edit,
    Delete,
    /// Action key outside the standard vocabulary
    Other(CustomId),
}

impl Action {
    /// The global action vocabulary, in display order
    pub const VOCABULARY: [Action; 4] = [Action::View, Action::Add, Action::Edit, Action::Delete];

    pub fn as_str(&self) -> &str {
        match self {
            Action::View => "view",
            Action::Add => "add",
            Action::Edit => "edit",
            Action::Delete => "delete",
            Action::Other(id) => id.as_str(),
        }
    }

    /// Human-readable label; unknown actions fall back to their raw id
    pub fn label(&self) -> &str {
        match self {
            Action::View => "View",
            Action::Add => "Add",
            Action::Edit => "Edit",
            Action::Delete => "Delete",
            Action::Other(id) => id.as_str(),
        }
    }

    /// Whether this action belongs to the standard vocabulary
    pub fn is_standard(&self) -> bool {
        !matches!(self, Action::Other(_))
    }
}

impl From<&str> for Action {
    fn from(id: &str) -> Self {
        match id {
            "view" => Action::View,
            "add" => Action::Add,
            "edit" => Action::Edit,
            "delete" => Action::Delete,
            other => Action::Other(CustomId(other.to_string())),
        }
    }
}

impl From<String> for Action {
    fn from(id: String) -> Self {
        match Action::from(id.as_str()) {
            Action::Other(_) => Action::Other(CustomId(id)),
            known => known,
        }
    }
}

impl From<Action> for String {
    fn from(action: Action) -> Self {
        match action {
            Action::Other(id) => id.0,
            known => known.as_str().to_string(),
        }
    }
}

impl FromStr for Action {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Action::from(s))
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_id_parsing() {
        assert_eq!(ModuleId::from("subAdmin"), ModuleId::SubAdmin);
        let analytics = ModuleId::from("analytics".to_string());
        assert!(matches!(&analytics, ModuleId::Other(id) if id.as_str() == "analytics"));
        assert_eq!(ModuleId::Faq.to_string(), "faq");
    }

    #[test]
    fn test_known_ids_never_become_other() {
        for id in ["faq", "dashboard", "subAdmin"] {
            assert!(!matches!(ModuleId::from(id), ModuleId::Other(_)));
            assert!(!matches!(ModuleId::from(id.to_string()), ModuleId::Other(_)));
            assert!(!matches!(id.parse::<ModuleId>().unwrap(), ModuleId::Other(_)));
        }
        assert_eq!(ModuleId::from("faq".to_string()), ModuleId::Faq);
        assert_eq!(Action::from("view".to_string()), Action::View);

        let module: ModuleId = serde_json::from_str("\"faq\"").unwrap();
        assert_eq!(module, ModuleId::Faq);
    }

    #[test]
    fn test_serde_uses_wire_ids() {
        let json = serde_json::to_string(&ModuleId::SubAdmin).unwrap();
        assert_eq!(json, "\"subAdmin\"");

        let action: Action = serde_json::from_str("\"publish\"").unwrap();
        assert_eq!(action, Action::from("publish"));
        assert!(matches!(&action, Action::Other(id) if id.as_str() == "publish"));
        assert!(!action.is_standard());
        assert_eq!(action.label(), "publish");
    }

    #[test]
    fn test_vocabulary_order() {
        let ids: Vec<&str> = Action::VOCABULARY.iter().map(Action::as_str).collect();
        assert_eq!(ids, vec!["view", "add", "edit", "delete"]);
        assert!(Action::View < Action::Delete);
    }
}
