//! Prompt composition: the main Dolphin script plus pre/post modules.
//!
//! Modules start from templates. A module whose value differs from its
//! template is marked `edited` and can be reverted. Variables bound in the
//! script or in any enabled module are offered to the output selectors.

use crate::extract::{dedupe_by_value, BoundVariable, ExtractScope, VariableExtractor};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A stock module body, looked up by key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DolphinTemplate {
    pub key: String,
    pub name: String,
    pub value: String,
}

/// Value of the template with `key`, or an empty string.
pub fn template_value<'a>(templates: &'a [DolphinTemplate], key: &str) -> &'a str {
    templates
        .iter()
        .find(|t| t.key == key)
        .map(|t| t.value.as_str())
        .unwrap_or("")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DolphinModule {
    pub key: String,
    pub name: String,
    pub value: String,
    pub enabled: bool,
    #[serde(default)]
    pub edited: bool,
}

impl DolphinModule {
    pub fn from_template(template: &DolphinTemplate) -> Self {
        Self {
            key: template.key.clone(),
            name: template.name.clone(),
            value: template.value.clone(),
            enabled: true,
            edited: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptComposition {
    pub dolphin: String,
    pub pre_modules: Vec<DolphinModule>,
    pub post_modules: Vec<DolphinModule>,
}

impl PromptComposition {
    pub fn new(dolphin: impl Into<String>) -> Self {
        Self {
            dolphin: dolphin.into(),
            ..Self::default()
        }
    }

    /// The script followed by every enabled module, pre modules first.
    pub fn composed_source(&self) -> String {
        let modules: Vec<&str> = self
            .pre_modules
            .iter()
            .chain(&self.post_modules)
            .filter(|m| m.enabled)
            .map(|m| m.value.as_str())
            .collect();
        format!("{}\n{}", self.dolphin, modules.join("\n"))
    }

    /// Deduplicated variables bound anywhere in the composed source.
    pub fn bound_variables(&self, extractor: &VariableExtractor) -> Vec<BoundVariable> {
        dedupe_by_value(extractor.extract(&self.composed_source(), ExtractScope::All))
    }

    pub fn module(&self, key: &str) -> Option<&DolphinModule> {
        self.pre_modules
            .iter()
            .chain(&self.post_modules)
            .find(|m| m.key == key)
    }

    fn module_mut(&mut self, key: &str) -> Option<&mut DolphinModule> {
        self.pre_modules
            .iter_mut()
            .chain(self.post_modules.iter_mut())
            .find(|m| m.key == key)
    }

    /// Set a module body. Returns `false` when no module has `key`.
    pub fn update_module(&mut self, key: &str, value: impl Into<String>, templates: &[DolphinTemplate]) -> bool {
        let template = template_value(templates, key);
        let Some(module) = self.module_mut(key) else {
            return false;
        };
        module.value = value.into();
        module.edited = module.value != template;
        debug!(key, edited = module.edited, "updated Dolphin module");
        true
    }

    /// Restore a module to its template body.
    pub fn revert_module(&mut self, key: &str, templates: &[DolphinTemplate]) -> bool {
        let template = template_value(templates, key).to_string();
        let Some(module) = self.module_mut(key) else {
            return false;
        };
        module.value = template;
        module.edited = false;
        true
    }

    pub fn set_enabled(&mut self, key: &str, enabled: bool) -> bool {
        match self.module_mut(key) {
            Some(module) => {
                module.enabled = enabled;
                true
            }
            None => false,
        }
    }

    /// Whether reverting would change the module.
    pub fn can_revert(&self, key: &str, templates: &[DolphinTemplate]) -> bool {
        self.module(key)
            .is_some_and(|m| m.value != template_value(templates, key))
    }
}

/// Output variables picked from the bound variables.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputBindings {
    pub answer_var: Option<String>,
    pub doc_retrieval_var: Option<String>,
}

impl OutputBindings {
    /// Clear selections no longer bound. Returns whether anything changed.
    pub fn reconcile(&mut self, variables: &[BoundVariable]) -> bool {
        let mut changed = false;
        for slot in [&mut self.answer_var, &mut self.doc_retrieval_var] {
            let stale = slot
                .as_deref()
                .is_some_and(|name| !variables.iter().any(|v| v.value == name));
            if stale {
                *slot = None;
                changed = true;
            }
        }
        changed
    }
}
