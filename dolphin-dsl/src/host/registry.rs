//! Language registry and completion-provider registrations.

use crate::completion::{CompletionItem, CompletionProvider, CompletionRequest, ProviderKind};
use crate::grammar::{DslGrammarConfig, BRACKETS, LINE_COMMENT};
use crate::lexer::Tokenizer;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak};
use tracing::debug;

/// Editor behaviour settings for a language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageConfiguration {
    pub line_comment: String,
    pub brackets: Vec<(char, char)>,
    pub auto_closing_pairs: Vec<(char, char)>,
}

impl LanguageConfiguration {
    pub fn for_grammar(grammar: &DslGrammarConfig) -> Self {
        Self {
            line_comment: LINE_COMMENT.to_string(),
            brackets: BRACKETS.to_vec(),
            auto_closing_pairs: grammar.auto_closing_pairs().to_vec(),
        }
    }
}

#[derive(Default)]
struct LanguageEntry {
    tokenizer: Option<Tokenizer>,
    configuration: Option<LanguageConfiguration>,
    providers: Vec<(u64, Arc<dyn CompletionProvider>)>,
}

#[derive(Default)]
struct RegistryState {
    languages: HashMap<String, LanguageEntry>,
    next_id: u64,
}

/// Languages known to an editor host and their completion providers.
///
/// Shared as `Arc<LanguageRegistry>`; provider registrations hold a weak
/// reference back and remove themselves when dropped.
#[derive(Default)]
pub struct LanguageRegistry {
    state: RwLock<RegistryState>,
}

impl fmt::Debug for LanguageRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.read();
        let mut languages: Vec<&String> = state.languages.keys().collect();
        languages.sort();
        f.debug_struct("LanguageRegistry")
            .field("languages", &languages)
            .finish()
    }
}

impl LanguageRegistry {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    // A poisoned lock only means a provider panicked mid-call; the maps stay
    // consistent, so keep serving them.
    fn read(&self) -> RwLockReadGuard<'_, RegistryState> {
        self.state.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, RegistryState> {
        self.state.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn register_language(&self, language: &str) {
        self.write().languages.entry(language.to_string()).or_default();
        debug!(language, "registered language");
    }

    pub fn is_registered(&self, language: &str) -> bool {
        self.read().languages.contains_key(language)
    }

    pub fn set_tokens_provider(&self, language: &str, tokenizer: Tokenizer) {
        self.write()
            .languages
            .entry(language.to_string())
            .or_default()
            .tokenizer = Some(tokenizer);
    }

    pub fn tokenizer(&self, language: &str) -> Option<Tokenizer> {
        self.read()
            .languages
            .get(language)
            .and_then(|entry| entry.tokenizer.clone())
    }

    pub fn set_language_configuration(&self, language: &str, configuration: LanguageConfiguration) {
        self.write()
            .languages
            .entry(language.to_string())
            .or_default()
            .configuration = Some(configuration);
    }

    pub fn language_configuration(&self, language: &str) -> Option<LanguageConfiguration> {
        self.read()
            .languages
            .get(language)
            .and_then(|entry| entry.configuration.clone())
    }

    /// Add a provider for `language`. It stays active until the returned
    /// registration is disposed or dropped.
    #[must_use = "dropping the registration removes the provider"]
    pub fn register_completion_provider(
        self: &Arc<Self>,
        language: &str,
        provider: Arc<dyn CompletionProvider>,
    ) -> Registration {
        let kind = provider.kind();
        let id = {
            let mut state = self.write();
            state.next_id += 1;
            let id = state.next_id;
            state
                .languages
                .entry(language.to_string())
                .or_default()
                .providers
                .push((id, provider));
            id
        };
        debug!(language, %kind, id, "registered completion provider");
        Registration {
            registry: Arc::downgrade(self),
            language: language.to_string(),
            kind,
            id,
            disposed: false,
        }
    }

    /// Ask every provider of `language`, in registration order.
    pub fn provide_completions(&self, language: &str, request: &CompletionRequest) -> Vec<CompletionItem> {
        // Clone the provider list so no lock is held while providers run.
        let providers: Vec<Arc<dyn CompletionProvider>> = self
            .read()
            .languages
            .get(language)
            .map(|entry| entry.providers.iter().map(|(_, p)| Arc::clone(p)).collect())
            .unwrap_or_default();

        providers
            .iter()
            .flat_map(|provider| provider.provide(request))
            .collect()
    }

    pub fn provider_count(&self, language: &str) -> usize {
        self.read()
            .languages
            .get(language)
            .map_or(0, |entry| entry.providers.len())
    }

    /// Live providers of one kind for `language`.
    pub fn provider_count_of(&self, language: &str, kind: ProviderKind) -> usize {
        self.read().languages.get(language).map_or(0, |entry| {
            entry.providers.iter().filter(|(_, p)| p.kind() == kind).count()
        })
    }

    fn remove_provider(&self, language: &str, id: u64) -> bool {
        let mut state = self.write();
        let Some(entry) = state.languages.get_mut(language) else {
            return false;
        };
        let before = entry.providers.len();
        entry.providers.retain(|(provider_id, _)| *provider_id != id);
        entry.providers.len() != before
    }
}

/// Register the Dolphin language: id, tokenizer and editor configuration.
pub fn register_dolphin_language(registry: &LanguageRegistry, grammar: &Arc<DslGrammarConfig>) {
    register_language_services(registry, crate::grammar::LANGUAGE_ID, grammar);
}

/// Register Dolphin language services under an arbitrary id.
pub(crate) fn register_language_services(
    registry: &LanguageRegistry,
    language: &str,
    grammar: &Arc<DslGrammarConfig>,
) {
    registry.register_language(language);
    registry.set_tokens_provider(language, Tokenizer::new(Arc::clone(grammar)));
    registry.set_language_configuration(language, LanguageConfiguration::for_grammar(grammar));
}

// ============================================================================
// REGISTRATION
// ============================================================================

/// Handle for a registered provider. Disposing or dropping it removes the
/// provider; disposing twice is a no-op.
pub struct Registration {
    registry: Weak<LanguageRegistry>,
    language: String,
    kind: ProviderKind,
    id: u64,
    disposed: bool,
}

impl Registration {
    pub fn kind(&self) -> ProviderKind {
        self.kind
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        if let Some(registry) = self.registry.upgrade() {
            if registry.remove_provider(&self.language, self.id) {
                debug!(language = %self.language, kind = %self.kind, id = self.id, "disposed completion provider");
            }
        }
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("language", &self.language)
            .field("kind", &self.kind)
            .field("id", &self.id)
            .field("disposed", &self.disposed)
            .finish()
    }
}

impl Drop for Registration {
    fn drop(&mut self) {
        self.dispose();
    }
}
