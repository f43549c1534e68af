use bevy::prelude::*;

use serde::{ Deserialize, Deserializer };
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Computes a translation from the active language and the source text.
///
/// Returning `None` makes the lookup fall back to the source text.
///
/// # Example
///
/// ```rust
/// use bevy_locale::Translator;
///
/// let count = Translator::new(|_lang, text| Some(text.replace("%d", "n")));
/// assert_eq!(count.call("fr", "Items: %d").as_deref(), Some("Items: n"));
/// ```
#[derive(Clone)]
pub struct Translator(Arc<dyn Fn(&str, &str) -> Option<String> + Send + Sync>);

impl Translator {
    pub fn new<F>(f: F) -> Self where F: Fn(&str, &str) -> Option<String> + Send + Sync + 'static {
        Self(Arc::new(f))
    }

    pub fn call(&self, lang: &str, text: &str) -> Option<String> {
        (self.0)(lang, text)
    }
}

impl fmt::Debug for Translator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Translator(..)")
    }
}

/// A per-language value inside a [`TranslationEntry::ByLanguage`] map.
#[derive(Debug, Clone)]
pub enum LanguageEntry {
    /// A static translated string
    Text(String),
    /// A translation computed at lookup time
    Translator(Translator),
}

/// What a source string maps to in an [`I18nResource`].
///
/// JSON shape:
/// ```json
/// "Hello": "Bonjour"
/// "Bye": { "fr": "Au revoir", "es": "Adiós" }
/// ```
#[derive(Debug, Clone)]
pub enum TranslationEntry {
    /// One translation, whatever the active language
    Text(String),
    /// Translations keyed by language code
    ByLanguage(HashMap<String, LanguageEntry>),
}

/// Dictionary from source text (written in the key language) to its translations.
#[derive(Debug, Clone, Default)]
pub struct I18nResource {
    entries: HashMap<String, TranslationEntry>,
}

impl I18nResource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Maps `source` to `text` for every language.
    pub fn insert_text(&mut self, source: impl Into<String>, text: impl Into<String>) -> &mut Self {
        self.entries.insert(source.into(), TranslationEntry::Text(text.into()));
        self
    }

    /// Maps `source` to `text` for `lang` only.
    ///
    /// A language-agnostic entry already stored for `source` is replaced by a
    /// per-language map.
    pub fn insert_lang_text(
        &mut self,
        source: impl Into<String>,
        lang: impl Into<String>,
        text: impl Into<String>
    ) -> &mut Self {
        self.insert_lang_entry(source.into(), lang.into(), LanguageEntry::Text(text.into()));
        self
    }

    /// Computes the translation of `source` for `lang` with `translator`.
    pub fn insert_translator(
        &mut self,
        source: impl Into<String>,
        lang: impl Into<String>,
        translator: Translator
    ) -> &mut Self {
        self.insert_lang_entry(source.into(), lang.into(), LanguageEntry::Translator(translator));
        self
    }

    pub fn insert(&mut self, source: impl Into<String>, entry: TranslationEntry) -> Option<TranslationEntry> {
        self.entries.insert(source.into(), entry)
    }

    pub fn remove(&mut self, source: &str) -> Option<TranslationEntry> {
        self.entries.remove(source)
    }

    pub fn get(&self, source: &str) -> Option<&TranslationEntry> {
        self.entries.get(source)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Copies every entry of `other` into `self`, replacing entries with the same source text.
    pub fn merge(&mut self, other: &I18nResource) {
        for (source, entry) in &other.entries {
            self.entries.insert(source.clone(), entry.clone());
        }
    }

    /// Looks up the translation of `text` for `lang`.
    ///
    /// `None` means the caller should display `text` itself: no entry, an
    /// empty language-agnostic entry, no value for `lang`, or a translator
    /// that produced nothing.
    pub fn resolve(&self, lang: &str, text: &str) -> Option<String> {
        match self.entries.get(text)? {
            TranslationEntry::Text(translated) if translated.is_empty() => None,
            TranslationEntry::Text(translated) => Some(translated.clone()),
            TranslationEntry::ByLanguage(by_lang) =>
                match by_lang.get(lang)? {
                    LanguageEntry::Text(translated) => Some(translated.clone()),
                    LanguageEntry::Translator(translator) => translator.call(lang, text),
                }
        }
    }

    /// Builds a resource from a JSON object.
    ///
    /// Values that are neither a string nor an object of strings are skipped,
    /// as are non-string values inside per-language objects.
    pub fn from_json_value(value: Value) -> Self {
        let mut resource = Self::new();

        let Value::Object(obj) = value else {
            warn!("Translation resource is not a JSON object, ignoring it");
            return resource;
        };

        for (source, val) in obj {
            let entry = match val {
                Value::String(text) => TranslationEntry::Text(text),
                Value::Object(nested) => {
                    let by_lang = nested
                        .into_iter()
                        .filter_map(|(lang, text)| match text {
                            Value::String(text) => Some((lang, LanguageEntry::Text(text))),
                            _ => None,
                        })
                        .collect();
                    TranslationEntry::ByLanguage(by_lang)
                }
                _ => {
                    debug!("Skipping malformed translation entry for '{}'", source);
                    continue;
                }
            };
            resource.entries.insert(source, entry);
        }

        resource
    }

    pub fn from_json_str(json: &str) -> serde_json::Result<Self> {
        let value: Value = serde_json::from_str(json)?;
        Ok(Self::from_json_value(value))
    }

    fn insert_lang_entry(&mut self, source: String, lang: String, value: LanguageEntry) {
        match self.entries.get_mut(&source) {
            Some(TranslationEntry::ByLanguage(by_lang)) => {
                by_lang.insert(lang, value);
            }
            _ => {
                let by_lang = HashMap::from([(lang, value)]);
                self.entries.insert(source, TranslationEntry::ByLanguage(by_lang));
            }
        }
    }
}

impl<'de> Deserialize<'de> for I18nResource {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error> where D: Deserializer<'de> {
        Value::deserialize(deserializer).map(Self::from_json_value)
    }
}

// ---------- Store ----------

/// The default translation dictionary shared by every [`LocaleProvider`](crate::LocaleProvider)
/// that does not bring its own.
///
/// Starts with whatever [`LocaleConfig::resource`](crate::LocaleConfig) holds and can be
/// filled at any time through `ResMut<I18nStore>`.
///
/// # Example
///
/// ```rust
/// use bevy::prelude::*;
/// use bevy_locale::I18nStore;
///
/// fn register_strings(mut store: ResMut<I18nStore>) {
///     store.insert_text("Settings", "Paramètres");
/// }
/// ```
#[derive(Resource, Debug, Clone, Default, Deref, DerefMut)]
pub struct I18nStore(pub I18nResource);

impl I18nStore {
    pub fn new(resource: I18nResource) -> Self {
        Self(resource)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> I18nResource {
        let mut resource = I18nResource::new();
        resource
            .insert_text("Hello", "Bonjour")
            .insert_lang_text("Bye", "fr", "Au revoir")
            .insert_lang_text("Bye", "es", "Adiós")
            .insert_translator(
                "Items: %d",
                "fr",
                Translator::new(|_, text| Some(text.replace("%d", "n")))
            )
            .insert_translator("Broken", "fr", Translator::new(|_, _| None));
        resource
    }

    #[test]
    fn resolves_language_agnostic_text() {
        assert_eq!(sample().resolve("de", "Hello").as_deref(), Some("Bonjour"));
    }

    #[test]
    fn resolves_per_language_text() {
        let resource = sample();
        assert_eq!(resource.resolve("es", "Bye").as_deref(), Some("Adiós"));
        assert_eq!(resource.resolve("de", "Bye"), None);
    }

    #[test]
    fn translator_receives_lang_and_source() {
        let mut resource = I18nResource::new();
        resource.insert_translator(
            "Hi",
            "it",
            Translator::new(|lang, text| Some(format!("{lang}:{text}")))
        );
        assert_eq!(resource.resolve("it", "Hi").as_deref(), Some("it:Hi"));
        assert_eq!(sample().resolve("fr", "Items: %d").as_deref(), Some("Items: n"));
        assert_eq!(sample().resolve("fr", "Broken"), None);
    }

    #[test]
    fn empty_language_agnostic_text_is_ignored() {
        let mut resource = I18nResource::new();
        resource.insert_text("Hello", "").insert_lang_text("Bye", "fr", "");
        assert_eq!(resource.resolve("fr", "Hello"), None);
        assert_eq!(resource.resolve("fr", "Bye").as_deref(), Some(""));
    }

    #[test]
    fn lang_text_replaces_plain_entry() {
        let mut resource = I18nResource::new();
        resource.insert_text("Hello", "Bonjour").insert_lang_text("Hello", "es", "Hola");
        assert_eq!(resource.resolve("es", "Hello").as_deref(), Some("Hola"));
        assert_eq!(resource.resolve("fr", "Hello"), None);
    }

    #[test]
    fn parses_json_and_skips_malformed_values() {
        let resource = I18nResource::from_json_str(
            r#"{
                "Hello": "Bonjour",
                "Bye": { "fr": "Au revoir", "es": 3 },
                "Count": 42,
                "List": ["a"]
            }"#
        ).unwrap();

        assert_eq!(resource.len(), 2);
        assert_eq!(resource.resolve("fr", "Hello").as_deref(), Some("Bonjour"));
        assert_eq!(resource.resolve("fr", "Bye").as_deref(), Some("Au revoir"));
        assert_eq!(resource.resolve("es", "Bye"), None);
        assert!(resource.get("Count").is_none());
    }

    #[test]
    fn non_object_json_yields_empty_resource() {
        let resource = I18nResource::from_json_str("[1, 2]").unwrap();
        assert!(resource.is_empty());
        assert!(I18nResource::from_json_str("{ nope").is_err());
    }

    #[test]
    fn deserializes_through_serde() {
        let resource: I18nResource = serde_json::from_str(r#"{ "Yes": "Oui" }"#).unwrap();
        assert_eq!(resource.resolve("fr", "Yes").as_deref(), Some("Oui"));
    }

    #[test]
    fn merge_overrides_existing_entries() {
        let mut base = sample();
        let mut overlay = I18nResource::new();
        overlay.insert_text("Hello", "Salut").insert_text("Thanks", "Merci");
        base.merge(&overlay);

        assert_eq!(base.resolve("fr", "Hello").as_deref(), Some("Salut"));
        assert_eq!(base.resolve("fr", "Thanks").as_deref(), Some("Merci"));
        assert_eq!(base.resolve("es", "Bye").as_deref(), Some("Adiós"));
    }
}
