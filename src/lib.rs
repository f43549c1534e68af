#![doc = include_str!("../README.md")]

//! # bevy-locale
//!
//! Source-text translation for [Bevy](https://bevyengine.org/) UI, scoped by
//! the entity hierarchy:
//!
//! - **Key language**: UI strings are written directly in one language and
//!   double as lookup keys
//! - **Scoped providers**: a [`LocaleProvider`] sets the language and
//!   dictionary for its whole subtree; nested providers win
//! - **Flexible entries**: one translation for all languages, one per
//!   language, or a [`Translator`] computing it
//! - **Case helpers**: upper case, lower case and capitalized variants
//! - **Silent fallback**: anything missing shows the source text
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use bevy::prelude::*;
//! use bevy_locale::{ I18nResource, LocaleConfig, LocalePlugin, LocaleProvider, LocalizedText };
//!
//! fn main() {
//!     let mut resource = I18nResource::new();
//!     resource.insert_lang_text("Start", "fr", "Commencer");
//!
//!     App::new()
//!         .add_plugins(DefaultPlugins)
//!         .add_plugins(LocalePlugin::with_config(LocaleConfig {
//!             resource,
//!             ..Default::default()
//!         }))
//!         .add_systems(Startup, setup_ui)
//!         .run();
//! }
//!
//! fn setup_ui(mut commands: Commands) {
//!     commands
//!         .spawn((Node::default(), LocaleProvider::new().with_lang("fr").with_key_lang("en")))
//!         .with_children(|parent| {
//!             parent.spawn(LocalizedText::new("Start"));
//!         });
//! }
//! ```

use bevy::prelude::*;

mod context;
mod locale;
mod resource;
mod text;

use serde::Deserialize;

pub use context::{
    AmbientLocale,
    LocaleContext,
    LocaleProvider,
    Localizer,
    TextCase,
    seed_provider_lang,
};
pub use locale::{ FALLBACK_LANG, detect_ambient_lang, primary_language };
pub use resource::{ I18nResource, I18nStore, LanguageEntry, TranslationEntry, Translator };
pub use text::{ LocalizedText, refresh_localized_text };

/// Configuration for the locale plugin.
///
/// # Example
///
/// ```rust
/// use bevy_locale::{ I18nResource, LocaleConfig };
///
/// let config = LocaleConfig {
///     ambient_lang: "fr".to_string(),
///     resource: I18nResource::new(),
/// };
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LocaleConfig {
    /// Language used outside of any provider. Providers created without a
    /// language take this value when they are inserted.
    /// Default: detected from the runtime
    pub ambient_lang: String,
    /// Initial content of the shared [`I18nStore`].
    /// Default: empty
    pub resource: I18nResource,
}

impl Default for LocaleConfig {
    fn default() -> Self {
        Self {
            ambient_lang: detect_ambient_lang(),
            resource: I18nResource::default(),
        }
    }
}

// ---------- Bevy Plugin ----------

/// Plugin inserting the [`AmbientLocale`] and [`I18nStore`] resources and keeping
/// every [`LocalizedText`] translated.
///
/// # Example
///
/// ```rust
/// use bevy::prelude::*;
/// use bevy_locale::{ LocaleConfig, LocalePlugin };
///
/// // Default configuration
/// App::new().add_plugins(LocalePlugin::default());
///
/// // Custom configuration
/// App::new().add_plugins(LocalePlugin::with_config(LocaleConfig {
///     ambient_lang: "de".to_string(),
///     ..Default::default()
/// }));
/// ```
#[derive(Default)]
pub struct LocalePlugin {
    /// Configuration for the plugin
    pub config: LocaleConfig,
}

impl LocalePlugin {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: LocaleConfig) -> Self {
        Self { config }
    }
}

impl Plugin for LocalePlugin {
    fn build(&self, app: &mut App) {
        let ambient_lang = if self.config.ambient_lang.is_empty() {
            warn!("Empty ambient language configured, using '{}'", FALLBACK_LANG);
            FALLBACK_LANG.to_string()
        } else {
            self.config.ambient_lang.clone()
        };
        debug!("Ambient language: {}", ambient_lang);

        app.insert_resource(AmbientLocale::new(ambient_lang))
            .insert_resource(I18nStore::new(self.config.resource.clone()))
            .add_systems(Update, (seed_provider_lang, refresh_localized_text).chain());
    }
}

// ---------- API ----------

/// Extension trait to switch the language of a [`LocaleProvider`] from
/// exclusive code.
///
/// Inside regular systems, call [`LocaleProvider::set_lang`] through
/// `Query<&mut LocaleProvider>` instead.
///
/// # Example
///
/// ```rust
/// use bevy::prelude::*;
/// use bevy_locale::{ LocaleProvider, LocaleWorldExt };
///
/// let mut world = World::new();
/// let root = world.spawn(LocaleProvider::new().with_lang("en")).id();
/// assert!(world.set_locale_lang(root, "fr"));
/// assert!(!world.set_locale_lang(root, ""));
/// ```
pub trait LocaleWorldExt {
    /// Sets the language of the provider on `provider`.
    ///
    /// Returns `false`, changing nothing, when `lang` is empty or the entity
    /// has no provider. Setting the current language again is a no-op that
    /// returns `true`.
    fn set_locale_lang(&mut self, provider: Entity, lang: &str) -> bool;
}

impl LocaleWorldExt for World {
    fn set_locale_lang(&mut self, provider: Entity, lang: &str) -> bool {
        if lang.is_empty() {
            debug!("Ignoring empty language for {}", provider);
            return false;
        }
        match self.get_mut::<LocaleProvider>(provider) {
            Some(mut scope) => {
                if scope.lang() != Some(lang) {
                    scope.set_lang(lang);
                }
                true
            }
            None => {
                warn!("Entity {} has no locale provider", provider);
                false
            }
        }
    }
}

impl LocaleWorldExt for App {
    fn set_locale_lang(&mut self, provider: Entity, lang: &str) -> bool {
        self.world_mut().set_locale_lang(provider, lang)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::ecs::system::SystemState;

    fn test_app(resource: I18nResource) -> App {
        let mut app = App::new();
        app.add_plugins(
            LocalePlugin::with_config(LocaleConfig {
                ambient_lang: "de".to_string(),
                resource,
            })
        );
        app
    }

    #[test]
    fn plugin_inserts_resources() {
        let mut resource = I18nResource::new();
        resource.insert_text("Hello", "Hallo");
        let app = test_app(resource);

        assert_eq!(app.world().resource::<AmbientLocale>().lang(), "de");
        assert_eq!(
            app.world().resource::<I18nStore>().resolve("de", "Hello").as_deref(),
            Some("Hallo")
        );
    }

    #[test]
    fn empty_ambient_lang_uses_fallback() {
        let mut app = App::new();
        app.add_plugins(
            LocalePlugin::with_config(LocaleConfig {
                ambient_lang: String::new(),
                resource: I18nResource::new(),
            })
        );
        assert_eq!(app.world().resource::<AmbientLocale>().lang(), FALLBACK_LANG);
    }

    #[test]
    fn config_deserializes_with_defaults() {
        let config: LocaleConfig = serde_json
            ::from_str(r#"{ "ambient_lang": "pt", "resource": { "Yes": "Sim" } }"#)
            .unwrap();
        assert_eq!(config.ambient_lang, "pt");
        assert_eq!(config.resource.resolve("pt", "Yes").as_deref(), Some("Sim"));

        let config: LocaleConfig = serde_json::from_str("{}").unwrap();
        assert!(config.resource.is_empty());
        assert!(!config.ambient_lang.is_empty());
    }

    #[test]
    fn localizer_uses_nearest_provider() {
        let mut app = test_app(I18nResource::new());
        let world = app.world_mut();

        let mut scoped = I18nResource::new();
        scoped.insert_lang_text("Hello", "fr", "Bonjour").insert_lang_text("Hello", "es", "Hola");

        let outer = world
            .spawn(LocaleProvider::new().with_lang("fr").with_key_lang("en").with_resource(scoped))
            .id();
        let middle = world.spawn(ChildOf(outer)).id();
        let leaf = world.spawn(ChildOf(middle)).id();
        let inner = world.spawn((LocaleProvider::new().with_key_lang("de"), ChildOf(middle))).id();
        let inner_leaf = world.spawn(ChildOf(inner)).id();
        let orphan = world.spawn_empty().id();

        let mut state: SystemState<Localizer> = SystemState::new(world);
        let localizer = state.get(world);

        assert_eq!(localizer.provider_of(leaf), Some(outer));
        assert_eq!(localizer.provider_of(outer), Some(outer));
        assert_eq!(localizer.provider_of(inner_leaf), Some(inner));
        assert_eq!(localizer.provider_of(orphan), None);

        assert_eq!(localizer.t(leaf, "Hello"), "Bonjour");
        // inner has no language of its own: ambient "de" equals its key language
        assert_eq!(localizer.t(inner_leaf, "Hello"), "Hello");
        assert!(localizer.context(inner_leaf).is_key_lang());

        let ambient = localizer.context(orphan);
        assert_eq!(ambient.lang, "de");
        assert_eq!(ambient.key_lang, None);
        assert_eq!(ambient.provider, None);
        assert_eq!(localizer.t(orphan, "Hello"), "Hello");
    }

    #[test]
    fn world_ext_ignores_empty_and_missing_providers() {
        let mut app = test_app(I18nResource::new());
        let root = app.world_mut().spawn(LocaleProvider::new().with_lang("fr")).id();
        let plain = app.world_mut().spawn_empty().id();

        assert!(!app.set_locale_lang(root, ""));
        assert!(!app.set_locale_lang(plain, "es"));
        assert_eq!(app.world().get::<LocaleProvider>(root).and_then(|p| p.lang()), Some("fr"));

        assert!(app.set_locale_lang(root, "es"));
        assert_eq!(app.world().get::<LocaleProvider>(root).and_then(|p| p.lang()), Some("es"));
    }
}
