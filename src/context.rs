use bevy::ecs::system::SystemParam;
use bevy::prelude::*;

use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;

use crate::resource::{ I18nResource, I18nStore };

// ---------- Ambient ----------

/// Language of the runtime, used by entities that no [`LocaleProvider`] covers.
/// Providers created without an explicit language take it when inserted.
///
/// Read once when the plugin is built.
#[derive(Resource, Debug, Clone, PartialEq, Eq)]
pub struct AmbientLocale {
    lang: String,
}

impl AmbientLocale {
    pub fn new(lang: impl Into<String>) -> Self {
        Self { lang: lang.into() }
    }

    pub fn lang(&self) -> &str {
        &self.lang
    }
}

// ---------- Provider ----------

/// Establishes a locale scope for the entity it sits on and all its descendants.
///
/// The language given at construction is only an initial value: once the
/// provider is spawned, [`LocaleProvider::set_lang`] is the way to switch
/// languages. Every [`LocalizedText`](crate::LocalizedText) in the subtree is
/// re-rendered after a switch.
///
/// # Example
///
/// ```rust
/// use bevy::prelude::*;
/// use bevy_locale::{ I18nResource, LocaleProvider, LocalizedText };
///
/// fn setup_ui(mut commands: Commands) {
///     let mut menu = I18nResource::new();
///     menu.insert_lang_text("Play", "fr", "Jouer");
///
///     commands
///         .spawn((
///             Node::default(),
///             LocaleProvider::new().with_lang("fr").with_key_lang("en").with_resource(menu),
///         ))
///         .with_children(|parent| {
///             parent.spawn(LocalizedText::new("Play"));
///         });
/// }
/// ```
#[derive(Component, Debug, Clone, Default)]
pub struct LocaleProvider {
    /// Active language, `None` until seeded means the ambient language
    lang: Option<String>,
    /// Language the source strings are written in
    key_lang: Option<String>,
    /// Scoped dictionary, `None` means the shared [`I18nStore`]
    resource: Option<Arc<I18nResource>>,
    /// Text direction, carried for consumers but not interpreted
    dir: Option<String>,
}

impl LocaleProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Initial language. Empty strings keep the ambient language.
    pub fn with_lang(mut self, lang: impl Into<String>) -> Self {
        let lang = lang.into();
        if !lang.is_empty() {
            self.lang = Some(lang);
        }
        self
    }

    pub fn with_key_lang(mut self, key_lang: impl Into<String>) -> Self {
        self.key_lang = Some(key_lang.into());
        self
    }

    /// Uses `resource` for this scope instead of the shared [`I18nStore`].
    pub fn with_resource(self, resource: I18nResource) -> Self {
        self.with_shared_resource(Arc::new(resource))
    }

    /// Same as [`with_resource`](Self::with_resource), sharing one dictionary between providers.
    pub fn with_shared_resource(mut self, resource: Arc<I18nResource>) -> Self {
        self.resource = Some(resource);
        self
    }

    pub fn with_dir(mut self, dir: impl Into<String>) -> Self {
        self.dir = Some(dir.into());
        self
    }

    /// Switches the scope to `lang`. Empty strings are ignored.
    pub fn set_lang(&mut self, lang: impl Into<String>) {
        let lang = lang.into();
        if lang.is_empty() {
            debug!("Ignoring empty language for locale provider");
            return;
        }
        if self.lang.as_deref() != Some(lang.as_str()) {
            debug!("Locale provider language: {:?} -> {}", self.lang, lang);
            self.lang = Some(lang);
        }
    }

    /// [`set_lang`](Self::set_lang) for a value that may be missing; `None` is ignored.
    pub fn set_lang_opt(&mut self, lang: Option<&str>) {
        if let Some(lang) = lang {
            self.set_lang(lang);
        }
    }

    /// Language set on this provider, if any was given.
    pub fn lang(&self) -> Option<&str> {
        self.lang.as_deref()
    }

    pub fn key_lang(&self) -> Option<&str> {
        self.key_lang.as_deref()
    }

    pub fn dir(&self) -> Option<&str> {
        self.dir.as_deref()
    }

    /// The scoped dictionary, if this provider overrides the shared one.
    pub fn resource(&self) -> Option<&I18nResource> {
        self.resource.as_deref()
    }

    /// Locale context of this scope.
    pub fn context<'a>(
        &'a self,
        entity: Entity,
        ambient: &'a AmbientLocale,
        store: &'a I18nResource
    ) -> LocaleContext<'a> {
        LocaleContext {
            lang: self.lang.as_deref().unwrap_or(ambient.lang()),
            key_lang: self.key_lang.as_deref(),
            resource: Some(self.resource.as_deref().unwrap_or(store)),
            dir: self.dir.as_deref(),
            provider: Some(entity),
        }
    }
}

/// Fixes the language of newly inserted providers that were given none to the
/// ambient language at that moment.
///
/// Until this runs, such a provider reads the current [`AmbientLocale`].
pub fn seed_provider_lang(
    ambient: Res<AmbientLocale>,
    mut providers: Query<&mut LocaleProvider, Added<LocaleProvider>>
) {
    for mut provider in &mut providers {
        if provider.lang.is_none() {
            provider.lang = Some(ambient.lang().to_string());
        }
    }
}

// ---------- Context ----------

static ARG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{\{(\w*)\}\}").unwrap());

/// Locale in effect at one point of the UI hierarchy.
///
/// Obtained from [`Localizer::context`]. All translation methods fall back
/// to the source text instead of failing.
#[derive(Debug, Clone, Copy)]
pub struct LocaleContext<'a> {
    /// Active language
    pub lang: &'a str,
    /// Language of the source strings; `None` never matches `lang`
    pub key_lang: Option<&'a str>,
    /// Dictionary in effect; `None` outside of any provider
    pub resource: Option<&'a I18nResource>,
    pub dir: Option<&'a str>,
    /// Entity holding the [`LocaleProvider`] of this scope, where the language can be changed
    pub provider: Option<Entity>,
}

impl<'a> LocaleContext<'a> {
    /// Context used where no provider applies: ambient language, no key language, no dictionary.
    pub fn ambient(ambient: &'a AmbientLocale) -> Self {
        Self {
            lang: ambient.lang(),
            key_lang: None,
            resource: None,
            dir: None,
            provider: None,
        }
    }

    /// Whether lookups are skipped because the active language is the key language.
    pub fn is_key_lang(&self) -> bool {
        self.key_lang == Some(self.lang)
    }

    /// Translates `text` into the active language.
    ///
    /// # Example
    ///
    /// ```rust
    /// use bevy_locale::{ I18nResource, LocaleContext };
    ///
    /// let mut resource = I18nResource::new();
    /// resource.insert_text("Hello", "Bonjour");
    ///
    /// let ctx = LocaleContext {
    ///     lang: "fr",
    ///     key_lang: Some("en"),
    ///     resource: Some(&resource),
    ///     dir: None,
    ///     provider: None,
    /// };
    /// assert_eq!(ctx.t("Hello"), "Bonjour");
    /// assert_eq!(ctx.t("Goodbye"), "Goodbye");
    /// ```
    pub fn t(&self, text: &str) -> String {
        if self.is_key_lang() {
            return text.to_string();
        }
        match self.resource.and_then(|resource| resource.resolve(self.lang, text)) {
            Some(translated) => translated,
            None => {
                trace!("No '{}' translation for '{}'", self.lang, text);
                text.to_string()
            }
        }
    }

    /// Translation in upper case.
    pub fn u(&self, text: &str) -> String {
        TextCase::Upper.apply(self.t(text))
    }

    /// Translation in lower case.
    pub fn l(&self, text: &str) -> String {
        TextCase::Lower.apply(self.t(text))
    }

    /// Translation in lower case with its first character in upper case.
    pub fn uf(&self, text: &str) -> String {
        TextCase::UpperFirst.apply(self.t(text))
    }

    /// Translates `text` then replaces its `{{}}` placeholders with `args`, in order.
    ///
    /// Placeholders without a matching argument are removed.
    pub fn t_with_args(&self, text: &str, args: &[&dyn ToString]) -> String {
        replace_placeholders(&self.t(text), args)
    }

    /// Translates `text` and applies `case`.
    pub fn render(&self, text: &str, case: TextCase) -> String {
        case.apply(self.t(text))
    }
}

fn replace_placeholders(template: &str, args: &[&dyn ToString]) -> String {
    let parts: Vec<&str> = ARG_RE.split(template).collect();
    let mut result = String::new();

    for (i, part) in parts.iter().enumerate() {
        result.push_str(part);
        if i + 1 < parts.len() {
            if let Some(arg) = args.get(i) {
                result.push_str(&arg.to_string());
            }
        }
    }

    result
}

// ---------- Case ----------

/// Case transform applied to a translation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextCase {
    #[default]
    AsIs,
    Upper,
    Lower,
    /// Lower case except the first character
    UpperFirst,
}

impl TextCase {
    /// Applies the transform. Empty strings are returned untouched.
    pub fn apply(self, text: String) -> String {
        if text.is_empty() {
            return text;
        }
        match self {
            TextCase::AsIs => text,
            TextCase::Upper => text.to_uppercase(),
            TextCase::Lower => text.to_lowercase(),
            TextCase::UpperFirst => {
                let lower = text.to_lowercase();
                let mut chars = lower.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect(),
                    None => lower,
                }
            }
        }
    }
}

// ---------- Lookup ----------

/// System parameter resolving the locale context of any entity.
///
/// The context comes from the closest entity, starting with the entity
/// itself and walking up through [`ChildOf`], that has a [`LocaleProvider`].
/// Without one, the [`AmbientLocale`] context applies.
///
/// # Example
///
/// ```rust
/// use bevy::prelude::*;
/// use bevy_locale::Localizer;
///
/// #[derive(Component)]
/// struct Tooltip(String);
///
/// fn log_tooltips(localizer: Localizer, tooltips: Query<(Entity, &Tooltip)>) {
///     for (entity, tooltip) in &tooltips {
///         info!("{}", localizer.t(entity, &tooltip.0));
///     }
/// }
/// ```
#[derive(SystemParam)]
pub struct Localizer<'w, 's> {
    providers: Query<'w, 's, &'static LocaleProvider>,
    parents: Query<'w, 's, &'static ChildOf>,
    ambient: Res<'w, AmbientLocale>,
    store: Res<'w, I18nStore>,
}

impl<'w, 's> Localizer<'w, 's> {
    /// Locale context in effect for `entity`.
    pub fn context(&self, entity: Entity) -> LocaleContext<'_> {
        match self.provider_of(entity) {
            Some(provider) =>
                match self.providers.get(provider) {
                    Ok(scope) => scope.context(provider, &self.ambient, &self.store),
                    Err(_) => LocaleContext::ambient(&self.ambient),
                }
            None => LocaleContext::ambient(&self.ambient),
        }
    }

    /// Closest entity with a [`LocaleProvider`], starting at `entity` itself.
    pub fn provider_of(&self, entity: Entity) -> Option<Entity> {
        let mut current = entity;
        loop {
            if self.providers.contains(current) {
                return Some(current);
            }
            current = self.parents.get(current).ok()?.parent();
        }
    }

    pub fn t(&self, entity: Entity, text: &str) -> String {
        self.context(entity).t(text)
    }

    pub fn u(&self, entity: Entity, text: &str) -> String {
        self.context(entity).u(text)
    }

    pub fn l(&self, entity: Entity, text: &str) -> String {
        self.context(entity).l(text)
    }

    pub fn uf(&self, entity: Entity, text: &str) -> String {
        self.context(entity).uf(text)
    }

    /// Whether the shared store or the ambient language changed since the system last ran.
    pub fn globals_changed(&self) -> bool {
        self.store.is_changed() || self.ambient.is_changed()
    }
}
