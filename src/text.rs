use bevy::prelude::*;

use crate::context::{ LocaleProvider, Localizer, TextCase };

/// UI text written in the key language, kept translated into the language of
/// its locale scope.
///
/// The entity's [`Text`] is rewritten whenever the scope's language or
/// dictionary changes.
#[derive(Component, Debug, Clone, PartialEq, Eq)]
#[require(Text)]
pub struct LocalizedText {
    /// Source string, also the lookup key
    pub source: String,
    pub case: TextCase,
}

impl LocalizedText {
    pub fn new(source: impl Into<String>) -> Self {
        Self { source: source.into(), case: TextCase::AsIs }
    }

    pub fn upper(source: impl Into<String>) -> Self {
        Self::new(source).with_case(TextCase::Upper)
    }

    pub fn lower(source: impl Into<String>) -> Self {
        Self::new(source).with_case(TextCase::Lower)
    }

    pub fn upper_first(source: impl Into<String>) -> Self {
        Self::new(source).with_case(TextCase::UpperFirst)
    }

    pub fn with_case(mut self, case: TextCase) -> Self {
        self.case = case;
        self
    }
}

/// Re-renders [`LocalizedText`] entities whose translation may be stale.
///
/// A change to any provider, the shared store or the ambient locale, a
/// removed provider, or any change to the hierarchy refreshes every localized
/// text, since moving an ancestor can move a whole subtree to another scope.
/// Otherwise only texts that were added or edited are refreshed.
pub fn refresh_localized_text(
    localizer: Localizer,
    changed_providers: Query<(), Changed<LocaleProvider>>,
    mut removed_providers: RemovedComponents<LocaleProvider>,
    changed_parents: Query<(), Changed<ChildOf>>,
    mut removed_parents: RemovedComponents<ChildOf>,
    mut texts: Query<(Entity, Ref<LocalizedText>, &mut Text)>
) {
    // drain both readers so old removals don't trigger again next frame
    let providers_removed = removed_providers.read().count() > 0;
    let parents_removed = removed_parents.read().count() > 0;
    let refresh_all =
        providers_removed ||
        parents_removed ||
        !changed_providers.is_empty() ||
        !changed_parents.is_empty() ||
        localizer.globals_changed();

    for (entity, localized, mut text) in &mut texts {
        if !refresh_all && !localized.is_changed() {
            continue;
        }

        let rendered = localizer.context(entity).render(&localized.source, localized.case);
        if text.0 != rendered {
            text.0 = rendered;
        }
    }
}
