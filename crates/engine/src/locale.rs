//! Locale-to-language mapping for invitation payloads.

use kiyoh_sync_core::StoreScope;

/// Host locale resolver: the currently active locale, if any.
pub trait LocaleSource: Send + Sync {
    fn current_locale(&self, scope: StoreScope) -> Option<String>;
}

/// A [`LocaleSource`] that always answers with the same locale (or nothing).
#[derive(Debug, Clone, Default)]
pub struct FixedLocale(pub Option<String>);

impl LocaleSource for FixedLocale {
    fn current_locale(&self, _scope: StoreScope) -> Option<String> {
        self.0.clone()
    }
}

/// Region locales the review platform accepts, mapped to its 2-letter
/// language codes. Note the platform's own quirks: Greek is `gr`, both
/// Norwegian variants collapse to `no`.
const LOCALE_TABLE: &[(&str, &str)] = &[
    ("nl_NL", "nl"),
    ("fr_FR", "fr"),
    ("fr_CA", "fr"),
    ("de_DE", "de"),
    ("de_AT", "de"),
    ("de_CH", "de"),
    ("en_US", "en"),
    ("en_GB", "en"),
    ("en_AU", "en"),
    ("en_CA", "en"),
    ("en_NZ", "en"),
    ("da_DK", "da"),
    ("hu_HU", "hu"),
    ("bg_BG", "bg"),
    ("ro_RO", "ro"),
    ("hr_HR", "hr"),
    ("ja_JP", "ja"),
    ("es_ES", "es"),
    ("es_AR", "es"),
    ("es_CL", "es"),
    ("es_CO", "es"),
    ("es_MX", "es"),
    ("es_PE", "es"),
    ("es_VE", "es"),
    ("it_IT", "it"),
    ("it_CH", "it"),
    ("pt_PT", "pt"),
    ("tr_TR", "tr"),
    ("nb_NO", "no"),
    ("nn_NO", "no"),
    ("sv_SE", "sv"),
    ("fi_FI", "fi"),
    ("pt_BR", "pt"),
    ("pl_PL", "pl"),
    ("sl_SI", "sl"),
    ("zh_Hans_CN", "zh"),
    ("zh_Hant_HK", "zh"),
    ("zh_Hant_TW", "zh"),
    ("ru_RU", "ru"),
    ("el_GR", "gr"),
    ("cs_CZ", "cs"),
    ("et_EE", "et"),
    ("lt_LT", "lt"),
    ("lv_LV", "lv"),
    ("sk_SK", "sk"),
];

/// Map a region locale to a review-platform language code.
///
/// Resolution is two-stage: an exact table match wins; otherwise the first
/// two characters of the locale are accepted only if that code already
/// appears as a table *value* (i.e. is a language the platform supports).
/// Anything else yields `fallback`.
#[must_use]
pub fn map_language(locale: &str, fallback: &str) -> String {
    if let Some((_, code)) = LOCALE_TABLE.iter().find(|(key, _)| *key == locale) {
        return (*code).to_string();
    }

    let prefix: String = locale.chars().take(2).collect();
    if LOCALE_TABLE.iter().any(|(_, code)| *code == prefix) {
        return prefix;
    }

    fallback.to_string()
}
