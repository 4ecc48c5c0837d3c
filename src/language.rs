//! Language detection for post bodies.

use thiserror::Error;
use tracing::debug;
use whatlang::Lang;

/// Language code used whenever detection fails.
pub const FALLBACK_LANGUAGE: &str = "en";

#[derive(Debug, Error)]
pub enum LanguageError {
    #[error("no text to classify")]
    EmptyText,
    #[error("language could not be determined")]
    Undetermined,
}

/// Black-box language classifier.
pub trait LanguageDetector: Send + Sync {
    /// Detect the language of `text`, returning a short language code.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is empty or cannot be classified.
    fn detect(&self, text: &str) -> Result<String, LanguageError>;
}

/// Detector backed by the `whatlang` trigram model.
#[derive(Debug, Default, Clone, Copy)]
pub struct WhatlangDetector;

impl LanguageDetector for WhatlangDetector {
    fn detect(&self, text: &str) -> Result<String, LanguageError> {
        if text.trim().is_empty() {
            return Err(LanguageError::EmptyText);
        }
        let info = whatlang::detect(text).ok_or(LanguageError::Undetermined)?;
        Ok(short_code(info.lang()).to_string())
    }
}

/// ISO 639-1 code for a detected language.
fn short_code(lang: Lang) -> &'static str {
    match lang {
        Lang::Afr => "af",
        Lang::Aka => "ak",
        Lang::Amh => "am",
        Lang::Ara => "ar",
        Lang::Aze => "az",
        Lang::Bel => "be",
        Lang::Ben => "bn",
        Lang::Bul => "bg",
        Lang::Cat => "ca",
        Lang::Ces => "cs",
        Lang::Cmn => "zh",
        Lang::Dan => "da",
        Lang::Deu => "de",
        Lang::Ell => "el",
        Lang::Eng => "en",
        Lang::Epo => "eo",
        Lang::Est => "et",
        Lang::Fin => "fi",
        Lang::Fra => "fr",
        Lang::Guj => "gu",
        Lang::Heb => "he",
        Lang::Hin => "hi",
        Lang::Hrv => "hr",
        Lang::Hun => "hu",
        Lang::Hye => "hy",
        Lang::Ind => "id",
        Lang::Ita => "it",
        Lang::Jav => "jv",
        Lang::Jpn => "ja",
        Lang::Kan => "kn",
        Lang::Kat => "ka",
        Lang::Khm => "km",
        Lang::Kor => "ko",
        Lang::Lat => "la",
        Lang::Lav => "lv",
        Lang::Lit => "lt",
        Lang::Mal => "ml",
        Lang::Mar => "mr",
        Lang::Mkd => "mk",
        Lang::Mya => "my",
        Lang::Nep => "ne",
        Lang::Nld => "nl",
        Lang::Nob => "nb",
        Lang::Ori => "or",
        Lang::Pan => "pa",
        Lang::Pes => "fa",
        Lang::Pol => "pl",
        Lang::Por => "pt",
        Lang::Ron => "ro",
        Lang::Rus => "ru",
        Lang::Sin => "si",
        Lang::Slk => "sk",
        Lang::Slv => "sl",
        Lang::Sna => "sn",
        Lang::Spa => "es",
        Lang::Srp => "sr",
        Lang::Swe => "sv",
        Lang::Tam => "ta",
        Lang::Tel => "te",
        Lang::Tgl => "tl",
        Lang::Tha => "th",
        Lang::Tuk => "tk",
        Lang::Tur => "tr",
        Lang::Ukr => "uk",
        Lang::Urd => "ur",
        Lang::Uzb => "uz",
        Lang::Vie => "vi",
        Lang::Yid => "yi",
        Lang::Zul => "zu",
    }
}

/// Detect a language, never failing: errors become [`FALLBACK_LANGUAGE`].
#[must_use]
pub fn detect_language(detector: &dyn LanguageDetector, text: &str) -> String {
    match detector.detect(text) {
        Ok(code) => code,
        Err(e) => {
            debug!(error = %e, "Language detection failed, using fallback");
            FALLBACK_LANGUAGE.to_string()
        }
    }
}
