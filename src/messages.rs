//! User-facing text in the supported locales.

use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Locale {
    #[default]
    En,
    Id,
}

#[derive(Debug, Error)]
#[error("unknown locale {0:?}, expected \"en\" or \"id\"")]
pub struct UnknownLocale(pub String);

impl FromStr for Locale {
    type Err = UnknownLocale;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "en" | "en-us" | "en_us" | "english" => Ok(Locale::En),
            "id" | "id-id" | "id_id" | "indonesian" => Ok(Locale::Id),
            other => Err(UnknownLocale(other.to_string())),
        }
    }
}

pub fn analysis_succeeded(locale: Locale) -> &'static str {
    match locale {
        Locale::En => "Health analysis completed!",
        Locale::Id => "Analisis kesehatan berhasil!",
    }
}

pub fn submission_failed(locale: Locale) -> &'static str {
    match locale {
        Locale::En => "Connection to server failed",
        Locale::Id => "Koneksi ke server gagal",
    }
}

pub fn checking_backend(locale: Locale) -> &'static str {
    match locale {
        Locale::En => "Checking backend...",
        Locale::Id => "Memeriksa backend...",
    }
}

pub fn years(locale: Locale) -> &'static str {
    match locale {
        Locale::En => "years",
        Locale::Id => "tahun",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locale_parsing() {
        assert_eq!("en".parse::<Locale>().unwrap(), Locale::En);
        assert_eq!(" ID ".parse::<Locale>().unwrap(), Locale::Id);
        assert!("fr".parse::<Locale>().is_err());
    }
}
