use thiserror::Error;

use crate::messages::Locale;
use crate::transport::FailureKind;

/// Failures of a request against the analysis backend
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RequestError {
    #[error("request timed out after {timeout_ms} ms")]
    Timeout { timeout_ms: u64 },

    #[error("server rejected request ({status}): {message}")]
    ServerRejected { message: String, status: u16 },

    #[error("cannot reach server: {0}")]
    NetworkUnreachable(String),

    #[error("request blocked by cross-origin policy: {0}")]
    CorsBlocked(String),

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("request failed: {0}")]
    Unknown(String),
}

impl RequestError {
    /// Maps a classified transport failure to the request taxonomy
    pub fn from_failure(kind: FailureKind, description: String, timeout_ms: u64) -> Self {
        match kind {
            FailureKind::Timeout => RequestError::Timeout { timeout_ms },
            FailureKind::ConnectFailed | FailureKind::NetworkError => {
                RequestError::NetworkUnreachable(description)
            }
            FailureKind::CorsBlocked => RequestError::CorsBlocked(description),
            FailureKind::Other => RequestError::Unknown(description),
        }
    }

    /// Message suitable for showing to the person filling in the form
    pub fn user_message(&self, locale: Locale, base_url: &str) -> String {
        match (self, locale) {
            (RequestError::Timeout { timeout_ms }, Locale::En) => {
                format!("Request timeout ({}), please try again", seconds(*timeout_ms))
            }
            (RequestError::Timeout { timeout_ms }, Locale::Id) => {
                format!("Request timeout ({}) - silakan coba lagi", seconds(*timeout_ms))
            }
            (RequestError::ServerRejected { message, .. }, _) => message.clone(),
            (RequestError::NetworkUnreachable(_), Locale::En) => {
                format!("Cannot connect to server {base_url}, check your connection")
            }
            (RequestError::NetworkUnreachable(_), Locale::Id) => {
                format!("Tidak dapat terhubung ke server {base_url} - periksa koneksi")
            }
            (RequestError::CorsBlocked(_), Locale::En) => {
                "CORS error, the server configuration needs fixing".to_string()
            }
            (RequestError::CorsBlocked(_), Locale::Id) => {
                "CORS error - konfigurasi server perlu diperbaiki".to_string()
            }
            (RequestError::MalformedResponse(_), Locale::En) => {
                "The server returned an invalid result".to_string()
            }
            (RequestError::MalformedResponse(_), Locale::Id) => {
                "Data hasil tidak valid".to_string()
            }
            (RequestError::Unknown(detail), Locale::En) => {
                format!("Something went wrong: {detail}")
            }
            (RequestError::Unknown(detail), Locale::Id) => {
                format!("Terjadi kesalahan: {detail}")
            }
        }
    }
}

/// "10s", "0.3s", "1.5s"
fn seconds(ms: u64) -> String {
    format!("{}s", ms as f64 / 1000.0)
}

/// Form fields subject to local validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Name,
    Age,
    Gender,
    Height,
    Weight,
}

impl Field {
    pub fn label(&self, locale: Locale) -> &'static str {
        match (self, locale) {
            (Field::Name, Locale::En) => "Name",
            (Field::Name, Locale::Id) => "Nama",
            (Field::Age, Locale::En) => "Age",
            (Field::Age, Locale::Id) => "Usia",
            (Field::Gender, Locale::En) => "Gender",
            (Field::Gender, Locale::Id) => "Jenis kelamin",
            (Field::Height, Locale::En) => "Height",
            (Field::Height, Locale::Id) => "Tinggi badan",
            (Field::Weight, Locale::En) => "Weight",
            (Field::Weight, Locale::Id) => "Berat badan",
        }
    }

    pub fn unit(&self, locale: Locale) -> &'static str {
        match (self, locale) {
            (Field::Name, Locale::En) => "characters",
            (Field::Name, Locale::Id) => "karakter",
            (Field::Age, Locale::En) => "years",
            (Field::Age, Locale::Id) => "tahun",
            (Field::Height, _) => "cm",
            (Field::Weight, _) => "kg",
            (Field::Gender, _) => "",
        }
    }
}

/// Local form validation failures. Never produced by the network layer.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("{0:?} is required")]
    MissingField(Field),

    #[error("{field:?} must be between {min} and {max}")]
    OutOfRange { field: Field, min: f64, max: f64 },

    #[error("{0:?} has an invalid value")]
    Invalid(Field),
}

impl ValidationError {
    pub fn field(&self) -> Field {
        match self {
            ValidationError::MissingField(field)
            | ValidationError::Invalid(field)
            | ValidationError::OutOfRange { field, .. } => *field,
        }
    }

    pub fn user_message(&self, locale: Locale) -> String {
        let field = self.field();
        let label = field.label(locale);
        match (self, field, locale) {
            (ValidationError::MissingField(_), Field::Gender, Locale::En) => {
                "Gender must be selected".to_string()
            }
            (ValidationError::MissingField(_), Field::Gender, Locale::Id) => {
                "Jenis kelamin harus dipilih".to_string()
            }
            (ValidationError::MissingField(_), Field::Name, Locale::En)
            | (ValidationError::OutOfRange { .. }, Field::Name, Locale::En) => {
                "Name must be at least 2 characters".to_string()
            }
            (ValidationError::MissingField(_), Field::Name, Locale::Id)
            | (ValidationError::OutOfRange { .. }, Field::Name, Locale::Id) => {
                "Nama harus diisi minimal 2 karakter".to_string()
            }
            (ValidationError::MissingField(_), _, Locale::En) => format!("{label} is required"),
            (ValidationError::MissingField(_), _, Locale::Id) => format!("{label} harus diisi"),
            (ValidationError::OutOfRange { min, max, .. }, _, Locale::En) => {
                format!("{label} must be between {min}-{max} {}", field.unit(locale))
            }
            (ValidationError::OutOfRange { min, max, .. }, _, Locale::Id) => {
                format!("{label} harus antara {min}-{max} {}", field.unit(locale))
            }
            (ValidationError::Invalid(_), _, Locale::En) => format!("{label} has an invalid value"),
            (ValidationError::Invalid(_), _, Locale::Id) => format!("{label} tidak valid"),
        }
    }
}
