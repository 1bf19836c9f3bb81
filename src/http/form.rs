//! # Formularios URL-encoded
//! src/http/form.rs
//!
//! Decodifica `application/x-www-form-urlencoded` tanto del body como de la
//! query string. Los valores del body tienen prioridad sobre los de la query.
//!
//! ```
//! use hash_server::http::{Request, form::FormValues};
//!
//! let raw = b"POST /hash HTTP/1.0\r\nContent-Type: application/x-www-form-urlencoded\r\n\r\npassword=angry+Monkey%21";
//! let request = Request::parse(raw).unwrap();
//! let form = FormValues::from_request(&request).unwrap();
//!
//! assert_eq!(form.get("password"), Some("angry Monkey!"));
//! ```

use super::request::{Method, Request};
use percent_encoding::percent_decode;
use thiserror::Error;

/// Content-Type que habilita el parseo del body
const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Errores al decodificar un formulario
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("invalid URL escape \"{0}\"")]
    InvalidEscape(String),

    #[error("invalid UTF-8 in form value")]
    InvalidUtf8,
}

/// Pares clave/valor decodificados, en orden de prioridad
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormValues {
    values: Vec<(String, String)>,
}

impl FormValues {
    /// Junta los campos del body (si el Content-Type es de formulario) y de
    /// la query string
    pub fn from_request(request: &Request) -> Result<Self, FormError> {
        let mut values = Vec::new();

        if has_body(request.method()) && is_form(request.header("Content-Type")) {
            values.extend(parse_urlencoded(request.body())?);
        }
        values.extend(parse_urlencoded(request.query().as_bytes())?);

        Ok(Self { values })
    }

    /// Primer valor de un campo
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

fn has_body(method: Method) -> bool {
    matches!(method, Method::POST | Method::PUT | Method::PATCH)
}

/// Compara el media type ignorando parámetros como `; charset=utf-8`
fn is_form(content_type: Option<&str>) -> bool {
    content_type
        .and_then(|value| value.split(';').next())
        .map(|media| media.trim().eq_ignore_ascii_case(FORM_CONTENT_TYPE))
        .unwrap_or(false)
}

/// Decodifica `a=1&b=dos+palabras` en pares
pub fn parse_urlencoded(input: &[u8]) -> Result<Vec<(String, String)>, FormError> {
    let mut pairs = Vec::new();

    for segment in input.split(|&b| b == b'&') {
        if segment.is_empty() {
            continue;
        }

        let (key, value) = match segment.iter().position(|&b| b == b'=') {
            Some(eq) => (&segment[..eq], &segment[eq + 1..]),
            None => (segment, &segment[segment.len()..]),
        };

        pairs.push((decode_component(key)?, decode_component(value)?));
    }

    Ok(pairs)
}

/// `+` es espacio y `%XX` tiene que ser un escape hexadecimal completo
fn decode_component(raw: &[u8]) -> Result<String, FormError> {
    for (i, &b) in raw.iter().enumerate() {
        if b != b'%' {
            continue;
        }
        let escape = raw.get(i + 1..i + 3);
        let valid = escape
            .map(|hex| hex.iter().all(u8::is_ascii_hexdigit))
            .unwrap_or(false);
        if !valid {
            let end = raw.len().min(i + 3);
            return Err(FormError::InvalidEscape(
                String::from_utf8_lossy(&raw[i..end]).into_owned(),
            ));
        }
    }

    let spaced: Vec<u8> = raw
        .iter()
        .map(|&b| if b == b'+' { b' ' } else { b })
        .collect();

    percent_decode(&spaced)
        .decode_utf8()
        .map(|decoded| decoded.into_owned())
        .map_err(|_| FormError::InvalidUtf8)
}
