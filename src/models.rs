use crate::format::{format_plain, parse_display_number};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Sentinel rendered for missing attributes.
pub const NOT_AVAILABLE: &str = "N/A";

/// Attribute keys used by the car service.
pub mod keys {
    pub const MARCA: &str = "Marca";
    pub const MODELO: &str = "Modelo";
    pub const ANO: &str = "Ano";
    pub const TIPO: &str = "Tipo";
    pub const PRECO: &str = "Preço Indicativo (€)";
    pub const POTENCIA: &str = "Potência (cv)";
    pub const CONSUMO: &str = "Consumo (l/100km)";
    pub const ACELERACAO: &str = "0-100 km/h (s)";
    pub const VELOCIDADE_MAX: &str = "Velocidade Max (km/h)";
    pub const BAGAGEIRA: &str = "Bagageira (l)";
    pub const COMBUSTIVEL: &str = "Combustível";
}

/// Boolean extras in canonical display order.
pub const EXTRAS: [&str; 6] = ["Airbag", "AC", "CC", "Sensores", "Teto Solar", "Navegador"];

// ============ Car records ============

/// One vehicle's attribute set as returned by the car service.
///
/// Kept as a JSON map since no attribute is mandatory and values arrive
/// with loose types (numbers, numeric strings, `true` or `"TRUE"`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CarRecord(Map<String, Value>);

impl CarRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter.
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.0.insert(key.to_string(), value.into());
        self
    }

    /// Raw value, treating JSON `null` as missing.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key).filter(|v| !v.is_null())
    }

    /// Display text of an attribute, `None` when missing.
    pub fn text(&self, key: &str) -> Option<String> {
        match self.get(key)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => n.as_f64().map(format_plain),
            Value::Bool(b) => Some(b.to_string()),
            other => Some(other.to_string()),
        }
    }

    /// Display text, or the `N/A` sentinel.
    pub fn text_or_sentinel(&self, key: &str) -> String {
        self.text(key).unwrap_or_else(|| NOT_AVAILABLE.to_string())
    }

    /// Numeric value of an attribute; see [`coerce_number`].
    pub fn number(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(coerce_number)
    }

    /// Whether a boolean extra is present (`true` or the string `"TRUE"`).
    pub fn has_extra(&self, key: &str) -> bool {
        match self.get(key) {
            Some(Value::Bool(b)) => *b,
            Some(Value::String(s)) => s.trim().eq_ignore_ascii_case("true"),
            _ => false,
        }
    }

    /// Truthy extras in canonical order.
    pub fn extras(&self) -> Vec<&'static str> {
        EXTRAS
            .iter()
            .copied()
            .filter(|extra| self.has_extra(extra))
            .collect()
    }

    /// `"<Marca> <Modelo>"`, with the sentinel for missing parts.
    pub fn display_name(&self) -> String {
        format!(
            "{} {}",
            self.text_or_sentinel(keys::MARCA),
            self.text_or_sentinel(keys::MODELO)
        )
    }
}

/// Coerces a raw value to a number for comparisons.
///
/// Numbers pass through; strings go through [`parse_display_number`].
/// Anything else, or a string with no digits, is a parse failure and yields
/// `None` so the value drops out of best-value candidacy.
pub fn coerce_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_display_number(s),
        _ => None,
    };
    if number.is_none() {
        tracing::trace!("Excluding non-numeric value from comparison: {}", value);
    }
    number.filter(|n| n.is_finite())
}

/// A car record with the service's 0..100 score.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoredCarRecord {
    #[serde(default)]
    pub score_total: Option<f64>,
    #[serde(flatten)]
    pub car: CarRecord,
}

impl ScoredCarRecord {
    pub fn new(car: CarRecord, score_total: Option<f64>) -> Self {
        Self { score_total, car }
    }
}

// ============ Car service API payloads ============

/// Response of `GET /tipos`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TiposResponse {
    #[serde(default)]
    pub tipos: Vec<String>,
}

/// Response of `GET /combustiveis`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CombustiveisResponse {
    #[serde(default)]
    pub combustiveis: Vec<String>,
}

/// Autocomplete entry from `GET /modelos`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSuggestion {
    pub id: String,
    #[serde(rename = "Marca", default)]
    pub marca: Option<String>,
    #[serde(rename = "Modelo", default)]
    pub modelo: Option<String>,
    #[serde(rename = "Ano", default)]
    pub ano: Option<Value>,
}

impl ModelSuggestion {
    /// `"<Marca> <Modelo> (<Ano>)"`.
    pub fn label(&self) -> String {
        let ano = match &self.ano {
            Some(Value::Number(n)) => n.as_f64().map(format_plain),
            Some(Value::String(s)) => Some(s.clone()),
            _ => None,
        };
        format!(
            "{} {} ({})",
            self.marca.as_deref().unwrap_or(NOT_AVAILABLE),
            self.modelo.as_deref().unwrap_or(NOT_AVAILABLE),
            ano.as_deref().unwrap_or(NOT_AVAILABLE)
        )
    }
}

/// Response of `GET /modelos`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelosResponse {
    #[serde(default)]
    pub modelos: Vec<ModelSuggestion>,
}

/// Body of `POST /comparar`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompararRequest {
    pub modelos: Vec<String>,
}

/// Response of `POST /comparar`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompararResponse {
    #[serde(default)]
    pub comparacao: Vec<CarRecord>,
}

/// Response of `POST /recomendar`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecomendarResponse {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub resultados: Vec<ScoredCarRecord>,
}
