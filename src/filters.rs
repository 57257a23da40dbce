//! Recommendation filters: form input to the `POST /recomendar` body, and
//! the same predicates applied locally to example data.

use crate::models::{keys, CarRecord, EXTRAS};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Slider range for the priority weights.
pub const PRIORITY_RANGE: (f64, f64) = (0.0, 2.0);
pub const DEFAULT_PRIORITY: f64 = 1.0;

/// Usage profile; selects the service's preset weights.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Perfil {
    Economico,
    Desportivo,
    Familia,
    Cidade,
    Estrada,
    #[default]
    Equilibrado,
    /// Uses the three priority sliders instead of a preset.
    Personalizado,
}

impl Perfil {
    pub const ALL: [Perfil; 7] = [
        Perfil::Equilibrado,
        Perfil::Economico,
        Perfil::Desportivo,
        Perfil::Familia,
        Perfil::Cidade,
        Perfil::Estrada,
        Perfil::Personalizado,
    ];

    /// Wire value.
    pub fn as_str(self) -> &'static str {
        match self {
            Perfil::Economico => "economico",
            Perfil::Desportivo => "desportivo",
            Perfil::Familia => "familia",
            Perfil::Cidade => "cidade",
            Perfil::Estrada => "estrada",
            Perfil::Equilibrado => "equilibrado",
            Perfil::Personalizado => "personalizado",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Perfil::Economico => "Económico",
            Perfil::Desportivo => "Desportivo",
            Perfil::Familia => "Família",
            Perfil::Cidade => "Cidade",
            Perfil::Estrada => "Estrada",
            Perfil::Equilibrado => "Equilibrado",
            Perfil::Personalizado => "Personalizado",
        }
    }
}

impl fmt::Display for Perfil {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Perfil {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Perfil::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown profile '{}'", s))
    }
}

/// Body of `POST /recomendar`.
///
/// Unset constraints serialize as `null`, including empty multi-selects:
/// the service reads `null` as "no constraint" while `[]` could match
/// nothing. No field is ever skipped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filtros {
    pub preco_max: Option<f64>,
    pub tipos: Option<Vec<String>>,
    pub combustiveis: Option<Vec<String>>,
    pub bagageira_min: Option<f64>,
    pub consumo_max: Option<f64>,
    pub extras_obrigatorios: Option<Vec<String>>,
    pub perfil: Perfil,
    pub prioridade_consumo: f64,
    pub prioridade_desempenho: f64,
    pub prioridade_espaco: f64,
}

impl Default for Filtros {
    fn default() -> Self {
        Self {
            preco_max: None,
            tipos: None,
            combustiveis: None,
            bagageira_min: None,
            consumo_max: None,
            extras_obrigatorios: None,
            perfil: Perfil::default(),
            prioridade_consumo: DEFAULT_PRIORITY,
            prioridade_desempenho: DEFAULT_PRIORITY,
            prioridade_espaco: DEFAULT_PRIORITY,
        }
    }
}

impl Filtros {
    /// Whether `car` satisfies every set constraint.
    ///
    /// Mirrors the service's filtering so example data can be narrowed the
    /// same way. A record missing a constrained attribute does not match.
    pub fn matches(&self, car: &CarRecord) -> bool {
        let at_most = |limit: Option<f64>, key: &str| match limit {
            Some(limit) => car.number(key).is_some_and(|v| v <= limit),
            None => true,
        };
        let at_least = |limit: Option<f64>, key: &str| match limit {
            Some(limit) => car.number(key).is_some_and(|v| v >= limit),
            None => true,
        };
        let one_of = |allowed: &Option<Vec<String>>, key: &str| match allowed {
            Some(allowed) => car
                .text(key)
                .is_some_and(|value| allowed.iter().any(|a| *a == value)),
            None => true,
        };

        at_most(self.preco_max, keys::PRECO)
            && one_of(&self.tipos, keys::TIPO)
            && one_of(&self.combustiveis, keys::COMBUSTIVEL)
            && at_least(self.bagageira_min, keys::BAGAGEIRA)
            && at_most(self.consumo_max, keys::CONSUMO)
            && self
                .extras_obrigatorios
                .iter()
                .flatten()
                .all(|extra| car.has_extra(extra))
    }
}

/// Raw recommendation form input.
///
/// Checkbox groups repeat their field name once per checked box, so the
/// body is decoded pair by pair instead of through a struct deserializer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterForm {
    pub preco_max: String,
    pub bagageira_min: String,
    pub consumo_max: String,
    pub tipos: Vec<String>,
    pub combustiveis: Vec<String>,
    pub extras: Vec<String>,
    pub perfil: String,
    pub prioridade_consumo: String,
    pub prioridade_desempenho: String,
    pub prioridade_espaco: String,
}

impl FilterForm {
    /// Decodes an `application/x-www-form-urlencoded` body.
    pub fn parse(body: &str) -> Self {
        let mut form = Self::default();
        for (name, value) in url::form_urlencoded::parse(body.as_bytes()) {
            let value = value.into_owned();
            match name.as_ref() {
                "preco_max" => form.preco_max = value,
                "bagageira_min" => form.bagageira_min = value,
                "consumo_max" => form.consumo_max = value,
                "tipos" => form.tipos.push(value),
                "combustiveis" => form.combustiveis.push(value),
                "extras" => form.extras.push(value),
                "perfil" => form.perfil = value,
                "prioridade_consumo" => form.prioridade_consumo = value,
                "prioridade_desempenho" => form.prioridade_desempenho = value,
                "prioridade_espaco" => form.prioridade_espaco = value,
                other => tracing::debug!("Ignoring unknown filter field '{}'", other),
            }
        }
        form
    }

    /// Builds the request body.
    ///
    /// Blank or non-numeric scalars and empty checkbox groups become `None`.
    /// Extras outside the six known keys are dropped.
    pub fn to_filtros(&self) -> Filtros {
        let extras: Vec<String> = self
            .extras
            .iter()
            .filter(|e| EXTRAS.contains(&e.as_str()))
            .cloned()
            .collect();

        Filtros {
            preco_max: parse_scalar(&self.preco_max),
            tipos: non_empty(&self.tipos),
            combustiveis: non_empty(&self.combustiveis),
            bagageira_min: parse_scalar(&self.bagageira_min),
            consumo_max: parse_scalar(&self.consumo_max),
            extras_obrigatorios: non_empty(&extras),
            perfil: self.perfil.parse().unwrap_or_default(),
            prioridade_consumo: parse_priority(&self.prioridade_consumo),
            prioridade_desempenho: parse_priority(&self.prioridade_desempenho),
            prioridade_espaco: parse_priority(&self.prioridade_espaco),
        }
    }
}

fn parse_scalar(raw: &str) -> Option<f64> {
    raw.trim()
        .replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

fn parse_priority(raw: &str) -> f64 {
    parse_scalar(raw)
        .map(|v| v.clamp(PRIORITY_RANGE.0, PRIORITY_RANGE.1))
        .unwrap_or(DEFAULT_PRIORITY)
}

fn non_empty(values: &[String]) -> Option<Vec<String>> {
    let values: Vec<String> = values
        .iter()
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect();
    if values.is_empty() {
        None
    } else {
        Some(values)
    }
}
