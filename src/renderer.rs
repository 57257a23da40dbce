//! Result rendering: comparison tables with best-value highlighting and
//! recommendation card grids.
//!
//! The renderer produces view models only. Markup lives in [`crate::pages`],
//! so the highlighting rules can be tested without any HTML.

use crate::format::{format_plain, format_pt_number};
use crate::models::{keys, CarRecord, ScoredCarRecord, EXTRAS, NOT_AVAILABLE};

/// Marker for an empty extras list on a card.
pub const NO_EXTRAS: &str = "Nenhum";

/// Header of the label column.
pub const LABEL_HEADER: &str = "Característica";

// ============ Comparison spec ============

/// How a numeric cell is displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Formatter {
    /// pt-PT grouped number followed by ` €`.
    Currency,
    /// The number as is.
    Plain,
    /// The number followed by `s`.
    Seconds,
}

impl Formatter {
    pub fn apply(self, value: f64) -> String {
        match self {
            Formatter::Currency => format!("{} €", format_pt_number(value)),
            Formatter::Plain => format_plain(value),
            Formatter::Seconds => format!("{}s", format_plain(value)),
        }
    }
}

/// Which end of a numeric row is favourable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    HigherIsBetter,
    LowerIsBetter,
}

impl Direction {
    /// Fixed direction policy: fuel consumption and acceleration time are
    /// better when lower, every other numeric attribute when higher.
    pub fn for_key(key: &str) -> Self {
        match key {
            keys::CONSUMO | keys::ACELERACAO => Direction::LowerIsBetter,
            _ => Direction::HigherIsBetter,
        }
    }

    pub fn higher_is_better(self) -> bool {
        self == Direction::HigherIsBetter
    }
}

/// What a row holds and whether it takes part in highlighting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKind {
    /// Numeric attribute, highlighted per [`Direction::for_key`].
    Numeric,
    /// Free text, never highlighted.
    Text,
    /// Boolean extra shown as a check mark.
    Extra,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComparisonRow {
    pub label: &'static str,
    pub key: &'static str,
    pub formatter: Option<Formatter>,
    pub kind: RowKind,
}

impl ComparisonRow {
    pub const fn numeric(label: &'static str, key: &'static str) -> Self {
        Self {
            label,
            key,
            formatter: None,
            kind: RowKind::Numeric,
        }
    }

    pub const fn text(label: &'static str, key: &'static str) -> Self {
        Self {
            label,
            key,
            formatter: None,
            kind: RowKind::Text,
        }
    }

    pub const fn extra(key: &'static str) -> Self {
        Self {
            label: key,
            key,
            formatter: None,
            kind: RowKind::Extra,
        }
    }

    pub const fn formatted(mut self, formatter: Formatter) -> Self {
        self.formatter = Some(formatter);
        self
    }
}

/// Ordered rows of a comparison table. Static configuration, not derived
/// from the data being compared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComparisonSpec {
    rows: Vec<ComparisonRow>,
}

impl ComparisonSpec {
    pub fn new(rows: Vec<ComparisonRow>) -> Self {
        Self { rows }
    }

    /// Attribute rows followed by the six extras.
    pub fn standard() -> Self {
        let mut rows = vec![
            ComparisonRow::numeric("Preço (€)", keys::PRECO)
                .formatted(Formatter::Currency),
            ComparisonRow::numeric("Ano", keys::ANO),
            ComparisonRow::text("Tipo", keys::TIPO),
            ComparisonRow::numeric("Potência (cv)", keys::POTENCIA),
            ComparisonRow::numeric("Consumo (l/100km)", keys::CONSUMO)
                .formatted(Formatter::Plain),
            ComparisonRow::numeric("0-100 km/h (s)", keys::ACELERACAO)
                .formatted(Formatter::Seconds),
            ComparisonRow::numeric("Velocidade Máx (km/h)", keys::VELOCIDADE_MAX),
            ComparisonRow::numeric("Bagageira (l)", keys::BAGAGEIRA),
            ComparisonRow::text("Combustível", keys::COMBUSTIVEL),
        ];
        rows.extend(EXTRAS.into_iter().map(ComparisonRow::extra));
        Self { rows }
    }

    pub fn rows(&self) -> &[ComparisonRow] {
        &self.rows
    }
}

impl Default for ComparisonSpec {
    fn default() -> Self {
        Self::standard()
    }
}

// ============ Comparison table ============

#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    pub label: String,
    /// One display cell per car.
    pub cells: Vec<String>,
    /// Column of the most favourable value, when the row has any.
    pub best_index: Option<usize>,
}

impl TableRow {
    pub fn is_best(&self, column: usize) -> bool {
        self.best_index == Some(column)
    }
}

/// Row-major comparison table.
#[derive(Debug, Clone, PartialEq)]
pub struct TableModel {
    /// Label column header followed by one `"<Marca> <Modelo>"` per car.
    pub headers: Vec<String>,
    pub rows: Vec<TableRow>,
}

impl TableModel {
    pub fn car_count(&self) -> usize {
        self.headers.len().saturating_sub(1)
    }
}

/// Builds the comparison table for `cars` following `spec`.
///
/// Never fails: missing values render as `N/A`, string values are shown
/// verbatim, and best values are computed from the raw values rather than
/// from the formatted cell text.
pub fn render_comparison_table(cars: &[CarRecord], spec: &ComparisonSpec) -> TableModel {
    let mut headers = Vec::with_capacity(cars.len() + 1);
    headers.push(LABEL_HEADER.to_string());
    headers.extend(cars.iter().map(CarRecord::display_name));

    let rows = spec
        .rows()
        .iter()
        .map(|row| match row.kind {
            RowKind::Extra => TableRow {
                label: row.label.to_string(),
                cells: cars
                    .iter()
                    .map(|car| if car.has_extra(row.key) { "✓" } else { "✗" }.to_string())
                    .collect(),
                best_index: None,
            },
            RowKind::Text => TableRow {
                label: row.label.to_string(),
                cells: cars.iter().map(|car| format_cell(car, row)).collect(),
                best_index: None,
            },
            RowKind::Numeric => {
                let values: Vec<Option<f64>> = cars.iter().map(|car| car.number(row.key)).collect();
                let best_index = if values.iter().any(Option::is_some) {
                    Some(compute_best_value_index(
                        &values,
                        Direction::for_key(row.key).higher_is_better(),
                    ))
                } else {
                    None
                };
                TableRow {
                    label: row.label.to_string(),
                    cells: cars.iter().map(|car| format_cell(car, row)).collect(),
                    best_index,
                }
            }
        })
        .collect();

    TableModel { headers, rows }
}

fn format_cell(car: &CarRecord, row: &ComparisonRow) -> String {
    match (car.get(row.key), row.formatter) {
        (None, _) => NOT_AVAILABLE.to_string(),
        (Some(serde_json::Value::Number(n)), Some(formatter)) => match n.as_f64() {
            Some(value) => formatter.apply(value),
            None => n.to_string(),
        },
        _ => car.text_or_sentinel(row.key),
    }
}

/// Index of the most favourable value in a row.
///
/// `None` entries are skipped. The scan runs left to right and only a
/// strictly better value replaces the current best, so ties go to the
/// lowest index. With no candidates at all the result is `0`.
pub fn compute_best_value_index(values: &[Option<f64>], higher_is_better: bool) -> usize {
    let mut best: Option<(usize, f64)> = None;
    for (index, value) in values.iter().enumerate() {
        let Some(value) = *value else { continue };
        let better = match best {
            None => true,
            Some((_, current)) if higher_is_better => value > current,
            Some((_, current)) => value < current,
        };
        if better {
            best = Some((index, value));
        }
    }
    best.map(|(index, _)| index).unwrap_or(0)
}

// ============ Recommendation grid ============

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardField {
    pub label: &'static str,
    pub value: String,
}

/// One recommended car.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardModel {
    pub title: String,
    /// Rounded score clamped to 0..=100, or `N/A` when the service sent none.
    pub score_badge: String,
    pub fields: Vec<CardField>,
    /// Comma-joined extras, or [`NO_EXTRAS`].
    pub extras: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecommendationGrid {
    /// Number of matches reported by the service (may exceed `cards.len()`).
    pub total: u64,
    pub cards: Vec<CardModel>,
}

impl RecommendationGrid {
    pub fn summary(&self) -> String {
        format!(
            "Encontrados {} carros que correspondem aos seus critérios",
            self.total
        )
    }
}

/// Display badge for a score: rounded to the nearest integer and clamped
/// to 0..=100. The score itself is not corrected.
pub fn score_badge(score: Option<f64>) -> String {
    match score.filter(|s| s.is_finite()) {
        Some(score) => format!("{}", score.round().clamp(0.0, 100.0) as i64),
        None => NOT_AVAILABLE.to_string(),
    }
}

/// One card per car, in the order the service ranked them.
pub fn render_recommendation_grid(cars: &[ScoredCarRecord]) -> Vec<CardModel> {
    cars.iter().map(render_card).collect()
}

fn render_card(scored: &ScoredCarRecord) -> CardModel {
    let car = &scored.car;
    let with_unit = |key: &str, unit: &str| match car.text(key) {
        Some(text) => format!("{}{}", text, unit),
        None => NOT_AVAILABLE.to_string(),
    };
    let price = match car.number(keys::PRECO) {
        Some(price) => format!("{} €", format_pt_number(price.trunc())),
        None => NOT_AVAILABLE.to_string(),
    };

    let fields = vec![
        CardField {
            label: "Preço",
            value: price,
        },
        CardField {
            label: "Ano",
            value: car.text_or_sentinel(keys::ANO),
        },
        CardField {
            label: "Tipo",
            value: car.text_or_sentinel(keys::TIPO),
        },
        CardField {
            label: "Potência",
            value: with_unit(keys::POTENCIA, " cv"),
        },
        CardField {
            label: "Consumo",
            value: with_unit(keys::CONSUMO, " l/100km"),
        },
        CardField {
            label: "0-100 km/h",
            value: with_unit(keys::ACELERACAO, "s"),
        },
        CardField {
            label: "Velocidade Máx",
            value: with_unit(keys::VELOCIDADE_MAX, " km/h"),
        },
        CardField {
            label: "Bagageira",
            value: with_unit(keys::BAGAGEIRA, "L"),
        },
        CardField {
            label: "Combustível",
            value: car.text_or_sentinel(keys::COMBUSTIVEL),
        },
    ];

    let extras = car.extras();
    CardModel {
        title: car.display_name(),
        score_badge: score_badge(scored.score_total),
        fields,
        extras: if extras.is_empty() {
            NO_EXTRAS.to_string()
        } else {
            extras.join(", ")
        },
    }
}
