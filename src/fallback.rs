//! Illustrative example data shown when the car service is unavailable.
//!
//! Every view built from these records is flagged as example data so the
//! page can label it.

use crate::filters::Filtros;
use crate::models::{keys, CarRecord, RecomendarResponse, ScoredCarRecord};

/// Label shown next to any result built from example data.
pub const EXAMPLE_LABEL: &str = "Dados de exemplo";

struct ExampleCar {
    marca: &'static str,
    modelo: &'static str,
    ano: u16,
    tipo: &'static str,
    preco: u32,
    potencia: u16,
    consumo: f64,
    aceleracao: f64,
    velocidade: u16,
    bagageira: u16,
    combustivel: &'static str,
    extras: [bool; 6],
    score: f64,
}

// Sorted by score, highest first.
const EXAMPLES: [ExampleCar; 6] = [
    ExampleCar {
        marca: "Toyota",
        modelo: "Corolla Hybrid",
        ano: 2023,
        tipo: "Sedan",
        preco: 31500,
        potencia: 140,
        consumo: 4.5,
        aceleracao: 9.1,
        velocidade: 180,
        bagageira: 471,
        combustivel: "Híbrido",
        extras: [true, true, true, true, false, true],
        score: 92.0,
    },
    ExampleCar {
        marca: "Peugeot",
        modelo: "3008",
        ano: 2022,
        tipo: "SUV",
        preco: 36900,
        potencia: 130,
        consumo: 5.9,
        aceleracao: 10.4,
        velocidade: 188,
        bagageira: 520,
        combustivel: "Gasolina",
        extras: [true, true, true, true, true, true],
        score: 88.0,
    },
    ExampleCar {
        marca: "Tesla",
        modelo: "Model 3",
        ano: 2023,
        tipo: "Sedan",
        preco: 44990,
        potencia: 283,
        consumo: 0.0,
        aceleracao: 6.1,
        velocidade: 225,
        bagageira: 594,
        combustivel: "Elétrico",
        extras: [true, true, true, true, true, true],
        score: 81.0,
    },
    ExampleCar {
        marca: "Volkswagen",
        modelo: "Golf",
        ano: 2022,
        tipo: "Hatchback",
        preco: 29900,
        potencia: 115,
        consumo: 4.9,
        aceleracao: 10.2,
        velocidade: 202,
        bagageira: 381,
        combustivel: "Diesel",
        extras: [true, true, true, false, false, true],
        score: 76.0,
    },
    ExampleCar {
        marca: "Renault",
        modelo: "Clio",
        ano: 2023,
        tipo: "Citadino",
        preco: 19800,
        potencia: 90,
        consumo: 5.3,
        aceleracao: 12.2,
        velocidade: 178,
        bagageira: 391,
        combustivel: "Gasolina",
        extras: [true, true, false, true, false, false],
        score: 71.0,
    },
    ExampleCar {
        marca: "Dacia",
        modelo: "Sandero",
        ano: 2021,
        tipo: "Citadino",
        preco: 13990,
        potencia: 65,
        consumo: 5.2,
        aceleracao: 16.7,
        velocidade: 158,
        bagageira: 328,
        combustivel: "Gasolina",
        extras: [true, false, false, false, false, false],
        score: 58.0,
    },
];

impl ExampleCar {
    fn record(&self) -> CarRecord {
        let mut car = CarRecord::new()
            .with(keys::MARCA, self.marca)
            .with(keys::MODELO, self.modelo)
            .with(keys::ANO, self.ano)
            .with(keys::TIPO, self.tipo)
            .with(keys::PRECO, self.preco)
            .with(keys::POTENCIA, self.potencia)
            .with(keys::CONSUMO, self.consumo)
            .with(keys::ACELERACAO, self.aceleracao)
            .with(keys::VELOCIDADE_MAX, self.velocidade)
            .with(keys::BAGAGEIRA, self.bagageira)
            .with(keys::COMBUSTIVEL, self.combustivel);
        for (extra, present) in crate::models::EXTRAS.iter().zip(self.extras) {
            car = car.with(extra, present);
        }
        car
    }

    /// Same shape as the service's model ids: `"<Marca> <Modelo> <Ano>"`.
    fn id(&self) -> String {
        format!("{} {} {}", self.marca, self.modelo, self.ano)
    }
}

/// All example records with their illustrative scores, best first.
pub fn example_cars() -> Vec<ScoredCarRecord> {
    EXAMPLES
        .iter()
        .map(|e| ScoredCarRecord::new(e.record(), Some(e.score)))
        .collect()
}

/// Example records for a comparison of `ids`.
///
/// Always yields one record per id. Ids naming an example car pick that
/// car; the remaining slots take the unpicked examples in order.
pub fn example_comparison(ids: &[String]) -> Vec<CarRecord> {
    let count = ids.len().min(EXAMPLES.len());
    let mut picked: Vec<usize> = Vec::with_capacity(count);
    for id in ids {
        let found = EXAMPLES
            .iter()
            .position(|e| e.id().eq_ignore_ascii_case(id.trim()));
        if let Some(index) = found.filter(|i| !picked.contains(i)) {
            picked.push(index);
        }
    }
    for index in 0..EXAMPLES.len() {
        if picked.len() >= count {
            break;
        }
        if !picked.contains(&index) {
            picked.push(index);
        }
    }
    picked.truncate(count);
    picked.into_iter().map(|i| EXAMPLES[i].record()).collect()
}

/// Example recommendations narrowed by the same predicates the service
/// applies, keeping the score order.
pub fn example_recommendations(filtros: &Filtros) -> RecomendarResponse {
    let resultados: Vec<ScoredCarRecord> = example_cars()
        .into_iter()
        .filter(|scored| filtros.matches(&scored.car))
        .collect();
    RecomendarResponse {
        total: resultados.len() as u64,
        resultados,
    }
}

/// Vehicle types and fuels present in the examples, first-seen order.
pub fn example_catalog() -> (Vec<String>, Vec<String>) {
    let mut tipos: Vec<String> = Vec::new();
    let mut combustiveis: Vec<String> = Vec::new();
    for example in &EXAMPLES {
        if !tipos.iter().any(|t| t == example.tipo) {
            tipos.push(example.tipo.to_string());
        }
        if !combustiveis.iter().any(|c| c == example.combustivel) {
            combustiveis.push(example.combustivel.to_string());
        }
    }
    (tipos, combustiveis)
}
