//! HTML page generation
//!
//! Renders the single-page frontend: mode switcher, compare and recommend
//! forms, notifications and the results region. All dynamic text goes
//! through [`html_escape`].

use crate::fallback::EXAMPLE_LABEL;
use crate::filters::{Perfil, DEFAULT_PRIORITY, PRIORITY_RANGE};
use crate::models::{ModelSuggestion, EXTRAS};
use crate::renderer::{CardModel, RecommendationGrid, TableModel};
use crate::search::Catalog;
use crate::view::{Mode, Notification, Results};

/// Everything the page needs from the session and the app.
pub struct PageContext<'a> {
    pub mode: Mode,
    pub catalog: &'a Catalog,
    pub notices: &'a [Notification],
    pub results: Option<&'a Results>,
    pub pending: bool,
    /// Client-side auto-dismiss delay for non-error notifications.
    pub notice_ttl_ms: u64,
}

/// Render the full page
pub fn render_page(ctx: &PageContext<'_>) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="pt">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Carros Portugal - Comparar e Encontrar</title>
    <style>{css}</style>
</head>
<body>
    <div class="container">
        <h1>Carros Portugal</h1>
        {notices}
        {nav}
        {comparar}
        {encontrar}
        {loading}
    </div>
    <script>{js}</script>
</body>
</html>"#,
        css = inline_css(),
        notices = render_notices(ctx.notices, ctx.notice_ttl_ms),
        nav = render_nav(ctx.mode),
        comparar = render_comparar_mode(ctx),
        encontrar = render_encontrar_mode(ctx),
        loading = if ctx.pending {
            r#"<div class="loading">A carregar...</div>"#
        } else {
            ""
        },
        js = inline_javascript(),
    )
}

/// `<option>` list for the model autocomplete datalist.
pub fn render_suggestions(models: &[ModelSuggestion]) -> String {
    models
        .iter()
        .map(|m| {
            format!(
                r#"<option value="{}">{}</option>"#,
                html_escape(&m.id),
                html_escape(&m.label())
            )
        })
        .collect()
}

fn render_notices(notices: &[Notification], ttl_ms: u64) -> String {
    notices
        .iter()
        .map(|n| {
            let ttl = if n.level.auto_dismisses() {
                format!(r#" data-ttl="{}""#, ttl_ms)
            } else {
                String::new()
            };
            format!(
                r#"<div class="alert {class}"{ttl}>
            <span>{message}</span>
            <form method="post" action="/notificacoes/{id}/fechar" class="inline">
                <button type="submit" class="close" aria-label="Fechar">&times;</button>
            </form>
        </div>"#,
                class = n.level.css_class(),
                ttl = ttl,
                message = html_escape(&n.message),
                id = n.id,
            )
        })
        .collect::<Vec<_>>()
        .join("\n        ")
}

fn render_nav(mode: Mode) -> String {
    let button = |target: Mode, label: &str| {
        let active = if target == mode { " active" } else { "" };
        format!(
            r#"<form method="post" action="/modo/{target}" class="inline">
                <button type="submit" class="mode-btn{active}" data-mode="{target}">{label}</button>
            </form>"#,
            target = target,
            active = active,
            label = label,
        )
    };
    format!(
        r#"<nav class="modes">
            {}
            {}
        </nav>"#,
        button(Mode::Comparar, "Comparar modelos"),
        button(Mode::Encontrar, "Encontrar carro"),
    )
}

fn mode_section(mode: Mode, ctx: &PageContext<'_>, body: String) -> String {
    let active = if ctx.mode == mode { " active" } else { "" };
    format!(
        r#"<section id="{mode}Mode" class="mode-content{active}">{body}</section>"#,
        mode = mode,
        active = active,
        body = body,
    )
}

fn results_for<'a>(ctx: &PageContext<'a>, mode: Mode) -> Option<&'a Results> {
    ctx.results.filter(|r| r.mode() == mode && ctx.mode == mode)
}

fn render_comparar_mode(ctx: &PageContext<'_>) -> String {
    let inputs: String = (1..=3)
        .map(|i| {
            let required = if i <= 2 { "" } else { " (opcional)" };
            format!(
                r#"<div class="form-group">
                <label for="modelo{i}">Modelo {i}{required}</label>
                <input type="text" id="modelo{i}" name="modelo{i}" list="modelo{i}-list" autocomplete="off" class="autocomplete">
                <datalist id="modelo{i}-list"></datalist>
            </div>"#,
                i = i,
                required = required,
            )
        })
        .collect();

    let results = match results_for(ctx, Mode::Comparar) {
        Some(Results::Comparison {
            table,
            example_data,
        }) => render_comparison(table, *example_data),
        _ => String::new(),
    };

    mode_section(
        Mode::Comparar,
        ctx,
        format!(
            r#"
            <form id="compararForm" method="post" action="/comparar">
                {inputs}
                <button type="submit" class="btn">Comparar</button>
            </form>
            <div id="compararResults" class="results">{results}</div>"#,
            inputs = inputs,
            results = results,
        ),
    )
}

fn render_encontrar_mode(ctx: &PageContext<'_>) -> String {
    let checkboxes = |name: &str, values: &[String]| -> String {
        values
            .iter()
            .map(|v| {
                let v = html_escape(v);
                format!(
                    r#"<label class="checkbox-item">
                    <input type="checkbox" name="{name}" value="{v}"> {v}
                </label>"#,
                    name = name,
                    v = v,
                )
            })
            .collect()
    };
    let extras: Vec<String> = EXTRAS.iter().map(|e| e.to_string()).collect();

    let perfis: String = Perfil::ALL
        .iter()
        .map(|p| {
            let selected = if *p == Perfil::default() { " selected" } else { "" };
            format!(
                r#"<option value="{}"{}>{}</option>"#,
                p.as_str(),
                selected,
                p.label()
            )
        })
        .collect();

    let sliders: String = [
        ("prioridade_consumo", "Consumo"),
        ("prioridade_desempenho", "Desempenho"),
        ("prioridade_espaco", "Espaço"),
    ]
    .iter()
    .map(|(name, label)| {
        format!(
            r#"<div class="form-group">
                <label for="{name}">Prioridade {label}</label>
                <input type="range" id="{name}" name="{name}" min="{min}" max="{max}" step="0.1" value="{value}">
                <span class="slider-value">{value}</span>
            </div>"#,
            name = name,
            label = label,
            min = PRIORITY_RANGE.0,
            max = PRIORITY_RANGE.1,
            value = DEFAULT_PRIORITY,
        )
    })
    .collect();

    let results = match results_for(ctx, Mode::Encontrar) {
        Some(Results::Recommendations { grid, example_data }) => {
            render_recommendations(grid, *example_data)
        }
        _ => String::new(),
    };

    mode_section(
        Mode::Encontrar,
        ctx,
        format!(
            r#"
            <form id="encontrarForm" method="post" action="/recomendar">
                <div class="form-group">
                    <label for="preco_max">Preço máximo (€)</label>
                    <input type="number" id="preco_max" name="preco_max" min="0" step="500">
                </div>
                <div class="form-group">
                    <label for="bagageira_min">Bagageira mínima (l)</label>
                    <input type="number" id="bagageira_min" name="bagageira_min" min="0" step="10">
                </div>
                <div class="form-group">
                    <label for="consumo_max">Consumo máximo (l/100km)</label>
                    <input type="number" id="consumo_max" name="consumo_max" min="0" step="0.1">
                </div>
                <fieldset><legend>Tipo</legend><div id="tiposContainer">{tipos}</div></fieldset>
                <fieldset><legend>Combustível</legend><div id="combustiveisContainer">{combustiveis}</div></fieldset>
                <fieldset><legend>Extras obrigatórios</legend><div id="extrasContainer">{extras}</div></fieldset>
                <div class="form-group">
                    <label for="perfil">Perfil</label>
                    <select id="perfil" name="perfil">{perfis}</select>
                </div>
                {sliders}
                <button type="submit" class="btn">Encontrar</button>
            </form>
            <div id="encontrarResults" class="results">{results}</div>"#,
            tipos = checkboxes("tipos", &ctx.catalog.tipos),
            combustiveis = checkboxes("combustiveis", &ctx.catalog.combustiveis),
            extras = checkboxes("extras", &extras),
            perfis = perfis,
            sliders = sliders,
            results = results,
        ),
    )
}

fn example_banner(example_data: bool) -> &'static str {
    if example_data {
        r#"<div class="alert alert-warning example-data">Dados de exemplo: resultados ilustrativos, não provêm do serviço.</div>"#
    } else {
        ""
    }
}

fn render_comparison(table: &TableModel, example_data: bool) -> String {
    let headers: String = table
        .headers
        .iter()
        .map(|h| format!("<th>{}</th>", html_escape(h)))
        .collect();

    let rows: String = table
        .rows
        .iter()
        .map(|row| {
            let cells: String = row
                .cells
                .iter()
                .enumerate()
                .map(|(i, cell)| {
                    let class = if row.is_best(i) {
                        r#" class="highlight""#
                    } else {
                        ""
                    };
                    format!("<td{}>{}</td>", class, html_escape(cell))
                })
                .collect();
            format!(
                "<tr><td><strong>{}</strong></td>{}</tr>",
                html_escape(&row.label),
                cells
            )
        })
        .collect();

    format!(
        r#"{banner}
            <div class="alert alert-info">Comparando {count} modelos</div>
            <div class="table-responsive">
                <table class="comparison-table{example}">
                    <thead><tr>{headers}</tr></thead>
                    <tbody>{rows}</tbody>
                </table>
            </div>"#,
        banner = example_banner(example_data),
        count = table.car_count(),
        example = if example_data { " example-data" } else { "" },
        headers = headers,
        rows = rows,
    )
}

fn render_card(card: &CardModel, example_data: bool) -> String {
    let fields: String = card
        .fields
        .iter()
        .map(|f| {
            format!(
                r#"<div class="car-spec"><span class="spec-label">{}:</span> <span class="spec-value">{}</span></div>"#,
                html_escape(f.label),
                html_escape(&f.value)
            )
        })
        .collect();
    let tag = if example_data {
        format!(r#"<span class="example-tag">{}</span>"#, EXAMPLE_LABEL)
    } else {
        String::new()
    };

    format!(
        r#"<div class="car-card">
                <div class="car-header">
                    <h3>{title}</h3>{tag}
                    <div class="score-badge">Score: {badge}/100</div>
                </div>
                <div class="car-body">
                    {fields}
                    <div class="car-spec"><span class="spec-label">Extras:</span> <span class="spec-value">{extras}</span></div>
                </div>
            </div>"#,
        title = html_escape(&card.title),
        tag = tag,
        badge = html_escape(&card.score_badge),
        fields = fields,
        extras = html_escape(&card.extras),
    )
}

fn render_recommendations(grid: &RecommendationGrid, example_data: bool) -> String {
    let cards: String = grid
        .cards
        .iter()
        .map(|c| render_card(c, example_data))
        .collect();
    format!(
        r#"{banner}
            <div class="alert alert-success">{summary}</div>
            <div class="results-grid">{cards}</div>"#,
        banner = example_banner(example_data),
        summary = html_escape(&grid.summary()),
        cards = cards,
    )
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

fn inline_css() -> &'static str {
    r#"
body { font-family: system-ui, sans-serif; margin: 0; background: #f4f6f8; color: #222; }
.container { max-width: 1100px; margin: 0 auto; padding: 1.5rem; }
.inline { display: inline; }
.modes { margin-bottom: 1rem; }
.mode-btn { padding: .6rem 1.2rem; border: 1px solid #1f6feb; background: #fff; color: #1f6feb; cursor: pointer; }
.mode-btn.active { background: #1f6feb; color: #fff; }
.mode-content { display: none; }
.mode-content.active { display: block; }
.form-group { margin-bottom: .8rem; }
.form-group label { display: block; font-weight: 600; margin-bottom: .2rem; }
.checkbox-item { display: inline-block; margin-right: 1rem; }
.btn { padding: .6rem 1.4rem; background: #1f6feb; color: #fff; border: 0; cursor: pointer; }
.alert { padding: .7rem 1rem; margin-bottom: .8rem; border-radius: 4px; display: flex; justify-content: space-between; }
.alert-info { background: #e7f1ff; }
.alert-success { background: #e6f6ea; }
.alert-warning { background: #fff4d6; }
.alert-error { background: #fde8e8; }
.close { background: none; border: 0; font-size: 1.2rem; cursor: pointer; }
.comparison-table { border-collapse: collapse; width: 100%; background: #fff; }
.comparison-table th, .comparison-table td { border: 1px solid #ddd; padding: .5rem; text-align: center; }
.comparison-table td.highlight { background: #d4f5dc; font-weight: 700; }
.results-grid { display: grid; grid-template-columns: repeat(auto-fill, minmax(260px, 1fr)); gap: 1rem; }
.car-card { background: #fff; border-radius: 6px; box-shadow: 0 1px 3px rgba(0,0,0,.12); }
.car-header { padding: .8rem; border-bottom: 1px solid #eee; }
.car-body { padding: .8rem; }
.score-badge { display: inline-block; background: #1f6feb; color: #fff; padding: .2rem .6rem; border-radius: 12px; }
.example-tag { margin-left: .5rem; font-size: .8rem; color: #8a6d00; }
.spec-label { font-weight: 600; }
.loading { padding: 1rem; text-align: center; }
"#
}

fn inline_javascript() -> &'static str {
    r#"
document.querySelectorAll('.alert[data-ttl]').forEach(function (el) {
    setTimeout(function () { el.remove(); }, parseInt(el.dataset.ttl, 10));
});
document.querySelectorAll('input[type="range"]').forEach(function (slider) {
    var display = slider.nextElementSibling;
    if (display && display.classList.contains('slider-value')) {
        slider.addEventListener('input', function () { display.textContent = slider.value; });
    }
});
document.querySelectorAll('input.autocomplete').forEach(function (input) {
    var list = document.getElementById(input.getAttribute('list'));
    input.addEventListener('input', function () {
        if (input.value.length < 2) { return; }
        fetch('/modelos?busca=' + encodeURIComponent(input.value))
            .then(function (r) { return r.ok ? r.text() : null; })
            .then(function (html) { if (html !== null) { list.innerHTML = html; } })
            .catch(function (err) { console.error('Erro na busca:', err); });
    });
});
"#
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{keys, CarRecord, ScoredCarRecord};
    use crate::renderer::{render_comparison_table, render_recommendation_grid, ComparisonSpec};
    use crate::view::{NoticeLevel, ViewState};
    use chrono::Utc;
    use std::time::Duration;

    fn catalog() -> Catalog {
        Catalog {
            tipos: vec!["SUV".into(), "<script>".into()],
            combustiveis: vec!["Gasolina".into()],
            load_failed: false,
        }
    }

    #[test]
    fn test_escapes_dynamic_text() {
        assert_eq!(
            html_escape(r#"<a href="x">'&'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;&#39;&amp;&#39;&lt;/a&gt;"
        );
        let catalog = catalog();
        let page = render_page(&PageContext {
            mode: Mode::Encontrar,
            catalog: &catalog,
            notices: &[],
            results: None,
            pending: false,
            notice_ttl_ms: 5000,
        });
        assert!(page.contains("&lt;script&gt;"));
        assert!(!page.contains("value=\"<script>\""));
    }

    #[test]
    fn test_checkboxes_wrapped_in_labels() {
        let catalog = catalog();
        let page = render_page(&PageContext {
            mode: Mode::Encontrar,
            catalog: &catalog,
            notices: &[],
            results: None,
            pending: false,
            notice_ttl_ms: 5000,
        });
        assert!(page.contains(r#"<label class="checkbox-item">"#));
        assert!(page.contains(r#"<input type="checkbox" name="extras" value="Teto Solar"> Teto Solar"#));
        assert!(!page.contains(r#"id="extras-Teto Solar""#));
    }

    #[test]
    fn test_comparison_highlight_and_example_label() {
        let cars = vec![
            CarRecord::new()
                .with(keys::MARCA, "A")
                .with(keys::CONSUMO, 5.2),
            CarRecord::new()
                .with(keys::MARCA, "B")
                .with(keys::CONSUMO, 4.3),
        ];
        let results = Results::Comparison {
            table: render_comparison_table(&cars, &ComparisonSpec::standard()),
            example_data: true,
        };
        let catalog = catalog();
        let page = render_page(&PageContext {
            mode: Mode::Comparar,
            catalog: &catalog,
            notices: &[],
            results: Some(&results),
            pending: false,
            notice_ttl_ms: 5000,
        });

        assert!(page.contains(r#"<td class="highlight">4.3</td>"#));
        assert!(page.contains("<td>5.2</td>"));
        assert!(page.contains("Comparando 2 modelos"));
        assert!(page.contains("Dados de exemplo"));
    }

    #[test]
    fn test_results_hidden_in_other_mode() {
        let grid = RecommendationGrid {
            total: 1,
            cards: render_recommendation_grid(&[ScoredCarRecord::new(
                CarRecord::new().with(keys::MARCA, "Kia"),
                Some(77.0),
            )]),
        };
        let results = Results::Recommendations {
            grid,
            example_data: false,
        };
        let catalog = catalog();
        let mut ctx = PageContext {
            mode: Mode::Encontrar,
            catalog: &catalog,
            notices: &[],
            results: Some(&results),
            pending: false,
            notice_ttl_ms: 5000,
        };
        assert!(render_page(&ctx).contains("Score: 77/100"));
        ctx.mode = Mode::Comparar;
        assert!(!render_page(&ctx).contains("Score: 77/100"));
    }

    #[test]
    fn test_error_notices_have_no_ttl() {
        let mut view = ViewState::new(Duration::from_secs(5));
        let now = Utc::now();
        view.notify(NoticeLevel::Error, "falhou", now);
        view.notify(NoticeLevel::Info, "info", now);
        let html = render_notices(view.active_notices(now), 5000);
        assert_eq!(html.matches("data-ttl=\"5000\"").count(), 1);
        assert!(html.contains("alert-error"));
        assert!(html.contains("/fechar"));
    }

    #[test]
    fn test_suggestions_fragment() {
        let models = vec![ModelSuggestion {
            id: "Renault Clio 2023".into(),
            marca: Some("Renault".into()),
            modelo: Some("Clio".into()),
            ano: Some(serde_json::json!(2023)),
        }];
        assert_eq!(
            render_suggestions(&models),
            r#"<option value="Renault Clio 2023">Renault Clio (2023)</option>"#
        );
        assert_eq!(render_suggestions(&[]), "");
    }
}
