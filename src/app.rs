use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
};
use handlebars::Handlebars;
use log::{debug, error, info};
use serde::Serialize;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::services::ServeDir;

use crate::chart::{ChartError, ChartOptions, render_png};
use crate::config::Config;
use crate::error::DashboardError;
use crate::export;
use crate::section::{Page, PageQuery, Section, Table, build_page};
use crate::table::Dataset;

const PAGE_TEMPLATE: &str = "page";

/// Router state: the loaded dataset, the configuration and compiled templates
///
/// Nothing in here changes after startup, so handlers share it without locks.
pub struct AppState {
    dataset: Dataset,
    config: Config,
    templates: Handlebars<'static>,
}

impl AppState {
    pub fn new(config: Config, dataset: Dataset) -> Result<Self, handlebars::TemplateError> {
        let mut templates = Handlebars::new();
        templates.register_template_string(PAGE_TEMPLATE, include_str!("./static/page.hbs"))?;

        Ok(Self {
            dataset,
            config,
            templates,
        })
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    status: String,
    message: Option<String>,
}

#[derive(Serialize)]
struct NavLink {
    label: &'static str,
    href: String,
    active: bool,
}

#[derive(Serialize)]
struct PanelView<'a> {
    heading: &'a str,
    text: Option<&'a str>,
    bullets: &'a [String],
    table: Option<&'a Table>,
    chart_url: Option<String>,
}

#[derive(Serialize)]
struct PaginationView {
    page: usize,
    pages: usize,
    prev_url: Option<String>,
    next_url: Option<String>,
}

#[derive(Serialize)]
struct PageView<'a> {
    title: &'a str,
    section: &'static str,
    show_logo: bool,
    nav: Vec<NavLink>,
    panels: Vec<PanelView<'a>>,
    pagination: Option<PaginationView>,
    csv_url: String,
    xlsx_url: String,
    has_exports: bool,
}

pub fn router(state: Arc<AppState>) -> Router {
    let assets = ServeDir::new(&state.config.server.assets_dir);

    Router::new()
        .route("/", get(serve_landing))
        .route("/section/:slug", get(serve_section))
        .route("/chart/:slug/:index", get(serve_chart))
        .route("/api/section/:slug", get(get_section_data))
        .route("/export/:slug/:format", get(export_section))
        .nest_service("/assets", assets)
        .with_state(state)
}

/// Serve the dashboard on `config.server.bind` until the process is stopped.
pub async fn run(config: Config, dataset: Dataset) -> Result<(), DashboardError> {
    let bind = config.server.bind.clone();

    // Setup app state
    let app_state = Arc::new(AppState::new(config, dataset)?);

    // Build router
    let app = router(app_state);

    // Start server
    let listener = TcpListener::bind(&bind).await?;
    info!("Listening on http://{}", bind);
    axum::serve(listener, app).await?;

    Ok(())
}

fn error_response(status: StatusCode, message: String) -> Response {
    (
        status,
        Json(ErrorResponse {
            status: "error".to_string(),
            message: Some(message),
        }),
    )
        .into_response()
}

fn unknown_section(slug: &str) -> Response {
    error_response(StatusCode::NOT_FOUND, format!("unknown section: {}", slug))
}

async fn serve_landing() -> Redirect {
    Redirect::to(&format!("/section/{}", Section::Overview.slug()))
}

async fn serve_section(
    Path(slug): Path<String>,
    Query(query): Query<PageQuery>,
    State(state): State<Arc<AppState>>,
) -> Response {
    let Some(section) = Section::from_slug(&slug) else {
        return unknown_section(&slug);
    };
    debug!("Rendering section {}", section.label());

    let page = build_page(section, &state.dataset, &state.config.menu, &query);
    match state.templates.render(PAGE_TEMPLATE, &page_view(&page, &query)) {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            error!("Failed to render {}: {}", section.label(), e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

async fn get_section_data(
    Path(slug): Path<String>,
    Query(query): Query<PageQuery>,
    State(state): State<Arc<AppState>>,
) -> Response {
    match Section::from_slug(&slug) {
        Some(section) => {
            Json(build_page(section, &state.dataset, &state.config.menu, &query)).into_response()
        }
        None => unknown_section(&slug),
    }
}

async fn serve_chart(
    Path((slug, index)): Path<(String, usize)>,
    State(state): State<Arc<AppState>>,
) -> Response {
    let Some(section) = Section::from_slug(&slug) else {
        return unknown_section(&slug);
    };

    // Aggregating and rasterizing both run off the async workers
    let options = ChartOptions::from(&state.config.charts);
    let rendered = tokio::task::spawn_blocking(move || {
        let page = build_page(section, &state.dataset, &state.config.menu, &PageQuery::default());
        page.chart(index).map(|chart| render_png(chart, &options))
    })
    .await;

    match rendered {
        Ok(Some(Ok(png))) => ([(header::CONTENT_TYPE, "image/png")], png).into_response(),
        Ok(None) => error_response(
            StatusCode::NOT_FOUND,
            format!("section {} has no chart {}", section.label(), index),
        ),
        Ok(Some(Err(ChartError::Empty(title)))) => {
            error_response(StatusCode::NOT_FOUND, format!("chart `{}` has no data", title))
        }
        Ok(Some(Err(e))) => {
            error!("Failed to render chart {} of {}: {}", index, section.label(), e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
        Err(e) => error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    }
}

async fn export_section(
    Path((slug, format)): Path<(String, String)>,
    State(state): State<Arc<AppState>>,
) -> Response {
    let Some(section) = Section::from_slug(&slug) else {
        return unknown_section(&slug);
    };
    let page = build_page(section, &state.dataset, &state.config.menu, &PageQuery::default());

    match format.as_str() {
        "csv" => download(
            "text/csv; charset=utf-8",
            format!("{}.csv", slug),
            export::to_csv(&page).into_bytes(),
        ),
        "xlsx" => match export::to_xlsx(&page) {
            Ok(bytes) => download(
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
                format!("{}.xlsx", slug),
                bytes,
            ),
            Err(e) => {
                error!("Failed to export {}: {}", section.label(), e);
                error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
        },
        other => error_response(
            StatusCode::NOT_FOUND,
            format!("unsupported export format: {}", other),
        ),
    }
}

fn download(content_type: &'static str, filename: String, body: Vec<u8>) -> Response {
    (
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        body,
    )
        .into_response()
}

fn page_view<'a>(page: &'a Page, query: &PageQuery) -> PageView<'a> {
    let slug = page.section.slug();

    let nav = Section::ALL
        .into_iter()
        .map(|section| NavLink {
            label: section.label(),
            href: format!("/section/{}", section.slug()),
            active: section == page.section,
        })
        .collect();

    let mut chart_index = 0;
    let panels = page
        .panels
        .iter()
        .map(|panel| {
            let chart_url = panel.chart.as_ref().map(|_| {
                let url = format!("/chart/{}/{}", slug, chart_index);
                chart_index += 1;
                url
            });
            PanelView {
                heading: &panel.heading,
                text: panel.text.as_deref(),
                bullets: &panel.bullets,
                table: panel.table.as_ref(),
                chart_url,
            }
        })
        .collect();

    let filter = query
        .kind
        .as_deref()
        .map(|kind| format!("&type={}", urlencoding::encode(kind)))
        .unwrap_or_default();
    let link = |page: usize| format!("/section/{}?page={}{}", slug, page, filter);
    let pagination = page.pagination.as_ref().map(|p| PaginationView {
        page: p.page,
        pages: p.pages,
        prev_url: p.prev.map(link),
        next_url: p.next.map(link),
    });

    PageView {
        title: &page.title,
        section: page.section.label(),
        show_logo: page.section == Section::Overview,
        nav,
        panels,
        pagination,
        csv_url: format!("/export/{}/csv", slug),
        xlsx_url: format!("/export/{}/xlsx", slug),
        has_exports: page
            .panels
            .iter()
            .any(|panel| panel.table.is_some() || panel.chart.is_some()),
    }
}
