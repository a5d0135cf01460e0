//! HTTP handlers for submitting and reading pastes.
//!
//! Handlers only translate between HTTP and `PasteService`; every response
//! body is one of the typed view structs below.

use crate::{
    errors::AppError,
    models::{
        identifier::{Identifier, OwnerToken},
        paste::{NewPaste, PasteSummary},
    },
    services::paste_service::{PasteService, parse_expiry},
};
use axum::{
    Form, Json,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Name of the cookie carrying the owner token.
pub const OWNER_COOKIE: &str = "owner";

/// Form body for `POST /`.
#[derive(Debug, Deserialize)]
pub struct SubmitForm {
    pub value: String,
    /// HTML checkbox: present (`on`, `true`, `1`) when ticked.
    pub listed: Option<String>,
    /// RFC 3339 timestamp; empty means no expiry.
    pub expiry: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RecentQuery {
    pub p: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitResponse {
    pub id: String,
    pub owner: String,
    pub url: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct PasteSummaryView {
    pub id: String,
    pub created_at: DateTime<Utc>,
}

impl From<PasteSummary> for PasteSummaryView {
    fn from(summary: PasteSummary) -> Self {
        Self {
            id: summary.id.to_string(),
            created_at: summary.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RecentView {
    pub pastes: Vec<PasteSummaryView>,
    pub page: usize,
    pub prev_page: Option<usize>,
    pub next_page: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HistoryView {
    pub pastes: Vec<PasteSummaryView>,
}

/// `POST /` — create a paste and hand back the owner token as a cookie.
pub async fn submit_paste(
    State(service): State<PasteService>,
    jar: CookieJar,
    Form(form): Form<SubmitForm>,
) -> Result<impl IntoResponse, AppError> {
    let expiry = match form.expiry.as_deref().map(str::trim) {
        Some(raw) if !raw.is_empty() => Some(parse_expiry(raw)?),
        _ => None,
    };
    let listed = form.listed.as_deref().is_some_and(is_checked);

    let (id, owner) = service
        .submit(
            NewPaste {
                value: form.value,
                listed,
                expiry,
            },
            owner_from_jar(&jar),
        )
        .await?;

    let path = format!("/{id}");
    Ok((
        StatusCode::CREATED,
        jar.add(owner_cookie(&owner)),
        [(header::LOCATION, path.clone())],
        Json(SubmitResponse {
            id: id.to_string(),
            owner: owner.to_string(),
            url: path,
        }),
    ))
}

/// `GET /{id}` — raw paste text. Malformed ids are plain 404s.
pub async fn get_paste(
    State(service): State<PasteService>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let id: Identifier = id
        .parse()
        .map_err(|_| AppError::not_found("paste not found"))?;
    let paste = service.fetch(&id).await?;

    let cache_control = if paste.expiry.is_some() {
        "no-cache"
    } else {
        "immutable"
    };

    Ok((
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8"),
            (header::CACHE_CONTROL, cache_control),
            (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
            (header::ACCESS_CONTROL_ALLOW_METHODS, "GET"),
        ],
        paste.value,
    )
        .into_response())
}

/// `GET /recent?p=N` — public feed. Unparseable page numbers mean page 0.
pub async fn recent_pastes(
    State(service): State<PasteService>,
    Query(q): Query<RecentQuery>,
) -> Result<Json<RecentView>, AppError> {
    let requested = q
        .p
        .as_deref()
        .and_then(|p| p.trim().parse::<usize>().ok())
        .unwrap_or(0);

    let page = service.recent(requested).await?;
    Ok(Json(RecentView {
        page: page.window.page_no,
        prev_page: page.window.prev_page(),
        next_page: page.window.next_page(),
        pastes: page.pastes.into_iter().map(Into::into).collect(),
    }))
}

/// `GET /history` — pastes correlated with the caller's owner cookie.
pub async fn paste_history(
    State(service): State<PasteService>,
    jar: CookieJar,
) -> Result<Json<HistoryView>, AppError> {
    let pastes = match owner_from_jar(&jar) {
        Some(owner) => service.history(&owner).await?,
        None => Vec::new(),
    };
    Ok(Json(HistoryView {
        pastes: pastes.into_iter().map(Into::into).collect(),
    }))
}

/// `GET /latest` — redirect to the newest listed paste.
pub async fn latest_paste(State(service): State<PasteService>) -> Result<Redirect, AppError> {
    let id = service.latest().await?;
    Ok(Redirect::to(&format!("/{id}")))
}

/// `GET /archive.tar.gz` — backup of the public feed, one tar entry per paste.
pub async fn export_archive(State(service): State<PasteService>) -> Result<Response, AppError> {
    let archive = service.export_archive(true).await?;
    Ok((
        [
            (header::CONTENT_TYPE, "application/gzip"),
            (header::CACHE_CONTROL, "no-cache"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"pastes.tar.gz\"",
            ),
        ],
        archive,
    )
        .into_response())
}

fn is_checked(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "on" | "true" | "1" | "yes"
    )
}

/// The owner token from the request cookies. A value that does not decode
/// counts as no cookie.
fn owner_from_jar(jar: &CookieJar) -> Option<OwnerToken> {
    jar.get(OWNER_COOKIE)
        .and_then(|cookie| cookie.value().parse().ok())
}

fn owner_cookie(owner: &OwnerToken) -> Cookie<'static> {
    Cookie::build((OWNER_COOKIE, owner.to_string()))
        .path("/")
        .permanent()
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Lax)
        .build()
}
