use anyhow::Context;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response, Result};
use axum::Json;
use serde::Serialize;
use tracing::error;

use crate::news::{ApiStatus, NewsItem, FALLBACK_IMAGE_URL};
use crate::rating::{RatingScale, Star};
use crate::server::convert_errors;
use crate::state::State as AppState;
use crate::template::Template;

use super::responses::NewsUnavailable;

#[derive(Serialize, Debug, Clone)]
struct Card<'a> {
    href: String,
    title: &'a str,
    summary: &'a str,
    source: &'a str,
    link: &'a str,
    image: &'a str,
    fallback_image: &'static str,
    stars: Vec<Star>,
    label: String,
}

impl<'a> Card<'a> {
    fn new(item: &'a NewsItem, scale: &RatingScale) -> Self {
        Self {
            href: format!("/news/{}", item.id),
            title: &item.title,
            summary: &item.summary,
            source: &item.source,
            link: item.link.as_str(),
            image: item.image_or_fallback(),
            fallback_image: FALLBACK_IMAGE_URL,
            stars: scale.rate(item.score).stars().to_vec(),
            label: scale.label(item.score),
        }
    }
}

pub async fn index(State(state): State<AppState>) -> Result<Html<String>> {
    #[derive(Serialize, Debug, Clone)]
    struct Context<'a> {
        status: ApiStatus,
        error: Option<&'static str>,
        cards: Vec<Card<'a>>,
    }

    convert_errors(async move {
        let (news, status) = tokio::join!(
            state.client.fetch_news(state.cfg.news_limit),
            state.client.api_status(),
        );

        let ctx = if news.success {
            Context {
                status,
                error: None,
                cards: news
                    .data
                    .iter()
                    .map(|item| Card::new(item, &state.cfg.rating))
                    .collect(),
            }
        } else {
            Context {
                status,
                error: Some("Could not load the news"),
                cards: vec![],
            }
        };

        let html = state
            .template
            .render(Template::Index.as_str(), &ctx)
            .context("could not render the HTML template")?;

        Ok(Html(html))
    })
    .await
}

pub async fn detail(State(state): State<AppState>, Path(id): Path<i64>) -> Result<Response> {
    #[derive(Serialize, Debug, Clone)]
    struct NotFoundContext {
        message: String,
    }

    let item = match state.client.fetch_news_by_id(id).await {
        Ok(response) => response.data.into_iter().find(|item| item.id == id),
        Err(e) if e.is_not_found() => None,

        Err(e) => {
            error!("Could not retrieve the news item #{id}: {e:#}");

            return Ok(NewsUnavailable { id }.into_response());
        }
    };

    convert_errors(async move {
        let Some(item) = item else {
            let html = state
                .template
                .render(
                    Template::NotFound.as_str(),
                    &NotFoundContext {
                        message: format!("There is no news item #{id}."),
                    },
                )
                .context("could not render the HTML template")?;

            return Ok((StatusCode::NOT_FOUND, Html(html)).into_response());
        };

        let html = state
            .template
            .render(
                Template::Detail.as_str(),
                &Card::new(&item, &state.cfg.rating),
            )
            .context("could not render the HTML template")?;

        Ok(Html(html).into_response())
    })
    .await
}

pub async fn status(State(state): State<AppState>) -> Json<ApiStatus> {
    Json(state.client.api_status().await)
}

#[cfg(test)]
mod tests {
    use axum::body::{self, Body};
    use axum::http::Request;
    use tokio::net::TcpListener;
    use tower::ServiceExt;
    use url::Url;

    use super::*;
    use crate::config::Config;
    use crate::server::router;

    async fn offline_state() -> AppState {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        AppState::new(Config {
            api_url: Url::parse(&format!("http://{addr}/api/v1")).unwrap(),
            ..Default::default()
        })
        .unwrap()
    }

    async fn get(uri: &str) -> (StatusCode, String) {
        let response = router(offline_state().await)
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = body::to_bytes(response.into_body(), usize::MAX).await.unwrap();

        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn index_lists_the_fallback_news() {
        let (status, body) = get("/").await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Offline mode"));
        assert!(body.contains("href=\"/news/3\""));
        assert!(body.contains("Social Media: Strategies for Engagement"));
        assert!(body.contains("star-full"));
    }

    #[tokio::test]
    async fn detail_of_a_fallback_item() {
        let (status, body) = get("/news/1").await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Digital Marketing Trends for 2024"));
        assert!(body.contains("https://example.com/digital-marketing-2024"));
    }

    #[tokio::test]
    async fn detail_of_an_unknown_item() {
        let (status, body) = get("/news/999").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body.contains("There is no news item #999."));
    }

    #[tokio::test]
    async fn status_reports_offline() {
        let (status, body) = get("/api/status").await;

        assert_eq!(status, StatusCode::OK);

        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["online"], false);
        assert_eq!(json["databaseConnected"], false);
        assert_eq!(json["version"], "1.0.0");
    }
}
