use std::sync::OnceLock;

use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tracing::error;
use url::Url;

use crate::news::{NewsItem, NewsResponse};

struct Entry {
    id: i64,
    title: &'static str,
    link: &'static str,
    image: &'static str,
    summary: &'static str,
    source: &'static str,
    score: f64,
}

// Kept in strictly descending score order.
const ENTRIES: [Entry; 6] = [
    Entry {
        id: 3,
        title: "Artificial Intelligence in Marketing: Success Stories",
        link: "https://example.com/ai-marketing-success-stories",
        image: "https://images.unsplash.com/photo-1677442136019-21780ecad995?w=400&h=250&fit=crop",
        summary: "Meet the companies using AI to overhaul their marketing strategies \
            and getting impressive results out of it.",
        source: "Mundo do Marketing",
        score: 4.8,
    },
    Entry {
        id: 6,
        title: "Advanced Analytics: The Metrics That Actually Matter",
        link: "https://example.com/analytics-metrics-that-matter",
        image: "https://images.unsplash.com/photo-1551288049-bebda4e38f71?w=400&h=250&fit=crop",
        summary: "Find out which metrics to track in order to make smarter marketing decisions.",
        source: "Meio & Mensagem",
        score: 4.6,
    },
    Entry {
        id: 1,
        title: "Digital Marketing Trends for 2024",
        link: "https://example.com/digital-marketing-2024",
        image: "https://images.unsplash.com/photo-1460925895917-afdab827c52f?w=400&h=250&fit=crop",
        summary: "The main trends shaping digital marketing in 2024, including AI, automation \
            and personalization.",
        source: "Exame",
        score: 4.5,
    },
    Entry {
        id: 5,
        title: "Content Marketing: Building Narratives That Sell",
        link: "https://example.com/content-marketing-narratives",
        image: "https://images.unsplash.com/photo-1552664730-d307ca884978?w=400&h=250&fit=crop",
        summary: "How to write content that not only informs but also turns visitors into customers.",
        source: "Exame",
        score: 4.3,
    },
    Entry {
        id: 2,
        title: "How E-commerce Is Reshaping Sales",
        link: "https://example.com/ecommerce-revolution",
        image: "https://images.unsplash.com/photo-1556742049-0cfed4f6a45d?w=400&h=250&fit=crop",
        summary: "A thorough look at how e-commerce platforms are transforming online sales.",
        source: "Meio & Mensagem",
        score: 4.2,
    },
    Entry {
        id: 4,
        title: "Social Media: Strategies for Engagement",
        link: "https://example.com/social-media-engagement",
        image: "https://images.unsplash.com/photo-1611224923853-80b023f02d71?w=400&h=250&fit=crop",
        summary: "Practical tips to grow engagement on social media and build a strong community.",
        source: "GKPB",
        score: 4.0,
    },
];

/// The embedded sample news served while the news service is unreachable.
pub fn dataset() -> &'static [NewsItem] {
    static DATASET: OnceLock<Vec<NewsItem>> = OnceLock::new();

    DATASET.get_or_init(|| {
        ENTRIES
            .iter()
            .map(|entry| NewsItem {
                id: entry.id,
                title: entry.title.into(),
                link: Url::parse(entry.link).unwrap(),
                image: Some(entry.image.into()),
                summary: entry.summary.into(),
                source: entry.source.into(),
                score: entry.score,
                status: "postada".into(),
            })
            .collect()
    })
}

/// The top `limit` fallback items, already ranked by score.
///
/// `total` still counts the whole dataset.
pub fn news(limit: usize) -> NewsResponse {
    let data = dataset().iter().take(limit).cloned().collect::<Vec<_>>();

    envelope(data, dataset().len())
}

pub fn news_by_id(id: i64) -> Option<NewsResponse> {
    dataset()
        .iter()
        .find(|item| item.id == id)
        .map(|item| envelope(vec![item.clone()], 1))
}

fn envelope(data: Vec<NewsItem>, total: usize) -> NewsResponse {
    NewsResponse {
        success: true,
        total,
        data,
        cached: false,
        timestamp: now(),
    }
}

pub fn now() -> String {
    let now = OffsetDateTime::now_utc();

    now.format(&Rfc3339)
        .inspect_err(|e| error!("could not format the current time ({now}): {e:#}"))
        .unwrap_or_default()
}
