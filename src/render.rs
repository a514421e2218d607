use crate::grid::{Feed, Grid};
use crate::modal::Phase;
use crate::news::{ApiStatus, NewsItem};
use crate::rating::RatingScale;

const SKELETON_CARDS: usize = 6;

pub fn status(status: &ApiStatus) -> String {
    if status.online {
        format!("● API online ({} {})", status.status, status.version)
    } else {
        "○ Offline mode\n  Showing sample news. Connect to the API for live data.".into()
    }
}

pub fn card(position: usize, item: &NewsItem, scale: &RatingScale) -> String {
    format!(
        "[{position}] {} ({})  {}\n    {}",
        scale.rate(item.score),
        scale.label(item.score),
        item.source,
        item.title,
    )
}

pub fn detail(item: &NewsItem, scale: &RatingScale) -> String {
    format!(
        "{} ({})  {}\n{}\n{}\nImage: {}\n\n    {}\n\nRead the full story: {}",
        scale.rate(item.score),
        scale.label(item.score),
        item.source,
        item.title,
        "=".repeat(item.title.chars().count()),
        item.image_or_fallback(),
        item.summary,
        item.link,
    )
}

pub fn grid(grid: &Grid, scale: &RatingScale) -> String {
    let mut lines = vec![status(grid.status()), String::new()];

    match grid.feed() {
        Feed::Loading => {
            let skeleton = format!("[ ] {}\n    ░░░░░░░░░░░░░░░░░░░░", "░".repeat(scale.max_stars));
            lines.extend(std::iter::repeat(skeleton).take(SKELETON_CARDS));
        }

        Feed::Failed(message) => lines.push(format!("Error: {message}")),

        Feed::Ready(items) if items.is_empty() => {
            lines.push("No news found".into());
            lines.push("Try reloading or check your connection.".into());
        }

        Feed::Ready(items) => lines.extend(
            items
                .iter()
                .enumerate()
                .map(|(idx, item)| card(idx + 1, item, scale)),
        ),
    }

    let modal = grid.modal();
    let state = modal.state();

    if let (true, Some(item)) = (state.visible, state.selected) {
        lines.push(String::new());

        if state.animating {
            lines.push(detail(item, scale));
            lines.push("(x: close, esc: dismiss, bg: click the backdrop)".into());
        } else {
            let transition = match modal.phase() {
                Phase::Closing => "closing",
                Phase::Opening | Phase::Open | Phase::Closed => "opening",
            };

            lines.push(format!("[ {transition}: {} ]", item.title));
        }
    }

    lines.join("\n") + "\n"
}
