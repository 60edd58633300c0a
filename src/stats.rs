use crate::models::PostSummary;

/// Posts per follower as a percentage.
///
/// This is not an interactions-based engagement rate; it mirrors what the
/// report has always called "engagement". `None` when there are no followers.
pub fn engagement_rate(post_count: u64, follower_count: u64) -> Option<f64> {
    if follower_count == 0 {
        return None;
    }
    Some(post_count as f64 / follower_count as f64 * 100.0)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PostStats {
    pub count: usize,
    pub avg_likes: f64,
    pub avg_comments: f64,
    pub total_interactions: u64,
}

impl PostStats {
    pub fn from_posts(posts: &[PostSummary]) -> Option<Self> {
        if posts.is_empty() {
            return None;
        }

        let likes: u64 = posts.iter().map(|p| p.likes).sum();
        let comments: u64 = posts.iter().map(|p| p.comments).sum();
        let count = posts.len();

        Some(Self {
            count,
            avg_likes: likes as f64 / count as f64,
            avg_comments: comments as f64 / count as f64,
            total_interactions: posts.iter().map(PostSummary::interactions).sum(),
        })
    }
}

/// `1234567` -> `1,234,567`
pub fn group_digits(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

/// One decimal with grouped thousands: `1234567.46` -> `1,234,567.5`
pub fn group_decimal(value: f64) -> String {
    let rendered = format!("{:.1}", value);
    match rendered.split_once('.') {
        Some((whole, fraction)) => match whole.parse::<u64>() {
            Ok(whole) => format!("{}.{}", group_digits(whole), fraction),
            Err(_) => rendered,
        },
        None => rendered,
    }
}

/// Short form for large counts: `1.2K`, `3.4M`, `1.0B`. Small values are
/// returned unchanged.
pub fn compact_count(value: u64) -> String {
    const UNITS: [(u64, &str); 3] = [(1_000, "K"), (1_000_000, "M"), (1_000_000_000, "B")];

    if value < 1_000 {
        return value.to_string();
    }

    let mut rendered = String::new();
    for (size, suffix) in UNITS {
        let scaled = value as f64 / size as f64;
        rendered = format!("{:.1}{}", scaled, suffix);
        // 999.95K would round up to "1000.0K"
        if scaled < 999.95 {
            break;
        }
    }
    rendered
}

/// Grouped count with the compact form appended when it adds anything.
pub fn format_count(value: u64) -> String {
    if value < 1_000 {
        return value.to_string();
    }
    format!("{} ({})", group_digits(value), compact_count(value))
}
