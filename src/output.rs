use crate::api::FetchError;
use crate::models::{MediaKind, PostSummary, ProfileSnapshot};
use crate::stats::{engagement_rate, format_count, group_decimal, group_digits, PostStats};
use atty::Stream;
use std::fmt::Display;
use std::io::{self, Write};

pub const MAX_DISPLAYED_POSTS: usize = 12;

const RULE_WIDTH: usize = 60;
const BODY_PREVIEW_CHARS: usize = 500;
const VERBOSE_DUMP_CHARS: usize = 2000;
const BIO_MAX_LINES: usize = 5;
const BIO_MAX_CHARS: usize = 300;
const CAPTION_CHARS: usize = 60;
const VERBOSE_CAPTION_CHARS: usize = 120;

/// How the post listing is laid out.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Layout {
    /// Aligned columns for a terminal.
    Table,
    /// One `|`-separated line per post, for pipes and files.
    Plain,
}

impl Layout {
    pub fn detect() -> Self {
        if is_terminal() {
            Layout::Table
        } else {
            Layout::Plain
        }
    }
}

pub fn is_terminal() -> bool {
    atty::is(Stream::Stdout)
}

/// Cuts `text` to at most `max_chars` characters, marking the cut with `...`.
pub fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

fn rule<W: Write>(out: &mut W, ch: char) -> io::Result<()> {
    writeln!(out, "{}", ch.to_string().repeat(RULE_WIDTH))
}

fn heading<W: Write>(out: &mut W, title: &str) -> io::Result<()> {
    rule(out, '-')?;
    writeln!(out, " {}", title)
}

fn field<W: Write>(out: &mut W, label: &str, value: impl Display) -> io::Result<()> {
    writeln!(out, "  {:<20}{}", format!("{}:", label), value)
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "Yes"
    } else {
        "No"
    }
}

fn dump<W: Write>(out: &mut W, label: &str, body: &str, max_chars: usize) -> io::Result<()> {
    writeln!(out, "{} ({} bytes):", label, body.len())?;
    writeln!(out, "{}", truncate(body, max_chars))
}

pub fn clear_screen<W: Write>(out: &mut W) -> io::Result<()> {
    write!(out, "\x1B[2J\x1B[1;1H")?;
    out.flush()
}

pub fn print_banner<W: Write>(out: &mut W) -> io::Result<()> {
    rule(out, '=')?;
    writeln!(out, " INSTAGRAM PROFILE SCAN")?;
    rule(out, '=')?;
    writeln!(out)
}

pub fn print_completion<W: Write>(out: &mut W) -> io::Result<()> {
    writeln!(out)?;
    rule(out, '=')?;
    writeln!(out, " Scan complete")?;
    rule(out, '=')
}

pub fn print_divider<W: Write>(out: &mut W) -> io::Result<()> {
    writeln!(out)?;
    rule(out, '-')
}

pub fn print_guidance<W: Write>(out: &mut W) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "Could not retrieve the profile.")?;
    writeln!(out, "Likely causes:")?;
    writeln!(out, "  - the account does not exist")?;
    writeln!(out, "  - Instagram blocked the request")?;
    writeln!(out, "  - network connection problems")
}

pub fn print_cancelled<W: Write>(out: &mut W) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out)?;
    writeln!(out, "Operation cancelled by user.")
}

pub fn print_crash<W: Write>(out: &mut W, err: &anyhow::Error, verbose: bool) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "Unexpected error: {:#}", err)?;
    if verbose {
        writeln!(out)?;
        writeln!(out, "{:?}", err)?;
    }
    Ok(())
}

fn bio_lines(bio: &str) -> Vec<String> {
    let clipped = truncate(bio, BIO_MAX_CHARS);
    let lines: Vec<&str> = clipped.lines().collect();
    let mut shown: Vec<String> = lines
        .iter()
        .take(BIO_MAX_LINES)
        .map(|line| line.to_string())
        .collect();
    if lines.len() > BIO_MAX_LINES {
        shown.push(format!("(+{} more lines)", lines.len() - BIO_MAX_LINES));
    }
    shown
}

pub fn print_profile<W: Write>(
    out: &mut W,
    profile: &ProfileSnapshot,
    verbose: bool,
) -> io::Result<()> {
    writeln!(out)?;
    rule(out, '=')?;
    writeln!(out, " PROFILE: @{}", profile.username)?;
    rule(out, '=')?;
    field(out, "Username", &profile.username)?;
    field(out, "Full name", profile.full_name.as_deref().unwrap_or("-"))?;
    field(out, "User ID", &profile.id)?;
    field(out, "Profile URL", &profile.profile_url)?;

    heading(out, "STATISTICS")?;
    field(out, "Posts", format_count(profile.post_count))?;
    field(out, "Followers", format_count(profile.follower_count))?;
    field(out, "Following", format_count(profile.following_count))?;
    if let Some(rate) = engagement_rate(profile.post_count, profile.follower_count) {
        field(out, "Engagement", format!("{:.2}%", rate))?;
    }

    heading(out, "ACCOUNT")?;
    field(out, "Private", yes_no(profile.is_private))?;
    field(out, "Verified", yes_no(profile.is_verified))?;
    field(
        out,
        "Account type",
        if profile.is_business {
            "Business"
        } else {
            "Personal"
        },
    )?;
    if let Some(category) = &profile.category {
        field(out, "Category", category)?;
    }
    if let Some(link) = &profile.external_url {
        field(out, "External link", link)?;
    }

    if let Some(bio) = &profile.biography {
        heading(out, "BIOGRAPHY")?;
        for line in bio_lines(bio) {
            writeln!(out, "  {}", line)?;
        }
    }

    if verbose {
        let extras = &profile.extras;
        heading(out, "DETAILS")?;
        field(out, "Professional", yes_no(extras.is_professional))?;
        field(out, "Joined recently", yes_no(extras.joined_recently))?;
        field(out, "Has reels", yes_no(extras.has_clips))?;
        if let Some(count) = extras.highlight_count {
            field(out, "Highlights", count)?;
        }
        if let Some(fbid) = &extras.facebook_id {
            field(out, "Facebook ID", fbid)?;
        }
        if let Some(pic) = &extras.profile_pic_url {
            field(out, "Profile picture", pic)?;
        }
    }

    Ok(())
}

pub fn print_fetch_error<W: Write>(out: &mut W, err: &FetchError, verbose: bool) -> io::Result<()> {
    writeln!(out)?;
    match err {
        FetchError::NotFound { username } => {
            writeln!(out, "Error: account @{} not found.", username)?;
            writeln!(out, "Check the spelling; the account may have been renamed or removed.")?;
        }
        FetchError::RateLimited { retry_after_secs } => {
            writeln!(out, "Error: rate limited by Instagram (HTTP 429).")?;
            if let Some(secs) = retry_after_secs {
                writeln!(out, "The server asked to retry after {} seconds.", secs)?;
            }
            writeln!(out, "Suggestions:")?;
            writeln!(out, "  - wait a few minutes before trying again")?;
            writeln!(out, "  - switch network (VPN, mobile hotspot or another IP)")?;
            writeln!(out, "  - use authenticated access")?;
        }
        FetchError::Status { status, body } => {
            writeln!(out, "Error: request failed with HTTP status {}.", status)?;
            if verbose {
                dump(out, "Response body", body, BODY_PREVIEW_CHARS)?;
            }
        }
        FetchError::ContentType { content_type, body } => {
            let shown = if content_type.is_empty() {
                "none"
            } else {
                content_type.as_str()
            };
            writeln!(out, "Error: expected JSON but received content type: {}.", shown)?;
            writeln!(
                out,
                "Instagram may be serving a login wall or bot check, or the endpoint changed."
            )?;
            dump(out, "Body preview", body, BODY_PREVIEW_CHARS)?;
        }
        FetchError::Json { source, body } => {
            writeln!(out, "Error: could not parse JSON response: {}", source)?;
            dump(out, "Raw body", body, BODY_PREVIEW_CHARS)?;
        }
        FetchError::Shape { reason, body } => {
            writeln!(out, "Error: unexpected response structure ({}).", reason)?;
            if verbose {
                dump(out, "Response", body, VERBOSE_DUMP_CHARS)?;
            }
        }
        FetchError::Timeout(source) => {
            writeln!(out, "Error: the request timed out.")?;
            writeln!(out, "Instagram is slow to answer or unreachable; try again later.")?;
            if verbose {
                writeln!(out, "{:?}", source)?;
            }
        }
        FetchError::Connect(source) => {
            writeln!(out, "Error: could not connect to Instagram.")?;
            writeln!(out, "Check your internet connection and DNS settings.")?;
            if verbose {
                writeln!(out, "{:?}", source)?;
            }
        }
        FetchError::Transport(source) => {
            writeln!(out, "Error: network error: {}", source)?;
            if verbose {
                writeln!(out, "{:?}", source)?;
            }
        }
        FetchError::Unexpected(source) => {
            writeln!(out, "Error: unexpected failure: {:#}", source)?;
            if verbose {
                writeln!(out, "{:?}", source)?;
            }
        }
    }
    Ok(())
}

fn media_label(kind: &MediaKind) -> String {
    match kind {
        MediaKind::Image => "Image".to_string(),
        MediaKind::Video {
            duration_secs,
            views,
        } => {
            let mut label = "Video".to_string();
            if let Some(secs) = duration_secs {
                label.push_str(&format!(" {:.1}s", secs));
            }
            if let Some(views) = views {
                label.push_str(&format!(" {} views", group_digits(*views)));
            }
            label
        }
    }
}

fn post_row(index: usize, post: &PostSummary, caption_chars: usize) -> Vec<String> {
    let date = post
        .taken_at
        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_default();
    let caption = post
        .caption
        .as_deref()
        .map(|c| truncate(&c.replace(['\n', '\r'], " "), caption_chars))
        .unwrap_or_default();

    vec![
        (index + 1).to_string(),
        date,
        media_label(&post.kind),
        group_digits(post.likes),
        group_digits(post.comments),
        caption,
        post.id.clone().unwrap_or_default(),
        post.link.clone().unwrap_or_default(),
    ]
}

fn write_table<W: Write>(out: &mut W, headers: &[&str], rows: &[Vec<String>]) -> io::Result<()> {
    let col_widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(i, header)| {
            let max_width = rows
                .iter()
                .map(|row| row.get(i).map_or(0, |c| c.chars().count()))
                .max()
                .unwrap_or(0);
            header.chars().count().max(max_width)
        })
        .collect();

    let separator: String = col_widths
        .iter()
        .map(|w| "-".repeat(*w + 2))
        .collect::<Vec<_>>()
        .join("+");
    let header_row: String = col_widths
        .iter()
        .enumerate()
        .map(|(i, w)| format!(" {:width$} ", headers.get(i).unwrap_or(&""), width = *w))
        .collect::<Vec<_>>()
        .join("|");

    writeln!(out, "|{}|", header_row)?;
    writeln!(out, "|{}|", separator)?;

    for row in rows {
        let row_str: String = col_widths
            .iter()
            .enumerate()
            .map(|(i, w)| {
                let cell = row.get(i).map(String::as_str).unwrap_or("");
                let pad = w.saturating_sub(cell.chars().count());
                format!(" {}{} ", cell, " ".repeat(pad))
            })
            .collect::<Vec<_>>()
            .join("|");
        writeln!(out, "|{}|", row_str)?;
    }
    Ok(())
}

/// Lists the first posts of the snapshot; the averages cover every post
/// the snapshot holds.
pub fn print_posts<W: Write>(
    out: &mut W,
    profile: &ProfileSnapshot,
    verbose: bool,
    layout: Layout,
) -> io::Result<()> {
    writeln!(out, " RECENT POSTS: @{}", profile.username)?;
    rule(out, '-')?;

    if profile.is_private {
        writeln!(out, "This account is private; its posts are not accessible.")?;
        return Ok(());
    }

    let Some(stats) = PostStats::from_posts(&profile.posts) else {
        writeln!(out, "No posts found for @{}.", profile.username)?;
        return Ok(());
    };

    let caption_chars = if verbose {
        VERBOSE_CAPTION_CHARS
    } else {
        CAPTION_CHARS
    };
    let rows: Vec<Vec<String>> = profile
        .posts
        .iter()
        .take(MAX_DISPLAYED_POSTS)
        .enumerate()
        .map(|(i, post)| post_row(i, post, caption_chars))
        .collect();

    match layout {
        Layout::Table => write_table(
            out,
            &["#", "Date (UTC)", "Type", "Likes", "Comments", "Caption", "ID", "Link"],
            &rows,
        )?,
        Layout::Plain => {
            for row in &rows {
                writeln!(out, "{}", row.join("|"))?;
            }
        }
    }

    heading(out, "POST STATISTICS")?;
    writeln!(
        out,
        "  Showing {} of {} loaded posts ({} on profile)",
        rows.len(),
        stats.count,
        group_digits(profile.post_count)
    )?;
    field(out, "Average likes", group_decimal(stats.avg_likes))?;
    field(out, "Average comments", group_decimal(stats.avg_comments))?;
    field(out, "Total interactions", group_digits(stats.total_interactions))?;
    Ok(())
}
