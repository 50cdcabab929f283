//! Field extraction for a single advisory section.
//!
//! Each field has its own extractor so that a markup change upstream only
//! touches the function for that field. No extractor fails the section: a
//! missing element yields the field's default.

use super::coordinates::extract_coordinates;
use super::models::{AdvisoryRecord, NO_DETAILS, UNKNOWN};
use super::text::element_text;

use regex::Regex;
use scraper::{ElementRef, Selector};
use std::sync::OnceLock;
use url::Url;

/// Cyclone name heading.
pub const HEADING_SELECTOR: &str = "h3";
/// Narrative paragraphs.
pub const DETAILS_SELECTOR: &str = "p";
/// Labelled sub-block, with its label and body.
pub const PANEL_SELECTOR: &str = "div.panel";
pub const PANEL_HEADING_SELECTOR: &str = ".panel-heading";
pub const PANEL_BODY_SELECTOR: &str = ".panel-body";
/// Track/preview image.
pub const PREVIEW_IMAGE_SELECTOR: &str = "img.image-preview";
/// Any heading that might carry advisory timestamps.
pub const TIMESTAMP_HEADING_SELECTOR: &str = "h1, h2, h3, h4, h5, h6";

pub const LOCATION_LABEL: &str = "location of eye";
pub const MOVEMENT_LABEL: &str = "movement";
pub const STRENGTH_LABEL: &str = "strength";

const ISSUED_AT: &str = "issued at";
const NEXT_ADVISORY: &str = "next advisory";

/// Parse every field of one advisory section.
pub fn parse_section(section: ElementRef<'_>, image_host: &Url) -> AdvisoryRecord {
    let (classification, name) = section_heading(section)
        .map(|heading| split_heading(&heading))
        .unwrap_or_else(|| (UNKNOWN.to_string(), UNKNOWN.to_string()));

    let details = section_details(section);

    let coordinates = extract_coordinates(&details).or_else(|| {
        panel_text(section, LOCATION_LABEL).and_then(|text| extract_coordinates(&text))
    });

    let strength = panel_text(section, STRENGTH_LABEL);
    let winds = strength.as_deref().and_then(sustained_winds);
    let gusts = strength.as_deref().and_then(gustiness);

    let (advisory_time, next_advisory_time) = advisory_times(section);

    AdvisoryRecord {
        name,
        classification,
        coordinates,
        details,
        movement: panel_text(section, MOVEMENT_LABEL),
        sustained_winds: winds,
        gustiness: gusts,
        image_url: preview_image(section, image_host),
        advisory_time,
        next_advisory_time,
    }
}

/// Split a heading into `(classification, name)`.
///
/// `Severe Tropical Storm "KRISTINE" (TRAMI)` gives the text before the first
/// quote as the classification and the quoted text as the name. A heading
/// without a quoted segment is all name.
pub fn split_heading(heading: &str) -> (String, String) {
    let quoted = heading
        .find(is_open_quote)
        .and_then(|open| {
            let quote_len = heading[open..].chars().next()?.len_utf8();
            let rest = &heading[open + quote_len..];
            let close = rest.find(is_close_quote)?;
            Some((&heading[..open], &rest[..close]))
        });

    match quoted {
        Some((before, name)) => {
            let classification = before.trim();
            let classification = if classification.is_empty() {
                UNKNOWN
            } else {
                classification
            };
            (classification.to_string(), name.trim().to_string())
        }
        None => (UNKNOWN.to_string(), heading.trim().to_string()),
    }
}

fn is_open_quote(c: char) -> bool {
    matches!(c, '"' | '\u{201C}')
}

fn is_close_quote(c: char) -> bool {
    matches!(c, '"' | '\u{201D}')
}

/// `sustained winds of 85` (km/h).
pub fn sustained_winds(text: &str) -> Option<u32> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"(?i)sustained winds of (\d+)").unwrap());
    capture_number(re, text)
}

/// `gustiness of up to 105` (km/h).
pub fn gustiness(text: &str) -> Option<u32> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"(?i)gustiness of up to (\d+)").unwrap());
    capture_number(re, text)
}

fn capture_number(re: &Regex, text: &str) -> Option<u32> {
    re.captures(text)?.get(1)?.as_str().parse().ok()
}

/// Text following `Issued at`, if the heading carries it.
///
/// Everything up to and including the marker is dropped, so a bulletin
/// title in front of it such as `Bulletin #12 Issued at ...` is not part of
/// the stamp.
pub fn issued_at(text: &str) -> Option<String> {
    let start = text.to_ascii_lowercase().find(ISSUED_AT)? + ISSUED_AT.len();
    let stamp = text[start..].trim();
    if stamp.is_empty() {
        None
    } else {
        Some(stamp.to_string())
    }
}

/// Time of the next advisory, such as `11:00 PM today`.
///
/// Falls back to the whole heading text when no time token is present.
pub fn next_advisory(text: &str) -> Option<String> {
    if !text.to_ascii_lowercase().contains(NEXT_ADVISORY) {
        return None;
    }

    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"(?i)\b(\d{1,2}:\d{2}\s*[AP]M\s+\w+)").unwrap());

    let stamp = re
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .unwrap_or(text);
    Some(stamp.trim().to_string())
}

/// Resolve an image `src` against the bulletin image host.
pub fn resolve_image_url(src: &str, image_host: &Url) -> Option<String> {
    let src = src.trim();
    if src.is_empty() {
        return None;
    }

    match Url::parse(src) {
        Ok(absolute) => Some(absolute.to_string()),
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            image_host.join(src).ok().map(|u| u.to_string())
        }
        Err(e) => {
            tracing::debug!("Ignoring unusable image reference {:?}: {}", src, e);
            None
        }
    }
}

fn section_heading(section: ElementRef<'_>) -> Option<String> {
    section
        .select(selector(&HEADING, HEADING_SELECTOR))
        .map(element_text)
        .find(|text| !text.is_empty() && !is_timestamp_heading(text))
}

fn is_timestamp_heading(text: &str) -> bool {
    let lower = text.to_ascii_lowercase();
    lower.contains(ISSUED_AT) || lower.contains(NEXT_ADVISORY)
}

fn section_details(section: ElementRef<'_>) -> String {
    section
        .select(selector(&DETAILS, DETAILS_SELECTOR))
        .map(element_text)
        .find(|text| !text.is_empty())
        .unwrap_or_else(|| NO_DETAILS.to_string())
}

/// Body text of the first panel whose label contains `label`.
pub fn panel_text(section: ElementRef<'_>, label: &str) -> Option<String> {
    let label = label.to_ascii_lowercase();

    section
        .select(selector(&PANEL, PANEL_SELECTOR))
        .find(|panel| {
            panel
                .select(selector(&PANEL_HEADING, PANEL_HEADING_SELECTOR))
                .next()
                .map(|heading| element_text(heading).to_ascii_lowercase().contains(&label))
                .unwrap_or(false)
        })
        .and_then(|panel| panel.select(selector(&PANEL_BODY, PANEL_BODY_SELECTOR)).next())
        .map(element_text)
        .filter(|text| !text.is_empty())
}

fn preview_image(section: ElementRef<'_>, image_host: &Url) -> Option<String> {
    section
        .select(selector(&PREVIEW_IMAGE, PREVIEW_IMAGE_SELECTOR))
        .find_map(|img| img.value().attr("src"))
        .and_then(|src| resolve_image_url(src, image_host))
}

fn advisory_times(section: ElementRef<'_>) -> (Option<String>, Option<String>) {
    let mut advisory_time = None;
    let mut next_advisory_time = None;

    for heading in section.select(selector(&TIMESTAMP_HEADING, TIMESTAMP_HEADING_SELECTOR)) {
        let text = element_text(heading);
        match next_advisory(&text) {
            Some(next) => {
                next_advisory_time.get_or_insert(next);
            }
            None if advisory_time.is_none() => advisory_time = issued_at(&text),
            None => {}
        }
    }

    (advisory_time, next_advisory_time)
}

static HEADING: OnceLock<Selector> = OnceLock::new();
static DETAILS: OnceLock<Selector> = OnceLock::new();
static PANEL: OnceLock<Selector> = OnceLock::new();
static PANEL_HEADING: OnceLock<Selector> = OnceLock::new();
static PANEL_BODY: OnceLock<Selector> = OnceLock::new();
static PREVIEW_IMAGE: OnceLock<Selector> = OnceLock::new();
static TIMESTAMP_HEADING: OnceLock<Selector> = OnceLock::new();

pub(super) fn selector(cell: &'static OnceLock<Selector>, css: &str) -> &'static Selector {
    cell.get_or_init(|| Selector::parse(css).expect("CSS selector should be valid"))
}
