//! Bulletin page extraction.
//!
//! Turns the raw markup of a severe weather bulletin page into advisory
//! records, one per cyclone section.

mod coordinates;
mod models;
mod section;
mod text;

pub use coordinates::*;
pub use models::*;
pub use section::*;

use scraper::{Html, Selector};
use std::sync::OnceLock;
use url::Url;

/// Marker class of one cyclone bulletin block.
pub const SECTION_SELECTOR: &str = "div.tab-pane";

static SECTION: OnceLock<Selector> = OnceLock::new();

/// Extract every rankable advisory from a bulletin page, in document order.
///
/// Sections without coordinates are dropped. A page with no sections is the
/// normal "no active cyclone" case and yields an empty list.
pub fn extract_advisories(page: &str, image_host: &Url) -> Vec<AdvisoryRecord> {
    let doc = Html::parse_document(page);

    let mut total = 0usize;
    let records: Vec<AdvisoryRecord> = doc
        .select(section::selector(&SECTION, SECTION_SELECTOR))
        .map(|el| {
            total += 1;
            parse_section(el, image_host)
        })
        .filter(|record| {
            if record.coordinates.is_none() {
                tracing::debug!("Dropping bulletin section {:?}: no coordinates", record.name);
                return false;
            }
            true
        })
        .collect();

    tracing::debug!(
        "Bulletin parsed: {} sections, {} with coordinates",
        total,
        records.len()
    );

    records
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<!DOCTYPE html>
<html><body>
  <ul class="nav nav-tabs"><li>KRISTINE</li><li>LEON</li></ul>
  <div class="tab-content">
    <div class="tab-pane active">
      <h3>Severe Tropical Storm "KRISTINE"</h3>
      <p>Located at 250 km East of Virac, Catanduanes (13.8°N, 126.5°E)</p>
    </div>
    <div class="tab-pane">
      <h3>Tropical Depression "LEON"</h3>
      <p>Forming east of Mindanao, position not yet fixed.</p>
    </div>
    <div class="tab-pane">
      <h3>Typhoon "KRISTINE"</h3>
      <div class="panel">
        <div class="panel-heading">Location of Eye/center</div>
        <div class="panel-body">Lat: 20.1, Lon: 135.0</div>
      </div>
    </div>
  </div>
</body></html>"#;

    fn host() -> Url {
        Url::parse("https://pubfiles.pagasa.dost.gov.ph").unwrap()
    }

    #[test]
    fn test_extract_keeps_document_order_and_duplicates() {
        let records = extract_advisories(PAGE, &host());
        let names: Vec<_> = records
            .iter()
            .map(|r| (r.classification.as_str(), r.name.as_str()))
            .collect();
        assert_eq!(
            names,
            vec![("Severe Tropical Storm", "KRISTINE"), ("Typhoon", "KRISTINE")]
        );
    }

    #[test]
    fn test_extract_drops_sections_without_coordinates() {
        let records = extract_advisories(PAGE, &host());
        assert!(records.iter().all(|r| r.coordinates.is_some()));
        assert!(!records.iter().any(|r| r.name == "LEON"));
    }

    #[test]
    fn test_extract_page_without_sections() {
        let page = "<html><body><h2>No Active Tropical Cyclone within the PAR</h2></body></html>";
        assert!(extract_advisories(page, &host()).is_empty());
        assert!(extract_advisories("", &host()).is_empty());
    }
}
