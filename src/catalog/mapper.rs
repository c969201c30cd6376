use std::cmp::Ordering;

use chrono::NaiveDate;
use tracing::{debug, warn};

use super::entity::Entity;
use super::record::RawRecord;

const RELEASE_DATE_FORMAT: &str = "%d %b %Y";
const CATEGORY_SEPARATOR: &str = ", ";

/// Normalizes raw rows into entities, newest release first. Never fails:
/// unparseable fields degrade to their sentinel values.
pub fn map_records(records: &[RawRecord]) -> Vec<Entity> {
    let mut entities = records.iter().map(map_record).collect::<Vec<_>>();

    // `sort_by` is stable, so equal dates keep their input order.
    entities.sort_by(|a, b| newest_first(a.release_date, b.release_date));

    debug!(count = entities.len(), "mapped catalog records");
    entities
}

fn map_record(record: &RawRecord) -> Entity {
    let release_date = parse_release_date(&record.released);
    if release_date.is_none() {
        warn!(title = %record.title, released = %record.released, "unparseable release date");
    }

    let rating = parse_rating(&record.rating);
    let votes = parse_votes(&record.votes);
    if rating.is_nan() || votes.is_none() {
        warn!(
            title = %record.title,
            rating = %record.rating,
            votes = %record.votes,
            "malformed numeric field"
        );
    }

    Entity {
        title: record.title.clone(),
        release_date,
        categories: parse_categories(&record.genre),
        rating,
        votes,
        rating_code: record.rated.trim().to_string(),
    }
}

fn newest_first(a: Option<NaiveDate>, b: Option<NaiveDate>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

pub(super) fn parse_release_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), RELEASE_DATE_FORMAT).ok()
}

pub(super) fn parse_categories(value: &str) -> Vec<String> {
    value
        .split(CATEGORY_SEPARATOR)
        .map(str::trim)
        .filter(|label| !label.is_empty())
        .map(str::to_string)
        .collect()
}

pub(super) fn parse_rating(value: &str) -> f64 {
    value.trim().parse::<f64>().unwrap_or(f64::NAN)
}

pub(super) fn parse_votes(value: &str) -> Option<u64> {
    let digits = value.trim().replace(',', "");
    digits.parse::<u64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(title: &str, released: &str) -> RawRecord {
        RawRecord {
            title: title.to_string(),
            released: released.to_string(),
            genre: "Drama".to_string(),
            rating: "7.0".to_string(),
            votes: "1,000".to_string(),
            rated: "PG".to_string(),
        }
    }

    #[test]
    fn sorts_newest_release_first() {
        let entities = map_records(&[
            record("Old", "01 Jan 1999"),
            record("New", "05 Mar 2015"),
            record("Middle", "16 Jul 2010"),
        ]);

        let titles = entities.iter().map(|e| e.title.as_str()).collect::<Vec<_>>();
        assert_eq!(titles, ["New", "Middle", "Old"]);
    }

    #[test]
    fn equal_dates_keep_input_order() {
        let entities = map_records(&[
            record("First", "16 Jul 2010"),
            record("Newest", "01 Jan 2012"),
            record("Second", "16 Jul 2010"),
            record("Third", "16 Jul 2010"),
        ]);

        let titles = entities.iter().map(|e| e.title.as_str()).collect::<Vec<_>>();
        assert_eq!(titles, ["Newest", "First", "Second", "Third"]);
    }

    #[test]
    fn undated_entities_sort_last() {
        let entities = map_records(&[record("Unknown", "N/A"), record("Dated", "01 Jan 1990")]);
        assert_eq!(entities[0].title, "Dated");
        assert_eq!(entities[1].title, "Unknown");
        assert_eq!(entities[1].release_date, None);
    }

    #[test]
    fn parses_display_dates() {
        assert_eq!(
            parse_release_date("16 Jul 2010"),
            NaiveDate::from_ymd_opt(2010, 7, 16)
        );
        assert_eq!(parse_release_date("2010-07-16"), None);
    }

    #[test]
    fn splits_categories_in_order() {
        assert_eq!(
            parse_categories("Action, Adventure,  Sci-Fi"),
            ["Action", "Adventure", "Sci-Fi"]
        );
        assert!(parse_categories("").is_empty());
    }

    #[test]
    fn strips_thousands_separators_from_votes() {
        assert_eq!(parse_votes("1,868,466"), Some(1_868_466));
        assert_eq!(parse_votes("42"), Some(42));
        assert_eq!(parse_votes("N/A"), None);
    }

    #[test]
    fn malformed_rating_degrades_to_nan() {
        assert!(parse_rating("N/A").is_nan());
        assert_eq!(parse_rating(" 8.8 "), 8.8);
    }

    #[test]
    fn mapping_never_fails_on_garbage() {
        let entities = map_records(&[RawRecord {
            title: "Broken".to_string(),
            released: "someday".to_string(),
            genre: String::new(),
            rating: "great".to_string(),
            votes: "lots".to_string(),
            rated: String::new(),
        }]);

        let entity = &entities[0];
        assert!(entity.rating.is_nan());
        assert_eq!(entity.votes, None);
        assert_eq!(entity.primary_category(), None);
    }
}
