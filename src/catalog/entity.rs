use chrono::NaiveDate;

/// A normalized catalog item. `title` is the identity key everywhere
/// downstream.
#[derive(Clone, Debug, PartialEq)]
pub struct Entity {
    pub title: String,
    pub release_date: Option<NaiveDate>,
    /// Ordered; the first label is the primary category.
    pub categories: Vec<String>,
    /// NaN when the source text was not a number.
    pub rating: f64,
    /// `None` when the source text was not an integer.
    pub votes: Option<u64>,
    pub rating_code: String,
}

impl Entity {
    pub fn primary_category(&self) -> Option<&str> {
        self.categories.first().map(String::as_str)
    }
}
