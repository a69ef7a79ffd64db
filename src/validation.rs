use crate::models::{BlogDraft, ItineraryDraft};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub field: String,
    pub message: String,
}

impl ValidationIssue {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// The "is this draft valid" predicate consulted before any network call.
pub trait Validator<T>: Send + Sync {
    fn validate(&self, draft: &T) -> Vec<ValidationIssue>;
}

impl<T, F> Validator<T> for F
where
    F: Fn(&T) -> Vec<ValidationIssue> + Send + Sync,
{
    fn validate(&self, draft: &T) -> Vec<ValidationIssue> {
        self(draft)
    }
}

/// Default form rules of the dashboard.
#[derive(Debug, Clone, Copy, Default)]
pub struct SchemaRules;

#[derive(Default)]
struct Issues(Vec<ValidationIssue>);

impl Issues {
    /// Counts characters as entered, surrounding whitespace included.
    fn min_len(&mut self, field: &str, value: &str, min: usize, message: &str) {
        if value.chars().count() < min {
            self.0.push(ValidationIssue::new(field, message));
        }
    }

    fn check(&mut self, ok: bool, field: &str, message: &str) {
        if !ok {
            self.0.push(ValidationIssue::new(field, message));
        }
    }

    fn items(&mut self, field: &str, items: &[String], what: &str) {
        self.check(!items.is_empty(), field, &format!("At least one {} is required", what));
        for (i, item) in items.iter().enumerate() {
            self.min_len(&format!("{}[{}]", field, i), item, 1, &format!("{} cannot be empty", what));
        }
    }
}

fn is_web_url(value: &str) -> bool {
    reqwest::Url::parse(value.trim())
        .map(|url| matches!(url.scheme(), "http" | "https"))
        .unwrap_or(false)
}

impl Validator<BlogDraft> for SchemaRules {
    fn validate(&self, draft: &BlogDraft) -> Vec<ValidationIssue> {
        let mut issues = Issues::default();
        issues.min_len("title", &draft.title, 3, "Title is required");
        issues.min_len("author", &draft.author, 1, "Author name is required");
        issues.min_len("content", &draft.content, 10, "Content must be at least 10 characters long");
        issues.check(!draft.cover_image.is_empty(), "cover_image", "Cover image is required");
        issues.check(!draft.sections.is_empty(), "sections", "At least one section is required");
        for (i, section) in draft.sections.iter().enumerate() {
            issues.min_len(
                &format!("sections[{}].content", i),
                &section.content,
                10,
                "Content must be at least 10 characters long",
            );
        }
        issues.0
    }
}

impl Validator<ItineraryDraft> for SchemaRules {
    fn validate(&self, draft: &ItineraryDraft) -> Vec<ValidationIssue> {
        let mut issues = Issues::default();
        issues.min_len("title", &draft.title, 3, "Itinerary title must be at least 3 characters long");
        issues.min_len("overview", &draft.overview, 20, "Overview must be at least 20 characters long");
        issues.check(draft.duration >= 1, "duration", "Duration must be at least 1 day");
        issues.check(
            draft.price.is_finite() && draft.price >= 0.0,
            "price",
            "Price cannot be negative",
        );
        issues.check(draft.discount <= 100, "discount", "Discount cannot exceed 100");
        issues.min_len("arrival_city", &draft.arrival_city, 1, "Arrival city is required");
        issues.min_len("departure_city", &draft.departure_city, 1, "Departure city is required");
        issues.min_len("accommodation", &draft.accommodation, 1, "Accommodation is required");
        issues.min_len("location", &draft.location, 1, "Location is required");
        issues.check(!draft.map.is_empty(), "map", "Map image is required");
        issues.check(
            !draft.gallery_images.is_empty(),
            "gallery_images",
            "At least one image is required",
        );
        issues.items("tags", &draft.tags, "tag");
        issues.items("cost_inclusive", &draft.cost_inclusive, "cost inclusive item");
        issues.items("cost_exclusive", &draft.cost_exclusive, "cost exclusive item");
        issues.check(!draft.days.is_empty(), "days", "At least one itinerary day is required");

        for (i, day) in draft.days.iter().enumerate() {
            let base = format!("days[{}]", i);
            issues.min_len(&format!("{}.title", base), &day.title, 1, "Day title is required");
            issues.min_len(
                &format!("{}.details", base),
                &day.details,
                10,
                "Day details must be at least 10 characters long",
            );
            issues.check(
                !day.images.is_empty(),
                &format!("{}.images", base),
                "At least one day image is required",
            );
            issues.min_len(&format!("{}.hotel.name", base), &day.hotel.name, 1, "Hotel name is required");
            issues.check(
                is_web_url(&day.hotel.url),
                &format!("{}.hotel.url", base),
                "Hotel URL must be a valid URL",
            );
            issues.check(
                !day.hotel.images.is_empty(),
                &format!("{}.hotel.images", base),
                "At least one hotel image is required",
            );
        }
        issues.0
    }
}
