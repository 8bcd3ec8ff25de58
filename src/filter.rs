/// Author/tag filters applied while extracting records from a page.
///
/// Matching is case-insensitive substring: a filter of "stein" keeps a record
/// whose author is "Albert Einstein". The tag filter matches when any tag in
/// the record's tag set contains the filter value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordFilter {
    pub author: Option<String>,
    pub tag: Option<String>,
}

impl RecordFilter {
    pub fn new(author: Option<String>, tag: Option<String>) -> Self {
        // Blank filter values behave the same as absent ones
        let non_blank = |v: Option<String>| v.filter(|s| !s.trim().is_empty());
        Self {
            author: non_blank(author),
            tag: non_blank(tag),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.author.is_none() && self.tag.is_none()
    }

    pub fn matches_author(&self, author: &str) -> bool {
        match &self.author {
            Some(filter) => author.to_lowercase().contains(&filter.to_lowercase()),
            None => true,
        }
    }

    pub fn matches_tags(&self, tags: &[String]) -> bool {
        match &self.tag {
            Some(filter) => {
                let filter = filter.to_lowercase();
                tags.iter().any(|t| t.to_lowercase().contains(&filter))
            }
            None => true,
        }
    }
}
