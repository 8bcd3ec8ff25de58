use serde::ser::{Serialize, SerializeMap, Serializer};

/// One scraped row: an ordered list of named string fields.
///
/// The field set varies by source (quotes, books, blogs, generic links all
/// carry different columns), so this is deliberately schemaless. Field order
/// is display order and nothing else.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    fields: Vec<(String, String)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.push((name.into(), value.into()));
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (k, v) in &self.fields {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

/// The outcome of driving a scraper to exhaustion (or interruption).
///
/// `complete` is false when the pagination loop stopped early: page ceiling,
/// repeated cursor, cancellation, or a fetch failure after the first page.
/// Records accumulated up to that point are still returned.
#[derive(Debug, Clone, Default)]
pub struct Harvest {
    pub records: Vec<Record>,
    pub pages: usize,
    pub complete: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_preserves_insertion_order() {
        let mut record = Record::new();
        record.push("title", "A Light in the Attic");
        record.push("price", "£51.77");
        record.push("availability", "In stock");

        let keys: Vec<&str> = record.keys().collect();
        assert_eq!(keys, vec!["title", "price", "availability"]);
        assert_eq!(record.get("price"), Some("£51.77"));
        assert_eq!(record.get("missing"), None);
    }

    #[test]
    fn record_serializes_as_json_object() {
        let mut record = Record::new();
        record.push("quote", "So it goes.");
        record.push("author", "Kurt Vonnegut");

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["quote"], "So it goes.");
        assert_eq!(json["author"], "Kurt Vonnegut");
    }
}
