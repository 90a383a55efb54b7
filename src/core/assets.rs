//! Ordered containers for page assets and feeds.

/// Ordered set of asset identifiers (javascripts, stylesheets).
///
/// Identifiers are unique. Plain inserts keep the first-seen position;
/// [`AssetList::push_front`] inserts at the front or promotes an existing
/// entry there.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetList {
    items: Vec<String>,
}

impl AssetList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `id` unless it is already present.
    ///
    /// Returns `true` if the list changed.
    pub fn push(&mut self, id: impl Into<String>) -> bool {
        let id = id.into();
        if self.contains(&id) {
            return false;
        }
        self.items.push(id);
        true
    }

    /// Insert `id` at the front, moving it there if already present.
    pub fn push_front(&mut self, id: impl Into<String>) {
        let id = id.into();
        if let Some(pos) = self.position(&id) {
            let existing = self.items.remove(pos);
            self.items.insert(0, existing);
        } else {
            self.items.insert(0, id);
        }
    }

    #[inline]
    pub fn contains(&self, id: &str) -> bool {
        self.position(id).is_some()
    }

    #[inline]
    fn position(&self, id: &str) -> Option<usize> {
        self.items.iter().position(|item| item == id)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.items
    }
}

impl<S: Into<String>> FromIterator<S> for AssetList {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut list = Self::new();
        for id in iter {
            list.push(id);
        }
        list
    }
}

impl From<Vec<String>> for AssetList {
    fn from(items: Vec<String>) -> Self {
        items.into_iter().collect()
    }
}

/// Feed descriptions keyed by URL, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedList {
    entries: Vec<(String, String)>,
}

impl FeedList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite the description for `url`.
    ///
    /// An overwritten feed keeps its position.
    pub fn insert(&mut self, url: impl Into<String>, description: impl Into<String>) {
        let url = url.into();
        let description = description.into();
        match self.entries.iter_mut().find(|(u, _)| *u == url) {
            Some((_, existing)) => *existing = description,
            None => self.entries.push((url, description)),
        }
    }

    pub fn get(&self, url: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(u, _)| u == url)
            .map(|(_, d)| d.as_str())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(u, d)| (u.as_str(), d.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(list: &AssetList) -> Vec<&str> {
        list.iter().collect()
    }

    #[test]
    fn test_push_collapses_duplicates() {
        let mut list = AssetList::new();
        assert!(list.push("jquery.js"));
        assert!(list.push("app.js"));
        assert!(!list.push("jquery.js"));

        assert_eq!(collect(&list), vec!["jquery.js", "app.js"]);
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn test_push_front_new_item() {
        let mut list: AssetList = ["a.js", "b.js"].into_iter().collect();
        list.push_front("first.js");
        assert_eq!(collect(&list), vec!["first.js", "a.js", "b.js"]);
    }

    #[test]
    fn test_push_front_promotes_existing() {
        let mut list: AssetList = ["a.js", "b.js", "c.js"].into_iter().collect();
        list.push_front("c.js");
        assert_eq!(collect(&list), vec!["c.js", "a.js", "b.js"]);
        assert_eq!(list.len(), 3);
    }

    #[test]
    fn test_from_vec_dedups() {
        let list = AssetList::from(vec![
            "x.css".to_string(),
            "y.css".to_string(),
            "x.css".to_string(),
        ]);
        assert_eq!(collect(&list), vec!["x.css", "y.css"]);
    }

    #[test]
    fn test_feed_overwrite_keeps_position() {
        let mut feeds = FeedList::new();
        feeds.insert("/rss/news", "News");
        feeds.insert("/rss/blog", "Blog");
        feeds.insert("/rss/news", "Latest news");

        let all: Vec<_> = feeds.iter().collect();
        assert_eq!(all, vec![("/rss/news", "Latest news"), ("/rss/blog", "Blog")]);
        assert_eq!(feeds.get("/rss/blog"), Some("Blog"));
        assert_eq!(feeds.get("/missing"), None);
    }
}
