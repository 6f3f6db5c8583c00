//! Fuzzy search over the component, template and tool catalogue shown in the header.

use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use serde::{Deserialize, Serialize};

/// Results returned for a blank query.
const BROWSE_LIMIT: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchItemType {
    Component,
    Template,
    Project,
    Tool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchableItem {
    pub id: String,
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub kind: SearchItemType,
}

fn item(id: &str, name: &str, category: &str, tags: &[&str], kind: SearchItemType) -> SearchableItem {
    SearchableItem {
        id: id.to_string(),
        name: name.to_string(),
        category: category.to_string(),
        tags: tags.iter().map(|t| t.to_string()).collect(),
        description: None,
        kind,
    }
}

pub fn default_items() -> Vec<SearchableItem> {
    use SearchItemType::*;
    vec![
        item("1", "Button", "UI Components", &["button", "interactive", "form"], Component),
        item("2", "Input", "UI Components", &["input", "form", "text"], Component),
        item("3", "Modal", "UI Components", &["modal", "dialog", "overlay"], Component),
        item("4", "Card", "UI Components", &["card", "container", "layout"], Component),
        item("5", "E-commerce Template", "Templates", &["ecommerce", "shop", "store"], Template),
        item("6", "Dashboard Template", "Templates", &["dashboard", "admin", "analytics"], Template),
        item("7", "Blog Template", "Templates", &["blog", "content", "cms"], Template),
        item("8", "ESLint", "Tools", &["linting", "code-quality", "javascript"], Tool),
        item("9", "Prettier", "Tools", &["formatting", "code-style"], Tool),
        item("10", "TypeScript", "Tools", &["typescript", "types", "compiler"], Tool),
    ]
}

pub struct SearchIndex {
    items: Vec<SearchableItem>,
    matcher: SkimMatcherV2,
}

impl Default for SearchIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchIndex {
    /// Index seeded with the built-in catalogue.
    pub fn new() -> Self {
        Self::with_items(default_items())
    }

    pub fn with_items(items: Vec<SearchableItem>) -> Self {
        Self {
            items,
            matcher: SkimMatcherV2::default().ignore_case(),
        }
    }

    pub fn items(&self) -> &[SearchableItem] {
        &self.items
    }

    /// Appends `new_items` after the existing ones.
    pub fn update_search_data(&mut self, new_items: Vec<SearchableItem>) {
        self.items.extend(new_items);
        tracing::debug!(items = self.items.len(), "Search index updated");
    }

    /// Best match first. A blank query browses the first entries instead.
    pub fn search(&self, query: &str) -> Vec<SearchableItem> {
        let query = query.trim();
        if query.is_empty() {
            return self.items.iter().take(BROWSE_LIMIT).cloned().collect();
        }

        let mut scored: Vec<(i64, &SearchableItem)> = self
            .items
            .iter()
            .filter_map(|item| self.score(item, query).map(|s| (s, item)))
            .collect();
        // stable, so equal scores keep catalogue order
        scored.sort_by(|a, b| b.0.cmp(&a.0));
        scored.into_iter().map(|(_, item)| item.clone()).collect()
    }

    pub fn items_by_category(&self, category: &str) -> Vec<SearchableItem> {
        self.items.iter().filter(|i| i.category == category).cloned().collect()
    }

    pub fn items_by_type(&self, kind: SearchItemType) -> Vec<SearchableItem> {
        self.items.iter().filter(|i| i.kind == kind).cloned().collect()
    }

    fn score(&self, item: &SearchableItem, query: &str) -> Option<i64> {
        std::iter::once(item.name.as_str())
            .chain(std::iter::once(item.category.as_str()))
            .chain(item.tags.iter().map(String::as_str))
            .chain(item.description.as_deref())
            .filter_map(|field| self.matcher.fuzzy_match(field, query))
            .max()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(items: &[SearchableItem]) -> Vec<&str> {
        items.iter().map(|i| i.id.as_str()).collect()
    }

    #[test]
    fn blank_query_browses_first_ten() {
        let mut index = SearchIndex::new();
        index.update_search_data(vec![item("11", "Jest", "Tools", &["testing"], SearchItemType::Tool)]);

        assert_eq!(index.items().len(), 11);
        let browsed = index.search("   ");
        assert_eq!(browsed.len(), 10);
        assert_eq!(browsed[0].name, "Button");
        assert_eq!(index.search(""), browsed);
    }

    #[test]
    fn fuzzy_query_tolerates_typos() {
        let index = SearchIndex::new();

        let hits = index.search("buton");
        assert_eq!(ids(&hits), vec!["1"]);

        let templ_hits = index.search("templ");
        let mut templates = ids(&templ_hits);
        templates.sort_unstable();
        assert_eq!(templates, vec!["5", "6", "7"]);

        assert!(index.search("zzqx").is_empty());
    }

    #[test]
    fn appended_items_and_descriptions_are_searchable() {
        let mut index = SearchIndex::new();
        let mut vitest = item("11", "Vitest", "Tools", &["testing"], SearchItemType::Tool);
        vitest.description = Some("Runner unitaire rapide".into());
        index.update_search_data(vec![vitest]);

        assert_eq!(ids(&index.search("unitaire")), vec!["11"]);
        assert_eq!(index.search("vitest")[0].name, "Vitest");
    }

    #[test]
    fn filters_match_exactly() {
        let index = SearchIndex::new();

        assert_eq!(ids(&index.items_by_category("Templates")), vec!["5", "6", "7"]);
        assert!(index.items_by_category("templates").is_empty());
        assert_eq!(ids(&index.items_by_type(SearchItemType::Tool)), vec!["8", "9", "10"]);
        assert!(index.items_by_type(SearchItemType::Project).is_empty());
    }
}
