//! Client-side article search.
//!
//! Article list views filter what they already hold by a search box term: an
//! article matches when the term appears, ignoring case, in its title or its
//! body. An empty term matches everything.

use crate::dto::PostResponse;

/// Anything with a title and a body that a list view can filter.
pub trait Searchable {
    fn title(&self) -> &str;
    fn body(&self) -> &str;

    fn matches(&self, term: &str) -> bool {
        text_matches(self.title(), self.body(), term)
    }
}

impl Searchable for PostResponse {
    fn title(&self) -> &str {
        &self.title
    }

    fn body(&self) -> &str {
        &self.content
    }
}

/// Case-insensitive substring match of `term` against `title` or `body`.
pub fn text_matches(title: &str, body: &str, term: &str) -> bool {
    let term = term.to_lowercase();
    title.to_lowercase().contains(&term) || body.to_lowercase().contains(&term)
}

/// True when any whitespace-separated word of `query` matches.
pub fn any_word_matches(title: &str, body: &str, query: &str) -> bool {
    query
        .split_whitespace()
        .any(|word| text_matches(title, body, word))
}

/// Keep the items matching `term`, preserving their order.
pub fn filter_by_term<'a, T: Searchable>(items: &'a [T], term: &str) -> Vec<&'a T> {
    items.iter().filter(|item| item.matches(term)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Article {
        title: &'static str,
        content: &'static str,
    }

    impl Searchable for Article {
        fn title(&self) -> &str {
            self.title
        }

        fn body(&self) -> &str {
            self.content
        }
    }

    fn sample() -> Vec<Article> {
        vec![
            Article {
                title: "Getting Started with React",
                content: "Learn the fundamentals of React.",
            },
            Article {
                title: "Mastering CSS Grid",
                content: "Create complex, responsive layouts.",
            },
            Article {
                title: "TypeScript Best Practices",
                content: "Clean, maintainable code that scales.",
            },
        ]
    }

    #[test]
    fn test_empty_term_matches_everything() {
        assert_eq!(filter_by_term(&sample(), "").len(), 3);
    }

    #[test]
    fn test_matches_title_or_body_ignoring_case() {
        let articles = sample();
        let hits = filter_by_term(&articles, "GRID");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "Mastering CSS Grid");

        let hits = filter_by_term(&articles, "maintainable");
        assert_eq!(hits[0].title, "TypeScript Best Practices");
    }

    #[test]
    fn test_no_match() {
        assert!(filter_by_term(&sample(), "kubernetes").is_empty());
    }

    #[test]
    fn test_any_word_matches() {
        assert!(any_word_matches("Rust tips", "", "golang rust"));
        assert!(!any_word_matches("Rust tips", "", "golang java"));
        assert!(!any_word_matches("Rust tips", "", "   "));
    }
}
