//! Asset categories and the tag/attribute/subdirectory table.
//!
//! The scheduler consults this table to know what to fetch and where to put
//! it; the rewriter consults the same table to know what local path to write
//! into the page. Keeping both on one table is the invariant that makes the
//! persisted page and the persisted assets agree on paths.

use std::fmt;

/// One kind of page asset, with a fixed tag/attribute pair and a fixed
/// subdirectory under the run root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Image,
    Audio,
    Pdf,
    Text,
    Script,
    Stylesheet,
}

impl Category {
    /// All categories in scheduling order. Images first, stylesheets last;
    /// the acquisition batch walks them in exactly this sequence.
    pub const ALL: [Category; 6] = [
        Category::Image,
        Category::Audio,
        Category::Pdf,
        Category::Text,
        Category::Script,
        Category::Stylesheet,
    ];

    /// HTML tag carrying this category's references.
    pub fn tag(self) -> &'static str {
        match self {
            Category::Image => "img",
            Category::Audio => "audio",
            Category::Pdf | Category::Text => "a",
            Category::Script => "script",
            Category::Stylesheet => "link",
        }
    }

    /// Attribute holding the reference URL on the category's tag.
    pub fn attribute(self) -> &'static str {
        match self {
            Category::Image | Category::Audio | Category::Script => "src",
            Category::Pdf | Category::Text | Category::Stylesheet => "href",
        }
    }

    /// Subdirectory name under the run root where fetched assets land.
    pub fn subdir(self) -> &'static str {
        match self {
            Category::Image => "images",
            Category::Audio => "audio",
            Category::Pdf => "pdfs",
            Category::Text => "text",
            Category::Script => "js",
            Category::Stylesheet => "css",
        }
    }

    /// Whether an element with the given attribute value (and `rel`
    /// attribute, for `link` tags) belongs to this category.
    ///
    /// Anchor-based categories filter on the referenced path's extension so
    /// that a given `<a href>` matches at most one category; without the
    /// filter the rewriter's target directory would be ambiguous.
    pub fn accepts(self, attr_value: &str, rel: Option<&str>) -> bool {
        match self {
            Category::Image | Category::Audio | Category::Script => true,
            Category::Pdf => path_has_extension(attr_value, &["pdf"]),
            Category::Text => path_has_extension(attr_value, &["txt", "md"]),
            Category::Stylesheet => rel
                .map(|r| r.split_ascii_whitespace().any(|w| w.eq_ignore_ascii_case("stylesheet")))
                .unwrap_or(false),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.subdir())
    }
}

/// True if the path portion of `value` (before any `?`/`#`) ends in one of
/// `extensions`, case-insensitively.
fn path_has_extension(value: &str, extensions: &[&str]) -> bool {
    let path = value.split(['?', '#']).next().unwrap_or_default();
    let lower = path.to_ascii_lowercase();
    extensions.iter().any(|ext| {
        lower
            .rsplit_once('.')
            .map(|(_, got)| got == *ext)
            .unwrap_or(false)
    })
}
