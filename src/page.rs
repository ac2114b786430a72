//! Parsed-page handle: reference extraction, attribute rewriting, serialization.
//!
//! All contact with the HTML library lives here. The scheduler reads
//! references through this wrapper, and the rewriter mutates attributes
//! through it; the two phases never overlap on the same handle.

use anyhow::{anyhow, Result};
use scraper::{Html, Selector, StrTendril};
use std::collections::HashMap;

use crate::category::Category;

/// One asset reference found on the page, in document order within its
/// category. `url` is the attribute value exactly as written in the markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawReference {
    pub category: Category,
    pub source_attribute: &'static str,
    pub url: String,
}

/// Owned parse of the fetched page.
pub struct PageDom {
    html: Html,
}

impl PageDom {
    /// Parses page bytes into a navigable tree. Lossy on invalid UTF-8,
    /// matching the best-effort nature of the tool.
    pub fn parse(bytes: &[u8]) -> PageDom {
        let text = String::from_utf8_lossy(bytes);
        PageDom {
            html: Html::parse_document(&text),
        }
    }

    /// The document title, trimmed. `None` if there is no `<title>` element
    /// or it is empty.
    pub fn title(&self) -> Option<String> {
        let selector = tag_selector("title").ok()?;
        let element = self.html.select(&selector).next()?;
        let text: String = element.text().collect();
        let trimmed = text.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }

    /// Collects every asset reference on the page, walking categories in
    /// scheduling order and elements in document order within each.
    pub fn references(&self) -> Result<Vec<RawReference>> {
        let mut refs = Vec::new();
        for category in Category::ALL {
            let selector = tag_selector(category.tag())?;
            for element in self.html.select(&selector) {
                let Some(value) = element.value().attr(category.attribute()) else {
                    continue;
                };
                let rel = element.value().attr("rel");
                if category.accepts(value, rel) {
                    refs.push(RawReference {
                        category,
                        source_attribute: category.attribute(),
                        url: value.to_string(),
                    });
                }
            }
        }
        Ok(refs)
    }

    /// Rewrites attribute values to local paths.
    ///
    /// `rewrites` maps (category, original attribute value) to the relative
    /// local path the scheduler used. Only matching elements whose current
    /// value appears in the map are touched, so references the scheduler
    /// never attempted keep their original URLs.
    pub fn rewrite(&mut self, rewrites: &HashMap<(Category, String), String>) -> Result<()> {
        for category in Category::ALL {
            let selector = tag_selector(category.tag())?;

            // Collect first: selection borrows the tree the mutation needs.
            let targets: Vec<_> = self
                .html
                .select(&selector)
                .filter_map(|element| {
                    let value = element.value().attr(category.attribute())?;
                    let rel = element.value().attr("rel");
                    if !category.accepts(value, rel) {
                        return None;
                    }
                    let key = (category, value.to_string());
                    let local = rewrites.get(&key)?;
                    Some((element.id(), local.clone()))
                })
                .collect();

            for (node_id, local_path) in targets {
                let Some(mut node) = self.html.tree.get_mut(node_id) else {
                    continue;
                };
                if let scraper::Node::Element(element) = node.value() {
                    for (name, value) in element.attrs.iter_mut() {
                        if &*name.local == category.attribute() {
                            *value = StrTendril::from(local_path.as_str());
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// Serializes the (possibly mutated) tree back to HTML text.
    pub fn serialize(&self) -> String {
        self.html.html()
    }
}

fn tag_selector(tag: &str) -> Result<Selector> {
    Selector::parse(tag).map_err(|e| anyhow!("bad selector {:?}: {}", tag, e))
}
