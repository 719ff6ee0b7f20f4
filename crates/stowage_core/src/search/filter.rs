//! Composite facet filter over the owner's items.
//!
//! # Responsibility
//! - Answer "which items match these facets" as a pure recomputation over a
//!   fresh snapshot of the owner's item list.
//!
//! # Invariants
//! - No mutation, no retained derived state: every call reloads and
//!   refilters, so results can never go stale under concurrent writes.
//! - Facets narrow conjunctively in a fixed order: category, bin, tags,
//!   text. The tag facet matches items carrying at least one of the given
//!   tags. Result order is the underlying creation order.

use crate::identity::OwnerId;
use crate::model::bin::BinId;
use crate::model::category::CategoryId;
use crate::model::item::Item;
use crate::model::tag::TagId;
use crate::repo::item_repo::ItemRepository;
use crate::repo::CatalogResult;

/// Facet criteria for the composite item query. Absent facets do not
/// narrow; an empty tag set is treated as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemFilter {
    /// Case-insensitive substring over name, description, and tag names.
    pub text: Option<String>,
    /// Exact category match.
    pub category_id: Option<CategoryId>,
    /// Exact bin match; not subtree-inclusive.
    pub bin_id: Option<BinId>,
    /// Match items carrying at least one of these tags.
    pub tag_ids: Vec<TagId>,
}

impl ItemFilter {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Loads the owner's full item list and keeps the items matching every
/// supplied facet, in creation order.
pub fn filter_items<R: ItemRepository>(
    repo: &R,
    owner: &OwnerId,
    filter: &ItemFilter,
) -> CatalogResult<Vec<Item>> {
    let items = repo.list_items(owner)?;
    Ok(items
        .into_iter()
        .filter(|item| item_matches(item, filter))
        .collect())
}

/// Pure facet predicate for one item.
pub fn item_matches(item: &Item, filter: &ItemFilter) -> bool {
    if let Some(category_id) = filter.category_id {
        if item.category_id != Some(category_id) {
            return false;
        }
    }

    if let Some(bin_id) = filter.bin_id {
        if item.bin_id != Some(bin_id) {
            return false;
        }
    }

    if !filter.tag_ids.is_empty()
        && !item.tags.iter().any(|tag| filter.tag_ids.contains(&tag.id))
    {
        return false;
    }

    if let Some(needle) = normalize_text_facet(filter.text.as_deref()) {
        let in_name = item.name.to_lowercase().contains(&needle);
        let in_description = item
            .description
            .as_deref()
            .is_some_and(|description| description.to_lowercase().contains(&needle));
        let in_tags = item
            .tags
            .iter()
            .any(|tag| tag.name.to_lowercase().contains(&needle));
        if !(in_name || in_description || in_tags) {
            return false;
        }
    }

    true
}

/// Whitespace-only text does not narrow; an emptied search box means "show
/// everything".
fn normalize_text_facet(text: Option<&str>) -> Option<String> {
    let trimmed = text?.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::{item_matches, ItemFilter};
    use crate::model::item::Item;
    use crate::model::tag::Tag;
    use uuid::Uuid;

    fn item_with_tags(name: &str, tags: Vec<Tag>) -> Item {
        Item {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: None,
            condition: None,
            notes: None,
            bin_id: None,
            category_id: None,
            photo_ref: None,
            tags,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn empty_filter_matches_everything() {
        let item = item_with_tags("Lantern", Vec::new());
        assert!(item_matches(&item, &ItemFilter::new()));
    }

    #[test]
    fn text_facet_is_case_insensitive_and_covers_tag_names() {
        let tag = Tag {
            id: Uuid::new_v4(),
            name: "Halloween".to_string(),
        };
        let item = item_with_tags("Lantern", vec![tag]);

        let by_name = ItemFilter {
            text: Some("LANT".to_string()),
            ..ItemFilter::new()
        };
        assert!(item_matches(&item, &by_name));

        let by_tag = ItemFilter {
            text: Some("hallow".to_string()),
            ..ItemFilter::new()
        };
        assert!(item_matches(&item, &by_tag));

        let miss = ItemFilter {
            text: Some("skeleton".to_string()),
            ..ItemFilter::new()
        };
        assert!(!item_matches(&item, &miss));
    }

    #[test]
    fn blank_text_facet_does_not_narrow() {
        let item = item_with_tags("Lantern", Vec::new());
        let filter = ItemFilter {
            text: Some("   ".to_string()),
            ..ItemFilter::new()
        };
        assert!(item_matches(&item, &filter));
    }

    #[test]
    fn tag_facet_uses_or_semantics() {
        let wanted = Tag {
            id: Uuid::new_v4(),
            name: "pumpkin".to_string(),
        };
        let other = Uuid::new_v4();
        let item = item_with_tags("Lantern", vec![wanted.clone()]);

        let filter = ItemFilter {
            tag_ids: vec![wanted.id, other],
            ..ItemFilter::new()
        };
        assert!(item_matches(&item, &filter));

        let disjoint = ItemFilter {
            tag_ids: vec![other],
            ..ItemFilter::new()
        };
        assert!(!item_matches(&item, &disjoint));
    }
}
