use super::{ItemType, Variant};
use crate::metadata::Meta;

/// Pick the variant for an item from where it was found and its metadata.
///
/// `image` is only consulted for posts; a page with an `image` field is
/// still a plain page (or a data page).
pub fn classify(item_type: ItemType, meta: &Meta) -> Variant {
    let image = meta.is_truthy("image");
    let data = meta.is_truthy("data");
    match item_type {
        ItemType::Pages if data => Variant::DataPage,
        ItemType::Pages => Variant::Page,
        ItemType::Posts if image => Variant::ImagePost,
        ItemType::Posts if data => Variant::DataPost,
        ItemType::Posts => Variant::Post,
    }
}
