pub mod item;
pub mod story_type;

pub use item::{Item, ItemKind, HN_ITEM_URL};
pub use story_type::StoryType;
