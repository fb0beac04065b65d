use super::geometry::{Rect, Vec2};

pub type ItemId = u32;

pub const ITEM_SIZE_PX: i32 = 16;
pub const DEFAULT_ITEM_VALUE: u32 = 10;
pub const COIN_ITEM_ID: ItemId = 1;
pub const CHEST_ITEM_ID: ItemId = 999;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemKind {
    Coin,
    /// Collecting a chest wins the run.
    Chest,
}

impl ItemKind {
    pub fn display_name(self) -> &'static str {
        match self {
            ItemKind::Coin => "Gold Coin",
            ItemKind::Chest => "Treasure Chest",
        }
    }

    pub fn default_id(self) -> ItemId {
        match self {
            ItemKind::Coin => COIN_ITEM_ID,
            ItemKind::Chest => CHEST_ITEM_ID,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    id: ItemId,
    name: String,
    kind: ItemKind,
    position: Vec2,
    value: u32,
    active: bool,
}

impl Item {
    pub fn new(id: ItemId, name: impl Into<String>, kind: ItemKind, position: Vec2) -> Self {
        Self {
            id,
            name: name.into(),
            kind,
            position,
            value: DEFAULT_ITEM_VALUE,
            active: true,
        }
    }

    pub fn coin(position: Vec2) -> Self {
        Self::new(COIN_ITEM_ID, ItemKind::Coin.display_name(), ItemKind::Coin, position)
    }

    pub fn chest(position: Vec2) -> Self {
        Self::new(
            CHEST_ITEM_ID,
            ItemKind::Chest.display_name(),
            ItemKind::Chest,
            position,
        )
    }

    pub fn with_value(mut self, value: u32) -> Self {
        self.value = value;
        self
    }

    pub fn id(&self) -> ItemId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ItemKind {
        self.kind
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn value(&self) -> u32 {
        self.value
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn bounds(&self) -> Rect {
        Rect::from_position(self.position, 0, 0, ITEM_SIZE_PX, ITEM_SIZE_PX)
    }

    /// Deactivates the item. Returns false if it was already collected.
    pub fn collect(&mut self) -> bool {
        if !self.active {
            return false;
        }
        self.active = false;
        true
    }
}

/// Static scenery that blocks player movement.
#[derive(Debug, Clone, PartialEq)]
pub struct DecorObject {
    position: Vec2,
    width: i32,
    height: i32,
    sprite_key: String,
}

impl DecorObject {
    pub fn new(position: Vec2, width: i32, height: i32, sprite_key: impl Into<String>) -> Self {
        Self {
            position,
            width,
            height,
            sprite_key: sprite_key.into(),
        }
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn sprite_key(&self) -> &str {
        &self.sprite_key
    }

    pub fn bounds(&self) -> Rect {
        Rect::from_position(self.position, 0, 0, self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collect_is_terminal_and_idempotent() {
        let mut coin = Item::coin(Vec2::ZERO);
        assert!(coin.collect());
        assert!(!coin.is_active());
        assert!(!coin.collect());
        assert!(!coin.is_active());
    }

    #[test]
    fn item_bounds_are_fixed_box_at_position() {
        let item = Item::coin(Vec2::new(32.7, 48.2));
        assert_eq!(item.bounds(), Rect::new(32, 48, 16, 16));
    }

    #[test]
    fn chest_uses_reserved_id_and_name() {
        let chest = Item::chest(Vec2::ZERO);
        assert_eq!(chest.id(), CHEST_ITEM_ID);
        assert_eq!(chest.name(), "Treasure Chest");
        assert_eq!(chest.value(), DEFAULT_ITEM_VALUE);
    }

    #[test]
    fn decor_bounds_cover_full_size() {
        let decor = DecorObject::new(Vec2::new(10.0, 20.0), 32, 8, "decor/barrel");
        assert_eq!(decor.bounds(), Rect::new(10, 20, 32, 8));
    }
}
