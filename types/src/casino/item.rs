use bytes::{Buf, BufMut};
use commonware_codec::{EncodeSize, Error, FixedSize, Read, ReadExt, Write};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{
    read_string, read_uuid, string_encode_size, write_string, write_uuid, MAX_ICON_LENGTH,
    MAX_NAME_LENGTH, UUID_ENCODE_SIZE,
};

/// Item rarity tiers, lowest to highest.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum Rarity {
    Common = 0,
    Rare = 1,
    Epic = 2,
    Mythic = 3,
    Legendary = 4,
}

impl Write for Rarity {
    fn write(&self, writer: &mut impl BufMut) {
        (*self as u8).write(writer);
    }
}

impl Read for Rarity {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let value = u8::read(reader)?;
        match value {
            0 => Ok(Self::Common),
            1 => Ok(Self::Rare),
            2 => Ok(Self::Epic),
            3 => Ok(Self::Mythic),
            4 => Ok(Self::Legendary),
            i => Err(Error::InvalidEnum(i)),
        }
    }
}

impl FixedSize for Rarity {
    const SIZE: usize = 1;
}

/// A tradeable item as configured in the catalog.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub id: u32,
    pub name: String,
    pub price: u64,
    pub rarity: Rarity,
    #[serde(default)]
    pub icon: String,
}

impl Write for CatalogItem {
    fn write(&self, writer: &mut impl BufMut) {
        self.id.write(writer);
        write_string(&self.name, MAX_NAME_LENGTH, writer);
        self.price.write(writer);
        self.rarity.write(writer);
        write_string(&self.icon, MAX_ICON_LENGTH, writer);
    }
}

impl Read for CatalogItem {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            id: u32::read(reader)?,
            name: read_string(reader, MAX_NAME_LENGTH)?,
            price: u64::read(reader)?,
            rarity: Rarity::read(reader)?,
            icon: read_string(reader, MAX_ICON_LENGTH)?,
        })
    }
}

impl EncodeSize for CatalogItem {
    fn encode_size(&self) -> usize {
        self.id.encode_size()
            + string_encode_size(&self.name, MAX_NAME_LENGTH)
            + self.price.encode_size()
            + Rarity::SIZE
            + string_encode_size(&self.icon, MAX_ICON_LENGTH)
    }
}

/// A concrete item owned by a player.
///
/// Every win mints a fresh `InventoryItem` with its own `unique_id` and serial, even when the
/// underlying catalog item is the same.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct InventoryItem {
    pub unique_id: Uuid,
    pub item: CatalogItem,
    /// Cosmetic serial number in 1..=MAX_SERIAL.
    pub serial: u16,
    /// Milliseconds since the Unix epoch.
    pub obtained_at: u64,
}

impl InventoryItem {
    pub fn item_id(&self) -> u32 {
        self.item.id
    }

    pub fn price(&self) -> u64 {
        self.item.price
    }
}

impl Write for InventoryItem {
    fn write(&self, writer: &mut impl BufMut) {
        write_uuid(&self.unique_id, writer);
        self.item.write(writer);
        self.serial.write(writer);
        self.obtained_at.write(writer);
    }
}

impl Read for InventoryItem {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            unique_id: read_uuid(reader)?,
            item: CatalogItem::read(reader)?,
            serial: u16::read(reader)?,
            obtained_at: u64::read(reader)?,
        })
    }
}

impl EncodeSize for InventoryItem {
    fn encode_size(&self) -> usize {
        UUID_ENCODE_SIZE
            + self.item.encode_size()
            + self.serial.encode_size()
            + self.obtained_at.encode_size()
    }
}
