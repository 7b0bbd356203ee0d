use crate::entities::player::{ClientId, LiveCharacter, Rgb, HIDE_ACCESSORY_FLAGS};
use crate::net::bits::{pack_bits, unpack_bits};
use crate::net::messages::ClientMessage;
use crate::net::packet::{PacketReader, PacketWriter};

/// Skin, colours and vitals of a character. In the binary form accessory
/// visibility travels as two bytes: flags 0-7 in the first, 8-9 in the low
/// bits of the second.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AppearanceRecord {
    pub skin_variant: u8,
    pub hair: u8,
    pub hair_dye: u8,
    pub hide_visual: [bool; HIDE_ACCESSORY_FLAGS],
    pub hide_misc: u8,
    pub hair_color: Rgb,
    pub skin_color: Rgb,
    pub eye_color: Rgb,
    pub shirt_color: Rgb,
    pub under_shirt_color: Rgb,
    pub pants_color: Rgb,
    pub shoe_color: Rgb,
    pub max_health: i16,
    pub max_mana: i16,
}

impl AppearanceRecord {
    pub fn capture(character: &LiveCharacter) -> Self {
        Self {
            skin_variant: character.skin_variant,
            hair: character.hair,
            hair_dye: character.hair_dye,
            hide_visual: character.hide_visible_accessory,
            hide_misc: character.hide_misc,
            hair_color: character.hair_color,
            skin_color: character.skin_color,
            eye_color: character.eye_color,
            shirt_color: character.shirt_color,
            under_shirt_color: character.under_shirt_color,
            pants_color: character.pants_color,
            shoe_color: character.shoe_color,
            max_health: saturate_i16(character.stat_life_max),
            max_mana: saturate_i16(character.stat_mana_max),
        }
    }

    /// Writes the record onto `character` and returns the refresh messages.
    ///
    /// The info refresh is always sent. Mana and health are only touched
    /// when the stored maximum is positive: a record captured from a
    /// character with no mana must not wipe the target's mana. When they are
    /// touched, both current and maximum are set to the stored maximum.
    pub fn apply(&self, client: ClientId, character: &mut LiveCharacter) -> Vec<ClientMessage> {
        character.skin_variant = self.skin_variant;
        character.hair = self.hair;
        character.hair_dye = self.hair_dye;
        character.hide_misc = self.hide_misc;
        character.hair_color = self.hair_color;
        character.skin_color = self.skin_color;
        character.eye_color = self.eye_color;
        character.shirt_color = self.shirt_color;
        character.under_shirt_color = self.under_shirt_color;
        character.pants_color = self.pants_color;
        character.shoe_color = self.shoe_color;
        character.hide_visible_accessory = self.hide_visual;

        let mut messages = vec![ClientMessage::PlayerInfo { client }];
        if self.max_mana > 0 {
            character.stat_mana_max = i32::from(self.max_mana);
            character.stat_mana = i32::from(self.max_mana);
            messages.push(ClientMessage::PlayerMana {
                client,
                mana: character.stat_mana,
                mana_max: character.stat_mana_max,
            });
        }
        if self.max_health > 0 {
            character.stat_life_max = i32::from(self.max_health);
            character.stat_life = i32::from(self.max_health);
            messages.push(ClientMessage::PlayerHp {
                client,
                life: character.stat_life,
                life_max: character.stat_life_max,
            });
        }
        messages
    }

    pub fn write(&self, writer: &mut PacketWriter) {
        writer.write_u8(self.skin_variant);
        writer.write_u8(self.hair);
        writer.write_u8(self.hair_dye);
        writer.write_u8(pack_bits(&self.hide_visual[..8]));
        writer.write_u8(pack_bits(&self.hide_visual[8..]));
        writer.write_u8(self.hide_misc);
        for color in self.colors() {
            writer.write_u8(color.r);
            writer.write_u8(color.g);
            writer.write_u8(color.b);
        }
        writer.write_i16_le(self.max_health);
        writer.write_i16_le(self.max_mana);
    }

    pub fn read(reader: &mut PacketReader<'_>) -> Option<Self> {
        let mut record = AppearanceRecord {
            skin_variant: reader.read_u8()?,
            hair: reader.read_u8()?,
            hair_dye: reader.read_u8()?,
            hide_visual: unpack_hide_flags(reader.read_u8()?, reader.read_u8()?),
            hide_misc: reader.read_u8()?,
            ..AppearanceRecord::default()
        };
        let mut colors = [Rgb::default(); 7];
        for color in colors.iter_mut() {
            *color = Rgb::new(reader.read_u8()?, reader.read_u8()?, reader.read_u8()?);
        }
        let [hair, skin, eye, shirt, under_shirt, pants, shoe] = colors;
        record.hair_color = hair;
        record.skin_color = skin;
        record.eye_color = eye;
        record.shirt_color = shirt;
        record.under_shirt_color = under_shirt;
        record.pants_color = pants;
        record.shoe_color = shoe;
        record.max_health = reader.read_i16_le()?;
        record.max_mana = reader.read_i16_le()?;
        Some(record)
    }

    fn colors(&self) -> [Rgb; 7] {
        [
            self.hair_color,
            self.skin_color,
            self.eye_color,
            self.shirt_color,
            self.under_shirt_color,
            self.pants_color,
            self.shoe_color,
        ]
    }
}

fn unpack_hide_flags(low: u8, high: u8) -> [bool; HIDE_ACCESSORY_FLAGS] {
    let low = unpack_bits(low);
    let high = unpack_bits(high);
    let mut flags = [false; HIDE_ACCESSORY_FLAGS];
    for (index, flag) in flags.iter_mut().enumerate() {
        *flag = if index < 8 { low[index] } else { high[index - 8] };
    }
    flags
}

fn saturate_i16(value: i32) -> i16 {
    value.clamp(i32::from(i16::MIN), i32::from(i16::MAX)) as i16
}
