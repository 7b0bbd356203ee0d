//! World-state packet.
//!
//! Sent to a single client around a swap so it renders the world
//! consistently and treats its character as server-owned while slots
//! change. Every call rebuilds the packet from the `WorldInfo` it is given.

use crate::net::bits::flag_byte;
use crate::net::messages::MESSAGE_WORLD_INFO;
use crate::net::packet::{PacketReader, PacketWriter};

/// Bit of [`ProgressionFlags`]' byte carrying the server-side-character mode.
pub const SERVER_SIDE_CHARACTER_BIT: u8 = 6;
pub const BACKGROUND_STYLES: usize = 16;
pub const UNIQUE_ID_LEN: usize = 16;

flag_byte! {
    pub struct DayFlags {
        0 => day_time,
        1 => blood_moon,
        2 => eclipse,
    }
}

flag_byte! {
    /// Bit 6 is reserved for the server-side-character flag, which the
    /// encoder supplies per call.
    pub struct ProgressionFlags {
        0 => shadow_orb_smashed,
        1 => downed_boss1,
        2 => downed_boss2,
        3 => downed_boss3,
        4 => hard_mode,
        5 => downed_clown,
        7 => downed_plant_boss,
    }
}

flag_byte! {
    pub struct MechanicalFlags {
        0 => downed_mech_boss1,
        1 => downed_mech_boss2,
        2 => downed_mech_boss3,
        3 => downed_mech_boss_any,
        4 => cloud_background_active,
        5 => crimson,
        6 => pumpkin_moon,
        7 => snow_moon,
    }
}

flag_byte! {
    pub struct EventFlags {
        1 => fast_forward_to_dawn,
        2 => slime_rain,
        3 => downed_slime_king,
        4 => downed_queen_bee,
        5 => downed_fishron,
        6 => downed_martians,
        7 => downed_ancient_cultist,
    }
}

flag_byte! {
    pub struct LateBossFlags {
        0 => downed_moonlord,
        1 => downed_halloween_king,
        2 => downed_halloween_tree,
        3 => downed_christmas_ice_queen,
        4 => downed_christmas_santank,
        5 => downed_christmas_tree,
        6 => downed_golem_boss,
        7 => party_is_up,
    }
}

flag_byte! {
    pub struct InvasionFlags {
        0 => downed_pirates,
        1 => downed_frost,
        2 => downed_goblins,
        3 => sandstorm_happening,
        4 => old_ones_army_ongoing,
        5 => downed_old_ones_army_t1,
        6 => downed_old_ones_army_t2,
        7 => downed_old_ones_army_t3,
    }
}

flag_byte! {
    pub struct CelestialFlags {
        0 => combat_book_used,
        1 => lanterns_up,
        2 => downed_tower_solar,
        3 => downed_tower_vortex,
        4 => downed_tower_nebula,
        5 => downed_tower_stardust,
        6 => force_halloween_today,
        7 => force_xmas_today,
    }
}

flag_byte! {
    pub struct TownFlags {
        0 => bought_cat,
        1 => bought_dog,
        2 => bought_bunny,
        3 => free_cake,
        4 => drunk_world,
        5 => downed_empress_of_light,
        6 => downed_queen_slime,
        7 => get_good_world,
    }
}

flag_byte! {
    pub struct SeedFlags {
        0 => tenth_anniversary_world,
        1 => dont_starve_world,
        2 => downed_deerclops,
        3 => not_the_bees_world,
        4 => remix_world,
        5 => unlocked_slime_blue_spawn,
        6 => combat_book_volume_two_used,
        7 => peddlers_satchel_used,
    }
}

flag_byte! {
    pub struct SlimeUnlockFlags {
        0 => unlocked_slime_green_spawn,
        1 => unlocked_slime_old_spawn,
        2 => unlocked_slime_purple_spawn,
        3 => unlocked_slime_rainbow_spawn,
        4 => unlocked_slime_red_spawn,
        5 => unlocked_slime_yellow_spawn,
        6 => unlocked_slime_copper_spawn,
        7 => fast_forward_to_dusk,
    }
}

flag_byte! {
    pub struct SecretSeedFlags {
        0 => no_traps_world,
        1 => zenith_world,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SavedOreTiers {
    pub copper: i16,
    pub iron: i16,
    pub silver: i16,
    pub gold: i16,
    pub cobalt: i16,
    pub mythril: i16,
    pub adamantite: i16,
}

impl SavedOreTiers {
    fn as_array(self) -> [i16; 7] {
        [
            self.copper,
            self.iron,
            self.silver,
            self.gold,
            self.cobalt,
            self.mythril,
            self.adamantite,
        ]
    }

    fn from_array(values: [i16; 7]) -> Self {
        let [copper, iron, silver, gold, cobalt, mythril, adamantite] = values;
        Self {
            copper,
            iron,
            silver,
            gold,
            cobalt,
            mythril,
            adamantite,
        }
    }
}

/// Global world state the packet mirrors. The host refreshes it each tick.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WorldInfo {
    pub time: i32,
    pub day: DayFlags,
    pub moon_phase: u8,
    pub max_tiles_x: i16,
    pub max_tiles_y: i16,
    pub spawn_tile_x: i16,
    pub spawn_tile_y: i16,
    pub world_surface: i16,
    pub rock_layer: i16,
    pub world_id: i32,
    pub world_name: String,
    pub game_mode: u8,
    pub unique_id: [u8; UNIQUE_ID_LEN],
    pub generator_version: u64,
    pub moon_type: u8,
    /// Thirteen biome background styles followed by the ice, jungle and
    /// hell back styles.
    pub background_styles: [u8; BACKGROUND_STYLES],
    pub wind_speed_target: f32,
    pub num_clouds: u8,
    pub tree_x: [i32; 3],
    pub tree_style: [u8; 4],
    pub cave_back_x: [i32; 3],
    pub cave_back_style: [u8; 4],
    /// Tree-top variation block, already serialized by the host.
    pub tree_tops: Vec<u8>,
    pub max_raining: f32,
    pub progression: ProgressionFlags,
    pub mechanical: MechanicalFlags,
    pub events: EventFlags,
    pub late_bosses: LateBossFlags,
    pub invasions: InvasionFlags,
    pub celestial: CelestialFlags,
    pub town: TownFlags,
    pub seeds: SeedFlags,
    pub slime_unlocks: SlimeUnlockFlags,
    pub secret_seeds: SecretSeedFlags,
    pub sundial_cooldown: u8,
    pub moondial_cooldown: u8,
    pub ore_tiers: SavedOreTiers,
    pub invasion_type: i8,
    pub lobby_id: Option<u64>,
    pub sandstorm_severity: f32,
    /// Host runs with server-side characters permanently enabled.
    pub server_side_characters: bool,
}

/// Encodes the full packet. `server_side_character` drives the
/// authoritative-character bit regardless of what the host normally
/// announces.
pub fn write_world_info(world: &WorldInfo, server_side_character: bool) -> Result<Vec<u8>, String> {
    let mut writer = PacketWriter::with_capacity(192 + world.world_name.len() + world.tree_tops.len());
    writer.write_u16_le(0);
    writer.write_u8(MESSAGE_WORLD_INFO);
    writer.write_i32_le(world.time);
    writer.write_u8(world.day.to_byte());
    writer.write_u8(world.moon_phase);
    writer.write_i16_le(world.max_tiles_x);
    writer.write_i16_le(world.max_tiles_y);
    writer.write_i16_le(world.spawn_tile_x);
    writer.write_i16_le(world.spawn_tile_y);
    writer.write_i16_le(world.world_surface);
    writer.write_i16_le(world.rock_layer);
    writer.write_i32_le(world.world_id);
    writer.write_string_str(&world.world_name);
    writer.write_u8(world.game_mode);
    writer.write_bytes(&world.unique_id);
    writer.write_u64_le(world.generator_version);
    writer.write_u8(world.moon_type);
    writer.write_bytes(&world.background_styles);
    writer.write_f32_le(world.wind_speed_target);
    writer.write_u8(world.num_clouds);
    for x in world.tree_x {
        writer.write_i32_le(x);
    }
    writer.write_bytes(&world.tree_style);
    for x in world.cave_back_x {
        writer.write_i32_le(x);
    }
    writer.write_bytes(&world.cave_back_style);
    writer.write_bytes(&world.tree_tops);
    writer.write_f32_le(world.max_raining);

    let mut progression = world.progression.to_byte();
    if server_side_character {
        progression |= 1 << SERVER_SIDE_CHARACTER_BIT;
    }
    writer.write_u8(progression);
    writer.write_u8(world.mechanical.to_byte());
    writer.write_u8(world.events.to_byte());
    writer.write_u8(world.late_bosses.to_byte());
    writer.write_u8(world.invasions.to_byte());
    writer.write_u8(world.celestial.to_byte());
    writer.write_u8(world.town.to_byte());
    writer.write_u8(world.seeds.to_byte());
    writer.write_u8(world.slime_unlocks.to_byte());
    writer.write_u8(world.secret_seeds.to_byte());

    writer.write_u8(world.sundial_cooldown);
    writer.write_u8(world.moondial_cooldown);
    for tier in world.ore_tiers.as_array() {
        writer.write_i16_le(tier);
    }
    writer.write_i8(world.invasion_type);
    writer.write_u64_le(world.lobby_id.unwrap_or(0));
    writer.write_f32_le(world.sandstorm_severity);

    let len = u16::try_from(writer.len())
        .map_err(|_| format!("world info packet too large: {} bytes", writer.len()))?;
    writer.patch_u16_le(0, len)?;
    Ok(writer.into_vec())
}

/// A decoded world-state packet.
#[derive(Debug, Clone, PartialEq)]
pub struct WorldInfoPacket {
    pub length: u16,
    pub world: WorldInfo,
    pub server_side_character: bool,
}

/// Decodes a packet produced by [`write_world_info`]. The tree-top block is
/// opaque, so its length must be supplied by the caller.
pub fn parse_world_info(data: &[u8], tree_tops_len: usize) -> Result<WorldInfoPacket, String> {
    let mut reader = PacketReader::new(data);
    let truncated = || "world info packet truncated".to_string();
    let length = reader.read_u16_le().ok_or_else(truncated)?;
    if usize::from(length) != data.len() {
        return Err(format!(
            "world info length prefix {} does not match {} bytes",
            length,
            data.len()
        ));
    }
    let message_type = reader.read_u8().ok_or_else(truncated)?;
    if message_type != MESSAGE_WORLD_INFO {
        return Err(format!("unexpected message type {}", message_type));
    }

    let mut world = WorldInfo::default();
    world.time = reader.read_i32_le().ok_or_else(truncated)?;
    world.day = DayFlags::from_byte(reader.read_u8().ok_or_else(truncated)?);
    world.moon_phase = reader.read_u8().ok_or_else(truncated)?;
    world.max_tiles_x = reader.read_i16_le().ok_or_else(truncated)?;
    world.max_tiles_y = reader.read_i16_le().ok_or_else(truncated)?;
    world.spawn_tile_x = reader.read_i16_le().ok_or_else(truncated)?;
    world.spawn_tile_y = reader.read_i16_le().ok_or_else(truncated)?;
    world.world_surface = reader.read_i16_le().ok_or_else(truncated)?;
    world.rock_layer = reader.read_i16_le().ok_or_else(truncated)?;
    world.world_id = reader.read_i32_le().ok_or_else(truncated)?;
    world.world_name = reader.read_string_lossy().ok_or_else(truncated)?;
    world.game_mode = reader.read_u8().ok_or_else(truncated)?;
    world.unique_id = reader.read_array().ok_or_else(truncated)?;
    world.generator_version = reader.read_u64_le().ok_or_else(truncated)?;
    world.moon_type = reader.read_u8().ok_or_else(truncated)?;
    world.background_styles = reader.read_array().ok_or_else(truncated)?;
    world.wind_speed_target = reader.read_f32_le().ok_or_else(truncated)?;
    world.num_clouds = reader.read_u8().ok_or_else(truncated)?;
    for x in world.tree_x.iter_mut() {
        *x = reader.read_i32_le().ok_or_else(truncated)?;
    }
    world.tree_style = reader.read_array().ok_or_else(truncated)?;
    for x in world.cave_back_x.iter_mut() {
        *x = reader.read_i32_le().ok_or_else(truncated)?;
    }
    world.cave_back_style = reader.read_array().ok_or_else(truncated)?;
    world.tree_tops = reader.read_bytes(tree_tops_len).ok_or_else(truncated)?.to_vec();
    world.max_raining = reader.read_f32_le().ok_or_else(truncated)?;

    let progression = reader.read_u8().ok_or_else(truncated)?;
    let server_side_character = progression & (1 << SERVER_SIDE_CHARACTER_BIT) != 0;
    world.progression = ProgressionFlags::from_byte(progression);
    world.mechanical = MechanicalFlags::from_byte(reader.read_u8().ok_or_else(truncated)?);
    world.events = EventFlags::from_byte(reader.read_u8().ok_or_else(truncated)?);
    world.late_bosses = LateBossFlags::from_byte(reader.read_u8().ok_or_else(truncated)?);
    world.invasions = InvasionFlags::from_byte(reader.read_u8().ok_or_else(truncated)?);
    world.celestial = CelestialFlags::from_byte(reader.read_u8().ok_or_else(truncated)?);
    world.town = TownFlags::from_byte(reader.read_u8().ok_or_else(truncated)?);
    world.seeds = SeedFlags::from_byte(reader.read_u8().ok_or_else(truncated)?);
    world.slime_unlocks = SlimeUnlockFlags::from_byte(reader.read_u8().ok_or_else(truncated)?);
    world.secret_seeds = SecretSeedFlags::from_byte(reader.read_u8().ok_or_else(truncated)?);

    world.sundial_cooldown = reader.read_u8().ok_or_else(truncated)?;
    world.moondial_cooldown = reader.read_u8().ok_or_else(truncated)?;
    let mut tiers = [0i16; 7];
    for tier in tiers.iter_mut() {
        *tier = reader.read_i16_le().ok_or_else(truncated)?;
    }
    world.ore_tiers = SavedOreTiers::from_array(tiers);
    world.invasion_type = reader.read_i8().ok_or_else(truncated)?;
    let lobby_id = reader.read_u64_le().ok_or_else(truncated)?;
    world.lobby_id = if lobby_id == 0 { None } else { Some(lobby_id) };
    world.sandstorm_severity = reader.read_f32_le().ok_or_else(truncated)?;
    if reader.remaining() != 0 {
        return Err(format!("world info has {} trailing bytes", reader.remaining()));
    }

    Ok(WorldInfoPacket {
        length,
        world,
        server_side_character,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Offset of the progression byte for a world named `name` with the
    /// given tree-top block length.
    fn progression_offset(name_len: usize, tree_tops_len: usize) -> usize {
        let varint_len = if name_len < 0x80 { 1 } else if name_len < 0x4000 { 2 } else { 3 };
        2 + 1 + 4 + 1 + 1 + 12 + 4 + varint_len + name_len + 1 + 16 + 8 + 1
            + BACKGROUND_STYLES + 4 + 1 + 12 + 4 + 12 + 4 + tree_tops_len + 4
    }

    fn sample_world() -> WorldInfo {
        WorldInfo {
            time: 27_000,
            day: DayFlags {
                day_time: true,
                blood_moon: false,
                eclipse: true,
            },
            moon_phase: 3,
            max_tiles_x: 4200,
            max_tiles_y: 1200,
            spawn_tile_x: 2100,
            spawn_tile_y: 300,
            world_surface: 350,
            rock_layer: 500,
            world_id: 123_456,
            world_name: "Swap Test".to_string(),
            game_mode: 1,
            unique_id: [7; UNIQUE_ID_LEN],
            generator_version: 0x0000_0100_0000_0117,
            moon_type: 2,
            background_styles: [1; BACKGROUND_STYLES],
            wind_speed_target: 0.5,
            num_clouds: 40,
            tree_x: [100, 200, 300],
            tree_style: [0, 1, 2, 3],
            cave_back_x: [400, 500, 600],
            cave_back_style: [3, 2, 1, 0],
            tree_tops: vec![0xaa; 13],
            max_raining: 0.25,
            progression: ProgressionFlags {
                downed_boss1: true,
                hard_mode: true,
                downed_plant_boss: true,
                ..ProgressionFlags::default()
            },
            mechanical: MechanicalFlags {
                crimson: true,
                ..MechanicalFlags::default()
            },
            events: EventFlags {
                fast_forward_to_dawn: true,
                ..EventFlags::default()
            },
            town: TownFlags {
                bought_cat: true,
                get_good_world: true,
                ..TownFlags::default()
            },
            secret_seeds: SecretSeedFlags {
                no_traps_world: false,
                zenith_world: true,
            },
            sundial_cooldown: 4,
            moondial_cooldown: 1,
            ore_tiers: SavedOreTiers {
                copper: 7,
                iron: 6,
                silver: 9,
                gold: 8,
                cobalt: 107,
                mythril: 108,
                adamantite: 111,
            },
            invasion_type: -1,
            lobby_id: Some(0x1122_3344_5566_7788),
            sandstorm_severity: 0.75,
            ..WorldInfo::default()
        }
    }

    #[test]
    fn length_prefix_matches_buffer() {
        let data = write_world_info(&sample_world(), false).expect("encode");
        let len = u16::from_le_bytes([data[0], data[1]]);
        assert_eq!(usize::from(len), data.len());
        assert_eq!(data[2], MESSAGE_WORLD_INFO);
    }

    #[test]
    fn length_prefix_matches_long_world_names() {
        let mut world = sample_world();
        for name_len in [0usize, 1, 127, 128, 1000, 16_383, 16_384, 60_000] {
            world.world_name = "n".repeat(name_len);
            let data = write_world_info(&world, true).expect("encode");
            assert_eq!(usize::from(u16::from_le_bytes([data[0], data[1]])), data.len());
            assert_eq!(
                data[progression_offset(name_len, world.tree_tops.len())] & (1 << SERVER_SIDE_CHARACTER_BIT),
                1 << SERVER_SIDE_CHARACTER_BIT
            );
        }
    }

    #[test]
    fn oversized_packet_is_rejected() {
        let mut world = sample_world();
        world.world_name = "n".repeat(70_000);
        let err = write_world_info(&world, false).expect_err("too large");
        assert!(err.contains("too large"));
    }

    #[test]
    fn server_side_character_bit_follows_parameter() {
        let world = sample_world();
        let offset = progression_offset(world.world_name.len(), world.tree_tops.len());
        let forced = write_world_info(&world, true).expect("encode");
        let ordinary = write_world_info(&world, false).expect("encode");
        assert_eq!(forced.len(), ordinary.len());
        assert_eq!(forced[offset], 0b1101_0010);
        assert_eq!(ordinary[offset], 0b1001_0010);
        let differing: Vec<usize> = (0..forced.len())
            .filter(|index| forced[*index] != ordinary[*index])
            .collect();
        assert_eq!(differing, vec![offset]);
    }

    #[test]
    fn parse_recovers_every_field() {
        let world = sample_world();
        let data = write_world_info(&world, true).expect("encode");
        let packet = parse_world_info(&data, world.tree_tops.len()).expect("parse");
        assert_eq!(packet.length as usize, data.len());
        assert!(packet.server_side_character);
        assert_eq!(packet.world, world);
    }

    #[test]
    fn missing_lobby_is_written_as_zero() {
        let mut world = sample_world();
        world.lobby_id = None;
        let data = write_world_info(&world, false).expect("encode");
        let tail = &data[data.len() - 12..data.len() - 4];
        assert_eq!(tail, &[0u8; 8]);
        let packet = parse_world_info(&data, world.tree_tops.len()).expect("parse");
        assert_eq!(packet.world.lobby_id, None);
        assert!(!packet.server_side_character);
    }

    #[test]
    fn fixed_section_layout() {
        let world = sample_world();
        let data = write_world_info(&world, false).expect("encode");
        assert_eq!(&data[3..7], &27_000i32.to_le_bytes());
        assert_eq!(data[7], 0b0000_0101);
        assert_eq!(data[8], 3);
        assert_eq!(&data[9..11], &4200i16.to_le_bytes());
        assert_eq!(&data[21..25], &123_456i32.to_le_bytes());
        assert_eq!(data[25], 9);
        assert_eq!(&data[26..35], b"Swap Test");
        let tail_start = data.len() - (2 + 14 + 1 + 8 + 4);
        assert_eq!(data[tail_start], 4);
        assert_eq!(data[tail_start + 1], 1);
        assert_eq!(&data[tail_start + 2..tail_start + 4], &7i16.to_le_bytes());
        assert_eq!(data[tail_start + 16], 0xff);
    }

    #[test]
    fn parse_rejects_wrong_prefix() {
        let world = sample_world();
        let mut data = write_world_info(&world, false).expect("encode");
        data.push(0);
        assert!(parse_world_info(&data, world.tree_tops.len()).is_err());
    }
}
