pub mod beatmap;
pub mod control_point;
pub mod hit_object;
pub mod mods;
