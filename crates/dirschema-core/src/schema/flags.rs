//! systemFlags bits

pub const ATTR_IS_CONSTRUCTED: i32 = 0x0000_0004;
pub const ATTR_IS_RDN: i32 = 0x0000_0020;
pub const DISALLOW_MOVE_ON_DELETE: i32 = 0x0200_0000;
pub const CONFIG_ALLOW_LIMITED_MOVE: i32 = 0x1000_0000;
pub const CONFIG_ALLOW_MOVE: i32 = 0x2000_0000;
pub const CONFIG_ALLOW_RENAME: i32 = 0x4000_0000;
pub const DISALLOW_DELETE: i32 = 0x8000_0000_u32 as i32;
