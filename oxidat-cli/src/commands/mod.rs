//! Command implementations for OxiDat CLI.

pub mod list;
pub mod pack;
pub mod test;
pub mod unpack;

pub use list::cmd_list;
pub use pack::{PackArgs, cmd_pack};
pub use test::cmd_test;
pub use unpack::{UnpackArgs, cmd_unpack};
