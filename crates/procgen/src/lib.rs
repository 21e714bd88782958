//! Procedural content for the landing sequence: stars, the blob planet, and the room.

pub mod blob;
pub mod icosphere;
pub mod room;
pub mod starfield;

pub use blob::*;
pub use icosphere::*;
pub use room::*;
pub use starfield::*;
