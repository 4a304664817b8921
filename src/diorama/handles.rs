use crate::gfx::scene::{LightId, ObjectId};

/// Ids of everything that is touched after assembly.
///
/// The scene owns the objects; this only names them. Ids stay valid for the
/// lifetime of the scene because nothing is ever removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SceneHandles {
    pub spot_light: LightId,
    pub candle_lights: [LightId; 2],
    pub table_top: ObjectId,
    pub table_leg: ObjectId,
    pub table_base: ObjectId,
}
