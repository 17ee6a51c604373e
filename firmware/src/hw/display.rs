//! Display stand-in that mirrors draw calls to the defmt log.

use handheld_core::animation::{DieFace, ScreenPoint};
use handheld_core::hal::Renderer;

pub struct DefmtRenderer;

impl Renderer for DefmtRenderer {
    fn clear(&mut self) {
        defmt::info!("display: clear");
    }

    fn draw_value_at(&mut self, face: DieFace, origin: ScreenPoint) {
        defmt::info!(
            "display: die {=u8} at ({=u16},{=u16})",
            face.value(),
            origin.x,
            origin.y
        );
    }
}
