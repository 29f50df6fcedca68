use super::CountdownApp;
use crate::models::WindowGeometry;

impl CountdownApp {
    /// Re-apply the remembered window geometry once, on the first frame.
    pub(super) fn apply_pending_root_geometry(&mut self, ctx: &egui::Context) {
        let Some(geometry) = self.pending_root_geometry.take() else {
            return;
        };
        if !geometry.is_plausible() {
            log::warn!(
                "Ignoring persisted root geometry due to implausible size: {:?}",
                geometry
            );
            return;
        }

        log::debug!("Restoring root geometry {:?}", geometry);
        ctx.send_viewport_cmd(egui::ViewportCommand::OuterPosition(egui::pos2(
            geometry.x, geometry.y,
        )));
        ctx.send_viewport_cmd(egui::ViewportCommand::InnerSize(egui::vec2(
            geometry.width,
            geometry.height,
        )));
    }

    /// Track the window's current geometry so it can be stored on exit.
    pub(super) fn capture_root_geometry(&mut self, ctx: &egui::Context) {
        let Some(geometry) = viewport_info(ctx, egui::ViewportId::ROOT)
            .as_ref()
            .and_then(geometry_from_viewport_info)
        else {
            return;
        };
        if !geometry.is_plausible() {
            log::debug!(
                "Skipping root geometry capture due to implausible size: {:?}",
                geometry
            );
            return;
        }
        let needs_update = match self.last_root_geometry {
            Some(current) => current.differs_from(&geometry),
            None => true,
        };
        if needs_update {
            log::debug!("Captured new root geometry: {:?}", geometry);
            self.last_root_geometry = Some(geometry);
        }
    }
}

pub(super) fn viewport_info(
    ctx: &egui::Context,
    viewport_id: egui::ViewportId,
) -> Option<egui::ViewportInfo> {
    ctx.input(|input| input.raw.viewports.get(&viewport_id).cloned())
}

/// Outer position plus inner size, the pair the window is restored from.
pub(super) fn geometry_from_viewport_info(info: &egui::ViewportInfo) -> Option<WindowGeometry> {
    let inner = info.inner_rect?;
    let (outer_left, outer_top) = info
        .outer_rect
        .map(|outer| (outer.left(), outer.top()))
        .unwrap_or((inner.left(), inner.top()));

    Some(WindowGeometry {
        x: outer_left,
        y: outer_top,
        width: inner.width(),
        height: inner.height(),
    })
}
