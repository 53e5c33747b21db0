use crate::session::{ClientSession, ConnectionState};
use macroquad::prelude::*;
use shared::{Entity, Map, Rect, Vec2 as WorldVec, ENTITY_HEIGHT, ENTITY_WIDTH};

/// Screen offset that centres `focus` in a `width` x `height` view.
pub fn camera_offset(focus: WorldVec, width: f32, height: f32) -> WorldVec {
    WorldVec::new(
        width as f64 / 2.0 - (focus.x + ENTITY_WIDTH / 2.0),
        height as f64 / 2.0 - (focus.y + ENTITY_HEIGHT / 2.0),
    )
}

pub fn status_text(state: &ConnectionState) -> String {
    match state {
        ConnectionState::Disconnected => "disconnected".to_string(),
        ConnectionState::Connecting => "connecting".to_string(),
        ConnectionState::AwaitingHandshakeAck => "joining".to_string(),
        ConnectionState::Synced => "connected".to_string(),
        ConnectionState::Failed(reason) => format!("failed: {}", reason),
    }
}

pub struct Renderer {
    width: f32,
    height: f32,
}

impl Renderer {
    pub fn new(width: f32, height: f32) -> Self {
        Renderer { width, height }
    }

    pub fn render(&mut self, session: &ClientSession, map: &Map, fake_ping_ms: u64) {
        self.width = screen_width();
        self.height = screen_height();

        clear_background(Color::from_rgba(26, 26, 26, 255));

        let focus = session
            .local_entity()
            .map(|entity| entity.position)
            .unwrap_or(map.origin);
        let offset = camera_offset(focus, self.width, self.height);

        for platform in &map.platforms {
            self.draw_platform(platform, offset);
        }

        for entity in session.roster() {
            let is_local = Some(entity.id.as_str()) == session.local_id();
            let color = if is_local {
                GREEN
            } else {
                Color::from_rgba(255, 68, 68, 255)
            };
            self.draw_entity(entity, offset, color);
        }

        self.draw_ui(session, fake_ping_ms);
    }

    fn draw_platform(&mut self, platform: &Rect, offset: WorldVec) {
        let x = (platform.x + offset.x) as f32;
        let y = (platform.y + offset.y) as f32;
        draw_rectangle(
            x,
            y,
            platform.width as f32,
            platform.height as f32,
            Color::from_rgba(68, 68, 68, 255),
        );
    }

    fn draw_entity(&mut self, entity: &Entity, offset: WorldVec, color: Color) {
        let x = (entity.position.x + offset.x) as f32;
        let y = (entity.position.y + offset.y) as f32;
        let (w, h) = (ENTITY_WIDTH as f32, ENTITY_HEIGHT as f32);

        draw_rectangle(x, y, w, h, color);
        draw_rectangle_lines(x, y, w, h, 2.0, WHITE);

        let label = measure_text(&entity.display_name, None, 16, 1.0);
        draw_text(
            &entity.display_name,
            x + w / 2.0 - label.width / 2.0,
            y - 6.0,
            16.0,
            WHITE,
        );
    }

    fn draw_ui(&mut self, session: &ClientSession, fake_ping_ms: u64) {
        let status = status_text(session.state());
        let status_color = if session.is_synced() { GREEN } else { RED };
        draw_rectangle(10.0, 10.0, 8.0, 8.0, status_color);
        draw_text(&status, 24.0, 18.0, 16.0, WHITE);

        let players = format!(
            "{} players  tick {}  +{}ms",
            session.roster().len(),
            session.last_tick(),
            fake_ping_ms
        );
        draw_text(&players, 10.0, 36.0, 16.0, WHITE);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camera_centres_entity() {
        let offset = camera_offset(WorldVec::new(0.0, -50.0), 800.0, 600.0);
        // Entity centre (25, 0) lands on the screen centre (400, 300).
        assert_eq!(offset, WorldVec::new(375.0, 300.0));
    }

    #[test]
    fn test_status_text() {
        assert_eq!(status_text(&ConnectionState::Synced), "connected");
        assert_eq!(
            status_text(&ConnectionState::Failed("timeout".to_string())),
            "failed: timeout"
        );
    }
}
