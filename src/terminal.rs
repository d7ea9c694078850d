// SPDX-License-Identifier: GPL-3.0-only

//! Terminal mesh viewer
//!
//! Rasterizes the mesh at twice the terminal's row count and shows it with
//! Unicode half-block characters, next to a parameter panel listing every
//! tunable with its keys.

use crate::app::{MeshApp, PARAMS, params};
use crate::constants::{APP_DIR_NAME, FRAME_POLL_INTERVAL};
use crate::errors::{AppError, AppResult};

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::Widget,
};
use std::io::{self, stdout};
use std::path::PathBuf;
use tracing::{error, info};

/// Columns reserved for the parameter panel
const PANEL_WIDTH: u16 = 30;
/// Panel is hidden below this terminal width
const MIN_WIDTH_FOR_PANEL: u16 = PANEL_WIDTH + 20;
/// Resolution of saved snapshots
const SNAPSHOT_SIZE: (u32, u32) = (1280, 720);

/// Run the terminal mesh viewer until the user quits
pub fn run(app: MeshApp) -> AppResult<()> {
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, mut app: MeshApp) -> AppResult<()> {
    info!(sensor = app.sensor_name(), "Starting terminal viewer");

    let mut show_help = false;
    let mut status_message = build_status_message();

    loop {
        app.update();

        terminal.draw(|f| {
            let area = f.area();
            let body = Rect {
                height: area.height.saturating_sub(1),
                ..area
            };

            let (mesh_area, panel_area) = if body.width >= MIN_WIDTH_FOR_PANEL {
                let mesh_width = body.width - PANEL_WIDTH;
                (
                    Rect {
                        width: mesh_width,
                        ..body
                    },
                    Some(Rect {
                        x: body.x + mesh_width,
                        width: PANEL_WIDTH,
                        ..body
                    }),
                )
            } else {
                (body, None)
            };

            let placeholder = placeholder_message(&app);
            let fb = app.draw(mesh_area.width as u32, mesh_area.height as u32 * 2);
            f.render_widget(
                FrameWidget {
                    framebuffer: fb,
                    placeholder,
                },
                mesh_area,
            );

            if let Some(panel_area) = panel_area {
                f.render_widget(ParamPanel { app: &app }, panel_area);
            }

            let status_area = Rect {
                x: area.x,
                y: area.height.saturating_sub(1),
                width: area.width,
                height: 1,
            };
            f.render_widget(
                StatusBar {
                    message: &status_message,
                },
                status_area,
            );
        })?;

        if event::poll(FRAME_POLL_INTERVAL)?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            // 'q' is a tilt key, so quitting is Esc or Ctrl+C
            if key.code == KeyCode::Esc
                || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL))
            {
                break;
            }

            match key.code {
                KeyCode::Char('h') => {
                    show_help = !show_help;
                    status_message = if show_help {
                        build_help_message()
                    } else {
                        build_status_message()
                    };
                }
                KeyCode::Char('p') => {
                    show_help = false;
                    status_message = match save_snapshot(&app) {
                        Ok(path) => format!("Saved: {}", path.display()),
                        Err(e) => {
                            error!("Failed to save snapshot: {}", e);
                            format!("Error: {}", e)
                        }
                    };
                }
                KeyCode::Char('0') => app.reset_rotation(),
                KeyCode::Left => app.rotate(-1.0, 0.0),
                KeyCode::Right => app.rotate(1.0, 0.0),
                KeyCode::Up => app.rotate(0.0, -1.0),
                KeyCode::Down => app.rotate(0.0, 1.0),
                KeyCode::Char(c) => {
                    app.tunables.handle_key(c);
                }
                _ => {}
            }
        }
    }

    info!(frames = app.frames_built(), "Terminal viewer closed");
    Ok(())
}

fn placeholder_message(app: &MeshApp) -> Option<&'static str> {
    if !app.mesh().is_empty() {
        None
    } else if app.sensor_connected() {
        Some("Waiting for depth frames...")
    } else {
        Some("No depth sensor connected")
    }
}

fn build_status_message() -> String {
    "'p' snapshot | 'h' help | Esc quit".to_string()
}

fn build_help_message() -> String {
    let mut msg = String::from("p: Snapshot | arrows: Rotate | 0: Reset view | ");
    msg.push_str(&format!(
        "{}: Wireframe | {}: Mode | Esc/Ctrl+C: Quit",
        params::KEY_WIREFRAME,
        params::KEY_MODE
    ));
    msg
}

/// `<pictures>/kinect-mesh`, falling back to the home directory
fn snapshot_directory() -> PathBuf {
    dirs::picture_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR_NAME)
}

/// Render the current mesh at snapshot resolution and save it as PNG
fn save_snapshot(app: &MeshApp) -> AppResult<PathBuf> {
    let (width, height) = SNAPSHOT_SIZE;
    let img = app
        .render_offscreen(width, height)
        .to_image()
        .ok_or_else(|| AppError::Other("Failed to create image".into()))?;

    let dir = snapshot_directory();
    std::fs::create_dir_all(&dir)?;

    let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    let filepath = dir.join(format!("MESH_{}.png", timestamp));

    img.save(&filepath)?;
    info!(path = %filepath.display(), "Snapshot saved");

    Ok(filepath)
}

/// Framebuffer shown with half-blocks: each cell covers two vertical pixels
struct FrameWidget<'a> {
    framebuffer: &'a crate::render::Framebuffer,
    placeholder: Option<&'static str>,
}

impl Widget for FrameWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if let Some(msg) = self.placeholder {
            let x = area.x + (area.width.saturating_sub(msg.len() as u16)) / 2;
            let y = area.y + area.height / 2;
            if y < area.y + area.height && x < area.x + area.width {
                buf.set_string(x, y, msg, Style::default());
            }
            return;
        }

        let fb = self.framebuffer;
        for ty in 0..area.height {
            for tx in 0..area.width {
                let top = fb.get_pixel(tx as i32, ty as i32 * 2).unwrap_or([0, 0, 0]);
                let bottom = fb
                    .get_pixel(tx as i32, ty as i32 * 2 + 1)
                    .unwrap_or([0, 0, 0]);

                if let Some(cell) = buf.cell_mut((area.x + tx, area.y + ty)) {
                    cell.set_char('▀');
                    cell.set_fg(Color::Rgb(top[0], top[1], top[2]));
                    cell.set_bg(Color::Rgb(bottom[0], bottom[1], bottom[2]));
                }
            }
        }
    }
}

/// Tunables with their current value and keys
struct ParamPanel<'a> {
    app: &'a MeshApp,
}

impl ParamPanel<'_> {
    fn lines(&self) -> Vec<(String, Style)> {
        let tunables = &self.app.tunables;
        let label = Style::default().fg(Color::White);
        let heading = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD);
        let dim = Style::default().fg(Color::Gray);

        let mut lines = vec![(" Parameters".to_string(), heading)];
        for spec in &PARAMS {
            lines.push((
                format!(
                    " {:<15} {:>7} {}/{}",
                    spec.name,
                    tunables.display_value(spec.id),
                    spec.key_incr,
                    spec.key_decr
                ),
                label,
            ));
        }
        lines.push((
            format!(
                " {:<15} {:>7} {}",
                "Wireframe",
                if tunables.wireframe { "on" } else { "off" },
                params::KEY_WIREFRAME
            ),
            label,
        ));
        lines.push((
            format!(
                " {:<11} {:>11} {}",
                "Mode",
                tunables.mode.display_name(),
                params::KEY_MODE
            ),
            label,
        ));
        lines.push((String::new(), label));
        lines.push((format!(" {}", self.app.sensor_name()), heading));
        lines.push((format!(" FPS: {:.1}", self.app.fps()), dim));
        lines.push((
            format!(" Triangles: {}", self.app.mesh().num_triangles()),
            dim,
        ));
        lines
    }
}

impl Widget for ParamPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        for y in area.y..area.y + area.height {
            for x in area.x..area.x + area.width {
                if let Some(cell) = buf.cell_mut((x, y)) {
                    cell.set_char(' ');
                    cell.set_bg(Color::Black);
                }
            }
        }

        for (row, (text, style)) in self.lines().into_iter().enumerate() {
            let y = area.y + row as u16;
            if y >= area.y + area.height {
                break;
            }
            buf.set_stringn(area.x, y, text, area.width as usize, style.bg(Color::Black));
        }
    }
}

/// Status bar widget
struct StatusBar<'a> {
    message: &'a str,
}

impl Widget for StatusBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        for x in area.x..area.x + area.width {
            if let Some(cell) = buf.cell_mut((x, area.y)) {
                cell.set_char(' ');
                cell.set_bg(Color::DarkGray);
            }
        }

        buf.set_stringn(
            area.x,
            area.y,
            self.message,
            area.width as usize,
            Style::default().fg(Color::White).bg(Color::DarkGray),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::Tunables;
    use crate::backends::sensor::{DisconnectedSensor, SyntheticSensor};

    #[test]
    fn test_panel_lists_every_param() {
        let app = MeshApp::new(Box::new(SyntheticSensor::new()), Tunables::default());
        let lines = ParamPanel { app: &app }.lines();
        for spec in &PARAMS {
            assert!(lines.iter().any(|(text, _)| text.contains(spec.name)));
        }
        assert!(lines.iter().any(|(text, _)| text.contains("RGB Texture")));
    }

    #[test]
    fn test_placeholder_for_disconnected_sensor() {
        let app = MeshApp::new(Box::new(DisconnectedSensor::new()), Tunables::default());
        assert_eq!(placeholder_message(&app), Some("No depth sensor connected"));
    }

    #[test]
    fn test_frame_widget_uses_half_blocks() {
        let mut app = MeshApp::new(Box::new(SyntheticSensor::new()), Tunables::default());
        app.update();
        let area = Rect::new(0, 0, 8, 4);
        let mut buf = Buffer::empty(area);
        let fb = app.draw(8, 8);
        FrameWidget {
            framebuffer: fb,
            placeholder: None,
        }
        .render(area, &mut buf);
        assert_eq!(buf[(0, 0)].symbol(), "▀");
    }
}
