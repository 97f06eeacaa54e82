pub mod components;
mod dashboard;
mod login;

use crate::app::{App, Screen};
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

/// Main draw function
pub fn draw(frame: &mut Frame, app: &App) {
  let chunks = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Min(1),    // Main content
      Constraint::Length(1), // Status bar
    ])
    .split(frame.area());

  match app.screen() {
    Screen::Login(state) => login::draw(frame, chunks[0], state),
    Screen::Dashboard(state) => dashboard::draw(frame, chunks[0], app, state),
  }

  draw_status_bar(frame, chunks[1], app);
}

fn draw_status_bar(frame: &mut Frame, area: Rect, app: &App) {
  let (content, style) = match app.screen() {
    Screen::Login(_) => (
      " Tab:switch field  Enter:submit  Esc:clear  Ctrl-C:quit".to_string(),
      Style::default().fg(Color::DarkGray),
    ),
    Screen::Dashboard(dash) => {
      if let Some(editor) = &dash.date_editor {
        (
          format!(" date: {}", editor.value()),
          Style::default().fg(Color::Yellow),
        )
      } else if let Some(error) = &dash.date_error {
        (format!(" {}", error), Style::default().fg(Color::Red))
      } else {
        (
          " j/k:users  Enter:select  PgUp/PgDn:cards  d:date  r:refresh  L:logout  q:quit"
            .to_string(),
          Style::default().fg(Color::DarkGray),
        )
      }
    }
  };

  let paragraph = Paragraph::new(content).style(style);
  frame.render_widget(paragraph, area);
}

/// Center a fixed-size box inside an area, clamped to fit
pub(crate) fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
  let width = width.min(area.width);
  let height = height.min(area.height);
  Rect {
    x: area.x + (area.width - width) / 2,
    y: area.y + (area.height - height) / 2,
    width,
    height,
  }
}
