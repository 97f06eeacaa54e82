use crate::app::{LoginField, LoginScreen};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};

use super::centered_rect;

/// Centered login form with masked password entry
pub fn draw(frame: &mut Frame, area: Rect, state: &LoginScreen) {
  let form = centered_rect(area, 44, 9);

  let block = Block::default()
    .title(" Operator Login ")
    .title_alignment(Alignment::Center)
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::Blue));
  frame.render_widget(block, form);

  let inner = form.inner(ratatui::layout::Margin {
    horizontal: 2,
    vertical: 1,
  });
  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // Username
      Constraint::Length(1),
      Constraint::Length(1), // Password
      Constraint::Length(1),
      Constraint::Length(1), // Error line
    ])
    .split(inner);

  draw_field(
    frame,
    rows[0],
    "Username",
    state.username.value(),
    state.focus == LoginField::Username,
  );

  let masked = "•".repeat(state.password.value().chars().count());
  draw_field(
    frame,
    rows[2],
    "Password",
    &masked,
    state.focus == LoginField::Password,
  );

  if let Some(error) = &state.error {
    let line = Paragraph::new(error.as_str()).style(Style::default().fg(Color::Red));
    frame.render_widget(line, rows[4]);
  }
}

fn draw_field(frame: &mut Frame, area: Rect, label: &str, value: &str, focused: bool) {
  let marker = if focused { "> " } else { "  " };
  let label_style = if focused {
    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
  } else {
    Style::default().fg(Color::DarkGray)
  };

  let line = Line::from(vec![
    Span::raw(marker),
    Span::styled(format!("{label:<9}"), label_style),
    Span::raw(value.to_string()),
    Span::styled(
      if focused { "_" } else { "" },
      Style::default().add_modifier(Modifier::SLOW_BLINK),
    ),
  ]);

  frame.render_widget(Paragraph::new(line), area);
}
