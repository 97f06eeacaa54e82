use crate::app::{App, CardPane, DashboardScreen};
use crate::card::{CardSummary, Completion};
use crate::query::QueryState;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap};

/// Height of one card row in the grid
const CARD_HEIGHT: u16 = 9;
/// Sidebar width in columns
const SIDEBAR_WIDTH: u16 = 28;

pub fn draw(frame: &mut Frame, area: Rect, app: &App, state: &DashboardScreen) {
  let chunks = Layout::default()
    .direction(Direction::Vertical)
    .constraints([Constraint::Length(3), Constraint::Min(0)])
    .split(area);

  draw_header(frame, chunks[0], app, state);

  let body = Layout::default()
    .direction(Direction::Horizontal)
    .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(0)])
    .split(chunks[1]);

  draw_sidebar(frame, body[0], state);
  draw_main(frame, body[1], app, state);
}

fn draw_header(frame: &mut Frame, area: Rect, app: &App, state: &DashboardScreen) {
  let block = Block::default()
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::Blue));

  let mut spans = vec![
    Span::styled(
      format!(" {} ", app.title()),
      Style::default().add_modifier(Modifier::BOLD),
    ),
    Span::raw("· check date "),
    Span::styled(app.date_string(), Style::default().fg(Color::Cyan)),
  ];
  if let Some(user) = &state.selected_user {
    spans.push(Span::raw(" · viewing "));
    spans.push(Span::styled(
      user.clone(),
      Style::default().fg(Color::Magenta),
    ));
  }

  let paragraph = Paragraph::new(Line::from(spans)).block(block);
  frame.render_widget(paragraph, area);
}

fn draw_sidebar(frame: &mut Frame, area: Rect, state: &DashboardScreen) {
  let users = state.users.data().map(Vec::as_slice).unwrap_or(&[]);

  let title = match state.users.state() {
    QueryState::Loading => " Users (loading...) ".to_string(),
    QueryState::Error(_) => " Users (error) ".to_string(),
    _ => format!(" Users ({}) ", users.len()),
  };

  let block = Block::default()
    .title(title)
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::Blue));

  if users.is_empty() {
    let content = match state.users.state() {
      QueryState::Loading => "Loading...".to_string(),
      QueryState::Error(e) => format!("Failed to load users: {e}\nPress 'r' to retry."),
      _ => "No users found.".to_string(),
    };
    let paragraph = Paragraph::new(content)
      .block(block)
      .style(Style::default().fg(Color::DarkGray))
      .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
    return;
  }

  let items: Vec<ListItem> = users
    .iter()
    .map(|user| {
      let selected = state.selected_user.as_deref() == Some(user.as_str());
      let marker = if selected { "● " } else { "  " };
      let style = if selected {
        Style::default().fg(Color::Magenta)
      } else {
        Style::default()
      };
      ListItem::new(Line::from(vec![
        Span::raw(marker),
        Span::styled(user.clone(), style),
      ]))
    })
    .collect();

  let list = List::new(items)
    .block(block)
    .highlight_style(
      Style::default()
        .bg(Color::DarkGray)
        .add_modifier(Modifier::BOLD),
    )
    .highlight_symbol("> ");

  // A refresh can shrink the list under the cursor
  let cursor = state.user_cursor.min(users.len().saturating_sub(1));
  let mut list_state = ListState::default();
  list_state.select(Some(cursor));
  frame.render_stateful_widget(list, area, &mut list_state);
}

fn draw_main(frame: &mut Frame, area: Rect, app: &App, state: &DashboardScreen) {
  let Some(user) = &state.selected_user else {
    let hint = Paragraph::new("Select a user from the sidebar (j/k, Enter).")
      .style(Style::default().fg(Color::DarkGray))
      .alignment(Alignment::Center);
    frame.render_widget(hint, area);
    return;
  };

  match state.settings.state() {
    QueryState::Idle | QueryState::Loading => {
      let text = Paragraph::new(format!("Loading cards for {user}..."))
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);
      frame.render_widget(text, area);
    }
    QueryState::Error(e) => {
      let text = Paragraph::new(format!("Failed to load settings: {e}"))
        .style(Style::default().fg(Color::Red))
        .wrap(Wrap { trim: true });
      frame.render_widget(text, area);
    }
    QueryState::Success(configs) if configs.is_empty() => {
      let text = Paragraph::new(format!("{user} has no cards configured."))
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);
      frame.render_widget(text, area);
    }
    QueryState::Success(_) => draw_card_grid(frame, area, app, &state.cards, state.card_scroll),
  }
}

/// Two cards per row, top to bottom. When the grid overflows the viewport a
/// scrolled window of rows is shown, with indicator lines counting the cards
/// hidden above and below.
fn draw_card_grid(frame: &mut Frame, area: Rect, app: &App, cards: &[CardPane], scroll: usize) {
  let rows: Vec<&[CardPane]> = cards.chunks(2).collect();

  let fits_whole = rows.len() as u16 * CARD_HEIGHT <= area.height;
  let (scroll, visible) = if fits_whole {
    (0, rows.len())
  } else {
    // One line above and below the grid for the hidden-card indicators
    let usable = area.height.saturating_sub(2);
    let visible = ((usable / CARD_HEIGHT) as usize).max(1);
    (scroll.min(rows.len() - visible), visible)
  };

  let hidden_above: usize = rows[..scroll].iter().map(|row| row.len()).sum();
  let hidden_below: usize = rows[scroll + visible..].iter().map(|row| row.len()).sum();

  let mut constraints = Vec::new();
  if !fits_whole {
    constraints.push(Constraint::Length(1));
  }
  constraints.extend(std::iter::repeat(Constraint::Length(CARD_HEIGHT)).take(visible));
  if !fits_whole {
    constraints.push(Constraint::Length(1));
  }

  let vertical = Layout::default()
    .direction(Direction::Vertical)
    .constraints(constraints)
    .split(area);

  let mut strips = vertical.iter();
  if !fits_whole {
    if let Some(top) = strips.next() {
      draw_hidden_indicator(frame, *top, hidden_above, "above (PgUp)");
    }
  }

  for (row, strip) in rows[scroll..scroll + visible].iter().zip(&mut strips) {
    let columns = Layout::default()
      .direction(Direction::Horizontal)
      .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
      .split(*strip);

    for (pane, cell) in row.iter().zip(columns.iter()) {
      draw_card(frame, *cell, app, pane);
    }
  }

  if !fits_whole {
    if let Some(bottom) = strips.next() {
      draw_hidden_indicator(frame, *bottom, hidden_below, "below (PgDn)");
    }
  }
}

fn draw_hidden_indicator(frame: &mut Frame, area: Rect, hidden: usize, direction: &str) {
  if hidden == 0 {
    return;
  }
  let label = if hidden == 1 { "card" } else { "cards" };
  let text = Paragraph::new(format!("{hidden} {label} {direction}"))
    .style(Style::default().fg(Color::DarkGray))
    .alignment(Alignment::Center);
  frame.render_widget(text, area);
}

fn draw_card(frame: &mut Frame, area: Rect, app: &App, pane: &CardPane) {
  let block = Block::default()
    .title(format!(" {} ", pane.config.title))
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));

  let content: Vec<Line> = match pane.rows.state() {
    QueryState::Idle | QueryState::Loading => {
      vec![Line::styled("Loading...", Style::default().fg(Color::DarkGray))]
    }
    QueryState::Error(e) => vec![Line::styled(
      format!("Error: {e}"),
      Style::default().fg(Color::Red),
    )],
    QueryState::Success(rows) if rows.is_empty() => vec![Line::styled(
      format!("No rows for {}", app.date_string()),
      Style::default().fg(Color::DarkGray),
    )],
    QueryState::Success(rows) => {
      summary_lines(&CardSummary::compute(rows, pane.config.target_count))
    }
  };

  let paragraph = Paragraph::new(content)
    .block(block)
    .wrap(Wrap { trim: true });
  frame.render_widget(paragraph, area);
}

fn summary_lines(summary: &CardSummary) -> Vec<Line<'static>> {
  let checked = summary.unique_numbers.len();

  let status = match summary.completion {
    Completion::Complete => Line::styled(
      format!("✓ Complete: {checked} numbers checked"),
      Style::default()
        .fg(Color::Green)
        .add_modifier(Modifier::BOLD),
    ),
    Completion::Incomplete { needed } => Line::styled(
      format!(
        "Incomplete ({checked}/{}): needs {needed} more",
        checked as u32 + needed
      ),
      Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD),
    ),
  };

  vec![
    status,
    Line::raw(""),
    labeled_line("Checked by: ", &summary.unique_users),
    labeled_line("Numbers:    ", &summary.unique_numbers),
  ]
}

fn labeled_line(label: &'static str, values: &[String]) -> Line<'static> {
  let joined = if values.is_empty() {
    "none".to_string()
  } else {
    values.join(", ")
  };
  Line::from(vec![
    Span::styled(label, Style::default().fg(Color::DarkGray)),
    Span::raw(joined),
  ])
}
