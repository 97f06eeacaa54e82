use crate::auth;
use crate::config::Config;
use crate::event::{Event, EventPump};
use crate::query::Query;
use crate::sheets::cached_client::CachedSheetsClient;
use crate::sheets::client::SheetsClient;
use crate::sheets::types::{CardConfig, SheetEntry};
use crate::ui;
use crate::ui::components::TextInput;
use chrono::NaiveDate;
use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{
  disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::prelude::*;
use std::io::stdout;
use std::time::Duration;
use tracing::info;

/// Wire format of the global check date
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Which login field has focus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginField {
  Username,
  Password,
}

impl LoginField {
  fn other(self) -> Self {
    match self {
      LoginField::Username => LoginField::Password,
      LoginField::Password => LoginField::Username,
    }
  }
}

/// State of the login screen
pub struct LoginScreen {
  pub username: TextInput,
  pub password: TextInput,
  pub focus: LoginField,
  pub error: Option<String>,
}

impl LoginScreen {
  fn new() -> Self {
    Self {
      username: TextInput::new(),
      password: TextInput::new(),
      focus: LoginField::Username,
      error: None,
    }
  }
}

/// One card widget: its config plus the dated row fetch backing it.
///
/// The query key is the date string, so a global-date change cancels any
/// in-flight fetch for the old date instead of letting it land.
pub struct CardPane {
  pub config: CardConfig,
  pub rows: Query<Vec<SheetEntry>>,
}

impl CardPane {
  fn new(client: &CachedSheetsClient, config: &CardConfig, date: &str) -> Self {
    let fetch_client = client.clone();
    let sheet_id = config.sheet_id.clone();
    let sheet_name = config.sheet_name.clone();

    let mut rows = Query::new(move |date: String| {
      let client = fetch_client.clone();
      let sheet_id = sheet_id.clone();
      let sheet_name = sheet_name.clone();
      async move {
        client
          .fetch_sheet_data(&sheet_id, &sheet_name, &date)
          .await
          .map_err(|e| e.to_string())
      }
    });
    rows.fetch_for(date);

    Self {
      config: config.clone(),
      rows,
    }
  }
}

/// State of the dashboard screen
pub struct DashboardScreen {
  pub users: Query<Vec<String>>,
  pub user_cursor: usize,
  pub selected_user: Option<String>,
  pub settings: Query<Vec<CardConfig>>,
  pub cards: Vec<CardPane>,
  /// First visible card-grid row when the grid overflows the viewport
  pub card_scroll: usize,
  /// Open while the operator is editing the global date
  pub date_editor: Option<TextInput>,
  pub date_error: Option<String>,
}

impl DashboardScreen {
  fn new(client: &CachedSheetsClient) -> Self {
    let users_client = client.clone();
    let mut users = Query::new(move |_key| {
      let client = users_client.clone();
      async move { client.fetch_all_users().await.map_err(|e| e.to_string()) }
    });
    users.fetch_for("all");

    let settings_client = client.clone();
    let settings = Query::new(move |username: String| {
      let client = settings_client.clone();
      async move {
        client
          .fetch_user_settings(&username)
          .await
          .map_err(|e| e.to_string())
      }
    });

    Self {
      users,
      user_cursor: 0,
      selected_user: None,
      settings,
      cards: Vec::new(),
      card_scroll: 0,
      date_editor: None,
      date_error: None,
    }
  }
}

pub enum Screen {
  Login(LoginScreen),
  Dashboard(DashboardScreen),
}

/// Main application state
pub struct App {
  config: Config,
  client: CachedSheetsClient,
  /// The global check date every card fetch is keyed on
  global_date: NaiveDate,
  screen: Screen,
  should_quit: bool,
}

impl App {
  pub fn new(config: Config, date: Option<NaiveDate>) -> Result<Self> {
    let endpoint = config.endpoint()?;
    let client = CachedSheetsClient::new(SheetsClient::new(endpoint));
    let global_date = date.unwrap_or_else(|| chrono::Local::now().date_naive());

    Ok(Self {
      config,
      client,
      global_date,
      screen: Screen::Login(LoginScreen::new()),
      should_quit: false,
    })
  }

  pub async fn run(&mut self) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let mut events = EventPump::new(Duration::from_millis(250));

    // Main loop
    while !self.should_quit {
      terminal.draw(|frame| ui::draw(frame, self))?;

      if let Some(event) = events.next().await {
        match event {
          Event::Key(key) => self.handle_key(key),
          Event::Tick => self.tick(),
          Event::Resize => {} // Redrawn on the next loop pass
        }
      }
    }

    // Cleanup terminal
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    Ok(())
  }

  fn tick(&mut self) {
    let date = self.date_string();
    if let Screen::Dashboard(dash) = &mut self.screen {
      dash.users.poll();

      // A resolved settings fetch replaces the card set
      if dash.settings.poll() {
        if let Some(configs) = dash.settings.data() {
          dash.cards = configs
            .iter()
            .map(|config| CardPane::new(&self.client, config, &date))
            .collect();
          dash.card_scroll = 0;
        }
      }

      for card in &mut dash.cards {
        card.rows.poll();
      }
    }
  }

  fn handle_key(&mut self, key: KeyEvent) {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
      self.should_quit = true;
      return;
    }

    match self.screen {
      Screen::Login(_) => self.handle_login_key(key),
      Screen::Dashboard(_) => self.handle_dashboard_key(key),
    }
  }

  fn handle_login_key(&mut self, key: KeyEvent) {
    let Screen::Login(login) = &mut self.screen else {
      return;
    };

    let mut submitted = false;
    match key.code {
      KeyCode::Tab | KeyCode::BackTab | KeyCode::Down | KeyCode::Up => {
        login.focus = login.focus.other();
      }
      KeyCode::Enter => match login.focus {
        // Enter in the username field moves on, like the form would
        LoginField::Username => login.focus = LoginField::Password,
        LoginField::Password => submitted = true,
      },
      KeyCode::Esc => {
        login.username.clear();
        login.password.clear();
        login.error = None;
        login.focus = LoginField::Username;
      }
      _ => {
        let field = match login.focus {
          LoginField::Username => &mut login.username,
          LoginField::Password => &mut login.password,
        };
        field.handle_key(key);
      }
    }

    if submitted {
      if !auth::verify(login.username.value(), login.password.value()) {
        login.error = Some("Invalid username or password".to_string());
        login.password.clear();
        return;
      }
      info!("operator logged in");
      self.screen = Screen::Dashboard(DashboardScreen::new(&self.client));
    }
  }

  fn handle_dashboard_key(&mut self, key: KeyEvent) {
    let current_date = self.global_date;
    let Screen::Dashboard(dash) = &mut self.screen else {
      return;
    };

    // The date prompt captures all input while open
    if let Some(editor) = &mut dash.date_editor {
      match key.code {
        KeyCode::Enter => {
          let raw = editor.value().to_string();
          match NaiveDate::parse_from_str(&raw, DATE_FORMAT) {
            Ok(date) => {
              dash.date_editor = None;
              dash.date_error = None;
              if date != current_date {
                self.apply_date(date);
              }
            }
            Err(_) => {
              dash.date_error = Some(format!("'{raw}' is not a YYYY-MM-DD date"));
            }
          }
        }
        KeyCode::Esc => {
          dash.date_editor = None;
          dash.date_error = None;
        }
        _ => {
          editor.handle_key(key);
        }
      }
      return;
    }

    match key.code {
      KeyCode::Char('q') => {
        self.should_quit = true;
      }
      KeyCode::Char('L') => {
        self.logout();
      }
      KeyCode::Char('d') => {
        let value = current_date.format(DATE_FORMAT).to_string();
        dash.date_editor = Some(TextInput::with_value(&value));
        dash.date_error = None;
      }
      KeyCode::Char('r') => {
        // Full refresh: forget cached rows and refetch everything visible,
        // card configs included
        self.client.reset_cache();
        dash.users.refetch();
        dash.settings.refetch();
        for card in &mut dash.cards {
          card.rows.refetch();
        }
      }
      KeyCode::Up | KeyCode::Char('k') => Self::move_cursor(dash, -1),
      KeyCode::Down | KeyCode::Char('j') => Self::move_cursor(dash, 1),
      // The renderer clamps against what actually fits the viewport
      KeyCode::PageDown => {
        let last_row = dash.cards.chunks(2).count().saturating_sub(1);
        dash.card_scroll = (dash.card_scroll + 1).min(last_row);
      }
      KeyCode::PageUp => {
        dash.card_scroll = dash.card_scroll.saturating_sub(1);
      }
      KeyCode::Enter => Self::toggle_selected_user(dash),
      KeyCode::Esc => {
        if dash.selected_user.is_some() {
          dash.selected_user = None;
          dash.settings.reset();
          dash.cards.clear();
          dash.card_scroll = 0;
        }
      }
      _ => {}
    }
  }

  fn move_cursor(dash: &mut DashboardScreen, delta: i32) {
    let len = dash.users.data().map(Vec::len).unwrap_or(0);
    if len > 0 {
      dash.user_cursor = (dash.user_cursor as i32 + delta).rem_euclid(len as i32) as usize;
    }
  }

  /// Select the user under the cursor; selecting the same user again
  /// deselects. Card configs are fetched fresh on every selection change.
  fn toggle_selected_user(dash: &mut DashboardScreen) {
    let Some(name) = dash
      .users
      .data()
      .and_then(|users| users.get(dash.user_cursor))
      .cloned()
    else {
      return;
    };

    dash.card_scroll = 0;
    if dash.selected_user.as_deref() == Some(name.as_str()) {
      dash.selected_user = None;
      dash.settings.reset();
      dash.cards.clear();
    } else {
      info!(user = %name, "user selected");
      dash.selected_user = Some(name.clone());
      dash.cards.clear();
      dash.settings.fetch_for(name);
    }
  }

  /// Change the global date: the entire row cache is reset and every card
  /// re-keys its fetch, cancelling fetches for the old date.
  fn apply_date(&mut self, date: NaiveDate) {
    info!(%date, "global date changed");
    self.global_date = date;
    self.client.reset_cache();

    let key = self.date_string();
    if let Screen::Dashboard(dash) = &mut self.screen {
      for card in &mut dash.cards {
        card.rows.fetch_for(key.clone());
      }
    }
  }

  /// Back to the login screen; session state and the cache do not survive
  fn logout(&mut self) {
    info!("operator logged out");
    self.client.reset_cache();
    self.screen = Screen::Login(LoginScreen::new());
  }

  // Accessors for rendering

  pub fn screen(&self) -> &Screen {
    &self.screen
  }

  pub fn title(&self) -> String {
    self.config.display_title()
  }

  pub fn date_string(&self) -> String {
    self.global_date.format(DATE_FORMAT).to_string()
  }
}
