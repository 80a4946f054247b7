//! Ratatui-based interactive prediction form.
//!
//! The TUI edits the six input features, runs the same encode -> scale ->
//! predict chain as the HTTP API (via `ServingContext`), and renders the
//! formatted price. It loads the artifact bundle once at startup; a missing
//! bundle degrades to an on-screen notice rather than an exit.

use std::io;
use std::path::Path;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Terminal,
};

use crate::error::AppError;
use crate::serve::{Prediction, ServingContext};

/// Field labels, in display order. The last entry is the categorical field.
const FIELD_LABELS: [&str; 6] = [
    "Overall Quality (1-10)",
    "Living Area (sq ft)",
    "Basement Area (sq ft)",
    "Garage Cars",
    "Year Built",
    "Neighborhood",
];

const NEIGHBORHOOD_FIELD: usize = 5;

/// Start the TUI.
pub fn run(model_dir: &Path) -> Result<(), AppError> {
    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::internal(format!("Failed to initialize terminal: {e}")))?;

    let mut app = App::new(model_dir);
    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode()
            .map_err(|e| AppError::internal(format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::internal(format!(
                "Failed to enter alternate screen: {e}"
            )));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

struct App {
    context: Option<ServingContext>,
    /// Editable text for the five numeric fields, in canonical order.
    numeric_inputs: [String; 5],
    neighborhoods: Vec<String>,
    neighborhood_idx: usize,
    selected_field: usize,
    editing: bool,
    edit_buffer: String,
    status: String,
    prediction: Option<Prediction>,
}

impl App {
    fn new(model_dir: &Path) -> Self {
        let (context, status) = match ServingContext::load(model_dir) {
            Ok(ctx) => (Some(ctx), "Ready. Press p to predict.".to_string()),
            Err(e) => (None, format!("Model not loaded: {e}")),
        };
        let neighborhoods = context
            .as_ref()
            .map(|c| c.neighborhoods().to_vec())
            .unwrap_or_else(|| vec!["Ames".to_string()]);
        // Start from the documented serving defaults.
        let neighborhood_idx = neighborhoods.iter().position(|n| n == "Ames").unwrap_or(0);

        Self {
            context,
            numeric_inputs: [
                "5".to_string(),
                "1500".to_string(),
                "1000".to_string(),
                "2".to_string(),
                "2000".to_string(),
            ],
            neighborhoods,
            neighborhood_idx,
            selected_field: 0,
            editing: false,
            edit_buffer: String::new(),
            status,
            prediction: None,
        }
    }

    fn event_loop<B: ratatui::backend::Backend>(
        &mut self,
        terminal: &mut Terminal<B>,
    ) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::internal(format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::internal(format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::internal(format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code) {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Returns true when the app should exit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        if self.editing {
            match code {
                KeyCode::Enter => {
                    self.numeric_inputs[self.selected_field] = self.edit_buffer.clone();
                    self.editing = false;
                }
                KeyCode::Esc => self.editing = false,
                KeyCode::Backspace => {
                    self.edit_buffer.pop();
                }
                KeyCode::Char(c) if c.is_ascii_digit() || c == '.' || c == '-' => {
                    self.edit_buffer.push(c);
                }
                _ => {}
            }
            return false;
        }

        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Up => {
                self.selected_field = self.selected_field.saturating_sub(1);
            }
            KeyCode::Down => {
                self.selected_field = (self.selected_field + 1).min(FIELD_LABELS.len() - 1);
            }
            KeyCode::Left if self.selected_field == NEIGHBORHOOD_FIELD => {
                self.neighborhood_idx = self
                    .neighborhood_idx
                    .checked_sub(1)
                    .unwrap_or(self.neighborhoods.len() - 1);
            }
            KeyCode::Right if self.selected_field == NEIGHBORHOOD_FIELD => {
                self.neighborhood_idx = (self.neighborhood_idx + 1) % self.neighborhoods.len();
            }
            KeyCode::Enter if self.selected_field != NEIGHBORHOOD_FIELD => {
                self.editing = true;
                self.edit_buffer = self.numeric_inputs[self.selected_field].clone();
            }
            KeyCode::Char('p') | KeyCode::Enter => self.predict(),
            _ => {}
        }
        false
    }

    fn predict(&mut self) {
        let Some(ctx) = &self.context else {
            self.status = "Model not loaded. Run `hp train` first.".to_string();
            return;
        };

        // Route through the same JSON coercion the HTTP API uses so typed
        // text gets identical validation and error detail.
        let mut body = serde_json::Map::new();
        for (name, value) in crate::domain::NUMERIC_FEATURES.iter().zip(&self.numeric_inputs) {
            body.insert(name.to_string(), serde_json::Value::String(value.clone()));
        }
        body.insert(
            crate::domain::CATEGORICAL_FEATURE.to_string(),
            serde_json::Value::String(self.neighborhoods[self.neighborhood_idx].clone()),
        );

        match ctx.predict_json(&serde_json::Value::Object(body)) {
            Ok(prediction) => {
                self.status = "Ready. Press p to predict.".to_string();
                self.prediction = Some(prediction);
            }
            Err(e) => {
                self.status = e.to_string();
                self.prediction = None;
            }
        }
    }

    fn draw(&self, frame: &mut ratatui::Frame) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(10), Constraint::Length(3)])
            .split(frame.area());
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(rows[0]);

        self.draw_fields(frame, cols[0]);
        self.draw_result(frame, cols[1]);
        self.draw_status(frame, rows[1]);
    }

    fn draw_fields(&self, frame: &mut ratatui::Frame, area: Rect) {
        let items: Vec<ListItem> = FIELD_LABELS
            .iter()
            .enumerate()
            .map(|(i, label)| {
                let value = if i == NEIGHBORHOOD_FIELD {
                    format!("< {} >", self.neighborhoods[self.neighborhood_idx])
                } else if self.editing && i == self.selected_field {
                    format!("{}_", self.edit_buffer)
                } else {
                    self.numeric_inputs[i].clone()
                };

                let style = if i == self.selected_field {
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default()
                };
                ListItem::new(Line::from(vec![
                    Span::styled(format!("{label:<24}"), style),
                    Span::styled(value, style),
                ]))
            })
            .collect();

        let list = List::new(items).block(
            Block::default()
                .borders(Borders::ALL)
                .title(" House Features "),
        );
        frame.render_widget(list, area);
    }

    fn draw_result(&self, frame: &mut ratatui::Frame, area: Rect) {
        let mut lines = Vec::new();
        match &self.prediction {
            Some(p) => {
                lines.push(Line::from(Span::styled(
                    "Estimated sale price",
                    Style::default().add_modifier(Modifier::BOLD),
                )));
                lines.push(Line::from(Span::styled(
                    p.formatted.clone(),
                    Style::default()
                        .fg(Color::Green)
                        .add_modifier(Modifier::BOLD),
                )));
            }
            None => lines.push(Line::from("No prediction yet.")),
        }
        lines.push(Line::from(""));
        if let Some(ctx) = &self.context {
            let info = ctx.info();
            lines.push(Line::from(format!("Model: {}", info.algorithm)));
            lines.push(Line::from(format!("Encoded columns: {}", info.feature_count)));
        }
        lines.push(Line::from(""));
        lines.push(Line::from("up/down select • enter edit • left/right neighborhood"));
        lines.push(Line::from("p predict • q quit"));

        let panel = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title(" Prediction "));
        frame.render_widget(panel, area);
    }

    fn draw_status(&self, frame: &mut ratatui::Frame, area: Rect) {
        let status = Paragraph::new(self.status.clone())
            .block(Block::default().borders(Borders::ALL).title(" Status "));
        frame.render_widget(status, area);
    }
}
