// SPDX-License-Identifier: AGPL-3.0
// Rentboard CLI - Command shell
//
// Parses one line per command and drives the Browser. Stdin is read on its
// own thread and forwarded over a channel so the async loop never blocks.

use crate::render::{render_overlays, render_view};
use async_channel::Receiver;
use rentboard_core::{
    city_label, AdDraft, AppError, Browser, BrowserSettings, FetchError, LoadOutcome,
    SearchCriteria, SettingsStore, ViewId, MAX_DRAFT_IMAGES,
};
use std::io::BufRead;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::thread;

pub const HELP: &str = "\
Commands:
  search key=value ...   new search (city, minPrice, maxPrice, rooms)
  more                   next page of the current tab
  refresh                reload the current tab from the start
  tab search|newest|mine switch tabs
  show                   print the current tab
  image <n> [k]          open image k (default 1) of listing n
  close                  close the image
  form                   open the listing form
  set <field> <value>    edit the draft (city, rooms, price, address, description, phone)
  attach <path>          attach an image to the draft
  submit                 send the draft for moderation
  cancel                 close the form, keeping the draft
  config [key [value]]   show or change settings (apiBaseUrl, pageSize, userId, requestTimeoutSecs)
  quit                   exit";

const FORM_CLOSED: &str = "Open the form first with `form`.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Search(SearchCriteria),
    More,
    Refresh,
    Tab(ViewId),
    Show,
    /// 1-based listing and image numbers
    Image { record: usize, image: usize },
    Close,
    Form,
    Set { field: String, value: String },
    Attach(PathBuf),
    Submit,
    Cancel,
    /// Show all settings, or set `key` when a value is given
    Config { key: Option<String>, value: Option<String> },
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = AppError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (name, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let rest = rest.trim();

        let command = match name.to_ascii_lowercase().as_str() {
            "search" | "s" => {
                let mut criteria = SearchCriteria::default();
                for pair in rest.split_whitespace() {
                    let (key, value) = pair.split_once('=').ok_or_else(|| {
                        AppError::InvalidConfig(format!("Expected key=value, got {}", pair))
                    })?;
                    criteria.set(key, value)?;
                }
                Command::Search(criteria)
            }
            "more" | "m" => Command::More,
            "refresh" | "r" => Command::Refresh,
            "tab" | "t" => Command::Tab(rest.parse()?),
            "show" | "ls" => Command::Show,
            "image" | "img" => {
                let mut numbers = rest.split_whitespace().map(parse_position);
                let record = numbers.next().unwrap_or_else(|| {
                    Err(AppError::InvalidConfig("Which listing?".to_string()))
                })?;
                let image = numbers.next().transpose()?.unwrap_or(1);
                Command::Image { record, image }
            }
            "close" => Command::Close,
            "form" => Command::Form,
            "set" => {
                let (field, value) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
                if field.is_empty() {
                    return Err(AppError::InvalidConfig("Which field?".to_string()));
                }
                Command::Set {
                    field: field.to_string(),
                    value: value.trim().to_string(),
                }
            }
            "attach" => {
                if rest.is_empty() {
                    return Err(AppError::InvalidConfig("Which file?".to_string()));
                }
                Command::Attach(PathBuf::from(rest))
            }
            "submit" => Command::Submit,
            "cancel" => Command::Cancel,
            "config" => {
                let (key, value) = match rest.split_once(char::is_whitespace) {
                    Some((key, value)) => (Some(key.to_string()), Some(value.trim().to_string())),
                    None if rest.is_empty() => (None, None),
                    None => (Some(rest.to_string()), None),
                };
                Command::Config { key, value }
            }
            "help" | "?" => Command::Help,
            "quit" | "exit" | "q" => Command::Quit,
            other => {
                return Err(AppError::InvalidConfig(format!(
                    "Unknown command: {} (try `help`)",
                    other
                )))
            }
        };
        Ok(command)
    }
}

fn parse_position(raw: &str) -> Result<usize, AppError> {
    raw.parse::<usize>()
        .ok()
        .filter(|n| *n > 0)
        .ok_or_else(|| AppError::InvalidConfig(format!("Expected a number from 1, got {}", raw)))
}

/// What the loop should do after a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Flow {
    Continue(String),
    Quit,
}

/// Interactive session over a [`Browser`]
pub struct Shell {
    browser: Arc<Browser>,
    /// Where `config` writes; absent when the settings file is unavailable
    settings: Option<Arc<SettingsStore>>,
}

impl Shell {
    pub fn new(browser: Arc<Browser>) -> Self {
        Self {
            browser,
            settings: None,
        }
    }

    pub fn with_settings(mut self, settings: Arc<SettingsStore>) -> Self {
        self.settings = Some(settings);
        self
    }

    pub fn browser(&self) -> &Browser {
        &self.browser
    }

    pub async fn execute(&mut self, command: Command) -> Flow {
        let output = match command {
            Command::Search(criteria) => {
                if let Some(city) = &criteria.city {
                    if city_label(city).is_none() {
                        tracing::warn!("Unknown city code: {}", city);
                    }
                }
                let result = self.browser.search(criteria).await;
                self.describe(ViewId::Search, result)
            }
            Command::More => {
                let tab = self.browser.ui().active_tab;
                let result = self.browser.load_more(tab).await;
                self.describe(tab, result)
            }
            Command::Refresh => {
                let tab = self.browser.ui().active_tab;
                let result = self.browser.refresh(tab).await;
                self.describe(tab, result)
            }
            Command::Tab(view) => {
                self.browser.select_tab(view);
                if self.needs_first_page(view) {
                    let result = self.browser.load_more(view).await;
                    self.describe(view, result)
                } else {
                    render_view(&self.browser.view(view))
                }
            }
            Command::Show => {
                let mut out = render_view(&self.browser.active_view());
                if let Some(overlays) = render_overlays(&self.browser.ui()) {
                    out.push('\n');
                    out.push_str(&overlays);
                }
                out
            }
            Command::Image { record, image } => {
                let snapshot = self.browser.active_view();
                let url = record
                    .checked_sub(1)
                    .and_then(|i| snapshot.records.get(i))
                    .zip(image.checked_sub(1))
                    .and_then(|(ad, k)| ad.images.get(k))
                    .cloned();
                match url {
                    Some(url) => {
                        self.browser.open_modal(url.clone());
                        format!("[image] {}", url)
                    }
                    None => format!("Listing {} has no image {}", record, image),
                }
            }
            Command::Close => {
                self.browser.close_modal();
                "Image closed.".to_string()
            }
            Command::Form => {
                self.browser.open_form();
                render_overlays(&self.browser.ui()).unwrap_or_default()
            }
            Command::Set { field, value } => {
                let Some(mut draft) = self.open_draft() else {
                    return Flow::Continue(FORM_CLOSED.to_string());
                };
                match draft.set_field(&field, &value) {
                    Ok(()) => {
                        self.browser.edit_draft(draft);
                        format!("{} = {}", field, value)
                    }
                    Err(e) => e.to_string(),
                }
            }
            Command::Attach(path) => {
                let Some(mut draft) = self.open_draft() else {
                    return Flow::Continue(FORM_CLOSED.to_string());
                };
                if draft.attach_image(&path) {
                    let attached = draft.images.len();
                    self.browser.edit_draft(draft);
                    format!(
                        "Attached {} ({} of {})",
                        path.display(),
                        attached,
                        MAX_DRAFT_IMAGES
                    )
                } else {
                    format!("At most {} images per listing", MAX_DRAFT_IMAGES)
                }
            }
            Command::Submit => {
                let Some(draft) = self.open_draft() else {
                    return Flow::Continue(FORM_CLOSED.to_string());
                };
                match self.browser.submit_form(draft).await {
                    Ok(receipt) => format!(
                        "{} ({})\n{}",
                        receipt.message,
                        receipt.status,
                        render_view(&self.browser.view(ViewId::Mine))
                    ),
                    Err(e) => format!("Error: {}", e),
                }
            }
            Command::Cancel => {
                let draft = self.browser.ui().form_draft;
                self.browser.close_form(draft);
                "Form closed, draft kept.".to_string()
            }
            Command::Config { key, value } => self.config(key, value),
            Command::Help => HELP.to_string(),
            Command::Quit => return Flow::Quit,
        };

        Flow::Continue(output)
    }

    fn config(&self, key: Option<String>, value: Option<String>) -> String {
        let Some(store) = &self.settings else {
            return "Settings are unavailable in this session.".to_string();
        };

        match (key, value) {
            (Some(key), Some(value)) => match store.set(&key, &value) {
                Ok(_) => format!("{} saved, applies from the next start", key),
                Err(e) => e.to_string(),
            },
            (Some(key), None) => match store.get().get(&key) {
                Some(current) => format!("{} = {}", key, current),
                None => format!("Unknown setting: {}", key),
            },
            (None, _) => {
                let settings = store.get();
                BrowserSettings::KEYS
                    .iter()
                    .map(|key| format!("{} = {}", key, settings.get(key).unwrap_or_default()))
                    .collect::<Vec<_>>()
                    .join("\n")
            }
        }
    }

    /// The draft of the open form, if the form is open
    fn open_draft(&self) -> Option<AdDraft> {
        let ui = self.browser.ui();
        ui.form_open.then_some(ui.form_draft)
    }

    /// A tab that was never loaded gets its first page on selection. The
    /// search tab only does so once a search has run.
    fn needs_first_page(&self, view: ViewId) -> bool {
        let snapshot = self.browser.view(view);
        let untouched = snapshot.records.is_empty()
            && snapshot.offset == 0
            && !snapshot.exhausted
            && snapshot.error.is_none();

        untouched && (view != ViewId::Search || self.browser.session().is_searched)
    }

    fn describe(&self, view: ViewId, result: Result<LoadOutcome, FetchError>) -> String {
        match result {
            Ok(LoadOutcome::Exhausted) => "No more listings.".to_string(),
            Ok(LoadOutcome::InFlight) => "Still loading the previous page.".to_string(),
            Ok(LoadOutcome::Merged { .. }) | Ok(LoadOutcome::Stale) | Err(_) => {
                render_view(&self.browser.view(view))
            }
        }
    }
}

/// Forward stdin lines to the async side until EOF
pub fn stdin_lines() -> Receiver<String> {
    let (tx, rx) = async_channel::bounded::<String>(32);

    thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            match line {
                Ok(line) => {
                    if tx.send_blocking(line).is_err() {
                        break; // Shell gone
                    }
                }
                Err(e) => {
                    tracing::warn!("Failed to read stdin: {}", e);
                    break;
                }
            }
        }
    });

    rx
}
