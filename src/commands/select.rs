//! Line-based selector spoken to by the supervisor over the handoff file.
//!
//! Menus are numbered prompts on stdin/stdout. The result is reported
//! through the exit code; see [`crate::session::handoff`].

use crate::config::credentials::{is_authenticated, valid_credentials};
use crate::config::{ConfigStore, InstallationTarget, Provider, ProviderKind};
use crate::error::{MultiClaudeError, Result};
use crate::providers::{effective_models, ANTHROPIC_TEMPLATE_ID};
use crate::session::handoff::{
    self, OAuthLoginRequest, SelectionPayload, EXIT_CANCELLED, EXIT_LAUNCH, EXIT_OAUTH_REQUEST,
    SELECTION_FILE_ENV,
};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

const DEFAULT_ACCOUNT_NAME: &str = "Claude Account";

/// Entry point for `mclaude __select`. Returns the protocol exit code.
pub fn execute(store: &ConfigStore) -> Result<i32> {
    let selection_file = std::env::var_os(SELECTION_FILE_ENV)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .ok_or_else(|| {
            MultiClaudeError::InvalidArgs(format!(
                "{} is not set; the selector is started by mclaude itself.",
                SELECTION_FILE_ENV
            ))
        })?;

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut selector = LineSelector::new(store, &selection_file, stdin.lock(), stdout.lock());
    selector.run()
}

/// What the user picked in a menu.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Choice {
    Item(usize),
    Key(char),
}

enum Step<T> {
    Done(T),
    Back,
    Exit(i32),
}

pub struct LineSelector<'a, R, W> {
    store: &'a ConfigStore,
    selection_file: &'a Path,
    input: R,
    output: W,
}

impl<'a, R: BufRead, W: Write> LineSelector<'a, R, W> {
    pub fn new(store: &'a ConfigStore, selection_file: &'a Path, input: R, output: W) -> Self {
        Self {
            store,
            selection_file,
            input,
            output,
        }
    }

    pub fn run(&mut self) -> Result<i32> {
        loop {
            let config = self.store.load_migrated();
            let labels: Vec<String> = config
                .providers
                .iter()
                .map(|p| self.provider_label(p))
                .collect();

            let choice = self.choose(
                "Select a provider:",
                &labels,
                &[('a', "Add Anthropic account"), ('q', "Quit")],
            )?;
            let provider = match choice {
                None | Some(Choice::Key('q')) => return Ok(EXIT_CANCELLED),
                Some(Choice::Key(_)) => return self.add_account(),
                Some(Choice::Item(index)) => config.providers[index].clone(),
            };

            if provider.is_oauth() && !self.has_valid_login(&provider) {
                writeln!(self.output, "\"{}\" needs to log in again.", provider.name)?;
                let request = OAuthLoginRequest::new(&provider.id, &provider.name, false);
                handoff::write(self.selection_file, &request)?;
                return Ok(EXIT_OAUTH_REQUEST);
            }

            let model = if provider.is_oauth() {
                String::new()
            } else {
                match self.choose_model(&provider)? {
                    Step::Done(model) => model,
                    Step::Back => continue,
                    Step::Exit(code) => return Ok(code),
                }
            };

            let installation = match self.choose_installation(&config.installations)? {
                Step::Done(installation) => installation,
                Step::Back => continue,
                Step::Exit(code) => return Ok(code),
            };

            let payload = SelectionPayload::new(&provider, &model, installation.id());
            handoff::write(self.selection_file, &payload)?;
            tracing::debug!(provider = %provider.name, model = %model, installation = installation.id(), "selection written");
            return Ok(EXIT_LAUNCH);
        }
    }

    fn provider_label(&self, provider: &Provider) -> String {
        if !provider.is_oauth() {
            return format!("{} ({})", provider.name, provider.template_id);
        }
        let status = if !is_authenticated(self.store.layout(), &provider.id) {
            "not authenticated"
        } else if valid_credentials(self.store.layout(), &provider.id).is_none() {
            "token expired"
        } else {
            "authenticated"
        };
        format!("{} (Anthropic, {})", provider.name, status)
    }

    fn has_valid_login(&self, provider: &Provider) -> bool {
        is_authenticated(self.store.layout(), &provider.id)
            && valid_credentials(self.store.layout(), &provider.id).is_some()
    }

    fn add_account(&mut self) -> Result<i32> {
        let Some(name) = self.prompt(&format!("Account name [{}]: ", DEFAULT_ACCOUNT_NAME))? else {
            return Ok(EXIT_CANCELLED);
        };
        let name = if name.is_empty() {
            DEFAULT_ACCOUNT_NAME.to_string()
        } else {
            name
        };

        let provider = self.store.add_provider(Provider {
            id: uuid::Uuid::new_v4().to_string(),
            name,
            template_id: ANTHROPIC_TEMPLATE_ID.to_string(),
            kind: ProviderKind::Oauth,
            api_key: String::new(),
            models: Vec::new(),
            base_url: None,
        })?;

        let request = OAuthLoginRequest::new(&provider.id, &provider.name, true);
        handoff::write(self.selection_file, &request)?;
        Ok(EXIT_OAUTH_REQUEST)
    }

    fn choose_model(&mut self, provider: &Provider) -> Result<Step<String>> {
        let models = effective_models(provider);

        if !models.is_empty() {
            let choice = self.choose(
                &format!("Select a model for {}:", provider.name),
                &models,
                &[('o', "Other model..."), ('b', "Back")],
            )?;
            match choice {
                None => return Ok(Step::Exit(EXIT_CANCELLED)),
                Some(Choice::Item(index)) => return Ok(Step::Done(models[index].clone())),
                Some(Choice::Key('b')) => return Ok(Step::Back),
                Some(Choice::Key(_)) => {}
            }
        }

        Ok(match self.prompt("Model name (empty to go back): ")? {
            None => Step::Exit(EXIT_CANCELLED),
            Some(model) if model.is_empty() => Step::Back,
            Some(model) => Step::Done(model),
        })
    }

    fn choose_installation(
        &mut self,
        installations: &[crate::config::Installation],
    ) -> Result<Step<InstallationTarget>> {
        if installations.is_empty() {
            return Ok(Step::Done(InstallationTarget::Default));
        }

        let labels: Vec<String> = std::iter::once("Default".to_string())
            .chain(installations.iter().map(|i| i.name.clone()))
            .collect();
        match self.choose("Select an installation:", &labels, &[('b', "Back")])? {
            None => Ok(Step::Exit(EXIT_CANCELLED)),
            Some(Choice::Item(0)) => Ok(Step::Done(InstallationTarget::Default)),
            Some(Choice::Item(index)) => Ok(Step::Done(InstallationTarget::from(
                &installations[index - 1],
            ))),
            Some(Choice::Key(_)) => Ok(Step::Back),
        }
    }

    /// Show a numbered menu until a valid answer is given. `None` on EOF.
    fn choose(&mut self, title: &str, items: &[String], keys: &[(char, &str)]) -> Result<Option<Choice>> {
        loop {
            writeln!(self.output, "\n{}", title)?;
            for (i, item) in items.iter().enumerate() {
                writeln!(self.output, "  {}) {}", i + 1, item)?;
            }
            for (key, label) in keys {
                writeln!(self.output, "  {}) {}", key, label)?;
            }

            let Some(answer) = self.prompt("> ")? else {
                return Ok(None);
            };
            if let Some(choice) = parse_choice(&answer, items.len(), keys) {
                return Ok(Some(choice));
            }
            writeln!(self.output, "Invalid choice: {}", answer)?;
        }
    }

    /// Read one trimmed line. `None` on EOF.
    fn prompt(&mut self, label: &str) -> Result<Option<String>> {
        write!(self.output, "{}", label)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }
}

fn parse_choice(answer: &str, item_count: usize, keys: &[(char, &str)]) -> Option<Choice> {
    if let Ok(n) = answer.parse::<usize>() {
        return (1..=item_count).contains(&n).then(|| Choice::Item(n - 1));
    }
    let mut chars = answer.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => {
            let c = c.to_ascii_lowercase();
            keys.iter().any(|(key, _)| *key == c).then_some(Choice::Key(c))
        }
        _ => None,
    }
}
