use std::sync::Arc;

use generation_provider::{GenerationRequest, Language, Transport};
use studio_store::{
    load_language, load_settings_value, load_theme, save_language, save_settings, save_theme,
    HistoryLog, HistoryStore, StoreError, Theme, UnitKey, UnitStore,
};

use crate::session::{SessionController, SessionEvent, SessionOutcome};
use crate::settings::{reconcile, resolve_selected_model, Settings};

/// UI-facing state: the editable input, the live output, the last visible
/// error and the persisted preferences around one [`SessionController`].
pub struct Studio {
    units: Arc<dyn UnitStore>,
    controller: Arc<SessionController>,
    defaults: Settings,
    settings: Settings,
    selected_model: String,
    credential_override: Option<String>,
    language: Language,
    theme: Theme,
    input: String,
    output: String,
    error: Option<String>,
}

impl Studio {
    /// Load settings, history and preferences from `units`.
    pub fn open(units: Arc<dyn UnitStore>, transport: Arc<dyn Transport>) -> Self {
        let defaults = Settings::builtin_defaults();
        let settings = reconcile(load_settings_value(units.as_ref()).as_ref(), &defaults);
        let selected_model = resolve_selected_model(&settings.model_catalog, "")
            .unwrap_or_default()
            .to_owned();
        let history = HistoryStore::open(Arc::clone(&units));
        let language = load_language(units.as_ref());
        let theme = load_theme(units.as_ref());

        Self {
            controller: Arc::new(SessionController::new(transport, history)),
            units,
            defaults,
            settings,
            selected_model,
            credential_override: None,
            language,
            theme,
            input: String::new(),
            output: String::new(),
            error: None,
        }
    }

    /// Shared handle for stopping a session from another task.
    #[must_use]
    pub fn controller(&self) -> Arc<SessionController> {
        Arc::clone(&self.controller)
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn output(&self) -> &str {
        &self.output
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn selected_model(&self) -> &str {
        &self.selected_model
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    #[must_use]
    pub fn history(&self) -> HistoryLog {
        self.controller.history_log()
    }

    #[must_use]
    pub fn is_generating(&self) -> bool {
        self.controller.running_session().is_some()
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    /// Select a catalog model. Unknown models leave the selection unchanged.
    pub fn select_model(&mut self, model: &str) -> bool {
        if self.settings.model_catalog.iter().any(|entry| entry == model) {
            self.selected_model = model.to_owned();
            true
        } else {
            false
        }
    }

    /// Use `credential` for requests instead of the stored one. Not persisted.
    pub fn set_credential_override(&mut self, credential: Option<String>) {
        self.credential_override = credential;
    }

    /// Generate from the current input, mirroring fragments into the output.
    ///
    /// Blank input is a no-op and returns `None`.
    pub async fn generate(
        &mut self,
        on_fragment: &mut (dyn FnMut(&str) + Send),
    ) -> Option<SessionOutcome> {
        if self.input.trim().is_empty() {
            return None;
        }

        self.error = None;
        self.output.clear();

        let mut connection = self.settings.connection();
        if let Some(credential) = &self.credential_override {
            connection.credential = credential.clone();
        }
        let request = GenerationRequest::new(
            self.input.clone(),
            self.language,
            self.selected_model.clone(),
            connection,
        );

        let controller = Arc::clone(&self.controller);
        let output = &mut self.output;
        let outcome = controller
            .generate(request, &mut |event| {
                if let SessionEvent::Fragment { text, .. } = event {
                    output.push_str(&text);
                    on_fragment(&text);
                }
            })
            .await;

        if let SessionOutcome::Failed(error) = &outcome {
            self.error = Some(error.to_string());
        }
        Some(outcome)
    }

    /// Stop the running session and discard its partial output.
    pub fn cancel(&mut self) {
        self.controller.stop();
        self.output.clear();
    }

    pub fn clear(&mut self) {
        self.input.clear();
        self.output.clear();
        self.error = None;
    }

    /// Restore a past generation into the editor.
    pub fn select_history(&mut self, id: i64) -> bool {
        let log = self.controller.history_log();
        let Some(record) = log.find(id) else {
            return false;
        };

        self.input = record.input_text.clone();
        self.output = record.output_text.clone();
        self.error = None;
        true
    }

    /// Re-read and reconcile the stored settings.
    pub fn load_settings(&mut self) -> &Settings {
        let stored = load_settings_value(self.units.as_ref());
        self.apply_settings(reconcile(stored.as_ref(), &self.defaults));
        &self.settings
    }

    /// Reconcile `edited` and persist the result.
    pub fn save_settings(&mut self, edited: &Settings) -> Result<&Settings, StoreError> {
        let value = serde_json::to_value(edited)
            .map_err(|source| StoreError::json_serialize(UnitKey::Settings.as_str(), source))?;
        let reconciled = reconcile(Some(&value), &self.defaults);
        save_settings(self.units.as_ref(), &reconciled)?;
        tracing::debug!(settings = ?reconciled, "settings saved");

        self.apply_settings(reconciled);
        Ok(&self.settings)
    }

    pub fn load_history(&mut self) -> HistoryLog {
        self.controller
            .with_history(|history| history.load().clone())
    }

    pub fn clear_history(&mut self) -> Result<(), StoreError> {
        self.controller.with_history(HistoryStore::clear)
    }

    pub fn set_language(&mut self, language: Language) -> Result<(), StoreError> {
        save_language(self.units.as_ref(), language)?;
        self.language = language;
        Ok(())
    }

    pub fn toggle_theme(&mut self) -> Result<Theme, StoreError> {
        let theme = self.theme.toggled();
        save_theme(self.units.as_ref(), theme)?;
        self.theme = theme;
        Ok(theme)
    }

    fn apply_settings(&mut self, settings: Settings) {
        self.selected_model = resolve_selected_model(&settings.model_catalog, &self.selected_model)
            .unwrap_or_default()
            .to_owned();
        self.settings = settings;
    }
}
