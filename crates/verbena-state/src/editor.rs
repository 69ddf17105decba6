//! The tool configuration editor.
//!
//! `ConfigEditor` owns one node's configuration while it is being edited. It
//! drives the pure reducer, expands edits through the tool's derived rules,
//! and notifies its owner exactly once per edit with the full merged state.
//!
//! ```text
//! owner ──data──▶ ConfigEditor ──ConfigChange──▶ ChangeNotifier (owner)
//!                     │
//!          update_field / update_fields
//!                     │
//!           derived rules ─▶ reducer ─▶ new ConfigState
//! ```

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, warn};
use verbena_config::{ConfigError, ConfigMap, ToolConfig, ToolKind, is_blank};

use crate::error::{CheckError, SaveError};
use crate::notify::{ChangeNotifier, ConfigChange, NoopNotifier};
use crate::rules::{DerivedRule, expand};
use crate::save::{ConfigSaver, RemoteValidator, ValidationPolicy};
use crate::state::{Action, ConfigState, initialize, reduce};
use crate::validate::{ValidationError, ValidationRule, validate};

/// Everything an editor needs to know about one tool type.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolSpec {
  pub tool_id: String,
  /// Complete defaults record for the tool.
  pub defaults: ConfigMap,
  pub derived: Vec<DerivedRule>,
  pub validation: Vec<ValidationRule>,
  /// Fields that must be filled in before the tool can be test-run.
  pub required_for_test: Vec<String>,
  pub policy: ValidationPolicy,
}

impl ToolSpec {
  /// A spec with only defaults: no derived rules, no validation.
  pub fn new(tool_id: impl Into<String>, defaults: ConfigMap) -> Self {
    Self {
      tool_id: tool_id.into(),
      defaults,
      derived: Vec::new(),
      validation: Vec::new(),
      required_for_test: Vec::new(),
      policy: ValidationPolicy::default(),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorStatus {
  Editing,
  /// A save is in flight.
  Saving,
}

/// Proof of a pending save, returned by [`ConfigEditor::begin_save`].
#[derive(Debug)]
pub struct SaveTicket {
  snapshot: ConfigState,
}

impl SaveTicket {
  /// The configuration being saved.
  pub fn config(&self) -> &ConfigMap {
    self.snapshot.config()
  }
}

pub struct ConfigEditor<N: ChangeNotifier = NoopNotifier> {
  spec: Arc<ToolSpec>,
  state: ConfigState,
  /// Last configuration confirmed as persisted.
  baseline: ConfigState,
  /// The save in flight, if any.
  pending: Option<PendingSave>,
  notifier: N,
}

/// A save in flight: what was sent, and the baseline it was sent over.
#[derive(Debug, Clone)]
struct PendingSave {
  snapshot: ConfigState,
  baseline: ConfigState,
}

impl ConfigEditor<NoopNotifier> {
  /// Open an editor whose changes are not observed.
  pub fn new(spec: Arc<ToolSpec>, data: &ConfigMap) -> Self {
    Self::with_notifier(spec, data, NoopNotifier)
  }
}

impl<N: ChangeNotifier> ConfigEditor<N> {
  /// Open an editor seeded from the tool defaults merged with `data`.
  ///
  /// The seeded state is the baseline: a freshly opened editor is not dirty,
  /// and opening one does not notify.
  pub fn with_notifier(spec: Arc<ToolSpec>, data: &ConfigMap, notifier: N) -> Self {
    let state = initialize(data, &spec.defaults);
    Self {
      baseline: state.clone(),
      state,
      pending: None,
      spec,
      notifier,
    }
  }

  pub fn spec(&self) -> &ToolSpec {
    &self.spec
  }

  pub fn state(&self) -> &ConfigState {
    &self.state
  }

  /// The full merged configuration.
  pub fn config(&self) -> &ConfigMap {
    self.state.config()
  }

  pub fn get(&self, key: &str) -> Option<&Value> {
    self.state.get(key)
  }

  pub fn status(&self) -> EditorStatus {
    if self.pending.is_some() {
      EditorStatus::Saving
    } else {
      EditorStatus::Editing
    }
  }

  pub fn is_saving(&self) -> bool {
    self.pending.is_some()
  }

  /// Whether the configuration differs from the last confirmed baseline.
  pub fn is_dirty(&self) -> bool {
    self.state != self.baseline
  }

  /// Set one field (plus whatever the tool derives from it), then notify once.
  pub fn update_field(&mut self, key: impl Into<String>, value: Value) -> &ConfigState {
    let mut patch = ConfigMap::new();
    patch.insert(key.into(), value);
    self.apply_patch(patch)
  }

  /// Set several fields as one edit, then notify once.
  pub fn update_fields(&mut self, patch: ConfigMap) -> &ConfigState {
    self.apply_patch(patch)
  }

  fn apply_patch(&mut self, patch: ConfigMap) -> &ConfigState {
    let patch = expand(&self.spec.derived, self.state.config(), patch);
    let mut changed: Vec<String> = patch.keys().cloned().collect();
    changed.sort();

    self.state = reduce(&self.state, &self.spec.defaults, Action::SetFields(patch));
    debug!(tool_id = %self.spec.tool_id, fields = ?changed, "configuration updated");

    self.notifier.notify(ConfigChange {
      tool_id: self.spec.tool_id.clone(),
      config: self.state.shared(),
      changed,
    });
    &self.state
  }

  /// Re-seed from new external data (the owner's `data` changed under us).
  ///
  /// The new state becomes the baseline. This is not an edit and does not
  /// notify.
  pub fn replace_data(&mut self, data: ConfigMap) {
    self.state = reduce(&self.state, &self.spec.defaults, Action::Replace(data));
    self.baseline = self.state.clone();
  }

  /// Mark the current configuration as persisted by someone else.
  pub fn confirm_baseline(&mut self) {
    self.baseline = self.state.clone();
  }

  /// Run the local validation rules. Never changes state.
  pub fn validate(&self) -> Vec<ValidationError> {
    validate(self.state.config(), &self.spec.validation)
  }

  /// On-demand check according to the tool's [`ValidationPolicy`].
  ///
  /// Local and remote findings are concatenated, local first. Remote field
  /// errors come back keyed by field name.
  pub async fn check<V: RemoteValidator + ?Sized>(
    &self,
    remote: &V,
  ) -> Result<Vec<ValidationError>, CheckError> {
    let mut errors = if self.spec.policy.validates_locally() {
      self.validate()
    } else {
      Vec::new()
    };

    if self.spec.policy.validates_remotely() {
      let snapshot = self.state.shared();
      let field_errors = remote
        .validate(&self.spec.tool_id, &snapshot)
        .await
        .map_err(|source| CheckError::Remote { source })?;
      errors.extend(
        field_errors
          .into_iter()
          .map(|(field, message)| ValidationError::field(field, message)),
      );
    }

    Ok(errors)
  }

  /// Whether every field needed for a test run is filled in.
  pub fn can_test(&self) -> bool {
    self
      .spec
      .required_for_test
      .iter()
      .all(|field| self.state.get(field).is_some_and(|v| !is_blank(v)))
  }

  /// Parse the configuration into its typed record.
  pub fn typed(&self) -> Result<ToolConfig, ConfigError> {
    let kind: ToolKind = self.spec.tool_id.parse()?;
    ToolConfig::from_map(kind, self.state.config())
  }

  /// Enter the saving state.
  ///
  /// Fails with `Busy` if a save is already in flight, or `Invalid` if the
  /// policy validates locally and the rules fail. Edits stay allowed while
  /// saving.
  pub fn begin_save(&mut self) -> Result<SaveTicket, SaveError> {
    if self.pending.is_some() {
      return Err(SaveError::Busy);
    }
    if self.spec.policy.validates_locally() {
      let errors = self.validate();
      if !errors.is_empty() {
        return Err(SaveError::Invalid(errors));
      }
    }
    self.pending = Some(PendingSave {
      snapshot: self.state.clone(),
      baseline: self.baseline.clone(),
    });
    Ok(SaveTicket {
      snapshot: self.state.clone(),
    })
  }

  /// Leave the saving state with the saver's outcome.
  ///
  /// On success the saved snapshot becomes the baseline, unless the owner
  /// re-seeded or confirmed a newer baseline while the save was in flight. On
  /// failure nothing but the busy flag changes.
  pub fn finish_save<E>(&mut self, ticket: SaveTicket, outcome: Result<(), E>) -> Result<(), SaveError>
  where
    E: Into<crate::error::BoxError>,
  {
    let pending = match self.pending.take() {
      Some(pending) if pending.snapshot.same_as(&ticket.snapshot) => pending,
      other => {
        self.pending = other;
        return Err(SaveError::NotSaving);
      }
    };

    match outcome {
      Ok(()) => {
        info!(tool_id = %self.spec.tool_id, "configuration saved");
        if self.baseline.same_as(&pending.baseline) {
          self.baseline = ticket.snapshot;
        }
        Ok(())
      }
      Err(e) => {
        let source = e.into();
        warn!(tool_id = %self.spec.tool_id, error = %source, "configuration save rejected");
        Err(SaveError::Rejected { source })
      }
    }
  }

  /// Validate (per policy), save through `saver`, and settle the outcome.
  pub async fn save<S: ConfigSaver + ?Sized>(&mut self, saver: &S) -> Result<(), SaveError> {
    let ticket = self.begin_save()?;
    let outcome = saver.save(ticket.config()).await;
    self.finish_save(ticket, outcome)
  }
}
