//! Verbena State
//!
//! Configuration state synchronization for tool editors.
//!
//! The core is a pure reducer ([`initialize`], [`update_field`],
//! [`update_fields`], [`reduce`]) over an immutable [`ConfigState`]. A
//! [`ConfigEditor`] drives it for one node: it expands edits through the tool's
//! [`DerivedRule`]s, applies them as a single step, and reports each new state
//! to a [`ChangeNotifier`]. Validation and saving are explicit, on demand.

mod editor;
mod error;
mod notify;
mod rules;
mod save;
mod state;
mod validate;

pub use editor::{ConfigEditor, EditorStatus, SaveTicket, ToolSpec};
pub use error::{BoxError, CheckError, SaveError};
pub use notify::{ChangeNotifier, ChannelNotifier, ConfigChange, FnNotifier, NoopNotifier};
pub use rules::{DerivedRule, allocate, expand};
pub use save::{ConfigSaver, RemoteValidator, ValidationPolicy};
pub use state::{Action, ConfigState, initialize, reduce, update_field, update_fields};
pub use validate::{SUM_TOLERANCE, ValidationError, ValidationRule, validate};
