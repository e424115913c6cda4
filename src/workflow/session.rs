//! Rename sessions
//!
//! A [`RenameSession`] holds the proposal for one group and moves between
//! [`SessionState`]s on discrete [`Command`]s. It does not know where the
//! commands come from.

use std::path::PathBuf;
use std::time::Duration;

use log::{debug, warn};

use crate::discovery::MultifileGroup;
use crate::errors::{Error, Result, generic_error};
use crate::naming::NamingCatalog;
use crate::range::{LazyIndexableView, RangeDescriptor};
use crate::rename::{
    ExecutionReport, PartialRange, RenameMode, RenameOptions, RenamePlan, build_plan,
    execute_plan,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// A proposal is waiting for a decision
    Proposed,
    Confirmed,
    Skipped,
    /// The user asked to stop processing altogether
    Aborted,
}

impl SessionState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, SessionState::Proposed)
    }
}

/// A decision or an edit of the current proposal
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Confirm,
    Skip,
    Quit,
    /// Number the group backwards
    Reverse,
    /// Use the catalog entry with this 1-based menu number
    Choose(usize),
    /// Continue numbering from this literal token
    Example(String),
    /// Re-slice the current output numbering
    Reslice(RangeDescriptor),
    Partial(PartialRange),
    ClearPartial,
}

/// The outcome of a confirmed session
#[derive(Debug, Clone)]
pub struct RenamedGroup {
    pub group: MultifileGroup,
    pub report: ExecutionReport,
}

#[derive(Debug)]
pub struct RenameSession<'a> {
    catalog: &'a NamingCatalog,
    group: MultifileGroup,
    naming: LazyIndexableView,
    pre_part: String,
    output_dir: Option<PathBuf>,
    partial: Option<PartialRange>,
    mode: RenameMode,
    plan: Option<RenamePlan>,
    last_error: Option<Error>,
    state: SessionState,
}

impl<'a> RenameSession<'a> {
    /// Starts a session proposing `options` for `group`
    pub fn new(catalog: &'a NamingCatalog, group: MultifileGroup, options: RenameOptions) -> Self {
        let mut session = RenameSession {
            catalog,
            group,
            naming: options.naming().clone(),
            pre_part: options.pre_part().to_string(),
            output_dir: options.output_dir().map(PathBuf::from),
            partial: options.partial().cloned(),
            mode: options.mode(),
            plan: None,
            last_error: None,
            state: SessionState::Proposed,
        };
        session.rebuild();
        session
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn group(&self) -> &MultifileGroup {
        &self.group
    }

    pub fn catalog(&self) -> &NamingCatalog {
        self.catalog
    }

    pub fn naming(&self) -> &LazyIndexableView {
        &self.naming
    }

    pub fn partial(&self) -> Option<&PartialRange> {
        self.partial.as_ref()
    }

    /// The current proposal, absent while the settings do not fit the group
    pub fn plan(&self) -> Option<&RenamePlan> {
        self.plan.as_ref()
    }

    /// Why the last command could not be applied
    pub fn last_error(&self) -> Option<&Error> {
        self.last_error.as_ref()
    }

    pub fn options(&self) -> RenameOptions {
        RenameOptions::builder(self.naming.clone())
            .pre_part(self.pre_part.clone())
            .output_dir(self.output_dir.clone())
            .partial(self.partial.clone())
            .mode(self.mode)
            .build()
    }

    /// Applies `command` and returns the resulting state
    pub fn apply(&mut self, command: Command) -> SessionState {
        if self.state.is_terminal() {
            warn!("Ignoring {command:?}, the session is already {:?}", self.state);
            return self.state;
        }
        debug!("Applying {command:?} to {}", self.group);

        match command {
            Command::Confirm if self.plan.is_some() => self.state = SessionState::Confirmed,
            Command::Confirm => {
                warn!("There is no valid plan to confirm for {}", self.group);
            }
            Command::Skip => self.state = SessionState::Skipped,
            Command::Quit => self.state = SessionState::Aborted,
            Command::Reverse => {
                let reversed = self
                    .naming
                    .take(self.group.len() as i64)
                    .and_then(|v| v.reverse());
                self.set_naming(reversed);
            }
            Command::Choose(choice) => {
                let chosen = self
                    .catalog
                    .choose(choice)
                    .map(|entry| entry.view().clone())
                    .ok_or_else(|| generic_error(&format!("There is no naming convention {choice}")));
                self.set_naming(chosen);
            }
            Command::Example(token) => {
                let naming = self.catalog.continue_from_example(&token);
                self.set_naming(naming);
            }
            Command::Reslice(desc) => {
                let naming = self.naming.slice(&desc);
                self.set_naming(naming);
            }
            Command::Partial(partial) => {
                self.partial = Some(partial);
                self.rebuild();
            }
            Command::ClearPartial => {
                self.partial = None;
                self.rebuild();
            }
        }
        self.state
    }

    fn set_naming(&mut self, naming: Result<LazyIndexableView>) {
        match naming {
            Ok(naming) => {
                self.naming = naming;
                self.rebuild();
            }
            Err(e) => {
                warn!("{e}");
                self.last_error = Some(e);
            }
        }
    }

    fn rebuild(&mut self) {
        match build_plan(&self.group, &self.options()) {
            Ok(plan) => {
                self.plan = Some(plan);
                self.last_error = None;
            }
            Err(e) => {
                warn!("Cannot rename {}: {e}", self.group);
                self.plan = None;
                self.last_error = Some(e);
            }
        }
    }

    /// Carries out the decision.
    ///
    /// A confirmed session executes its plan and returns the renamed group;
    /// a skipped or aborted one returns `None` without touching any file.
    ///
    /// # Errors
    /// * any error of [`execute_plan`]
    /// * `Generic` if no decision has been made yet
    pub fn finish(self, lock_timeout: Duration) -> Result<Option<RenamedGroup>> {
        match (self.state, self.plan) {
            (SessionState::Confirmed, Some(plan)) => {
                let report = execute_plan(&plan, lock_timeout)?;
                Ok(Some(RenamedGroup {
                    group: plan.into_result(),
                    report,
                }))
            }
            (SessionState::Skipped | SessionState::Aborted, _) => Ok(None),
            _ => Err(generic_error("The rename session has not been decided")),
        }
    }
}
