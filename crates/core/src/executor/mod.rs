//! Task dispatch.
//!
//! Given a [`Task`], the [`Executor`] resolves what to run, runs it, passes the
//! value through [`serialize`] and returns exactly one [`TaskOutcome`] carrying
//! the task's id. Failures become the outcome's `error`; nothing escapes.
//!
//! Resolution order:
//! 1. `action` whose name is a built-in action: run that handler
//! 2. otherwise `code`: evaluate it in the page
//! 3. otherwise an unrecognized `action`: [`Error::UnknownAction`]
//! 4. otherwise [`Error::EmptyTask`]
//!
//! An `action` that is not a `{type, ...}` object, or `code` that is not a
//! string, fails with [`Error::InvalidTask`] under the same task id.


use bridge_protocol::{Action, Task, TaskOutcome};
use tracing::{debug, warn};

use crate::config::ActionConfig;
use crate::page::{Page, PageValue};
use crate::serialize::serialize;
use crate::{Clock, Error, Result, actions};

/// Runs tasks against one page.
pub struct Executor<P, C> {
	page: P,
	clock: C,
	config: ActionConfig,
}

impl<P, C> Executor<P, C>
where
	P: Page,
	C: Clock,
{
	pub fn new(page: P, clock: C, config: ActionConfig) -> Self {
		Self { page, clock, config }
	}

	pub fn page(&self) -> &P {
		&self.page
	}

	/// Executes `task` to completion and returns its correlated outcome.
	pub async fn execute(&self, task: &Task) -> TaskOutcome {
		let task_id = task.task_id.clone();
		match self.run(task).await {
			Ok(value) => {
				debug!(target = "bridge", task_id = %task_id, "task succeeded");
				TaskOutcome::success(task_id, serialize(value))
			}
			Err(err) => {
				warn!(target = "bridge", task_id = %task_id, error = %err, "task failed");
				TaskOutcome::failure(task_id, err.to_string())
			}
		}
	}

	async fn run(&self, task: &Task) -> Result<PageValue<P::Element>> {
		let request = match task.action_request() {
			Some(Ok(request)) => Some(request),
			Some(Err(err)) => {
				debug!(target = "bridge", task_id = %task.task_id, error = %err, "malformed action");
				return self.fall_back(task, Error::InvalidTask(format!("action: {err}"))).await;
			}
			None => None,
		};

		if let Some(request) = &request {
			if let Some(parsed) = request.parse() {
				let action = parsed.map_err(|source| Error::InvalidParams {
					action: request.kind.clone(),
					source,
				})?;
				return self.run_action(&action).await;
			}
		}

		match request {
			Some(request) => self.fall_back(task, Error::UnknownAction(request.kind)).await,
			None => self.fall_back(task, Error::EmptyTask).await,
		}
	}

	/// Evaluates the task's raw code, or fails with `otherwise` when it has none.
	async fn fall_back(&self, task: &Task, otherwise: Error) -> Result<PageValue<P::Element>> {
		match task.code_str() {
			Some(Ok(code)) => {
				debug!(target = "bridge", task_id = %task.task_id, "evaluating raw code");
				actions::eval(&self.page, code).await
			}
			Some(Err(code)) => Err(Error::InvalidTask(format!("code must be a string, got {code}"))),
			None => Err(otherwise),
		}
	}

	async fn run_action(&self, action: &Action) -> Result<PageValue<P::Element>> {
		debug!(target = "bridge", action = action.name(), "running action");
		actions::run(action, &self.page, &self.clock, &self.config).await
	}
}
