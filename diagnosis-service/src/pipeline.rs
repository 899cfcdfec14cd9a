//! Linear task pipeline for a single diagnosis request.
//!
//! Each [`Task`] reads what it needs from a shared [`Context`], writes its own
//! outputs back, and tells the [`Pipeline`] whether to continue with the next
//! task or stop. A pipeline can be entered at any task, which lets callers skip
//! steps whose outputs they already have.

use async_trait::async_trait;
use dashmap::DashMap;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Task not found: {0}")]
    TaskNotFound(String),

    #[error("Task execution failed: {0}")]
    TaskExecutionFailed(String),

    #[error("Context error: {0}")]
    ContextError(String),
}

pub type Result<T> = std::result::Result<T, PipelineError>;

/// Values shared between the tasks of one pipeline run
#[derive(Clone, Debug, Default)]
pub struct Context {
    data: Arc<DashMap<String, Value>>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set(&self, key: impl Into<String>, value: impl Serialize) -> Result<()> {
        let key = key.into();
        let value = serde_json::to_value(value)
            .map_err(|e| PipelineError::ContextError(format!("cannot store '{key}': {e}")))?;
        self.data.insert(key, value);
        Ok(())
    }

    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.get_sync(key)
    }

    pub fn get_sync<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.data
            .get(key)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    /// Like [`Context::get`], but a missing or mistyped value is an error.
    pub async fn require<T: DeserializeOwned>(&self, key: &str) -> Result<T> {
        self.get(key)
            .await
            .ok_or_else(|| PipelineError::ContextError(format!("{key} not found in context")))
    }

    pub async fn remove(&self, key: &str) -> Option<Value> {
        self.data.remove(key).map(|(_, v)| v)
    }
}

/// What the pipeline does after a task returns
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextAction {
    /// Run the next task in order
    Continue,
    /// Stop here
    End,
}

#[derive(Debug, Clone)]
pub struct TaskResult {
    pub response: Option<String>,
    pub next_action: NextAction,
    pub status_message: Option<String>,
}

impl TaskResult {
    pub fn new(response: Option<String>, next_action: NextAction) -> Self {
        Self {
            response,
            next_action,
            status_message: None,
        }
    }

    pub fn new_with_status(
        response: Option<String>,
        next_action: NextAction,
        status_message: Option<String>,
    ) -> Self {
        Self {
            response,
            next_action,
            status_message,
        }
    }
}

#[async_trait]
pub trait Task: Send + Sync {
    fn id(&self) -> &str {
        std::any::type_name::<Self>()
    }

    async fn run(&self, context: Context) -> Result<TaskResult>;
}

#[derive(Debug, Clone)]
pub struct ExecutionResult {
    pub response: Option<String>,
    pub status_message: Option<String>,
    /// Ids of the tasks that ran, in order
    pub executed: Vec<String>,
}

pub struct Pipeline {
    pub id: String,
    tasks: Vec<Arc<dyn Task>>,
}

impl Pipeline {
    pub fn task_ids(&self) -> impl Iterator<Item = &str> {
        self.tasks.iter().map(|t| t.id())
    }

    /// Run every task from the first one
    pub async fn execute(&self, context: Context) -> Result<ExecutionResult> {
        self.run_from_index(0, context).await
    }

    /// Run from `task_id` to the end, or until a task returns [`NextAction::End`]
    pub async fn execute_from(&self, task_id: &str, context: Context) -> Result<ExecutionResult> {
        let start = self
            .tasks
            .iter()
            .position(|t| t.id() == task_id)
            .ok_or_else(|| PipelineError::TaskNotFound(task_id.to_string()))?;
        self.run_from_index(start, context).await
    }

    async fn run_from_index(&self, start: usize, context: Context) -> Result<ExecutionResult> {
        let mut result = ExecutionResult {
            response: None,
            status_message: None,
            executed: Vec::new(),
        };

        for task in &self.tasks[start..] {
            debug!(pipeline = %self.id, task = task.id(), "running task");
            let outcome = task.run(context.clone()).await?;
            result.executed.push(task.id().to_string());
            if outcome.response.is_some() {
                result.response = outcome.response;
            }
            if outcome.status_message.is_some() {
                result.status_message = outcome.status_message;
            }
            if outcome.next_action == NextAction::End {
                break;
            }
        }

        Ok(result)
    }
}

pub struct PipelineBuilder {
    id: String,
    tasks: Vec<Arc<dyn Task>>,
}

impl PipelineBuilder {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            tasks: Vec::new(),
        }
    }

    pub fn add_task(mut self, task: Arc<dyn Task>) -> Self {
        self.tasks.push(task);
        self
    }

    pub fn build(self) -> Pipeline {
        Pipeline {
            id: self.id,
            tasks: self.tasks,
        }
    }
}
