//! Dialog state entity

use std::fmt;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::messenger::ChatRef;
use crate::domain::pagination::PaginationState;
use crate::domain::workflow::{StepId, WorkflowError, WorkflowId};

/// Data key holding the workflow to start when the current one completes
pub const NEXT_WORKFLOW_KEY: &str = "next_workflow";

/// Data key holding the parsed deep link of the start command
pub const DEEP_LINK_KEY: &str = "deep_link";

/// Primary key of a state row
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StateKey {
    pub platform: String,
    pub user_id: String,
}

impl StateKey {
    pub fn new(platform: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            platform: platform.into(),
            user_id: user_id.into(),
        }
    }
}

impl fmt::Display for StateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.platform, self.user_id)
    }
}

impl From<&ChatRef> for StateKey {
    fn from(chat: &ChatRef) -> Self {
        Self::new(chat.platform.clone(), chat.user_id.clone())
    }
}

/// Workflow-local key/value bag.
///
/// Workflows read and write it through small typed structs
/// ([`StateData::extract`], [`StateData::from_typed`]); the map form only
/// exists at the storage boundary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateData(Map<String, Value>);

impl StateData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serialize a typed struct into a data update; `null` fields are skipped
    pub fn from_typed<T: Serialize>(value: &T) -> Result<Self, WorkflowError> {
        match serde_json::to_value(value) {
            Ok(Value::Object(map)) => Ok(Self(
                map.into_iter().filter(|(_, v)| !v.is_null()).collect(),
            )),
            Ok(other) => Err(WorkflowError::state_data(format!(
                "expected an object, got {}",
                other
            ))),
            Err(e) => Err(WorkflowError::state_data(e.to_string())),
        }
    }

    /// Deserialize the whole bag into a typed view
    pub fn extract<T: DeserializeOwned>(&self) -> Result<T, WorkflowError> {
        serde_json::from_value(Value::Object(self.0.clone()))
            .map_err(|e| WorkflowError::state_data(e.to_string()))
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    /// Typed read of a single key
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.0
            .get(key)
            .and_then(|value| serde_json::from_value(value.clone()).ok())
    }

    /// Shallow merge; keys in `update` overwrite existing ones
    pub fn merge(&mut self, update: &StateData) {
        for (key, value) in &update.0 {
            self.0.insert(key.clone(), value.clone());
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl From<Map<String, Value>> for StateData {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Persisted position of one user inside a workflow.
///
/// A row exists only while the user has an active, incomplete workflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DialogState {
    platform: String,
    user_id: String,
    chat_id: String,
    workflow_id: WorkflowId,
    current_step: StepId,
    #[serde(default)]
    data: StateData,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pagination: Option<PaginationState>,
    updated_at: DateTime<Utc>,
}

impl DialogState {
    /// Fresh state at `step` of `workflow_id`
    pub fn new(chat: &ChatRef, workflow_id: WorkflowId, step: StepId, data: StateData) -> Self {
        Self {
            platform: chat.platform.clone(),
            user_id: chat.user_id.clone(),
            chat_id: chat.chat_id.clone(),
            workflow_id,
            current_step: step,
            data,
            pagination: None,
            updated_at: Utc::now(),
        }
    }

    pub fn key(&self) -> StateKey {
        StateKey::new(self.platform.clone(), self.user_id.clone())
    }

    pub fn chat(&self) -> ChatRef {
        ChatRef::new(
            self.platform.clone(),
            self.user_id.clone(),
            self.chat_id.clone(),
        )
    }

    pub fn platform(&self) -> &str {
        &self.platform
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn chat_id(&self) -> &str {
        &self.chat_id
    }

    pub fn workflow_id(&self) -> &WorkflowId {
        &self.workflow_id
    }

    pub fn current_step(&self) -> &StepId {
        &self.current_step
    }

    pub fn data(&self) -> &StateData {
        &self.data
    }

    pub fn pagination(&self) -> Option<&PaginationState> {
        self.pagination.as_ref()
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Workflow requested for chaining, if any
    pub fn next_workflow(&self) -> Option<&str> {
        self.data
            .get_str(NEXT_WORKFLOW_KEY)
            .filter(|id| !id.trim().is_empty())
    }

    /// Shallow-merge a step's data update
    pub fn merge_data(&mut self, update: &StateData) {
        self.data.merge(update);
    }

    pub fn set_pagination(&mut self, pagination: Option<PaginationState>) {
        self.pagination = pagination;
    }

    /// Move to another step; pagination belongs to the step that set it
    pub fn move_to(&mut self, step: StepId) {
        self.current_step = step;
        self.pagination = None;
    }

    /// Keep the chat id current when the channel reports a new one
    pub fn set_chat_id(&mut self, chat_id: impl Into<String>) {
        self.chat_id = chat_id.into();
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
