//! Test helper types for agent tests.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use futures::stream;

use crate::agent::{AgentRun, AuthorizationChannel, UnitStream};
use crate::operator::{Notice, Operator};
use crate::types::{MessageRecord, RunInput, StreamUnit, ThreadId};
use crate::{Error, Result};

pub enum Script {
    Units(Vec<StreamUnit>),
    FailAfter(Vec<StreamUnit>, &'static str),
    FailToStart(&'static str),
}

/// Plays back one script per invocation and records every call.
pub struct ScriptedRun {
    scripts: Mutex<VecDeque<Script>>,
    calls: Mutex<Vec<(ThreadId, RunInput)>>,
}

impl ScriptedRun {
    pub fn new(scripts: Vec<Script>) -> Arc<Self> {
        Arc::new(Self {
            scripts: Mutex::new(scripts.into()),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<(ThreadId, RunInput)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl AgentRun for ScriptedRun {
    async fn stream(&self, thread: &ThreadId, input: RunInput) -> Result<UnitStream> {
        self.calls.lock().unwrap().push((thread.clone(), input));
        let script = self
            .scripts
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Script::Units(Vec::new()));

        match script {
            Script::Units(units) => Ok(Box::pin(stream::iter(units.into_iter().map(Ok)))),
            Script::FailAfter(units, message) => {
                let items: Vec<Result<StreamUnit>> = units
                    .into_iter()
                    .map(Ok)
                    .chain(std::iter::once(Err(Error::Run(message.to_string()))))
                    .collect();
                Ok(Box::pin(stream::iter(items)))
            }
            Script::FailToStart(message) => Err(Error::Run(message.to_string())),
        }
    }
}

/// Completes authorizations listed as granted, fails every other one.
#[derive(Default)]
pub struct StubChannel {
    outcomes: HashMap<String, bool>,
    waited: Mutex<Vec<String>>,
}

impl StubChannel {
    pub fn granting(ids: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            outcomes: ids.iter().map(|id| (id.to_string(), true)).collect(),
            waited: Mutex::new(Vec::new()),
        })
    }

    pub fn denying() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn waited(&self) -> Vec<String> {
        self.waited.lock().unwrap().clone()
    }
}

#[async_trait]
impl AuthorizationChannel for StubChannel {
    async fn wait_for_completion(&self, authorization_id: &str) -> Result<()> {
        self.waited.lock().unwrap().push(authorization_id.to_string());
        if self.outcomes.get(authorization_id).copied().unwrap_or(false) {
            Ok(())
        } else {
            Err(Error::Authorization(format!(
                "authorization {} failed",
                authorization_id
            )))
        }
    }
}

/// Never completes.
pub struct HangingChannel;

#[async_trait]
impl AuthorizationChannel for HangingChannel {
    async fn wait_for_completion(&self, _authorization_id: &str) -> Result<()> {
        std::future::pending().await
    }
}

/// Answers prompts from a queue and records everything it was shown.
#[derive(Default)]
pub struct ScriptedOperator {
    pub answers: VecDeque<String>,
    pub prompts: Vec<String>,
    pub rendered: Vec<String>,
    pub notices: Vec<Notice>,
}

impl ScriptedOperator {
    pub fn answering(answers: &[&str]) -> Self {
        Self {
            answers: answers.iter().map(|a| a.to_string()).collect(),
            ..Default::default()
        }
    }
}

#[async_trait]
impl Operator for ScriptedOperator {
    async fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        self.prompts.push(prompt.to_string());
        Ok(self.answers.pop_front())
    }

    async fn render(&mut self, record: &MessageRecord) -> Result<()> {
        self.rendered.push(record.text());
        Ok(())
    }

    async fn notify(&mut self, notice: Notice) -> Result<()> {
        self.notices.push(notice);
        Ok(())
    }
}
