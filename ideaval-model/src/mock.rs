use async_trait::async_trait;
use ideaval_core::{GenerationRequest, GenerationResponse, IdeaError, Result, TextGenerator};
use std::collections::VecDeque;
use std::sync::Mutex;

type Responder = Box<dyn Fn(&GenerationRequest) -> Result<GenerationResponse> + Send + Sync>;

enum Script {
    Queue(Mutex<VecDeque<Result<GenerationResponse>>>),
    Responder(Responder),
}

/// Scripted generator for tests. Every request is recorded.
pub struct MockGenerator {
    name: String,
    script: Script,
    calls: Mutex<Vec<GenerationRequest>>,
}

impl MockGenerator {
    /// A generator that replays queued replies in order and fails once they run out.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            script: Script::Queue(Mutex::new(VecDeque::new())),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// A generator that computes each reply from the request.
    pub fn from_fn<F>(name: impl Into<String>, responder: F) -> Self
    where
        F: Fn(&GenerationRequest) -> Result<GenerationResponse> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            script: Script::Responder(Box::new(responder)),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_response(self, response: GenerationResponse) -> Self {
        self.push(Ok(response))
    }

    pub fn with_text(self, text: impl Into<String>) -> Self {
        self.with_response(GenerationResponse::new(text))
    }

    pub fn with_error(self, message: impl Into<String>) -> Self {
        self.push(Err(IdeaError::Model(message.into())))
    }

    fn push(self, reply: Result<GenerationResponse>) -> Self {
        if let Script::Queue(queue) = &self.script {
            queue.lock().unwrap().push_back(reply);
        }
        self
    }

    /// Requests received so far, oldest first.
    pub fn calls(&self) -> Vec<GenerationRequest> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl TextGenerator for MockGenerator {
    fn name(&self) -> &str {
        &self.name
    }

    async fn generate(&self, request: GenerationRequest) -> Result<GenerationResponse> {
        let reply = match &self.script {
            Script::Queue(queue) => queue.lock().unwrap().pop_front().unwrap_or_else(|| {
                Err(IdeaError::Model(format!("{} has no scripted reply left", self.name)))
            }),
            Script::Responder(responder) => responder(&request),
        };
        self.calls.lock().unwrap().push(request);
        reply
    }
}
