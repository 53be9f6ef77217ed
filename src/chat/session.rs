//! Core chat session management.
//!
//! The session controller owns the conversation, the running cost, and
//! the provider adapter. It is an explicit object passed by handle into
//! every operation; no state lives in globals. One generation stream is
//! active at a time and the stream is the only suspend point: each
//! fragment is applied to the conversation and pushed to the display
//! before the next fragment is requested.

use futures::StreamExt;

use crate::conversation::Conversation;
use crate::cost::{CostEstimator, format_cost};
use crate::error::{Error, Result};
use crate::observability::{SESSION_RESETS, SESSION_SUPPRESSED, SESSION_TURNS};
use crate::provider::{GenerationParams, StreamingChatProvider, build_provider};
use crate::render::DisplayObserver;
use crate::types::{ModelCatalog, ModelProfile, Role, Turn};

use super::config::SessionConfig;

/// Weight applied to the output-side estimate: generated tokens are
/// priced higher than prompt tokens. A coarse heuristic, not a
/// provider-billing reconciliation.
const OUTPUT_COST_WEIGHT: f64 = 3.0;

/// The lifecycle of the most recent generation.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum StreamState {
    /// No generation has run since the last reset.
    Idle,

    /// A stream is being consumed.
    Streaming,

    /// The last stream ran to completion.
    Completed,

    /// The last stream ended in an error; partial output was retained.
    Failed,

    /// The last generation was suppressed by the stop flag.
    Cancelled,
}

/// How a generation call ended.
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationOutcome {
    /// The stream ran to completion.
    Completed {
        /// Number of fragments the backend emitted.
        fragments: usize,
    },

    /// The stop flag suppressed the generation; no stream was opened.
    Suppressed,
}

/// A point-in-time snapshot of session state for display.
#[derive(Debug, Clone)]
pub struct SessionStats {
    /// The active model identifier.
    pub model: String,

    /// The number of turns in the conversation.
    pub turn_count: usize,

    /// The sampling temperature.
    pub temperature: f32,

    /// The response token ceiling.
    pub max_tokens: u32,

    /// The system prompt, if any.
    pub system_prompt: Option<String>,

    /// The running session cost in USD.
    pub cost: f64,

    /// The running session cost, formatted.
    pub formatted_cost: String,

    /// The lifecycle state of the most recent generation.
    pub state: StreamState,

    /// Content blocks dropped by the active adapter's request-shape
    /// translation.
    pub dropped_blocks: u64,
}

/// A chat session: conversation state, cost accounting, and turn-taking
/// over a streaming provider.
pub struct ChatSession {
    provider: Box<dyn StreamingChatProvider>,
    profile: ModelProfile,
    catalog: ModelCatalog,
    config: SessionConfig,
    estimator: CostEstimator,
    conversation: Conversation,
    cost: f64,
    stop: bool,
    state: StreamState,
}

impl ChatSession {
    /// Creates a session, building the provider adapter for the
    /// configured model.
    ///
    /// # Errors
    ///
    /// Fails if the model is not in the catalog or no API key is
    /// configured. An *invalid* key is not detected here; it surfaces as
    /// an authentication error when the first generation streams.
    pub fn new(config: SessionConfig, catalog: ModelCatalog) -> Result<Self> {
        let profile = catalog.get(&config.model)?.clone();
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| Error::empty_input("an API key is required"))?;
        let provider = build_provider(
            &api_key,
            &profile,
            config.base_url.as_deref(),
            config.request_timeout,
        )?;
        Self::with_provider(config, catalog, provider)
    }

    /// Creates a session over an already-built provider adapter.
    pub fn with_provider(
        config: SessionConfig,
        catalog: ModelCatalog,
        provider: Box<dyn StreamingChatProvider>,
    ) -> Result<Self> {
        let profile = catalog.get(&config.model)?.clone();
        Ok(Self {
            provider,
            profile,
            catalog,
            config,
            estimator: CostEstimator::new(),
            conversation: Conversation::new(),
            cost: 0.0,
            stop: false,
            state: StreamState::Idle,
        })
    }

    /// Appends a user text turn and generates a response.
    ///
    /// Blank input is rejected before anything is appended.
    pub async fn submit_user_text(
        &mut self,
        text: &str,
        observer: &mut dyn DisplayObserver,
    ) -> Result<GenerationOutcome> {
        if text.trim().is_empty() {
            return Err(Error::empty_input("the prompt is empty"));
        }
        SESSION_TURNS.click();
        self.conversation.push(Turn::user_text(text))?;
        self.generate(observer).await
    }

    /// Appends a user image turn.
    ///
    /// The turn is appended regardless of the active model's capability
    /// set; a text-only backend will drop the block during request
    /// translation, which is accounted there.
    pub fn submit_image(&mut self, url: &str) -> Result<()> {
        if !url.starts_with("data:") {
            let parsed = url::Url::parse(url)?;
            if parsed.scheme() != "http" && parsed.scheme() != "https" {
                return Err(Error::validation(
                    "an image reference must be a data URI or an http(s) URL",
                    Some("url".to_string()),
                ));
            }
        }
        self.conversation.push(Turn::user_image(url))
    }

    /// Generates a response to the current conversation.
    ///
    /// Appends an empty assistant turn and streams fragments into it,
    /// pushing the cumulative text to `observer` after each fragment.
    /// Cost accounting runs in two parts: the prompt-side estimate when
    /// the stream opens and the weighted output-side estimate when it
    /// ends. Both completion and failure finalize the cost, because a
    /// failed stream's partial output is retained, not rolled back.
    pub async fn generate(
        &mut self,
        observer: &mut dyn DisplayObserver,
    ) -> Result<GenerationOutcome> {
        if self.stop {
            self.stop = false;
            self.state = StreamState::Cancelled;
            SESSION_SUPPRESSED.click();
            return Ok(GenerationOutcome::Suppressed);
        }
        if self.conversation.is_empty() {
            return Err(Error::invalid_state("there is no turn to respond to"));
        }

        let system = self
            .config
            .system_prompt
            .clone()
            .filter(|s| !s.is_empty());
        let params = GenerationParams {
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        // Prompt-side estimate covers everything that goes over the
        // wire, the synthesized system turn included.
        let input_cost = {
            let sys_turn = system.as_deref().map(Turn::system);
            let turns = self.conversation.iter();
            match &sys_turn {
                Some(sys) => self
                    .estimator
                    .estimate(std::iter::once(sys).chain(turns), &self.profile),
                None => self.estimator.estimate(turns, &self.profile),
            }
        };
        self.cost += input_cost;
        observer.cost_updated(&format_cost(self.cost));

        self.conversation.push(Turn::assistant_empty())?;
        self.state = StreamState::Streaming;

        let stream_result = {
            let turns = self.conversation.turns();
            let prompt = &turns[..turns.len() - 1];
            self.provider.stream(prompt, system.as_deref(), &params).await
        };

        let mut stream = match stream_result {
            Ok(stream) => stream,
            Err(err) => {
                // The empty assistant turn stays, as any partial output
                // would have.
                self.state = StreamState::Failed;
                observer.failed(&err.to_string());
                return Err(err);
            }
        };

        let mut fragments = 0usize;
        let mut failure = None;
        while let Some(item) = stream.next().await {
            match item {
                Ok(text) => {
                    fragments += 1;
                    if let Some(turn) = self.conversation.last_mut() {
                        turn.push_text(&text);
                        observer.fragment(&turn.text());
                    }
                }
                Err(err) => {
                    failure = Some(err);
                    break;
                }
            }
        }
        drop(stream);

        let output_cost = match self.conversation.last() {
            Some(turn) => self.estimator.estimate_turn(turn, &self.profile) * OUTPUT_COST_WEIGHT,
            None => 0.0,
        };
        self.cost += output_cost;
        observer.cost_updated(&format_cost(self.cost));

        match failure {
            Some(err) => {
                self.state = StreamState::Failed;
                observer.failed(&err.to_string());
                Err(err)
            }
            None => {
                self.state = StreamState::Completed;
                let text = self
                    .conversation
                    .last()
                    .map(Turn::text)
                    .unwrap_or_default();
                observer.completed(&text);
                Ok(GenerationOutcome::Completed { fragments })
            }
        }
    }

    /// Discards the most recent assistant turn and generates a new
    /// response over the shortened history.
    ///
    /// Defined only when the last turn is an assistant turn; a user turn
    /// is never popped.
    pub async fn regenerate(
        &mut self,
        observer: &mut dyn DisplayObserver,
    ) -> Result<GenerationOutcome> {
        if self.stop {
            self.stop = false;
            self.state = StreamState::Cancelled;
            SESSION_SUPPRESSED.click();
            return Ok(GenerationOutcome::Suppressed);
        }
        match self.conversation.last() {
            Some(turn) if turn.role == Role::Assistant => {
                self.conversation.pop_last()?;
                self.generate(observer).await
            }
            Some(_) => Err(Error::invalid_state(
                "the last turn is not an assistant turn",
            )),
            None => Err(Error::invalid_state("the conversation is empty")),
        }
    }

    /// Removes the last turn.
    pub fn delete_last(&mut self) -> Result<Turn> {
        self.conversation.pop_last()
    }

    /// Clears the conversation and the running cost.
    pub fn reset(&mut self) {
        self.conversation.reset();
        self.cost = 0.0;
        self.state = StreamState::Idle;
        SESSION_RESETS.click();
    }

    /// Arms the stop flag.
    ///
    /// The next generation-initiating call consumes the flag and is
    /// suppressed for that interaction cycle. A stream already in
    /// progress is not cancelled.
    pub fn stop(&mut self) {
        self.stop = true;
    }

    /// Switches to a different model, rebuilding the provider adapter.
    pub fn set_model(&mut self, model: &str) -> Result<()> {
        let profile = self.catalog.get(model)?.clone();
        let api_key = self
            .config
            .api_key
            .clone()
            .ok_or_else(|| Error::empty_input("an API key is required"))?;
        self.provider = build_provider(
            &api_key,
            &profile,
            self.config.base_url.as_deref(),
            self.config.request_timeout,
        )?;
        self.profile = profile;
        self.config.model = model.to_string();
        Ok(())
    }

    /// Replaces the API key, rebuilding the provider adapter.
    pub fn set_api_key(&mut self, api_key: &str) -> Result<()> {
        if api_key.is_empty() {
            return Err(Error::empty_input("an API key is required"));
        }
        self.provider = build_provider(
            api_key,
            &self.profile,
            self.config.base_url.as_deref(),
            self.config.request_timeout,
        )?;
        self.config.api_key = Some(api_key.to_string());
        Ok(())
    }

    /// Sets or clears the system prompt.
    pub fn set_system_prompt(&mut self, prompt: Option<String>) {
        self.config.system_prompt = prompt;
    }

    /// Sets the sampling temperature.
    pub fn set_temperature(&mut self, temperature: f32) -> Result<()> {
        if !(0.0..=2.0).contains(&temperature) {
            return Err(Error::validation(
                "temperature must be between 0.0 and 2.0",
                Some("temperature".to_string()),
            ));
        }
        self.config.temperature = temperature;
        Ok(())
    }

    /// Sets the response token ceiling.
    pub fn set_max_tokens(&mut self, max_tokens: u32) {
        self.config.max_tokens = max_tokens;
    }

    /// Returns the conversation.
    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// Returns the running session cost in USD.
    pub fn cost(&self) -> f64 {
        self.cost
    }

    /// Returns the running session cost, formatted with five fractional
    /// digits.
    pub fn formatted_cost(&self) -> String {
        format_cost(self.cost)
    }

    /// Returns the lifecycle state of the most recent generation.
    pub fn state(&self) -> StreamState {
        self.state
    }

    /// Returns the active model identifier.
    pub fn model_id(&self) -> &str {
        &self.config.model
    }

    /// Returns the current system prompt, if any.
    pub fn system_prompt(&self) -> Option<&str> {
        self.config.system_prompt.as_deref()
    }

    /// Returns the model identifiers the catalog offers.
    pub fn available_models(&self) -> impl Iterator<Item = &str> {
        self.catalog.ids()
    }

    /// Returns a display snapshot of the session.
    pub fn stats(&self) -> SessionStats {
        SessionStats {
            model: self.config.model.clone(),
            turn_count: self.conversation.len(),
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
            system_prompt: self.config.system_prompt.clone(),
            cost: self.cost,
            formatted_cost: self.formatted_cost(),
            state: self.state,
            dropped_blocks: self.provider.dropped_blocks(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;

    use crate::cost::TokenCounter;
    use crate::provider::FragmentStream;
    use crate::types::{ContentBlock, ModelProfile, ProviderKind};

    /// Replays a fixed script of fragments on every stream call.
    #[derive(Debug)]
    struct ScriptedProvider {
        script: Vec<Result<String>>,
    }

    impl ScriptedProvider {
        fn new(fragments: &[&str]) -> Self {
            Self {
                script: fragments.iter().map(|f| Ok(f.to_string())).collect(),
            }
        }

        fn failing_after(fragments: &[&str], err: Error) -> Self {
            let mut script: Vec<Result<String>> =
                fragments.iter().map(|f| Ok(f.to_string())).collect();
            script.push(Err(err));
            Self { script }
        }
    }

    #[async_trait::async_trait]
    impl StreamingChatProvider for ScriptedProvider {
        fn kind(&self) -> ProviderKind {
            ProviderKind::OpenAi
        }

        fn model_id(&self) -> &str {
            "scripted"
        }

        async fn stream(
            &self,
            _turns: &[Turn],
            _system: Option<&str>,
            _params: &GenerationParams,
        ) -> Result<FragmentStream> {
            Ok(Box::pin(stream::iter(self.script.clone())))
        }
    }

    /// Rejects the stream before the first fragment.
    #[derive(Debug)]
    struct RejectingProvider;

    #[async_trait::async_trait]
    impl StreamingChatProvider for RejectingProvider {
        fn kind(&self) -> ProviderKind {
            ProviderKind::OpenAi
        }

        fn model_id(&self) -> &str {
            "scripted"
        }

        async fn stream(
            &self,
            _turns: &[Turn],
            _system: Option<&str>,
            _params: &GenerationParams,
        ) -> Result<FragmentStream> {
            Err(Error::authentication("invalid API key"))
        }
    }

    /// Counts whitespace-separated words.
    struct WordCounter;

    impl TokenCounter for WordCounter {
        fn count(&self, text: &str) -> usize {
            text.split_whitespace().count()
        }
    }

    #[derive(Default)]
    struct RecordingObserver {
        fragments: Vec<String>,
        completed: Vec<String>,
        failures: Vec<String>,
    }

    impl DisplayObserver for RecordingObserver {
        fn fragment(&mut self, cumulative: &str) {
            self.fragments.push(cumulative.to_string());
        }

        fn completed(&mut self, text: &str) {
            self.completed.push(text.to_string());
        }

        fn failed(&mut self, message: &str) {
            self.failures.push(message.to_string());
        }
    }

    fn test_catalog(rate: f64) -> ModelCatalog {
        ModelCatalog::new(vec![ModelProfile::new(
            "scripted",
            ProviderKind::OpenAi,
            rate,
        )])
    }

    fn scripted_session(fragments: &[&str], rate: f64) -> ChatSession {
        let config = SessionConfig::new().with_model("scripted");
        let mut session = ChatSession::with_provider(
            config,
            test_catalog(rate),
            Box::new(ScriptedProvider::new(fragments)),
        )
        .unwrap();
        session.estimator = CostEstimator::with_counter(Box::new(WordCounter));
        session
    }

    #[tokio::test]
    async fn each_round_appends_two_turns() {
        let mut session = scripted_session(&["Hello"], 0.0);
        let mut observer = RecordingObserver::default();

        for round in 1..=3usize {
            session
                .submit_user_text("Hi", &mut observer)
                .await
                .unwrap();
            assert_eq!(session.conversation().len(), 2 * round);
        }
    }

    #[tokio::test]
    async fn fragments_accumulate_into_assistant_turn() {
        let mut session = scripted_session(&["Hel", "lo"], 0.0);
        let mut observer = RecordingObserver::default();

        let outcome = session
            .submit_user_text("Hi", &mut observer)
            .await
            .unwrap();
        assert_eq!(outcome, GenerationOutcome::Completed { fragments: 2 });

        let assistant = session.conversation().last().unwrap();
        assert_eq!(assistant.role, Role::Assistant);
        assert_eq!(assistant.text(), "Hello");

        // The observer sees cumulative text, then the terminal note.
        assert_eq!(observer.fragments, vec!["Hel", "Hello"]);
        assert_eq!(observer.completed, vec!["Hello"]);
        assert_eq!(session.state(), StreamState::Completed);
    }

    #[tokio::test]
    async fn failed_stream_retains_partial_output() {
        let provider = ScriptedProvider::failing_after(
            &["Hel", "lo"],
            Error::streaming("connection reset", None),
        );
        let config = SessionConfig::new().with_model("scripted");
        let mut session =
            ChatSession::with_provider(config, test_catalog(0.0), Box::new(provider)).unwrap();
        let mut observer = RecordingObserver::default();

        let err = session
            .submit_user_text("Hi", &mut observer)
            .await
            .unwrap_err();
        assert!(err.is_streaming());

        // Not empty and not rolled back.
        assert_eq!(session.conversation().len(), 2);
        assert_eq!(session.conversation().last().unwrap().text(), "Hello");
        assert_eq!(session.state(), StreamState::Failed);
        assert_eq!(observer.failures.len(), 1);
    }

    #[tokio::test]
    async fn rejected_key_surfaces_when_streaming_begins() {
        let config = SessionConfig::new().with_model("scripted");
        let mut session =
            ChatSession::with_provider(config, test_catalog(0.0), Box::new(RejectingProvider))
                .unwrap();
        let mut observer = RecordingObserver::default();

        let err = session
            .submit_user_text("Hi", &mut observer)
            .await
            .unwrap_err();
        assert!(err.is_authentication());

        // The empty assistant turn stays in place.
        assert_eq!(session.conversation().len(), 2);
        assert_eq!(session.conversation().last().unwrap().text(), "");
        assert_eq!(session.state(), StreamState::Failed);
    }

    #[tokio::test]
    async fn regenerate_keeps_length_and_replaces_content() {
        let mut session = scripted_session(&["Hello ", "again"], 0.0);
        let mut observer = RecordingObserver::default();

        session
            .submit_user_text("Hi", &mut observer)
            .await
            .unwrap();
        let before = session.conversation().len();

        session.regenerate(&mut observer).await.unwrap();
        assert_eq!(session.conversation().len(), before);

        let assistant = session.conversation().last().unwrap();
        assert_eq!(assistant.role, Role::Assistant);
        assert!(!assistant.text().is_empty());
    }

    #[tokio::test]
    async fn regenerate_refuses_to_pop_a_user_turn() {
        let mut session = scripted_session(&["Hello"], 0.0);
        let mut observer = RecordingObserver::default();

        session.conversation.push(Turn::user_text("Hi")).unwrap();
        let err = session.regenerate(&mut observer).await.unwrap_err();
        assert!(err.is_invalid_state());
        assert_eq!(session.conversation().len(), 1);

        session.conversation.reset();
        let err = session.regenerate(&mut observer).await.unwrap_err();
        assert!(err.is_invalid_state());
    }

    #[tokio::test]
    async fn delete_last_pops_exactly_one() {
        let mut session = scripted_session(&["Hello"], 0.0);
        let mut observer = RecordingObserver::default();

        session
            .submit_user_text("Hi", &mut observer)
            .await
            .unwrap();
        assert_eq!(session.conversation().len(), 2);

        session.delete_last().unwrap();
        assert_eq!(session.conversation().len(), 1);

        session.delete_last().unwrap();
        let err = session.delete_last().unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn reset_clears_conversation_and_cost() {
        let mut session = scripted_session(&["Hello"], 10.0);
        let mut observer = RecordingObserver::default();

        session
            .submit_user_text("Hi", &mut observer)
            .await
            .unwrap();
        assert!(session.cost() > 0.0);

        session.reset();
        assert_eq!(session.conversation().len(), 0);
        assert_eq!(session.cost(), 0.0);
        assert_eq!(session.state(), StreamState::Idle);
    }

    #[tokio::test]
    async fn stop_suppresses_the_next_generation_only() {
        let mut session = scripted_session(&["Hello"], 0.0);
        let mut observer = RecordingObserver::default();

        session.stop();
        let outcome = session
            .submit_user_text("Hi", &mut observer)
            .await
            .unwrap();
        assert_eq!(outcome, GenerationOutcome::Suppressed);
        assert_eq!(session.state(), StreamState::Cancelled);

        // The user turn was still recorded, but no assistant turn.
        assert_eq!(session.conversation().len(), 1);
        assert_eq!(session.conversation().last().unwrap().role, Role::User);

        // The flag was consumed; the next submission streams normally.
        let outcome = session
            .submit_user_text("Hi again", &mut observer)
            .await
            .unwrap();
        assert_eq!(outcome, GenerationOutcome::Completed { fragments: 1 });
        assert_eq!(session.conversation().len(), 3);
    }

    #[tokio::test]
    async fn blank_input_is_rejected_before_appending() {
        let mut session = scripted_session(&["Hello"], 0.0);
        let mut observer = RecordingObserver::default();

        let err = session
            .submit_user_text("   ", &mut observer)
            .await
            .unwrap_err();
        assert!(err.is_empty_input());
        assert_eq!(session.conversation().len(), 0);
    }

    #[tokio::test]
    async fn cost_accounting_weights_output_three_to_one() {
        // One input token at 10 per Mtok, three output tokens at 3x:
        // 1*10e-6 + 3*10e-6*3 = 1.0e-4.
        let mut session = scripted_session(&["one ", "two ", "three"], 10.0);
        let mut observer = RecordingObserver::default();

        session
            .submit_user_text("Hi", &mut observer)
            .await
            .unwrap();
        assert!((session.cost() - 1.0e-4).abs() < 1e-12);
        assert_eq!(session.formatted_cost(), "$0.00010");
    }

    #[tokio::test]
    async fn system_prompt_is_charged_with_the_prompt() {
        let mut session = scripted_session(&["ok"], 10.0);
        session.set_system_prompt(Some("be brief".to_string()));
        let mut observer = RecordingObserver::default();

        session
            .submit_user_text("Hi", &mut observer)
            .await
            .unwrap();
        // Input: "be brief" (2) + "Hi" (1); output: "ok" (1) at 3x.
        let expected = 3.0 * 10e-6 + 1.0 * 10e-6 * 3.0;
        assert!((session.cost() - expected).abs() < 1e-12);
    }

    #[test]
    fn submit_image_validates_the_reference() {
        let config = SessionConfig::new().with_model("scripted");
        let mut session = ChatSession::with_provider(
            config,
            test_catalog(0.0),
            Box::new(ScriptedProvider::new(&[])),
        )
        .unwrap();

        session
            .submit_image("data:image/jpeg;base64,AA==")
            .unwrap();
        session.submit_image("https://example.com/cat.jpg").unwrap();
        assert_eq!(session.conversation().len(), 2);
        assert!(session.conversation().last().unwrap().has_image());

        let err = session.submit_image("ftp://example.com/cat.jpg").unwrap_err();
        assert!(err.is_validation());
        assert_eq!(session.conversation().len(), 2);
    }

    #[test]
    fn temperature_is_range_checked() {
        let config = SessionConfig::new().with_model("scripted");
        let mut session = ChatSession::with_provider(
            config,
            test_catalog(0.0),
            Box::new(ScriptedProvider::new(&[])),
        )
        .unwrap();

        session.set_temperature(0.0).unwrap();
        session.set_temperature(2.0).unwrap();
        assert!(session.set_temperature(2.1).unwrap_err().is_validation());
        assert!(session.set_temperature(-0.1).unwrap_err().is_validation());
    }

    #[test]
    fn stats_snapshot() {
        let config = SessionConfig::new().with_model("scripted");
        let mut session = ChatSession::with_provider(
            config,
            test_catalog(0.0),
            Box::new(ScriptedProvider::new(&[])),
        )
        .unwrap();
        session.conversation.push(Turn::user_text("Hi")).unwrap();
        session
            .conversation
            .push(Turn::new(
                Role::Assistant,
                vec![ContentBlock::text("Hello!")],
            ))
            .unwrap();

        let stats = session.stats();
        assert_eq!(stats.model, "scripted");
        assert_eq!(stats.turn_count, 2);
        assert_eq!(stats.formatted_cost, "$0.00000");
        assert_eq!(stats.state, StreamState::Idle);
    }
}
