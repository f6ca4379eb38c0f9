//! Fan-out dispatch behaviour against mock providers.

use std::sync::Arc;
use std::time::Duration;

use mock_provider::{
    DelayedProvider, EchoProvider, FailingProvider, FlakyProvider, MockClientFactory,
    PanickingProvider,
};
use orchestrator::{
    CircuitBreakerConfig, CircuitBreakerRegistry, CircuitState, Orchestrator, OrchestratorConfig,
    RetryPolicy, CANCELLED_TEXT,
};
use provider_core::{Credentials, Provider, ProviderCredential, ProviderError, ProviderOutcome};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

fn credentials(providers: &[Provider]) -> Credentials {
    providers.iter().fold(Credentials::new(), |creds, p| {
        creds.with(*p, ProviderCredential::new(format!("{}-key", p)))
    })
}

fn orchestrator(factory: MockClientFactory, config: OrchestratorConfig) -> Orchestrator {
    let breakers = Arc::new(CircuitBreakerRegistry::new(config.circuit_breaker.clone()));
    Orchestrator::new(Arc::new(factory), breakers, config)
}

fn no_retry() -> OrchestratorConfig {
    OrchestratorConfig::default().with_retry(RetryPolicy::none())
}

fn outcome_for(outcomes: &[ProviderOutcome], provider: Provider) -> &ProviderOutcome {
    outcomes
        .iter()
        .find(|o| o.provider == provider)
        .unwrap_or_else(|| panic!("no outcome for {}", provider))
}

#[tokio::test]
async fn every_provider_answers() {
    let factory = MockClientFactory::new()
        .with(EchoProvider::with_prefix(Provider::OpenAi, "openai: "))
        .with(EchoProvider::with_prefix(Provider::Anthropic, "claude: "))
        .with(EchoProvider::with_prefix(Provider::Gemini, "gemini: "));
    let orchestrator = orchestrator(factory, no_retry());
    let enabled = [Provider::OpenAi, Provider::Anthropic, Provider::Gemini];

    let outcomes = orchestrator
        .dispatch("hi", &[], &enabled, &credentials(&enabled))
        .await;

    assert_eq!(outcomes.len(), 3);
    for outcome in &outcomes {
        assert!(!outcome.degraded);
        assert!(outcome.is_success());
    }
    assert_eq!(outcome_for(&outcomes, Provider::Anthropic).content, "claude: hi");
}

#[tokio::test]
async fn failing_provider_does_not_affect_the_other() {
    let openai = EchoProvider::new(Provider::OpenAi);
    let factory = MockClientFactory::new()
        .with(openai.clone())
        .with(PanickingProvider::new(Provider::Grok));
    let orchestrator = orchestrator(factory, no_retry());
    let enabled = [Provider::OpenAi, Provider::Grok];

    let outcomes = orchestrator
        .dispatch("hello", &[], &enabled, &credentials(&enabled))
        .await;

    assert_eq!(outcomes.len(), 2);
    let ok = outcome_for(&outcomes, Provider::OpenAi);
    assert_eq!(ok, &ProviderOutcome::success(Provider::OpenAi, "hello"));

    let broken = outcome_for(&outcomes, Provider::Grok);
    assert!(broken.degraded);
    assert!(!broken.is_success());
    assert!(broken.content.contains("task failed"));
    assert_eq!(openai.calls().get(), 1);
}

#[tokio::test]
async fn failed_provider_falls_back_to_substitute() {
    let factory = MockClientFactory::new()
        .with(EchoProvider::with_prefix(Provider::OpenAi, "openai: "))
        .with(FailingProvider::server_error(Provider::Gemini));
    let orchestrator = orchestrator(factory, no_retry());
    let enabled = [Provider::OpenAi, Provider::Gemini];

    let outcomes = orchestrator
        .dispatch("hi", &[], &enabled, &credentials(&enabled))
        .await;

    let gemini = outcome_for(&outcomes, Provider::Gemini);
    assert!(gemini.degraded);
    assert!(gemini.is_success());
    assert_eq!(gemini.substitute, Some(Provider::OpenAi));
    assert_eq!(gemini.originating_provider(), Some(Provider::Gemini));
    assert_eq!(gemini.content, "openai: hi");

    let openai = outcome_for(&outcomes, Provider::OpenAi);
    assert!(!openai.degraded);
}

#[tokio::test]
async fn fallback_only_uses_credentialed_providers() {
    // Anthropic prefers OpenAI, then Gemini, then Grok. Only Grok has a key.
    let openai = EchoProvider::new(Provider::OpenAi);
    let factory = MockClientFactory::new()
        .with(FailingProvider::new(Provider::Anthropic, ProviderError::Timeout))
        .with(openai.clone())
        .with(EchoProvider::with_prefix(Provider::Grok, "grok: "));
    let orchestrator = orchestrator(factory, no_retry());

    let outcomes = orchestrator
        .dispatch(
            "hi",
            &[],
            &[Provider::Anthropic],
            &credentials(&[Provider::Anthropic, Provider::Grok]),
        )
        .await;

    assert_eq!(outcomes.len(), 1);
    assert_eq!(outcomes[0].substitute, Some(Provider::Grok));
    assert_eq!(openai.calls().get(), 0);
}

#[tokio::test]
async fn exhausted_chain_yields_error_text() {
    let openai = FailingProvider::server_error(Provider::OpenAi);
    let grok = FailingProvider::new(Provider::Grok, ProviderError::Timeout);
    let factory = MockClientFactory::new()
        .with(openai.clone())
        .with(grok.clone());
    let orchestrator = orchestrator(factory, no_retry());

    let outcomes = orchestrator
        .dispatch(
            "hi",
            &[],
            &[Provider::OpenAi],
            &credentials(&[Provider::OpenAi, Provider::Grok]),
        )
        .await;

    let outcome = &outcomes[0];
    assert!(outcome.degraded);
    assert_eq!(outcome.substitute, None);
    // The substitute's error is the last one seen.
    assert_eq!(outcome.error.as_deref(), Some("request timed out"));
    assert_eq!(openai.calls().get(), 1);
    assert_eq!(grok.calls().get(), 1);
}

#[tokio::test(start_paused = true)]
async fn default_config_reports_provider_error_not_open_circuit() {
    let grok = FailingProvider::server_error(Provider::Grok);
    let factory = MockClientFactory::new().with(grok.clone());
    let orchestrator = orchestrator(factory, OrchestratorConfig::default());
    let start = Instant::now();

    let outcomes = orchestrator
        .dispatch("hi", &[], &[Provider::Grok], &credentials(&[Provider::Grok]))
        .await;

    let outcome = &outcomes[0];
    assert!(outcome.degraded);
    assert_eq!(
        outcome.error.as_deref(),
        Some("provider API error (500): grok is down")
    );
    // The breaker opens on the third failure; no fourth call, no trailing backoff.
    assert_eq!(grok.calls().get(), 3);
    assert!(start.elapsed() < Duration::from_millis(3100));
    assert_eq!(
        orchestrator.breakers().snapshot(Provider::Grok).await.state,
        CircuitState::Open
    );
}

#[tokio::test]
async fn fallback_never_cycles() {
    let factory = Provider::ALL.iter().fold(MockClientFactory::new(), |f, p| {
        f.with(FailingProvider::server_error(*p))
    });
    let orchestrator = orchestrator(factory.clone(), no_retry());

    let outcomes = orchestrator
        .dispatch("hi", &[], &[Provider::Gemini], &credentials(&Provider::ALL))
        .await;

    assert!(!outcomes[0].is_success());
    // Gemini plus three substitutes, each built exactly once.
    assert_eq!(factory.builds().get(), 4);
}

#[tokio::test]
async fn skips_providers_without_credentials_and_duplicates() {
    let factory = MockClientFactory::new().with(EchoProvider::new(Provider::OpenAi));
    let orchestrator = orchestrator(factory, no_retry());

    let outcomes = orchestrator
        .dispatch(
            "hi",
            &[],
            &[Provider::OpenAi, Provider::Gemini, Provider::OpenAi],
            &credentials(&[Provider::OpenAi]),
        )
        .await;

    assert_eq!(outcomes.len(), 1);
    assert_eq!(outcomes[0].provider, Provider::OpenAi);
}

#[tokio::test]
async fn blank_keys_count_as_unavailable() {
    let factory = MockClientFactory::new().with(EchoProvider::new(Provider::Grok));
    let orchestrator = orchestrator(factory, no_retry());
    let creds = Credentials::new().with(Provider::Grok, ProviderCredential::new("   "));

    let outcomes = orchestrator.dispatch("hi", &[], &[Provider::Grok], &creds).await;
    assert!(outcomes.is_empty());
}

#[tokio::test(start_paused = true)]
async fn providers_run_concurrently() {
    let factory = MockClientFactory::new()
        .with(DelayedProvider::with_secs(EchoProvider::new(Provider::OpenAi), 2))
        .with(DelayedProvider::with_secs(EchoProvider::new(Provider::Anthropic), 2))
        .with(DelayedProvider::with_secs(EchoProvider::new(Provider::Gemini), 2));
    let orchestrator = orchestrator(factory, no_retry());
    let enabled = [Provider::OpenAi, Provider::Anthropic, Provider::Gemini];
    let start = Instant::now();

    let outcomes = orchestrator
        .dispatch("hi", &[], &enabled, &credentials(&enabled))
        .await;

    assert_eq!(outcomes.len(), 3);
    assert!(start.elapsed() < Duration::from_secs(3));
}

#[tokio::test(start_paused = true)]
async fn slow_provider_times_out_and_falls_back() {
    let factory = MockClientFactory::new()
        .with(DelayedProvider::with_secs(EchoProvider::new(Provider::Anthropic), 120))
        .with(EchoProvider::with_prefix(Provider::OpenAi, "openai: "));
    let config = no_retry().with_call_timeout(Duration::from_secs(5));
    let orchestrator = orchestrator(factory, config);
    let start = Instant::now();

    let outcomes = orchestrator
        .dispatch(
            "hi",
            &[],
            &[Provider::Anthropic],
            &credentials(&[Provider::Anthropic, Provider::OpenAi]),
        )
        .await;

    assert_eq!(outcomes[0].substitute, Some(Provider::OpenAi));
    let elapsed = start.elapsed();
    assert!(elapsed >= Duration::from_secs(5) && elapsed < Duration::from_secs(6));
}

#[tokio::test(start_paused = true)]
async fn flaky_provider_recovers_within_retries() {
    let flaky = FlakyProvider::new(Provider::Gemini, 2);
    let factory = MockClientFactory::new().with(flaky.clone());
    let config = OrchestratorConfig::default();
    let orchestrator = orchestrator(factory, config);

    let outcomes = orchestrator
        .dispatch("hi", &[], &[Provider::Gemini], &credentials(&[Provider::Gemini]))
        .await;

    assert_eq!(outcomes[0], ProviderOutcome::success(Provider::Gemini, "hi"));
    assert_eq!(flaky.calls().get(), 3);
    let snapshot = orchestrator.breakers().snapshot(Provider::Gemini).await;
    assert_eq!(snapshot.state, CircuitState::Closed);
}

#[tokio::test(start_paused = true)]
async fn open_circuit_is_skipped_and_rerouted() {
    let grok = FailingProvider::server_error(Provider::Grok);
    let factory = MockClientFactory::new()
        .with(grok.clone())
        .with(EchoProvider::new(Provider::OpenAi));
    let config = OrchestratorConfig::default()
        .with_retry(RetryPolicy::default().with_max_retries(2))
        .with_circuit_breaker(CircuitBreakerConfig::default().with_failure_threshold(3));
    let orchestrator = orchestrator(factory, config);
    let creds = credentials(&[Provider::Grok, Provider::OpenAi]);

    let first = orchestrator.dispatch("one", &[], &[Provider::Grok], &creds).await;
    assert_eq!(first[0].substitute, Some(Provider::OpenAi));
    assert_eq!(grok.calls().get(), 3);
    assert_eq!(
        orchestrator.breakers().snapshot(Provider::Grok).await.state,
        CircuitState::Open
    );

    let second = orchestrator.dispatch("two", &[], &[Provider::Grok], &creds).await;
    assert_eq!(second[0].substitute, Some(Provider::OpenAi));
    assert_eq!(second[0].content, "two");
    assert_eq!(grok.calls().get(), 3);
}

#[tokio::test(start_paused = true)]
async fn cancellation_stops_the_chain() {
    let factory = MockClientFactory::new()
        .with(FailingProvider::new(Provider::OpenAi, ProviderError::Timeout))
        .with(EchoProvider::new(Provider::Anthropic));
    let config = OrchestratorConfig::default()
        .with_circuit_breaker(CircuitBreakerConfig::default().with_failure_threshold(10));
    let orchestrator = orchestrator(factory, config);
    let cancel = CancellationToken::new();

    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(1500)).await;
        trigger.cancel();
    });

    let outcomes = orchestrator
        .dispatch_with_cancel(
            "hi",
            &[],
            &[Provider::OpenAi],
            &credentials(&[Provider::OpenAi, Provider::Anthropic]),
            cancel,
        )
        .await;

    assert_eq!(outcomes[0], ProviderOutcome::failed(Provider::OpenAi, CANCELLED_TEXT));
}
