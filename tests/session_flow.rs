//! End-to-end tests for the session state machine and the command
//! interpreter, driven through a stub search backend.

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::SeedableRng;
use searxngr::client::{SearchClient, SearchError};
use searxngr::command::{self, ActionTarget, Command, SessionEffect};
use searxngr::query::{PageDirection, QueryContext, TimeRange};
use searxngr::results::{ResultPage, SearchResult};
use searxngr::session::{DisplayFlags, DisplayToggle, Session, SessionError, SessionState};
use std::sync::{Arc, Mutex};

#[derive(Clone)]
struct StubClient {
    calls: Arc<Mutex<Vec<QueryContext>>>,
    fail: Arc<Mutex<bool>>,
    per_page: usize,
}

impl StubClient {
    fn new(per_page: usize) -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            fail: Arc::new(Mutex::new(false)),
            per_page,
        }
    }

    fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn last_call(&self) -> QueryContext {
        self.calls.lock().unwrap().last().cloned().unwrap()
    }

    fn set_fail(&self, fail: bool) {
        *self.fail.lock().unwrap() = fail;
    }
}

#[async_trait]
impl SearchClient for StubClient {
    async fn execute(&self, context: &QueryContext) -> Result<ResultPage, SearchError> {
        self.calls.lock().unwrap().push(context.clone());
        if *self.fail.lock().unwrap() {
            return Err(SearchError::Server {
                status: 500,
                body: "boom".to_string(),
            });
        }
        let results = (0..self.per_page)
            .map(|i| {
                let mut r = SearchResult::new(
                    format!("result {i}"),
                    format!("https://example.com/{}/{}", context.page_index(), i),
                );
                // The second result is reported by two engines.
                r.engines = if i == 1 {
                    vec!["bing".to_string(), "duckduckgo".to_string()]
                } else {
                    vec!["duckduckgo".to_string()]
                };
                r
            })
            .collect();
        Ok(ResultPage::new(results, context.page_index(), Some(100), true))
    }
}

fn session_with(client: &StubClient, page_size: usize) -> Session {
    let mut session = Session::new(Box::new(client.clone()));
    let mut context = QueryContext::new("sky blue").unwrap();
    context.set_page_size(page_size);
    session
        .bootstrap(context, DisplayFlags::default())
        .unwrap();
    session
}

fn rng() -> StdRng {
    StdRng::seed_from_u64(7)
}

#[tokio::test]
async fn bootstrap_search_display_lifecycle() {
    let client = StubClient::new(10);
    let mut session = session_with(&client, 10);
    assert_eq!(session.state(), SessionState::Ready);
    assert!(session.page().is_none());

    session.search().await.unwrap();
    assert_eq!(session.state(), SessionState::Displaying);
    assert_eq!(session.page().unwrap().len(), 10);
}

#[tokio::test]
async fn next_page_advances_offset_and_requeries() {
    let client = StubClient::new(10);
    let mut session = session_with(&client, 10);
    session.search().await.unwrap();

    session.turn_page(PageDirection::Next).await.unwrap();

    let context = session.context().unwrap();
    assert_eq!(context.offset(), 10);
    assert_eq!(client.call_count(), 2);
    assert_eq!(client.last_call().offset(), 10);
    assert_eq!(session.page().unwrap().page_index(), 1);
}

#[tokio::test]
async fn first_rewinds_like_a_direct_reset() {
    let client = StubClient::new(10);
    let mut session = session_with(&client, 10);
    session.search().await.unwrap();
    session.turn_page(PageDirection::Next).await.unwrap();
    session.turn_page(PageDirection::Next).await.unwrap();
    assert_eq!(session.context().unwrap().offset(), 20);

    session.turn_page(PageDirection::First).await.unwrap();
    assert_eq!(session.context().unwrap().offset(), 0);

    session.turn_page(PageDirection::Next).await.unwrap();
    assert_eq!(session.context().unwrap().offset(), 10);
    session.turn_page(PageDirection::Previous).await.unwrap();
    assert_eq!(session.context().unwrap().offset(), 0);
}

#[tokio::test]
async fn paging_rejected_when_page_size_is_zero() {
    let client = StubClient::new(7);
    let mut session = session_with(&client, 0);
    session.search().await.unwrap();

    let err = session.turn_page(PageDirection::Next).await.unwrap_err();
    assert!(matches!(err, SessionError::Paging(_)));
    // State untouched: same page, same offset, no extra network call.
    assert_eq!(session.context().unwrap().offset(), 0);
    assert_eq!(client.call_count(), 1);
}

#[tokio::test]
async fn failed_search_keeps_the_previous_page() {
    let client = StubClient::new(3);
    let mut session = session_with(&client, 3);
    session.search().await.unwrap();
    let old_url = session.page().unwrap().get(0).unwrap().url.clone();

    client.set_fail(true);
    session.set_query("different").unwrap();
    let err = session.search().await.unwrap_err();
    assert!(matches!(err, SessionError::Search(_)));

    // The mutation stands, the page swap never happened.
    assert_eq!(session.context().unwrap().query(), "different");
    assert_eq!(session.page().unwrap().get(0).unwrap().url, old_url);
    assert_eq!(session.state(), SessionState::Displaying);
}

#[tokio::test]
async fn failed_page_turn_keeps_the_offset() {
    let client = StubClient::new(10);
    let mut session = session_with(&client, 10);
    session.search().await.unwrap();

    client.set_fail(true);
    assert!(session.turn_page(PageDirection::Next).await.is_err());
    assert_eq!(session.context().unwrap().offset(), 0);
    assert_eq!(session.page().unwrap().page_index(), 0);
}

#[tokio::test]
async fn engine_add_command_requeries_with_the_merged_set() {
    let client = StubClient::new(5);
    let mut session = session_with(&client, 5);
    session.search().await.unwrap();
    let cmd = command::parse("e duckduckgo").unwrap().unwrap();
    command::apply(&mut session, cmd, &mut rng()).unwrap();

    let cmd = command::parse("e +bing").unwrap().unwrap();
    let effect = command::apply(&mut session, cmd, &mut rng()).unwrap();
    assert_eq!(effect, SessionEffect::Requery);

    let engines: Vec<_> = session
        .context()
        .unwrap()
        .engines()
        .iter()
        .cloned()
        .collect();
    assert_eq!(engines, vec!["bing".to_string(), "duckduckgo".to_string()]);

    session.search().await.unwrap();
    assert_eq!(client.last_call().engines().len(), 2);
}

#[tokio::test]
async fn invalid_time_range_reports_without_touching_anything() {
    let client = StubClient::new(5);
    let mut session = session_with(&client, 5);
    session.search().await.unwrap();
    let calls_before = client.call_count();

    let err = command::parse("t weekk").unwrap_err();
    assert!(err.to_string().contains("weekk"));

    assert_eq!(session.context().unwrap().time_range(), None);
    assert_eq!(client.call_count(), calls_before);
}

#[tokio::test]
async fn valid_time_range_mutates_and_requeries() {
    let client = StubClient::new(5);
    let mut session = session_with(&client, 5);
    session.search().await.unwrap();

    let cmd = command::parse("t w").unwrap().unwrap();
    let effect = command::apply(&mut session, cmd, &mut rng()).unwrap();
    assert_eq!(effect, SessionEffect::Requery);
    assert_eq!(
        session.context().unwrap().time_range(),
        Some(TimeRange::Week)
    );
}

#[tokio::test]
async fn every_contributing_engine_is_reported() {
    let client = StubClient::new(3);
    let mut session = session_with(&client, 3);
    session.search().await.unwrap();

    let result = session.result_at(1).unwrap();
    assert_eq!(
        result.engines,
        vec!["bing".to_string(), "duckduckgo".to_string()]
    );
    // The raw dump carries both too.
    let json = serde_json::to_value(result).unwrap();
    assert_eq!(json["engines"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn inspect_validates_the_index() {
    let client = StubClient::new(3);
    let mut session = session_with(&client, 3);
    session.search().await.unwrap();

    let cmd = command::parse("j 3").unwrap().unwrap();
    let effect = command::apply(&mut session, cmd, &mut rng()).unwrap();
    assert_eq!(effect, SessionEffect::ShowRaw(2));

    let cmd = command::parse("j 4").unwrap().unwrap();
    let err = command::apply(&mut session, cmd, &mut rng()).unwrap_err();
    assert!(matches!(
        err,
        SessionError::IndexOutOfRange { index: 4, len: 3 }
    ));
}

#[tokio::test]
async fn open_targets_resolve_against_the_current_page() {
    let client = StubClient::new(4);
    let mut session = session_with(&client, 4);
    session.search().await.unwrap();

    let effect = command::apply(
        &mut session,
        Command::Open(ActionTarget::First),
        &mut rng(),
    )
    .unwrap();
    assert_eq!(
        effect,
        SessionEffect::OpenUrl("https://example.com/0/0".to_string())
    );

    // Random is injected and uniform over the page indices.
    let effect = command::apply(
        &mut session,
        Command::Open(ActionTarget::Random),
        &mut StdRng::seed_from_u64(42),
    )
    .unwrap();
    let SessionEffect::OpenUrl(url) = effect else {
        panic!("expected an open effect");
    };
    assert!(url.starts_with("https://example.com/0/"));

    // Same seed, same pick.
    let again = command::apply(
        &mut session,
        Command::Open(ActionTarget::Random),
        &mut StdRng::seed_from_u64(42),
    )
    .unwrap();
    assert_eq!(again, SessionEffect::OpenUrl(url));
}

#[tokio::test]
async fn toggles_never_touch_the_network() {
    let client = StubClient::new(3);
    let mut session = session_with(&client, 3);
    session.search().await.unwrap();
    let calls_before = client.call_count();

    for line in ["x", "d", "a"] {
        let cmd = command::parse(line).unwrap().unwrap();
        let effect = command::apply(&mut session, cmd, &mut rng()).unwrap();
        assert_eq!(effect, SessionEffect::Redisplay);
    }
    assert!(session.flags().expand);
    assert!(session.flags().debug);
    assert!(!session.flags().color);
    assert_eq!(client.call_count(), calls_before);
}

#[tokio::test]
async fn quit_closes_and_close_is_idempotent() {
    let client = StubClient::new(3);
    let mut session = session_with(&client, 3);
    session.search().await.unwrap();

    let cmd = command::parse("quit").unwrap().unwrap();
    let effect = command::apply(&mut session, cmd, &mut rng()).unwrap();
    assert_eq!(effect, SessionEffect::Exit);
    assert!(session.is_closed());

    session.close();
    assert!(session.is_closed());
    assert!(matches!(
        session.search().await.unwrap_err(),
        SessionError::InvalidState(_)
    ));
}

#[tokio::test]
async fn actions_without_results_are_rejected() {
    let client = StubClient::new(0);
    let mut session = session_with(&client, 10);
    session.search().await.unwrap();

    let err = command::apply(
        &mut session,
        Command::Open(ActionTarget::First),
        &mut rng(),
    )
    .unwrap_err();
    assert!(matches!(err, SessionError::NoResults));
}

#[tokio::test]
async fn unknown_engines_are_flagged_but_still_applied() {
    let client = StubClient::new(3);
    let mut session = session_with(&client, 3);
    session.set_known_engines(vec!["bing".to_string(), "duckduckgo".to_string()]);

    let cmd = command::parse("e +qwant +bing").unwrap().unwrap();
    let effect = command::apply(&mut session, cmd, &mut rng()).unwrap();
    assert_eq!(effect, SessionEffect::Requery);
    // The unknown name went through anyway; the server gets to decide.
    assert!(session.context().unwrap().engines().contains("qwant"));
    assert!(session.context().unwrap().engines().contains("bing"));
}

#[tokio::test]
async fn history_is_bounded_and_ordered() {
    let client = StubClient::new(1);
    let mut session = session_with(&client, 1);

    for i in 0..505 {
        session.push_history(&format!("line {i}"));
    }
    assert_eq!(session.history().len(), 500);
    assert_eq!(session.history()[0], "line 5");
    assert_eq!(session.history()[499], "line 504");
}

#[tokio::test]
async fn toggle_returns_the_new_value() {
    let client = StubClient::new(1);
    let mut session = session_with(&client, 1);
    assert!(session.toggle(DisplayToggle::Expand));
    assert!(!session.toggle(DisplayToggle::Expand));
}
