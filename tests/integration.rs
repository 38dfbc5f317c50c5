#![cfg(test)]

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use chat_triage::{
    base::{
        config::{Config, ConfigInner, DispatchConfig, TriggerPolicy},
        types::{DispatchOutcome, Element, HandlerKind, InboundMessage, MessageClass, ProfileItem, ProfileItemMetadata, ReplyRequest, Res, UserProfile, Void},
    },
    runtime::Runtime,
    service::{
        chat::{ChatClient, GenericChatClient},
        db::{
            DbClient, GenericDbClient,
            surreal::{LogTable, SurrealDbClient},
        },
        judge::{GenericJudgeClient, JudgeClient},
        reply::{GenericReplyHandler, ReplyClient},
    },
    triage::{Dispatcher, observer::Observer},
};
use mockall::mock;

// Mocks.

mock! {
    pub Db {}

    #[async_trait]
    impl GenericDbClient for Db {
        async fn get_or_create_user(&self, user_id: &str, username: &str) -> Res<UserProfile>;
        async fn add_channel_memory(&self, message: &InboundMessage) -> Void;
        async fn add_broadcast_seed(&self, message: &InboundMessage) -> Void;
        async fn add_warning(&self, message: &InboundMessage) -> Void;
    }
}

mock! {
    pub Judge {}

    #[async_trait]
    impl GenericJudgeClient for Judge {
        async fn should_reply(&self, message: &InboundMessage) -> Res<bool>;
    }
}

mock! {
    pub Replies {}

    #[async_trait]
    impl GenericReplyHandler for Replies {
        async fn handle_private(&self, message: &InboundMessage, content: &str) -> Void;
        async fn handle_nickname(&self, message: &InboundMessage, content: &str) -> Void;
        async fn handle_auto_reply(&self, message: &InboundMessage, content: &str) -> Void;
        async fn handle_random(&self, message: &InboundMessage, content: &str) -> Void;
    }
}

mock! {
    pub Chat {}

    #[async_trait]
    impl GenericChatClient for Chat {
        fn bot_user_id(&self) -> &str;
        async fn next_message(&self) -> Res<Option<InboundMessage>>;
        async fn send_reply(&self, request: &ReplyRequest) -> Void;
    }
}

// Helpers.

/// A group message from `U1` in `G1`, seen by bot `B1`.
fn message(content: &str) -> InboundMessage {
    InboundMessage {
        content: content.to_string(),
        elements: vec![Element::Text { content: content.to_string() }],
        user_id: "U1".to_string(),
        username: Some("alice".to_string()),
        channel_id: "G1".to_string(),
        is_direct: None,
        subtype: None,
        self_id: "B1".to_string(),
    }
}

fn direct_message(content: &str) -> InboundMessage {
    InboundMessage {
        channel_id: "D1".to_string(),
        is_direct: Some(true),
        ..message(content)
    }
}

/// Every trigger path on, judge policy.
fn full_config() -> DispatchConfig {
    DispatchConfig {
        enable_auto_reply: true,
        max_tokens: 50,
        nick_name_enabled: true,
        nick_name_list: vec!["kitty".to_string()],
        nick_name_block_words: vec!["閉嘴".to_string()],
        private_enabled: true,
        ..Default::default()
    }
}

/// A database mock that accepts all bookkeeping and serves `profile`.
fn db_mock(profile: UserProfile) -> MockDb {
    let mut db = MockDb::new();

    db.expect_get_or_create_user().returning(move |_, _| Ok(profile.clone()));
    db.expect_add_channel_memory().returning(|_| Ok(()));
    db.expect_add_broadcast_seed().returning(|_| Ok(()));
    db.expect_add_warning().returning(|_| Ok(()));

    db
}

fn dispatcher(config: DispatchConfig, db: MockDb, judge: MockJudge, replies: MockReplies) -> Dispatcher {
    Dispatcher::new(config, DbClient::new(Arc::new(db)), JudgeClient::new(Arc::new(judge)), ReplyClient::new(Arc::new(replies)))
}

fn profile_with_nickname(nickname: &str) -> UserProfile {
    let mut profile = UserProfile::new("U1", "alice");
    profile.items.insert(
        "情侶合照".to_string(),
        ProfileItem {
            count: 1,
            metadata: Some(ProfileItemMetadata {
                user_nickname: Some(nickname.to_string()),
                bot_nickname: None,
            }),
        },
    );
    profile
}

/// Records the content of every ordinary message it sees.
struct RecordingObserver {
    seen: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl Observer for RecordingObserver {
    fn name(&self) -> &'static str {
        "recording"
    }

    fn applies(&self, _message: &InboundMessage, class: MessageClass, _config: &DispatchConfig) -> bool {
        !class.is_special()
    }

    async fn observe(&self, message: &InboundMessage) -> Void {
        self.seen.lock().unwrap().push(message.content.clone());
        Ok(())
    }
}

// Routing.

#[tokio::test]
async fn private_wins_over_nickname() {
    let mut db = MockDb::new();
    db.expect_get_or_create_user().never();
    db.expect_add_channel_memory().times(1).returning(|_| Ok(()));
    db.expect_add_broadcast_seed().times(1).returning(|_| Ok(()));
    db.expect_add_warning().never();

    let mut judge = MockJudge::new();
    judge.expect_should_reply().never();

    let mut replies = MockReplies::new();
    replies
        .expect_handle_private()
        .withf(|_, content| content.to_string() == "kitty 你好")
        .times(1)
        .returning(|_, _| Ok(()));
    replies.expect_handle_nickname().never();
    replies.expect_handle_auto_reply().never();

    let dispatcher = dispatcher(full_config(), db, judge, replies);

    let outcome = dispatcher.dispatch(&direct_message("  kitty 你好 ")).await.unwrap();

    assert_eq!(outcome, DispatchOutcome::Handled(HandlerKind::Private));
}

#[tokio::test]
async fn empty_private_message_passes_through() {
    let mut judge = MockJudge::new();
    judge.expect_should_reply().never();

    let mut replies = MockReplies::new();
    replies.expect_handle_private().never();

    let dispatcher = dispatcher(full_config(), db_mock(UserProfile::default()), judge, replies);

    let outcome = dispatcher.dispatch(&direct_message("   ")).await.unwrap();

    assert_eq!(outcome, DispatchOutcome::PassThrough);
}

#[tokio::test]
async fn private_disabled_falls_to_auto_reply() {
    let mut judge = MockJudge::new();
    judge.expect_should_reply().times(1).returning(|_| Ok(true));

    let mut replies = MockReplies::new();
    replies.expect_handle_private().never();
    replies.expect_handle_nickname().never();
    replies.expect_handle_auto_reply().times(1).returning(|_, _| Ok(()));

    let config = DispatchConfig {
        private_enabled: false,
        ..full_config()
    };
    let dispatcher = dispatcher(config, db_mock(UserProfile::default()), judge, replies);

    // Group-only nickname trigger does not apply to direct messages.
    let outcome = dispatcher.dispatch(&direct_message("kitty 你好")).await.unwrap();

    assert_eq!(outcome, DispatchOutcome::Handled(HandlerKind::AutoReply));
}

#[tokio::test]
async fn nickname_hands_over_normalized_prompt() {
    let mut judge = MockJudge::new();
    judge.expect_should_reply().never();

    let mut replies = MockReplies::new();
    replies
        .expect_handle_nickname()
        .withf(|message, content| message.channel_id == "G1" && content.to_string() == "寶貝 在嗎")
        .times(1)
        .returning(|_, _| Ok(()));

    let dispatcher = dispatcher(full_config(), db_mock(profile_with_nickname("寶貝")), judge, replies);

    let outcome = dispatcher.dispatch(&message(" 寶貝 在嗎 ")).await.unwrap();

    assert_eq!(outcome, DispatchOutcome::Handled(HandlerKind::NickName));
}

#[tokio::test]
async fn mention_without_nickname_handling_reaches_gate() {
    let mut judge = MockJudge::new();
    judge.expect_should_reply().times(1).returning(|_| Ok(true));

    let mut replies = MockReplies::new();
    replies.expect_handle_nickname().never();
    replies
        .expect_handle_auto_reply()
        .withf(|_, content| content.to_string() == "@bot 你好")
        .times(1)
        .returning(|_, _| Ok(()));

    let config = DispatchConfig {
        nick_name_enabled: false,
        ..full_config()
    };
    let dispatcher = dispatcher(config, db_mock(UserProfile::default()), judge, replies);

    let mut msg = message("@bot 你好");
    msg.elements = vec![
        Element::Text { content: "你好 ".to_string() },
        Element::Mention { id: "B1".to_string(), name: Some("bot".to_string()) },
    ];

    let outcome = dispatcher.dispatch(&msg).await.unwrap();

    assert_eq!(outcome, DispatchOutcome::Handled(HandlerKind::AutoReply));
}

#[tokio::test]
async fn block_word_vetoes_nickname_and_mention() {
    let mut judge = MockJudge::new();
    judge.expect_should_reply().times(1).returning(|_| Ok(false));

    let mut replies = MockReplies::new();
    replies.expect_handle_nickname().never();
    replies.expect_handle_auto_reply().never();

    let dispatcher = dispatcher(full_config(), db_mock(UserProfile::default()), judge, replies);

    let mut msg = message("kitty 閉嘴");
    msg.elements.push(Element::Mention { id: "B1".to_string(), name: None });

    let outcome = dispatcher.dispatch(&msg).await.unwrap();

    assert_eq!(outcome, DispatchOutcome::PassThrough);
}

#[tokio::test]
async fn link_is_special_and_passes_through() {
    let mut db = MockDb::new();
    db.expect_get_or_create_user().never();
    db.expect_add_channel_memory().never();
    db.expect_add_broadcast_seed().times(1).returning(|_| Ok(()));

    let mut judge = MockJudge::new();
    judge.expect_should_reply().never();

    let mut replies = MockReplies::new();
    replies.expect_handle_nickname().never();
    replies.expect_handle_random().never();
    replies.expect_handle_auto_reply().never();

    // Random trigger that would always fire for ordinary messages.
    let config = DispatchConfig {
        trigger_policy: TriggerPolicy::Random,
        random_reply_probability: 1.0,
        random_min_tokens: 0,
        ..full_config()
    };
    let dispatcher = dispatcher(config, db, judge, replies).with_roll(Arc::new(|| 0.0));

    let outcome = dispatcher.dispatch(&message("kitty https://example.com")).await.unwrap();

    assert_eq!(outcome, DispatchOutcome::PassThrough);
}

#[tokio::test]
async fn long_message_never_reaches_judge() {
    let mut judge = MockJudge::new();
    judge.expect_should_reply().never();

    let mut replies = MockReplies::new();
    replies.expect_handle_auto_reply().never();

    let dispatcher = dispatcher(full_config(), db_mock(UserProfile::default()), judge, replies);

    let outcome = dispatcher.dispatch(&message(&"字".repeat(80))).await.unwrap();

    assert_eq!(outcome, DispatchOutcome::PassThrough);
}

#[tokio::test]
async fn judge_failure_passes_through() {
    let mut judge = MockJudge::new();
    judge.expect_should_reply().times(1).returning(|_| Err(anyhow::anyhow!("upstream 500")));

    let mut replies = MockReplies::new();
    replies.expect_handle_auto_reply().never();

    let dispatcher = dispatcher(full_config(), db_mock(UserProfile::default()), judge, replies);

    let outcome = dispatcher.dispatch(&message("anyone around?")).await.unwrap();

    assert_eq!(outcome, DispatchOutcome::PassThrough);
}

#[tokio::test]
async fn random_policy_replaces_judge() {
    let mut judge = MockJudge::new();
    judge.expect_should_reply().never();

    let mut replies = MockReplies::new();
    replies
        .expect_handle_random()
        .withf(|_, content| content.to_string() == "what a lovely afternoon")
        .times(1)
        .returning(|_, _| Ok(()));

    let config = DispatchConfig {
        trigger_policy: TriggerPolicy::Random,
        random_reply_probability: 0.3,
        random_min_tokens: 5,
        ..full_config()
    };
    let dispatcher = dispatcher(config, db_mock(UserProfile::default()), judge, replies).with_roll(Arc::new(|| 0.1));

    let outcome = dispatcher.dispatch(&message("what a lovely afternoon")).await.unwrap();

    assert_eq!(outcome, DispatchOutcome::Handled(HandlerKind::Random));
}

#[tokio::test]
async fn bare_self_mention_passes_through_without_fallback() {
    let mut judge = MockJudge::new();
    judge.expect_should_reply().never();

    let mut replies = MockReplies::new();
    replies.expect_handle_nickname().never();
    replies.expect_handle_auto_reply().never();

    let dispatcher = dispatcher(full_config(), db_mock(UserProfile::default()), judge, replies);

    // The mention trails an empty text element, so the message stays ordinary.
    let mut msg = message(r#"<at id="B1"/>"#);
    msg.elements = vec![
        Element::Text { content: String::new() },
        Element::Mention { id: "B1".to_string(), name: None },
    ];

    let outcome = dispatcher.dispatch(&msg).await.unwrap();

    assert_eq!(outcome, DispatchOutcome::PassThrough);
}

#[tokio::test]
async fn own_direct_message_is_never_answered() {
    let mut judge = MockJudge::new();
    judge.expect_should_reply().never();

    let mut replies = MockReplies::new();
    replies.expect_handle_private().never();
    replies.expect_handle_auto_reply().never();

    let dispatcher = dispatcher(full_config(), db_mock(UserProfile::default()), judge, replies);

    let mut msg = direct_message("echoed reply");
    msg.user_id = "B1".to_string();

    let outcome = dispatcher.dispatch(&msg).await.unwrap();

    assert_eq!(outcome, DispatchOutcome::PassThrough);
}

#[tokio::test]
async fn custom_observers_replace_the_defaults() {
    let mut db = MockDb::new();
    db.expect_add_channel_memory().never();
    db.expect_add_broadcast_seed().never();
    db.expect_add_warning().never();

    let seen = Arc::new(Mutex::new(Vec::new()));
    let observer = RecordingObserver { seen: seen.clone() };

    let config = DispatchConfig {
        enable_auto_reply: false,
        trigger_policy: TriggerPolicy::Random,
        ..full_config()
    };
    let dispatcher = dispatcher(config, db, MockJudge::new(), MockReplies::new()).with_observers(vec![Arc::new(observer)])
        .with_roll(Arc::new(|| 1.0));

    assert_eq!(dispatcher.config().trigger_policy, TriggerPolicy::Random);

    dispatcher.dispatch(&message("hello")).await.unwrap();
    dispatcher.dispatch(&message("https://example.com")).await.unwrap();

    assert_eq!(*seen.lock().unwrap(), vec!["hello".to_string()]);
}

// Failures.

#[tokio::test]
async fn observer_failure_does_not_change_routing() {
    let mut db = MockDb::new();
    db.expect_add_channel_memory().times(1).returning(|_| Err(anyhow::anyhow!("memory store down")));
    db.expect_add_broadcast_seed().times(1).returning(|_| Err(anyhow::anyhow!("broadcast store down")));

    let mut replies = MockReplies::new();
    replies.expect_handle_private().times(1).returning(|_, _| Ok(()));

    let dispatcher = dispatcher(full_config(), db, MockJudge::new(), replies);

    let outcome = dispatcher.dispatch(&direct_message("hello")).await.unwrap();

    assert_eq!(outcome, DispatchOutcome::Handled(HandlerKind::Private));
}

#[tokio::test]
async fn warning_list_sees_only_the_warning_channel() {
    let mut db = MockDb::new();
    db.expect_add_warning().withf(|message| message.channel_id == "G-WARN").times(1).returning(|_| Ok(()));
    db.expect_add_channel_memory().times(2).returning(|_| Ok(()));
    db.expect_add_broadcast_seed().times(2).returning(|_| Ok(()));

    let config = DispatchConfig {
        enable_auto_reply: false,
        nick_name_enabled: false,
        favorability_enabled: true,
        warning_enabled: true,
        warning_channel_id: "G-WARN".to_string(),
        ..full_config()
    };
    let dispatcher = dispatcher(config, db, MockJudge::new(), MockReplies::new());

    let mut warned = message("something suspicious");
    warned.channel_id = "G-WARN".to_string();

    assert_eq!(dispatcher.dispatch(&warned).await.unwrap(), DispatchOutcome::PassThrough);
    assert_eq!(dispatcher.dispatch(&message("something else")).await.unwrap(), DispatchOutcome::PassThrough);
}

#[tokio::test]
async fn profile_failure_propagates() {
    let mut db = MockDb::new();
    db.expect_get_or_create_user().times(1).returning(|_, _| Err(anyhow::anyhow!("profile store down")));
    db.expect_add_channel_memory().returning(|_| Ok(()));
    db.expect_add_broadcast_seed().returning(|_| Ok(()));

    let mut judge = MockJudge::new();
    judge.expect_should_reply().never();

    let mut replies = MockReplies::new();
    replies.expect_handle_nickname().never();
    replies.expect_handle_auto_reply().never();

    let dispatcher = dispatcher(full_config(), db, judge, replies);

    assert!(dispatcher.dispatch(&message("kitty hi")).await.is_err());
}

#[tokio::test]
async fn handler_failure_is_terminal() {
    let mut judge = MockJudge::new();
    judge.expect_should_reply().never();

    let mut replies = MockReplies::new();
    replies.expect_handle_nickname().times(1).returning(|_, _| Err(anyhow::anyhow!("send failed")));
    replies.expect_handle_auto_reply().never();

    let dispatcher = dispatcher(full_config(), db_mock(UserProfile::default()), judge, replies);

    let err = dispatcher.dispatch(&message("kitty hi")).await.unwrap_err();

    assert!(format!("{err:#}").contains("send failed"));
}

// Storage.

#[tokio::test]
async fn surreal_store_creates_profiles_once() {
    let store = SurrealDbClient::memory().await.unwrap();

    let first = store.get_or_create_user("U1", "alice").await.unwrap();
    let second = store.get_or_create_user("U1", "someone else").await.unwrap();

    assert_eq!(first.user_id, "U1");
    assert_eq!(second.username, "alice");
    assert!(second.items.is_empty());
}

#[tokio::test]
async fn surreal_store_records_bookkeeping() {
    let store = SurrealDbClient::memory().await.unwrap();

    let config = DispatchConfig {
        enable_auto_reply: false,
        nick_name_enabled: false,
        favorability_enabled: true,
        warning_enabled: true,
        warning_channel_id: "G1".to_string(),
        ..full_config()
    };
    let dispatcher = Dispatcher::new(
        config,
        DbClient::new(Arc::new(store.clone())),
        JudgeClient::new(Arc::new(MockJudge::new())),
        ReplyClient::new(Arc::new(MockReplies::new())),
    );

    dispatcher.dispatch(&message("good morning")).await.unwrap();
    dispatcher.dispatch(&message("https://example.com")).await.unwrap();

    let memory = store.list_entries(LogTable::ChannelMemory, "G1").await.unwrap();
    let seeds = store.list_entries(LogTable::BroadcastSeed, "G1").await.unwrap();
    let warnings = store.list_entries(LogTable::Warning, "G1").await.unwrap();

    assert_eq!(memory.len(), 1);
    assert_eq!(memory[0].content, "good morning");
    assert_eq!(seeds.len(), 2);
    assert_eq!(warnings.len(), 2);
    assert!(store.list_entries(LogTable::ChannelMemory, "G2").await.unwrap().is_empty());
}

// Runtime.

#[tokio::test]
async fn runtime_relays_selected_replies() {
    let messages = VecDeque::from(vec![message("kitty 在嗎"), message("https://example.com"), direct_message("hi"), message("hello")]);
    let queue = Arc::new(Mutex::new(messages));

    let mut chat = MockChat::new();
    chat.expect_bot_user_id().return_const("B1".to_string());
    chat.expect_next_message().returning(move || Ok(queue.lock().unwrap().pop_front()));
    chat.expect_send_reply()
        .withf(|request| request.kind == HandlerKind::NickName && request.content == "kitty 在嗎" && request.channel_id == "G1")
        .times(1)
        .returning(|_| Ok(()));
    chat.expect_send_reply()
        .withf(|request| request.kind == HandlerKind::Private && request.content == "hi")
        .times(1)
        .returning(|_| Ok(()));

    let config = Config {
        inner: Arc::new(ConfigInner {
            bot_user_id: "B1".to_string(),
            dispatch: DispatchConfig {
                enable_auto_reply: false,
                ..full_config()
            },
            ..Default::default()
        }),
    };

    let db = DbClient::surreal_memory().await.unwrap();
    let runtime = Runtime::from_parts(config, db, JudgeClient::new(Arc::new(MockJudge::new())), ChatClient::new(Arc::new(chat)));

    runtime.run().await.unwrap();
}
