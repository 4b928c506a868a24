//! Update poller
//!
//! Fetches the remote every tick and, when a new remote head shows up,
//! notifies the owner with an update/ignore button pair. At most one
//! notification is sent per remote commit id, and a suppressed id is never
//! announced again.

use crate::changelog::{render_changelog, CHANGELOG_LIMIT};
use crate::repo::Repository;
use crate::state::UpdateState;
use crate::Result;
use dk_core::{Button, ChatId, CommandDispatcher, Invocation, KvStore, Markup, MessageId, Messenger};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

/// Callback data of the "update" button
pub const ACTION_UPDATE: &str = "devkit_update";
/// Callback data of the "ignore" button
pub const ACTION_IGNORE: &str = "devkit_upd_ignore";

const SUPPRESSED_TEXT: &str = "Notifications about this update have been suppressed";

#[derive(Debug, Clone)]
pub struct NotifierConfig {
    /// Where notifications go (the owner)
    pub chat: ChatId,
    /// Web URL of the repository, used for the compare link
    pub repo_url: String,
    /// Regular poll interval (default: 60s)
    pub interval: Duration,
    /// Poll interval while the pending commit is suppressed (default: 120s)
    pub ignored_interval: Duration,
    /// Commits listed in the changelog before the overflow footer
    pub changelog_limit: usize,
}

impl NotifierConfig {
    pub fn new(chat: ChatId, repo_url: impl Into<String>) -> Self {
        Self {
            chat,
            repo_url: repo_url.into(),
            interval: Duration::from_secs(60),
            ignored_interval: Duration::from_secs(120),
            changelog_limit: CHANGELOG_LIMIT,
        }
    }
}

/// What a single poll did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// No commits between local and remote head
    UpToDate,
    /// Pending commit is the suppressed one
    Suppressed,
    /// Pending commit is already checked out or already announced
    NothingNew,
    /// A notification was sent
    Notified(MessageId),
}

/// Result of handling an inline button press
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    /// Not one of ours
    Unrecognized,
    /// This commit id will not be announced again
    Suppressed(Option<String>),
    /// The host's update command was dispatched
    Updating,
}

pub struct UpdateNotifier {
    repo: Arc<dyn Repository>,
    messenger: Arc<dyn Messenger>,
    store: Arc<dyn KvStore>,
    dispatcher: Arc<dyn CommandDispatcher>,
    config: NotifierConfig,
    markup: Markup,
    /// Most recently observed remote head
    pending: Mutex<Option<String>>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl UpdateNotifier {
    pub fn new(
        repo: Arc<dyn Repository>,
        messenger: Arc<dyn Messenger>,
        store: Arc<dyn KvStore>,
        dispatcher: Arc<dyn CommandDispatcher>,
        config: NotifierConfig,
    ) -> Arc<Self> {
        Arc::new(Self {
            repo,
            messenger,
            store,
            dispatcher,
            config,
            markup: Markup::row(vec![
                Button::new("🔄 Update", ACTION_UPDATE),
                Button::new("🚫 Ignore", ACTION_IGNORE),
            ]),
            pending: Mutex::new(None),
            task: Mutex::new(None),
        })
    }

    /// Spawn the poller. Calling it again replaces the running poller.
    pub fn start(self: &Arc<Self>) {
        let this = Arc::clone(self);
        let task = tokio::spawn(async move { this.run().await });

        if let Some(previous) = self.task.lock().replace(task) {
            previous.abort();
        }
    }

    /// Cancel the poller
    pub fn unload(&self) {
        if let Some(task) = self.task.lock().take() {
            task.abort();
            info!("Update poller stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.task.lock().as_ref().map_or(false, |t| !t.is_finished())
    }

    /// Remote head seen by the latest poll
    pub fn pending(&self) -> Option<String> {
        self.pending.lock().clone()
    }

    pub fn markup(&self) -> &Markup {
        &self.markup
    }

    /// Poll forever; errors are logged and retried on the next tick
    async fn run(&self) {
        info!(
            "Starting update poller (interval: {:?}, while ignored: {:?})",
            self.config.interval, self.config.ignored_interval
        );

        loop {
            let delay = match self.tick().await {
                Ok(TickOutcome::Suppressed) => self.config.ignored_interval,
                Ok(outcome) => {
                    debug!("Update poll: {:?}", outcome);
                    self.config.interval
                }
                Err(e) => {
                    error!("Error occurred while fetching update: {}", e);
                    self.config.interval
                }
            };

            tokio::time::sleep(delay).await;
        }
    }

    /// Run one poll
    pub async fn tick(&self) -> Result<TickOutcome> {
        self.repo.fetch().await?;

        let commits = self.repo.pending_commits().await?;
        let Some(changelog) = render_changelog(&commits, self.config.changelog_limit) else {
            return Ok(TickOutcome::UpToDate);
        };

        let pending = self.repo.remote_head().await?;
        *self.pending.lock() = Some(pending.clone());

        let mut state = UpdateState::load(self.store.as_ref());
        if state.is_ignored(&pending) {
            return Ok(TickOutcome::Suppressed);
        }

        let local = self.repo.local_head().await?;
        if pending == local || state.is_notified(&pending) {
            return Ok(TickOutcome::NothingNew);
        }

        if let Some(previous) = state.message.take() {
            if let Err(e) = self.messenger.delete_message(self.config.chat, previous).await {
                debug!("Could not delete previous update notification {}: {}", previous, e);
            }
        }

        let text = self.notification_text(&local, &pending, &changelog);
        let message = self
            .messenger
            .send_message(self.config.chat, &text, Some(&self.markup))
            .await?;

        state.message = Some(message);
        state.notified = Some(pending.clone());
        state.ignored = None;
        state.save(self.store.as_ref())?;

        info!("Notified about update {}", short(&pending, 12));
        Ok(TickOutcome::Notified(message))
    }

    /// Handle an inline button press on a notification
    pub async fn handle_action(&self, data: &str) -> Result<ActionOutcome> {
        match data {
            ACTION_IGNORE => {
                let pending = self.pending();
                if let Some(commit) = &pending {
                    UpdateState::save_ignored(self.store.as_ref(), commit)?;
                    info!("Suppressed update notifications for {}", short(commit, 12));
                }
                self.messenger.answer_callback(SUPPRESSED_TEXT).await?;
                Ok(ActionOutcome::Suppressed(pending))
            }
            ACTION_UPDATE => {
                let state = UpdateState::load(self.store.as_ref());
                if let Some(message) = state.message {
                    if let Err(e) = self.messenger.delete_message(self.config.chat, message).await {
                        debug!("Could not delete update notification {}: {}", message, e);
                    }
                }

                self.dispatcher
                    .dispatch(Invocation::new("update", "--force", self.config.chat))
                    .await?;
                Ok(ActionOutcome::Updating)
            }
            _ => Ok(ActionOutcome::Unrecognized),
        }
    }

    fn notification_text(&self, local: &str, remote: &str, changelog: &str) -> String {
        let url = self.config.repo_url.trim_end_matches('/');
        format!(
            "🌘 <b>Update available!</b>\n\nNew version released.\n🔮 <b><s>{}</s> -> <a href=\"{}/compare/{}...{}\">{}</a></b>\n\n{}",
            short(local, 6),
            url,
            short(local, 12),
            short(remote, 12),
            short(remote, 6),
            changelog
        )
    }
}

/// First `len` characters of a commit id
fn short(id: &str, len: usize) -> &str {
    match id.char_indices().nth(len) {
        Some((idx, _)) => &id[..idx],
        None => id,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{RecordingDispatcher, RecordingMessenger, ScriptedRepository};
    use crate::UpdateError;
    use dk_core::MemoryStore;

    const LOCAL: &str = "abc1230000000000000000000000000000000000";
    const REMOTE: &str = "def4560000000000000000000000000000000000";
    const NEWER: &str = "0badc0de00000000000000000000000000000000";

    struct Fixture {
        repo: Arc<ScriptedRepository>,
        messenger: Arc<RecordingMessenger>,
        store: Arc<MemoryStore>,
        dispatcher: Arc<RecordingDispatcher>,
        notifier: Arc<UpdateNotifier>,
    }

    fn fixture() -> Fixture {
        let repo = Arc::new(ScriptedRepository::new(LOCAL));
        let messenger = Arc::new(RecordingMessenger::new());
        let store = Arc::new(MemoryStore::new());
        let dispatcher = Arc::new(RecordingDispatcher::new());
        let notifier = UpdateNotifier::new(
            repo.clone(),
            messenger.clone(),
            store.clone(),
            dispatcher.clone(),
            NotifierConfig::new(ChatId(1), "https://github.com/example/devkit"),
        );

        Fixture {
            repo,
            messenger,
            store,
            dispatcher,
            notifier,
        }
    }

    #[tokio::test]
    async fn test_up_to_date_sends_nothing() {
        let f = fixture();

        assert_eq!(f.notifier.tick().await.unwrap(), TickOutcome::UpToDate);
        assert!(f.messenger.sent().is_empty());
        assert_eq!(f.notifier.pending(), None);
    }

    #[tokio::test]
    async fn test_remote_equal_to_local_sends_nothing() {
        let f = fixture();
        // Log not empty but heads agree (e.g. HEAD moved by hand)
        f.repo.push_remote(LOCAL, &["Local change"]);

        assert_eq!(f.notifier.tick().await.unwrap(), TickOutcome::NothingNew);
        assert!(f.messenger.sent().is_empty());
    }

    #[tokio::test]
    async fn test_new_remote_head_is_announced_once() {
        let f = fixture();
        f.repo.push_remote(REMOTE, &["Add watcher", "Fix poller"]);

        let outcome = f.notifier.tick().await.unwrap();
        let sent = f.messenger.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(outcome, TickOutcome::Notified(sent[0].id));

        let text = &sent[0].text;
        assert!(text.contains("<s>abc123</s>"));
        assert!(text.contains(">def456</a>"));
        assert!(text.contains("/compare/abc123000000...def456000000"));
        assert!(text.contains("<i>Fix poller</i>"));
        assert!(text.contains("<i>Add watcher</i>"));

        let markup = sent[0].markup.as_ref().unwrap();
        assert!(markup.contains(ACTION_UPDATE));
        assert!(markup.contains(ACTION_IGNORE));
        assert_eq!(sent[0].chat, ChatId(1));

        // Same pending id again: no duplicate
        assert_eq!(f.notifier.tick().await.unwrap(), TickOutcome::NothingNew);
        assert_eq!(f.messenger.sent().len(), 1);

        let state = UpdateState::load(f.store.as_ref());
        assert_eq!(state.notified.as_deref(), Some(REMOTE));
        assert_eq!(state.message, Some(sent[0].id));
    }

    #[tokio::test]
    async fn test_ignore_suppresses_only_that_commit() {
        let f = fixture();
        f.repo.push_remote(REMOTE, &["Add watcher"]);
        f.notifier.tick().await.unwrap();

        let outcome = f.notifier.handle_action(ACTION_IGNORE).await.unwrap();
        assert_eq!(outcome, ActionOutcome::Suppressed(Some(REMOTE.to_string())));
        assert_eq!(f.messenger.answers(), vec![SUPPRESSED_TEXT.to_string()]);
        assert!(UpdateState::load(f.store.as_ref()).is_ignored(REMOTE));

        assert_eq!(f.notifier.tick().await.unwrap(), TickOutcome::Suppressed);
        assert_eq!(f.messenger.sent().len(), 1);

        // A different commit is announced and clears the suppression
        f.repo.push_remote(NEWER, &["Another change"]);
        assert!(matches!(f.notifier.tick().await.unwrap(), TickOutcome::Notified(_)));
        assert_eq!(f.messenger.sent().len(), 2);
        assert_eq!(UpdateState::load(f.store.as_ref()).ignored, None);
    }

    #[tokio::test]
    async fn test_ignore_before_first_poll_is_harmless() {
        let f = fixture();

        let outcome = f.notifier.handle_action(ACTION_IGNORE).await.unwrap();
        assert_eq!(outcome, ActionOutcome::Suppressed(None));
        assert_eq!(UpdateState::load(f.store.as_ref()).ignored, None);
    }

    #[tokio::test]
    async fn test_previous_notification_is_replaced() {
        let f = fixture();
        f.repo.push_remote(REMOTE, &["First"]);
        f.notifier.tick().await.unwrap();
        let first = f.messenger.sent()[0].id;

        f.repo.push_remote(NEWER, &["Second"]);
        f.notifier.tick().await.unwrap();

        assert_eq!(f.messenger.deleted(), vec![first]);
        let state = UpdateState::load(f.store.as_ref());
        assert_eq!(state.message, Some(f.messenger.sent()[1].id));
    }

    #[tokio::test]
    async fn test_delete_failure_is_ignored() {
        let f = fixture();
        f.messenger.fail_deletes();
        f.store
            .set("UpdateNotifier", "upd_msg", serde_json::json!(55))
            .unwrap();
        f.repo.push_remote(REMOTE, &["Change"]);

        assert!(matches!(f.notifier.tick().await.unwrap(), TickOutcome::Notified(_)));
    }

    #[tokio::test]
    async fn test_update_action_dispatches_forced_update() {
        let f = fixture();
        f.repo.push_remote(REMOTE, &["Change"]);
        f.notifier.tick().await.unwrap();
        let notification = f.messenger.sent()[0].id;

        let outcome = f.notifier.handle_action(ACTION_UPDATE).await.unwrap();
        assert_eq!(outcome, ActionOutcome::Updating);

        assert_eq!(
            f.dispatcher.invocations(),
            vec![Invocation::new("update", "--force", ChatId(1))]
        );
        assert_eq!(f.messenger.deleted(), vec![notification]);
    }

    #[tokio::test]
    async fn test_unknown_action_is_ignored() {
        let f = fixture();

        let outcome = f.notifier.handle_action("something_else").await.unwrap();
        assert_eq!(outcome, ActionOutcome::Unrecognized);
        assert!(f.dispatcher.invocations().is_empty());
        assert!(f.messenger.answers().is_empty());
        assert!(f.store.is_empty());
    }

    #[tokio::test]
    async fn test_after_update_local_head_catches_up() {
        let f = fixture();
        f.repo.push_remote(REMOTE, &["Change"]);
        f.notifier.tick().await.unwrap();

        f.repo.fast_forward();
        assert_eq!(f.notifier.tick().await.unwrap(), TickOutcome::UpToDate);
    }

    #[tokio::test]
    async fn test_fetch_error_surfaces_from_tick() {
        let f = fixture();
        f.repo.fail_next_fetches(1);

        let err = f.notifier.tick().await.unwrap_err();
        assert!(matches!(err, UpdateError::Git { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_poller_retries_after_errors() {
        let f = fixture();
        f.repo.push_remote(REMOTE, &["Change"]);
        f.repo.fail_next_fetches(2);

        f.notifier.start();
        assert!(f.notifier.is_running());

        // Two failed ticks, then a successful one
        tokio::time::sleep(Duration::from_secs(150)).await;
        assert_eq!(f.messenger.sent().len(), 1);

        f.notifier.unload();
        tokio::task::yield_now().await;
        assert!(!f.notifier.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_poller_backs_off_while_suppressed() {
        let f = fixture();
        f.repo.push_remote(REMOTE, &["Change"]);
        f.notifier.tick().await.unwrap();
        f.notifier.handle_action(ACTION_IGNORE).await.unwrap();
        assert_eq!(f.repo.fetches(), 1);

        // First tick runs immediately and is suppressed
        f.notifier.start();
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(f.repo.fetches(), 2);

        // No poll at the normal interval
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(f.repo.fetches(), 2);

        // Next poll after the ignored interval
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(f.repo.fetches(), 3);

        // A new commit is announced at t=240, then polls resume every 60s
        f.repo.push_remote(NEWER, &["Another change"]);
        tokio::time::sleep(Duration::from_secs(120)).await;
        assert_eq!(f.repo.fetches(), 4);
        assert_eq!(f.messenger.sent().len(), 2);

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(f.repo.fetches(), 5);
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(f.repo.fetches(), 6);

        f.notifier.unload();
    }

    #[test]
    fn test_short_ids() {
        assert_eq!(short("abcdef123456789", 6), "abcdef");
        assert_eq!(short("abc", 6), "abc");
    }
}
