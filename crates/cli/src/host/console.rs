//! Terminal messenger

use async_trait::async_trait;
use dk_core::{ChatId, HostError, Markup, MessageId, Messenger};
use owo_colors::OwoColorize;
use parking_lot::Mutex;
use std::path::PathBuf;
use std::sync::atomic::{AtomicI64, Ordering};

/// A message as it currently stands
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Posted {
    pub chat: ChatId,
    pub id: MessageId,
    pub text: String,
    pub markup: Option<Markup>,
    /// Outbox path for uploads
    pub file: Option<PathBuf>,
    pub deleted: bool,
}

/// [`Messenger`] that renders to stdout and keeps a transcript
pub struct ConsoleMessenger {
    outbox: PathBuf,
    next_id: AtomicI64,
    transcript: Mutex<Vec<Posted>>,
    answers: Mutex<Vec<String>>,
    quiet: bool,
}

impl ConsoleMessenger {
    pub fn new(outbox: PathBuf) -> Self {
        Self {
            outbox,
            next_id: AtomicI64::new(1),
            transcript: Mutex::new(Vec::new()),
            answers: Mutex::new(Vec::new()),
            quiet: false,
        }
    }

    /// Record only, print nothing
    pub fn quiet(mut self) -> Self {
        self.quiet = true;
        self
    }

    pub fn transcript(&self) -> Vec<Posted> {
        self.transcript.lock().clone()
    }

    /// Latest message that is still visible
    pub fn last_visible(&self) -> Option<Posted> {
        self.transcript.lock().iter().rev().find(|p| !p.deleted).cloned()
    }

    pub fn answers(&self) -> Vec<String> {
        self.answers.lock().clone()
    }

    fn post(&self, chat: ChatId, text: &str, markup: Option<&Markup>, file: Option<PathBuf>) -> MessageId {
        let id = MessageId(self.next_id.fetch_add(1, Ordering::SeqCst));
        let posted = Posted {
            chat,
            id,
            text: text.to_string(),
            markup: markup.cloned(),
            file,
            deleted: false,
        };

        self.render(&posted);
        self.transcript.lock().push(posted);
        id
    }

    fn render(&self, posted: &Posted) {
        if self.quiet {
            return;
        }

        println!("{} {}", posted.id.to_string().dimmed(), strip_html(&posted.text));
        if let Some(file) = &posted.file {
            println!("   {} {}", "📎".dimmed(), file.display().cyan());
        }
        if let Some(markup) = &posted.markup {
            for row in &markup.rows {
                let rendered: Vec<String> = row
                    .iter()
                    .map(|b| format!("[{}] {}", b.text, format!("press {}", b.data).dimmed()))
                    .collect();
                println!("   {}", rendered.join("  "));
            }
        }
    }

    fn find_mut<'a>(
        transcript: &'a mut [Posted],
        chat: ChatId,
        message: MessageId,
    ) -> dk_core::Result<&'a mut Posted> {
        transcript
            .iter_mut()
            .find(|p| p.chat == chat && p.id == message && !p.deleted)
            .ok_or_else(|| HostError::Messaging(format!("message {} not found in chat {}", message, chat)))
    }
}

#[async_trait]
impl Messenger for ConsoleMessenger {
    async fn send_message(&self, chat: ChatId, text: &str, markup: Option<&Markup>) -> dk_core::Result<MessageId> {
        Ok(self.post(chat, text, markup, None))
    }

    async fn edit_message(&self, chat: ChatId, message: MessageId, text: &str) -> dk_core::Result<()> {
        let mut transcript = self.transcript.lock();
        let posted = Self::find_mut(&mut transcript, chat, message)?;
        posted.text = text.to_string();

        if !self.quiet {
            println!("{} {}", format!("{} (edited)", message).dimmed(), strip_html(text));
        }
        Ok(())
    }

    async fn delete_message(&self, chat: ChatId, message: MessageId) -> dk_core::Result<()> {
        let mut transcript = self.transcript.lock();
        let posted = Self::find_mut(&mut transcript, chat, message)?;
        posted.deleted = true;

        if !self.quiet {
            println!("{}", format!("{} (deleted)", message).dimmed());
        }
        Ok(())
    }

    async fn send_file(
        &self,
        chat: ChatId,
        file_name: &str,
        contents: &[u8],
        caption: &str,
    ) -> dk_core::Result<MessageId> {
        tokio::fs::create_dir_all(&self.outbox).await?;

        let id = self.next_id.load(Ordering::SeqCst);
        let path = self.outbox.join(format!("{}-{}", id, file_name));
        tokio::fs::write(&path, contents).await?;

        Ok(self.post(chat, caption, None, Some(path)))
    }

    async fn answer_callback(&self, text: &str) -> dk_core::Result<()> {
        if !self.quiet {
            println!("   {} {}", "↳".green(), text);
        }
        self.answers.lock().push(text.to_string());
        Ok(())
    }
}

/// Drop HTML tags and unescape the three escaped characters
pub fn strip_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_tag = false;

    for c in text.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }

    out.replace("&lt;", "<").replace("&gt;", ">").replace("&amp;", "&")
}
