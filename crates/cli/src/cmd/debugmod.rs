//! `debugmod <module>` - toggle live-reload debugging for a module

use crate::context::Context;
use anyhow::Result;
use dk_core::{HostError, Invocation};
use watcher::{Toggled, WatchError};

pub async fn run(ctx: &Context, invocation: &Invocation) -> Result<()> {
    let text = match ctx.session.toggle(&invocation.args) {
        Ok(Toggled::Enabled { module, path }) => {
            let dir = ctx.session.dir().display().to_string();
            let file = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            format!(
                "🧑‍💻 <b>Debugging mode enabled for module </b><code>{}</code>\n<i>Go to directory <code>{}</code>, edit file named <code>{}</code> and see changes in real time</i>",
                module.class_name, dir, file
            )
        }
        Ok(Toggled::Disabled { .. }) => "✅ <b>Debugging disabled</b>".to_string(),
        Err(WatchError::Host(HostError::ModuleNotFound(_))) => "🚫 <b>Module not found</b>".to_string(),
        Err(e) => return Err(e.into()),
    };

    ctx.reply(invocation.chat, &text).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::testing::Harness;

    #[tokio::test]
    async fn test_toggle_by_display_name() {
        let harness = Harness::new();
        let snapshot = harness.ctx.session.snapshot_path("TestMod");

        harness.run(".debugmod tester").await.unwrap();
        assert!(harness.last().text.contains("<code>TestMod</code>"));
        assert!(snapshot.is_file());
        assert!(harness.files.is_active("TestMod"));

        harness.run(".debugmod TestMod").await.unwrap();
        assert_eq!(harness.last().text, "✅ <b>Debugging disabled</b>");
        assert!(!snapshot.exists());
    }

    #[tokio::test]
    async fn test_unknown_module() {
        let harness = Harness::new();

        harness.run(".debugmod nope").await.unwrap();
        assert_eq!(harness.last().text, "🚫 <b>Module not found</b>");

        harness.run(".debugmod").await.unwrap();
        assert_eq!(harness.last().text, "🚫 <b>Module not found</b>");
    }
}
