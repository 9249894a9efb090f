// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

use crate::HomeFixture;

use anyhow::{anyhow, Result};
use confkeep::{
    config::HighlightOptions,
    history::{backend::WORKING_FILE, CommitMode},
    session::EditorSession,
    syntax::{highlight, ContentType, HighlightClass},
};
use indoc::indoc;
use pretty_assertions::assert_eq;
use std::fs;
use tokio::runtime::Handle;

#[tokio::test]
async fn edit_save_and_restore_round_trip() -> Result<()> {
    let fixture = HomeFixture::new()?;
    let original = indoc! {r#"
        # Prompt
        export PS1="\u@\h \W $ "
        alias ll='ls -la'
    "#};
    let path = fixture.write(".bashrc", original)?;

    let mut session = EditorSession::new(HighlightOptions::default(), Handle::current());
    session.open(&path, fs::read_to_string(&path)?);
    fixture
        .store()
        .commit_if_changed(&path, session.buffer().text(), Some("initial"))?;

    let end = session.buffer().len();
    session.edit(end..end, "export EDITOR=nvim\n")?;
    fs::write(&path, session.buffer().text())?;
    fixture
        .store()
        .commit_if_changed(&path, session.buffer().text(), None)?;

    // Focus loss with nothing new to save.
    let unchanged = fixture
        .store()
        .commit_if_changed(&path, session.buffer().text(), None)?;
    assert_eq!(unchanged, None);

    let history = fixture.store().history(&path)?;
    assert_eq!(history.len(), 2);
    assert_eq!(history[1].message, "initial");

    let restored = fixture.store().restore(&path, &history[1].id)?;
    assert_eq!(restored, original);
    assert_eq!(fixture.store().history(&path)?.len(), 2);

    session.open(&path, restored);
    assert_eq!(session.undo_depth(), 0);
    assert_eq!(session.buffer().text(), original);

    let resaved = fixture.store().commit_if_changed(&path, session.buffer().text(), None)?;
    assert!(resaved.is_some());
    assert_eq!(fixture.store().history(&path)?.len(), 3);

    Ok(())
}

#[test]
fn repository_reflects_newest_snapshot() -> Result<()> {
    let fixture = HomeFixture::new()?;
    let path = fixture.write(".config/git/config", "[user]\n  name = blah\n")?;

    fixture
        .store()
        .commit(&path, "[user]\n  name = blah\n", None, CommitMode::Force)?;
    fixture
        .store()
        .commit(&path, "[user]\n  name = foo\n", None, CommitMode::Force)?;

    let repo = fixture.repository(&path)?;
    let head = repo.head()?;
    assert_eq!(head.shorthand(), Some("main"));

    let workdir = repo
        .workdir()
        .ok_or_else(|| anyhow!("history repository has no working copy"))?;
    assert_eq!(
        fs::read_to_string(workdir.join(WORKING_FILE))?,
        "[user]\n  name = foo\n"
    );

    let snapshots = fixture.store().history(&path)?;
    assert_eq!(head.peel_to_commit()?.id().to_string(), snapshots[0].id);

    Ok(())
}

#[test]
fn snapshot_diff_renders_as_unified_text() -> Result<()> {
    let fixture = HomeFixture::new()?;
    let path = fixture.write("app/settings.yml", "")?;
    fixture
        .store()
        .commit_if_changed(&path, "name: app\nport: 80\n", None)?;
    let snapshot = fixture
        .store()
        .commit_if_changed(&path, "name: app\nport: 8080\n", None)?
        .ok_or_else(|| anyhow!("no snapshot"))?;

    let diff = fixture
        .store()
        .diff(&path, &snapshot.id)?
        .ok_or_else(|| anyhow!("no diff"))?;
    let text = diff.to_string();
    assert!(text.contains("@@ -1,2 +1,2 @@"));
    assert!(text.contains("\n name: app\n-port: 80\n+port: 8080\n"));

    Ok(())
}

#[tokio::test]
async fn settled_sessions_match_full_highlight() -> Result<()> {
    let files = [
        ("package.json", r#"{"name": "app", "private": true, "version": 1}"#),
        (".zshrc", "# zsh\nexport PATH=\"$HOME/bin:$PATH\"\n"),
        ("docker-compose.yml", "services:\n  web:\n    image: nginx # latest\n"),
        ("Cargo.toml", "[package]\nname = \"app\"\nedition = 2021\n"),
        ("pom.xml", "<!-- build\n  file -->\n<project id=\"app\"></project>\n"),
        ("setup.py", "def main():\n    return 42  # answer\n"),
    ];

    let tiered = HighlightOptions {
        large_file_threshold_chars: 1,
        debounce_ms: 5,
    };
    let mut session = EditorSession::new(tiered, Handle::current());
    for (name, text) in files {
        session.open(name, text);
        session.set_search("app");
        session.settle().await;

        let expect = highlight(text, session.buffer().content_type(), 0..text.len(), "app");
        assert_eq!(session.styles().ranges(), expect.ranges.as_slice(), "{name}");
    }

    Ok(())
}

#[tokio::test]
async fn typing_in_large_file_keeps_comment_masking() -> Result<()> {
    let text = (0..200)
        .map(|line| format!("key{line} = value{line}"))
        .collect::<Vec<_>>()
        .join("\n");
    let mut session = EditorSession::new(
        HighlightOptions {
            large_file_threshold_chars: 1000,
            debounce_ms: 5,
        },
        Handle::current(),
    );
    session.open("settings.ini", text);
    session.settle().await;
    assert_eq!(session.buffer().content_type(), ContentType::Ini);

    // Comment out line 100 by typing at its start.
    let start = session.buffer().lines(100, 1).start;
    session.edit(start..start, "#")?;
    session.edit(start + 1..start + 1, " ")?;
    session.settle().await;

    let line = session.buffer().line_at(start);
    let classes = session
        .styles()
        .within(line.clone())
        .map(|range| (range.span(), range.class))
        .collect::<Vec<_>>();
    assert_eq!(classes, vec![(line, HighlightClass::Comment)]);

    Ok(())
}
