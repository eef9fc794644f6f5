//! Offline replay of keystroke scripts against a configured keymap.
//!
//! Script format, one entry per line:
//!
//! ```text
//! # comment
//! 0    g
//! 120  g
//! 900  ctrl+s
//! 950  esc keyup
//! scope editor
//! ```
//!
//! Key lines are `<ms> <combo> [keydown|keyup|keypress]`, with `ms` measured
//! from the start of the replay and never decreasing.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use anyhow::{bail, Context as _};
use serde::Serialize;
use tracing::{debug, info};

use crate::config::Config;
use crate::hotkeys::{
    ActionTable, EventType, HotkeyEngine, HotkeyStats, KeyEvent, ListenerTarget, MountedHotkeys,
};
use crate::logging;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ScriptLine {
    Key {
        at: Duration,
        combo: String,
        event_type: EventType,
    },
    Scope(String),
}

pub fn parse_script(text: &str) -> anyhow::Result<Vec<ScriptLine>> {
    let mut lines = Vec::new();
    let mut last = Duration::ZERO;

    for (index, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let parsed = parse_line(line).with_context(|| format!("line {}: {:?}", index + 1, raw))?;
        if let ScriptLine::Key { at, .. } = &parsed {
            if *at < last {
                bail!("line {}: timestamps must not decrease", index + 1);
            }
            last = *at;
        }
        lines.push(parsed);
    }
    Ok(lines)
}

fn parse_line(line: &str) -> anyhow::Result<ScriptLine> {
    let mut parts = line.split_whitespace();
    let first = parts.next().context("empty line")?;

    if first == "scope" {
        let scope = parts.next().context("scope needs a name")?;
        return Ok(ScriptLine::Scope(scope.to_string()));
    }

    let ms: u64 = first
        .parse()
        .with_context(|| format!("expected milliseconds, got {first:?}"))?;
    let combo = parts.next().context("missing combo")?;
    let event_type = match parts.next() {
        None | Some("keydown") => EventType::KeyDown,
        Some("keyup") => EventType::KeyUp,
        Some("keypress") => EventType::KeyPress,
        Some(other) => bail!("unknown event type {other:?}"),
    };
    if let Some(extra) = parts.next() {
        bail!("unexpected trailing {extra:?}");
    }

    Ok(ScriptLine::Key {
        at: Duration::from_millis(ms),
        combo: combo.to_string(),
        event_type,
    })
}

/// One handler run during a replay.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplayHit {
    pub at_ms: u128,
    pub combo: String,
    pub scope: String,
    pub actions: Vec<String>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplayReport {
    pub hits: Vec<ReplayHit>,
    pub stats: HotkeyStats,
    pub failed_entries: Vec<String>,
}

/// Mount `config`'s keymap and feed `script` through a fresh engine.
///
/// Every action named in the keymap is bound to a recorder, so the report
/// shows which named actions each keystroke would have run.
pub fn replay(config: &Config, script: &[ScriptLine]) -> anyhow::Result<ReplayReport> {
    let fired: Rc<RefCell<Vec<String>>> = Rc::default();
    let mut actions = ActionTable::new();
    for entry in &config.keymap {
        let sink = Rc::clone(&fired);
        let name = entry.action.clone();
        actions.insert(entry.action.clone(), move || sink.borrow_mut().push(name.clone()));
    }

    let mut engine = HotkeyEngine::from_config(config);
    let mut mounted = MountedHotkeys::mount_keymap(&mut engine, &config.keymap, &actions);
    let failed_entries = mounted.failures().iter().map(ToString::to_string).collect();
    info!(bindings = mounted.ids().len(), "Replay keymap mounted");

    let start = Instant::now();
    let mut hits = Vec::new();
    for line in script {
        match line {
            ScriptLine::Scope(scope) => engine.set_scope(scope.clone()),
            ScriptLine::Key {
                at,
                combo,
                event_type,
            } => {
                let now = start + *at;
                engine.tick(now);
                let mut event = KeyEvent::from_combo(combo);
                let outcome = engine
                    .dispatch(&ListenerTarget::Global, *event_type, &mut event, now)
                    .with_context(|| format!("dispatching {combo} at {}ms", at.as_millis()))?;
                logging::log_key_event(&event, &outcome);

                if let Some(triggered) = outcome.triggered() {
                    let actions = std::mem::take(&mut *fired.borrow_mut());
                    debug!(combo = %triggered.combo, ?actions, "Replay hit");
                    hits.push(ReplayHit {
                        at_ms: at.as_millis(),
                        combo: triggered.combo.clone(),
                        scope: triggered.scope.clone(),
                        actions,
                    });
                }
            }
        }
    }

    let stats = engine.stats();
    mounted.unmount(&mut engine);
    Ok(ReplayReport {
        hits,
        stats,
        failed_entries,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::KeymapEntry;

    fn entry(preset: Option<&str>, combo: Option<&str>, action: &str) -> KeymapEntry {
        KeymapEntry {
            preset: preset.map(str::to_string),
            combo: combo.map(str::to_string),
            action: action.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn parses_keys_scopes_and_comments() {
        let script = parse_script("# start\n0 g\n\n120 g keyup\nscope editor\n").unwrap();
        assert_eq!(
            script,
            vec![
                ScriptLine::Key {
                    at: Duration::ZERO,
                    combo: "g".into(),
                    event_type: EventType::KeyDown
                },
                ScriptLine::Key {
                    at: Duration::from_millis(120),
                    combo: "g".into(),
                    event_type: EventType::KeyUp
                },
                ScriptLine::Scope("editor".into()),
            ]
        );
    }

    #[test]
    fn rejects_bad_lines() {
        assert!(parse_script("abc g").is_err());
        assert!(parse_script("10").is_err());
        assert!(parse_script("10 g sideways").is_err());
        assert!(parse_script("10 g keyup extra").is_err());
        assert!(parse_script("scope").is_err());

        let err = parse_script("100 g\n50 g").unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn replays_sequences_and_scopes() {
        let mut scoped = entry(None, Some("ctrl+s"), "saveDraft");
        scoped.scope = Some("editor".into());
        let config = Config {
            keymap: vec![
                entry(Some("vim.documentStart"), None, "top"),
                scoped,
                entry(None, Some("ctrl+q"), "missingHandlerIsFine"),
                entry(Some("vim.nope"), None, "broken"),
            ],
            ..Config::default()
        };
        let script = parse_script("0 g\n100 g\n200 ctrl+s\nscope editor\n300 ctrl+s\n").unwrap();

        let report = replay(&config, &script).unwrap();
        let actions: Vec<&str> = report
            .hits
            .iter()
            .flat_map(|h| h.actions.iter().map(String::as_str))
            .collect();
        assert_eq!(actions, vec!["top", "saveDraft"]);
        assert_eq!(report.hits[0].at_ms, 100);
        assert_eq!(report.stats.total_triggered, 2);
        assert_eq!(report.failed_entries, vec!["Preset 'vim.nope' not found"]);
    }
}
