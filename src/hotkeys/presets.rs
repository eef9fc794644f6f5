//! Built-in catalog of common shortcuts.
//!
//! Presets are typed. The dotted string form (`"save"`, `"vim.deleteLine"`)
//! only exists for configuration files and the CLI, via [`Preset::from_path`].

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use super::binding::{Binding, Handler};
use crate::error::{HotkeyError, Result};

/// Combo, label and kind of a preset.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct PresetSpec {
    pub combo: &'static str,
    pub description: &'static str,
    pub sequence: bool,
}

macro_rules! preset_table {
    (
        $(#[$meta:meta])*
        $enum_name:ident {
            $($variant:ident => $name:literal, $combo:literal, $description:literal, $sequence:literal;)+
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        pub enum $enum_name {
            $($variant,)+
        }

        impl $enum_name {
            pub const ALL: &'static [Self] = &[$(Self::$variant,)+];

            /// camelCase name used in configuration.
            pub fn name(self) -> &'static str {
                match self {
                    $(Self::$variant => $name,)+
                }
            }

            pub fn spec(self) -> PresetSpec {
                match self {
                    $(Self::$variant => PresetSpec {
                        combo: $combo,
                        description: $description,
                        sequence: $sequence,
                    },)+
                }
            }

            pub fn from_name(name: &str) -> Option<Self> {
                Self::ALL.iter().copied().find(|p| p.name() == name)
            }
        }
    };
}

preset_table! {
    /// Application-level shortcuts.
    AppPreset {
        Save => "save", "ctrl+s", "Save", false;
        Copy => "copy", "ctrl+c", "Copy", false;
        Paste => "paste", "ctrl+v", "Paste", false;
        Undo => "undo", "ctrl+z", "Undo", false;
        Redo => "redo", "ctrl+y", "Redo", false;
        Find => "find", "ctrl+f", "Find", false;
        Escape => "escape", "escape", "Escape", false;
        Enter => "enter", "enter", "Enter", false;
        Search => "search", "ctrl+k", "Search", false;
        Focus => "focus", "tab", "Focus Next", false;
        Blur => "blur", "shift+tab", "Focus Previous", false;
        Fullscreen => "fullscreen", "ctrl+shift+w", "Toggle Fullscreen", false;
        ToggleSidebar => "toggleSidebar", "ctrl+b", "Toggle Sidebar", false;
        ToggleSettings => "toggleSettings", "ctrl+shift+s", "Toggle Settings", false;
        ToggleTheme => "toggleTheme", "ctrl+shift+t", "Toggle Theme", false;
        ToggleNotifications => "toggleNotifications", "ctrl+shift+n", "Toggle Notifications", false;
        CommandPalette => "commandPalette", "space space", "Command Palette", true;
    }
}

preset_table! {
    /// Modal editing keymap.
    VimPreset {
        Up => "up", "k", "Move up", false;
        Down => "down", "j", "Move down", false;
        Left => "left", "h", "Move left", false;
        Right => "right", "l", "Move right", false;
        WordForward => "wordForward", "w", "Word forward", false;
        WordBackward => "wordBackward", "b", "Word backward", false;
        WordEnd => "wordEnd", "e", "End of word", false;
        LineStart => "lineStart", "0", "Start of line", false;
        LineEnd => "lineEnd", "$", "End of line", false;
        FirstNonBlank => "firstNonBlank", "^", "First non-blank", false;
        DocumentStart => "documentStart", "g g", "Document start", true;
        DocumentEnd => "documentEnd", "shift+g", "Document end", false;
        PageUp => "pageUp", "ctrl+u", "Page up", false;
        PageDown => "pageDown", "ctrl+d", "Page down", false;
        HalfPageUp => "halfPageUp", "ctrl+b", "Half page up", false;
        HalfPageDown => "halfPageDown", "ctrl+f", "Half page down", false;
        Insert => "insert", "i", "Insert mode", false;
        InsertLineStart => "insertLineStart", "shift+i", "Insert at line start", false;
        Append => "append", "a", "Append", false;
        AppendLineEnd => "appendLineEnd", "shift+a", "Append at line end", false;
        OpenLineBelow => "openLineBelow", "o", "Open line below", false;
        OpenLineAbove => "openLineAbove", "shift+o", "Open line above", false;
        DeleteChar => "deleteChar", "x", "Delete character", false;
        DeleteCharBefore => "deleteCharBefore", "shift+x", "Delete char before", false;
        DeleteLine => "deleteLine", "d d", "Delete line", true;
        DeleteToEnd => "deleteToEnd", "shift+d", "Delete to end", false;
        DeleteWord => "deleteWord", "d w", "Delete word", true;
        Yank => "yank", "y", "Yank", false;
        YankLine => "yankLine", "y y", "Yank line", true;
        YankToEnd => "yankToEnd", "shift+y", "Yank to end", false;
        Put => "put", "p", "Put after", false;
        PutBefore => "putBefore", "shift+p", "Put before", false;
        Change => "change", "c", "Change", false;
        ChangeLine => "changeLine", "c c", "Change line", true;
        ChangeToEnd => "changeToEnd", "shift+c", "Change to end", false;
        Replace => "replace", "r", "Replace char", false;
        ReplaceMode => "replaceMode", "shift+r", "Replace mode", false;
        Undo => "undo", "u", "Undo", false;
        Redo => "redo", "ctrl+r", "Redo", false;
        Search => "search", "/", "Search", false;
        SearchBackward => "searchBackward", "?", "Search backward", false;
        SearchNext => "searchNext", "n", "Search next", false;
        SearchPrevious => "searchPrevious", "shift+n", "Search previous", false;
        FindChar => "findChar", "f", "Find character", false;
        FindCharBackward => "findCharBackward", "shift+f", "Find char backward", false;
        TillChar => "tillChar", "t", "Till character", false;
        TillCharBackward => "tillCharBackward", "shift+t", "Till char backward", false;
        RepeatFind => "repeatFind", ";", "Repeat find", false;
        RepeatFindReverse => "repeatFindReverse", ",", "Repeat find reverse", false;
        SetMark => "setMark", "m", "Set mark", false;
        JumpToMark => "jumpToMark", "'", "Jump to mark", false;
        JumpToMarkColumn => "jumpToMarkColumn", "`", "Jump to mark column", false;
        JumpBack => "jumpBack", "ctrl+o", "Jump back", false;
        JumpForward => "jumpForward", "ctrl+i", "Jump forward", false;
        Visual => "visual", "v", "Visual mode", false;
        VisualLine => "visualLine", "shift+v", "Visual line", false;
        VisualBlock => "visualBlock", "ctrl+v", "Visual block", false;
        InnerWord => "innerWord", "i w", "Inner word", true;
        AroundWord => "aroundWord", "a w", "Around word", true;
        InnerParagraph => "innerParagraph", "i p", "Inner paragraph", true;
        AroundParagraph => "aroundParagraph", "a p", "Around paragraph", true;
        InnerParens => "innerParens", "i (", "Inner parentheses", true;
        AroundParens => "aroundParens", "a (", "Around parentheses", true;
        InnerBrackets => "innerBrackets", "i [", "Inner brackets", true;
        AroundBrackets => "aroundBrackets", "a [", "Around brackets", true;
        InnerBraces => "innerBraces", "i {", "Inner braces", true;
        AroundBraces => "aroundBraces", "a {", "Around braces", true;
        InnerQuotes => "innerQuotes", "i \"", "Inner quotes", true;
        AroundQuotes => "aroundQuotes", "a \"", "Around quotes", true;
        Command => "command", ":", "Command mode", false;
        Quit => "quit", ": q", "Quit", true;
        Write => "write", ": w", "Write", true;
        WriteQuit => "writeQuit", ": w q", "Write and quit", true;
        ForceQuit => "forceQuit", ": q !", "Force quit", true;
        Escape => "escape", "escape", "Escape to normal", false;
        EscapeJk => "escapeJK", "j k", "Escape (jk)", true;
        EscapeKj => "escapeKJ", "k j", "Escape (kj)", true;
        Repeat => "repeat", ".", "Repeat last command", false;
        RecordMacro => "recordMacro", "q", "Record macro", false;
        PlayMacro => "playMacro", "@", "Play macro", false;
        SplitHorizontal => "splitHorizontal", "ctrl+w s", "Split horizontal", true;
        SplitVertical => "splitVertical", "ctrl+w v", "Split vertical", true;
        WindowNext => "windowNext", "ctrl+w w", "Next window", true;
        WindowClose => "windowClose", "ctrl+w c", "Close window", true;
        FoldToggle => "foldToggle", "z a", "Toggle fold", true;
        FoldOpen => "foldOpen", "z o", "Open fold", true;
        FoldClose => "foldClose", "z c", "Close fold", true;
        FoldOpenAll => "foldOpenAll", "z shift+r", "Open all folds", true;
        FoldCloseAll => "foldCloseAll", "z shift+m", "Close all folds", true;
    }
}

const VIM_NAMESPACE: &str = "vim";

/// Any catalog entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Preset {
    App(AppPreset),
    Vim(VimPreset),
}

impl From<AppPreset> for Preset {
    fn from(preset: AppPreset) -> Self {
        Self::App(preset)
    }
}

impl From<VimPreset> for Preset {
    fn from(preset: VimPreset) -> Self {
        Self::Vim(preset)
    }
}

impl Preset {
    /// Every preset, app entries first.
    pub fn all() -> impl Iterator<Item = Preset> {
        AppPreset::ALL
            .iter()
            .copied()
            .map(Preset::App)
            .chain(VimPreset::ALL.iter().copied().map(Preset::Vim))
    }

    /// Dotted path, e.g. `toggleTheme` or `vim.deleteLine`.
    pub fn path(self) -> String {
        match self {
            Self::App(p) => p.name().to_string(),
            Self::Vim(p) => format!("{VIM_NAMESPACE}.{}", p.name()),
        }
    }

    pub fn spec(self) -> PresetSpec {
        match self {
            Self::App(p) => p.spec(),
            Self::Vim(p) => p.spec(),
        }
    }

    /// Binding with the preset's combo, description and sequence flag.
    pub fn binding(self, handler: Handler) -> Binding {
        let spec = self.spec();
        let mut binding = if spec.sequence {
            Binding::sequence(spec.combo, handler)
        } else {
            Binding::new(spec.combo, handler)
        };
        binding.description = Some(spec.description.to_string());
        binding
    }

    pub fn from_path(path: &str) -> Result<Self> {
        let found = match path.split_once('.') {
            Some((VIM_NAMESPACE, name)) => VimPreset::from_name(name).map(Self::Vim),
            Some(_) => None,
            None => AppPreset::from_name(path).map(Self::App),
        };
        found.ok_or_else(|| HotkeyError::UnknownPreset(path.to_string()))
    }
}

impl FromStr for Preset {
    type Err = HotkeyError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_path(s)
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}
