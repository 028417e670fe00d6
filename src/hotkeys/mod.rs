use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

use crate::models::Action;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HotkeyError {
    #[error("unknown action '{0}'")]
    UnknownAction(String),
    #[error("binding '{0}' has no key")]
    MissingKey(String),
    #[error("binding '{binding}' has more than one key ('{first}' and '{second}')")]
    MultipleKeys {
        binding: String,
        first: String,
        second: String,
    },
    #[error("binding '{binding}' is used by both {first} and {second}")]
    Duplicate {
        binding: String,
        first: Action,
        second: Action,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Modifier {
    Cmd,
    Alt,
    Ctrl,
    Shift,
}

impl Modifier {
    fn parse(token: &str) -> Option<Self> {
        match token {
            "cmd" | "command" => Some(Modifier::Cmd),
            "alt" | "option" | "opt" => Some(Modifier::Alt),
            "ctrl" | "control" => Some(Modifier::Ctrl),
            "shift" => Some(Modifier::Shift),
            _ => None,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Modifier::Cmd => "cmd",
            Modifier::Alt => "alt",
            Modifier::Ctrl => "ctrl",
            Modifier::Shift => "shift",
        }
    }
}

/// A modifier set plus one key, written `ctrl+alt+cmd+right`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Binding {
    pub modifiers: Vec<Modifier>,
    pub key: String,
}

impl Binding {
    pub fn parse(raw: &str) -> Result<Self, HotkeyError> {
        let mut modifiers = Vec::new();
        let mut key: Option<String> = None;

        for token in raw.split('+').map(|t| t.trim().to_lowercase()) {
            if token.is_empty() {
                continue;
            }
            if let Some(modifier) = Modifier::parse(&token) {
                if !modifiers.contains(&modifier) {
                    modifiers.push(modifier);
                }
                continue;
            }
            if let Some(first) = &key {
                return Err(HotkeyError::MultipleKeys {
                    binding: raw.to_string(),
                    first: first.clone(),
                    second: token,
                });
            }
            key = Some(token);
        }

        let key = key.ok_or_else(|| HotkeyError::MissingKey(raw.to_string()))?;
        modifiers.sort();
        Ok(Self { modifiers, key })
    }
}

impl fmt::Display for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for modifier in &self.modifiers {
            write!(f, "{}+", modifier.name())?;
        }
        write!(f, "{}", self.key)
    }
}

/// Parsed `[hotkeys]` section, ordered by action.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bindings {
    entries: Vec<(Action, Binding)>,
}

impl Bindings {
    pub fn from_config(raw: &BTreeMap<String, String>) -> Result<Self, HotkeyError> {
        let mut entries: Vec<(Action, Binding)> = Vec::with_capacity(raw.len());
        let mut seen: BTreeMap<Binding, Action> = BTreeMap::new();

        for (name, spec) in raw {
            let action: Action = name
                .parse()
                .map_err(|_| HotkeyError::UnknownAction(name.clone()))?;
            let binding = Binding::parse(spec)?;

            if let Some(&first) = seen.get(&binding) {
                return Err(HotkeyError::Duplicate {
                    binding: binding.to_string(),
                    first,
                    second: action,
                });
            }
            seen.insert(binding.clone(), action);
            entries.push((action, binding));
        }

        entries.sort_by_key(|(action, _)| *action);
        Ok(Self { entries })
    }

    pub fn register_all(&self, registrar: &mut dyn HotkeyRegistrar) -> Result<(), HotkeyError> {
        for (action, binding) in &self.entries {
            registrar.register(binding, *action)?;
        }
        Ok(())
    }
}

/// Something that can route a key chord to an action.
pub trait HotkeyRegistrar {
    fn register(&mut self, binding: &Binding, action: Action) -> Result<(), HotkeyError>;
}

/// Renders bindings as an skhd configuration that invokes this binary.
pub struct SkhdRegistrar {
    program: String,
    lines: Vec<String>,
}

impl SkhdRegistrar {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            lines: Vec::new(),
        }
    }

    pub fn render(&self) -> String {
        let mut out = String::from("# albumhop hotkeys (skhd)\n");
        for line in &self.lines {
            out.push_str(line);
            out.push('\n');
        }
        out
    }
}

impl HotkeyRegistrar for SkhdRegistrar {
    fn register(&mut self, binding: &Binding, action: Action) -> Result<(), HotkeyError> {
        let chord = if binding.modifiers.is_empty() {
            binding.key.clone()
        } else {
            let mods: Vec<&str> = binding.modifiers.iter().map(|m| m.name()).collect();
            format!("{} - {}", mods.join(" + "), binding.key)
        };
        self.lines
            .push(format!("{chord} : {} {}", self.program, action.command()));
        Ok(())
    }
}
