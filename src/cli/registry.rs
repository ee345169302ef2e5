use std::collections::HashMap;

use crate::cli::core::{CommandResult, ShellContext};

pub type CommandHandler = fn(&mut ShellContext, &[&str]) -> CommandResult;

pub struct CommandEntry {
    pub name: &'static str,
    pub description: &'static str,
    pub usage: &'static str,
    pub handler: CommandHandler,
}

impl CommandEntry {
    pub const fn new(
        name: &'static str,
        description: &'static str,
        usage: &'static str,
        handler: CommandHandler,
    ) -> Self {
        Self {
            name,
            description,
            usage,
            handler,
        }
    }

    /// Subcommands advertised in the usage line, e.g. `txn <add|list>` yields `add`, `list`.
    pub fn subcommands(&self) -> Vec<&'static str> {
        let usage: &'static str = self.usage;
        let Some(start) = usage.find('<') else {
            return Vec::new();
        };
        let Some(len) = usage[start..].find('>') else {
            return Vec::new();
        };
        let inner = &usage[start + 1..start + len];
        if !inner.contains('|') {
            return Vec::new();
        }
        inner.split('|').map(str::trim).collect()
    }
}

/// Commands keyed by name, remembering registration order for help listings.
#[derive(Default)]
pub struct CommandRegistry {
    commands: HashMap<&'static str, CommandEntry>,
    order: Vec<&'static str>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, entry: CommandEntry) {
        let name = entry.name;
        if self.commands.insert(name, entry).is_none() {
            self.order.push(name);
        }
    }

    pub fn get(&self, name: &str) -> Option<&CommandEntry> {
        self.commands.get(name)
    }

    pub fn list(&self) -> Vec<&CommandEntry> {
        self.order
            .iter()
            .filter_map(|name| self.commands.get(name))
            .collect()
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.order.iter().copied()
    }

    pub fn handler(&self, name: &str) -> Option<CommandHandler> {
        self.commands.get(name).map(|entry| entry.handler)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop(_: &mut ShellContext, _: &[&str]) -> CommandResult {
        Ok(())
    }

    #[test]
    fn keeps_registration_order_and_ignores_duplicates() {
        let mut registry = CommandRegistry::new();
        registry.register(CommandEntry::new("txn", "a", "txn", noop));
        registry.register(CommandEntry::new("help", "b", "help", noop));
        registry.register(CommandEntry::new("txn", "c", "txn", noop));
        let names: Vec<_> = registry.names().collect();
        assert_eq!(names, vec!["txn", "help"]);
        assert_eq!(registry.get("txn").map(|e| e.description), Some("c"));
    }

    #[test]
    fn subcommands_come_from_usage() {
        let entry = CommandEntry::new("fx", "", "fx <list|convert> [args]", noop);
        assert_eq!(entry.subcommands(), vec!["list", "convert"]);
        let plain = CommandEntry::new("help", "", "help [command]", noop);
        assert!(plain.subcommands().is_empty());
        let single = CommandEntry::new("cfo", "", "cfo <question>", noop);
        assert!(single.subcommands().is_empty());
    }
}
