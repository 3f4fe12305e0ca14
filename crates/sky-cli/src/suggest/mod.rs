//! Core tool registry and "did you mean" suggestions for unknown commands.

use std::io::{self, Write};

/// A core Starlark tool shipped alongside `sky`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct CoreTool {
    /// Alias accepted by `sky`.
    pub(crate) name: &'static str,
    /// Executable that implements the tool.
    pub(crate) binary: &'static str,
    /// One-line description shown in help and suggestions.
    pub(crate) summary: &'static str,
}

/// Core tools, sorted by alias.
pub(crate) const CORE_TOOLS: &[CoreTool] = &[
    CoreTool {
        name: "check",
        binary: "skycheck",
        summary: "static analysis",
    },
    CoreTool {
        name: "doc",
        binary: "skydoc",
        summary: "generate documentation",
    },
    CoreTool {
        name: "fmt",
        binary: "skyfmt",
        summary: "format Starlark files",
    },
    CoreTool {
        name: "lint",
        binary: "skylint",
        summary: "lint Starlark files",
    },
    CoreTool {
        name: "ls",
        binary: "skyls",
        summary: "language server (LSP)",
    },
    CoreTool {
        name: "query",
        binary: "skyquery",
        summary: "query Starlark sources",
    },
    CoreTool {
        name: "repl",
        binary: "skyrepl",
        summary: "interactive REPL",
    },
    CoreTool {
        name: "test",
        binary: "skytest",
        summary: "run Starlark tests",
    },
];

/// Maximum edit distance for a suggestion.
const MAX_DISTANCE: usize = 2;

/// Looks up a core tool by alias or by its executable name.
pub(crate) fn core_tool(command: &str) -> Option<&'static CoreTool> {
    CORE_TOOLS
        .iter()
        .find(|tool| tool.name == command || tool.binary == command)
}

/// Core tools resembling `input` by prefix in either direction or by an edit
/// distance of at most two, in alias order.
pub(crate) fn similar_tools(input: &str) -> Vec<&'static CoreTool> {
    let needle = input.to_lowercase();
    CORE_TOOLS
        .iter()
        .filter(|tool| {
            tool.name.starts_with(&needle)
                || needle.starts_with(tool.name)
                || levenshtein(&needle, tool.name) <= MAX_DISTANCE
        })
        .collect()
}

/// Writes the unknown-command diagnostic with suggestions and install hints.
pub(crate) fn write_unknown_command(out: &mut dyn Write, command: &str) -> io::Result<()> {
    writeln!(out, "sky: unknown command {command:?}")?;
    writeln!(out)?;
    let suggestions = similar_tools(command);
    if !suggestions.is_empty() {
        writeln!(out, "Did you mean one of these?")?;
        for tool in suggestions {
            writeln!(out, "  sky {:<8} {}", tool.name, tool.summary)?;
        }
        writeln!(out)?;
    }
    writeln!(out, "To install a plugin:")?;
    writeln!(out, "  sky plugin install {command}")?;
    writeln!(out, "  sky plugin search {command}")
}

/// Edit distance between two strings, counted in characters.
pub(crate) fn levenshtein(left: &str, right: &str) -> usize {
    let (short, long) = if left.chars().count() <= right.chars().count() {
        (left, right)
    } else {
        (right, left)
    };
    let short: Vec<char> = short.chars().collect();
    let mut previous: Vec<usize> = (0..=short.len()).collect();

    for (row, long_char) in long.chars().enumerate() {
        let mut current = Vec::with_capacity(previous.len());
        current.push(row + 1);
        for (column, short_char) in short.iter().enumerate() {
            let cost = usize::from(*short_char != long_char);
            let deletion = previous.get(column + 1).map_or(usize::MAX, |d| d + 1);
            let insertion = current.last().map_or(usize::MAX, |i| i + 1);
            let substitution = previous.get(column).map_or(usize::MAX, |s| s + cost);
            current.push(deletion.min(insertion).min(substitution));
        }
        previous = current;
    }

    previous.last().copied().unwrap_or_default()
}
