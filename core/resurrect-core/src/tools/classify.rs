//! Command-line classification.
//!
//! A command line matches a tool when one of its leading tokens has a final
//! path segment exactly equal to one of the tool's binary names. The token may
//! be the program itself or the script argument of a single wrapper
//! interpreter (`node /usr/local/bin/claude`). Substring hits never count:
//! `claude-monitor` or `/opt/codex-tools/bin/run` are not assistants.

use super::Tool;

/// Detection row: which binaries identify a tool, and which subcommands mark
/// a helper process that must never be treated as the assistant itself.
#[derive(Debug, Clone, Copy)]
pub struct DetectDef {
    pub tool: Tool,
    pub binaries: &'static [&'static str],
    /// Subcommand tokens that, directly after the binary, mark a helper.
    pub excluded_subcommands: &'static [&'static str],
}

pub const DETECT_TABLE: &[DetectDef] = &[
    DetectDef {
        tool: Tool::Claude,
        binaries: &["claude"],
        excluded_subcommands: &[],
    },
    DetectDef {
        tool: Tool::OpenCode,
        binaries: &["opencode"],
        // opencode runs language servers as `opencode x <server>`
        excluded_subcommands: &["x"],
    },
    DetectDef {
        tool: Tool::Codex,
        binaries: &["codex"],
        excluded_subcommands: &[],
    },
];

/// Interpreters and package runners that may sit directly in front of the
/// assistant binary on the same command line.
const WRAPPERS: &[&str] = &["node", "bun", "deno", "python", "python3", "npx", "bunx"];

/// Classify one process command line. Never panics; unknown input is `None`.
pub fn classify(command_line: &str) -> Option<Tool> {
    let tokens: Vec<&str> = command_line.split_whitespace().collect();
    let first = *tokens.first()?;

    if let Some(tool) = classify_at(&tokens, 0) {
        return Some(tool);
    }

    if WRAPPERS.contains(&final_segment(first)) {
        // Skip interpreter flags (`node --no-warnings /path/claude`).
        let script = tokens
            .iter()
            .enumerate()
            .skip(1)
            .find(|(_, token)| !token.starts_with('-'))
            .map(|(idx, _)| idx)?;
        return classify_at(&tokens, script);
    }

    None
}

fn classify_at(tokens: &[&str], idx: usize) -> Option<Tool> {
    let name = final_segment(tokens.get(idx)?);
    let def = DETECT_TABLE
        .iter()
        .find(|def| def.binaries.contains(&name))?;

    let next = tokens.get(idx + 1).copied();
    if next.is_some_and(|sub| def.excluded_subcommands.contains(&sub)) {
        return None;
    }

    Some(def.tool)
}

fn final_segment(token: &str) -> &str {
    token.rsplit('/').next().unwrap_or(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn bare_binary_matches() {
        assert_eq!(classify("claude"), Some(Tool::Claude));
        assert_eq!(classify("opencode"), Some(Tool::OpenCode));
        assert_eq!(classify("codex"), Some(Tool::Codex));
    }

    #[test]
    fn absolute_path_with_arguments_matches() {
        assert_eq!(
            classify("/usr/local/bin/claude --resume abc"),
            Some(Tool::Claude)
        );
        assert_eq!(
            classify("/home/u/.opencode/bin/opencode -s ses_1"),
            Some(Tool::OpenCode)
        );
    }

    #[test]
    fn wrapper_interpreter_prefix_matches() {
        assert_eq!(
            classify("node /home/u/.npm-global/bin/claude --dangerously-skip-permissions"),
            Some(Tool::Claude)
        );
        assert_eq!(
            classify("node --no-warnings /usr/lib/node_modules/.bin/codex resume 123"),
            Some(Tool::Codex)
        );
        assert_eq!(classify("bun /opt/opencode"), Some(Tool::OpenCode));
    }

    #[test]
    fn substring_names_do_not_match() {
        assert_eq!(classify("claude-monitor --watch"), None);
        assert_eq!(classify("/opt/codex-tools/bin/run"), None);
        assert_eq!(classify("vim claude.md"), None);
        assert_eq!(classify("grep opencode notes.txt"), None);
        assert_eq!(classify("/usr/bin/myclaude"), None);
    }

    #[test]
    fn excluded_subcommand_is_not_an_assistant() {
        assert_eq!(
            classify("/home/u/.opencode/bin/opencode x typescript-language-server --stdio"),
            None
        );
        assert_eq!(classify("bun /opt/opencode x pyright-langserver"), None);
    }

    #[test]
    fn excluded_token_elsewhere_still_matches() {
        assert_eq!(classify("opencode --model x"), Some(Tool::OpenCode));
    }

    #[test]
    fn empty_and_whitespace_inputs_are_none() {
        assert_eq!(classify(""), None);
        assert_eq!(classify("   \t "), None);
        assert_eq!(classify("node"), None);
        assert_eq!(classify("node --inspect"), None);
    }

    proptest! {
        #[test]
        fn never_matches_without_exact_segment(line in "[a-z /._-]{0,60}") {
            let has_token = line.split_whitespace().any(|token| {
                let name = final_segment(token);
                DETECT_TABLE.iter().any(|def| def.binaries.contains(&name))
            });
            prop_assume!(!has_token);
            prop_assert_eq!(classify(&line), None);
        }

        #[test]
        fn helper_subcommand_never_matches(
            prefix in "(/[a-z]{1,8}){0,3}/",
            rest in "[a-z -]{0,30}",
        ) {
            let line = format!("{}opencode x {}", prefix, rest);
            prop_assert_eq!(classify(&line), None);
        }
    }
}
