//! Argument parsing over an assistant's argv.
//!
//! The argv may carry a wrapper in front (`node /usr/bin/claude ...`), so all
//! helpers first locate the tool's own binary token and only look at what
//! follows it.

use crate::tools::{DetectDef, Tool, DETECT_TABLE};

/// A launch flag worth replaying when the tool is resumed.
struct ReplayFlag {
    names: &'static [&'static str],
    takes_value: bool,
}

const CLAUDE_REPLAY: &[ReplayFlag] = &[
    ReplayFlag {
        names: &["--dangerously-skip-permissions"],
        takes_value: false,
    },
    ReplayFlag {
        names: &["--model"],
        takes_value: true,
    },
    ReplayFlag {
        names: &["--permission-mode"],
        takes_value: true,
    },
];

const OPENCODE_REPLAY: &[ReplayFlag] = &[
    ReplayFlag {
        names: &["--model", "-m"],
        takes_value: true,
    },
    ReplayFlag {
        names: &["--agent"],
        takes_value: true,
    },
];

const CODEX_REPLAY: &[ReplayFlag] = &[
    ReplayFlag {
        names: &["--model", "-m"],
        takes_value: true,
    },
    ReplayFlag {
        names: &["--dangerously-bypass-approvals-and-sandbox"],
        takes_value: false,
    },
    ReplayFlag {
        names: &["--full-auto"],
        takes_value: false,
    },
];

/// codex options that consume the following token.
const CODEX_VALUE_FLAGS: &[&str] = &[
    "-m",
    "--model",
    "-c",
    "--config",
    "-p",
    "--profile",
    "-s",
    "--sandbox",
    "-a",
    "--ask-for-approval",
    "-C",
    "--cd",
    "-i",
    "--image",
];

/// Arguments after the tool's binary token.
pub fn tool_args(tool: Tool, argv: &[String]) -> &[String] {
    let Some(def) = DETECT_TABLE.iter().find(|def| def.tool == tool) else {
        return &[];
    };
    match binary_index(def, argv) {
        Some(idx) => &argv[idx + 1..],
        None => &[],
    }
}

fn binary_index(def: &DetectDef, argv: &[String]) -> Option<usize> {
    argv.iter().position(|arg| {
        let name = arg.rsplit('/').next().unwrap_or(arg);
        def.binaries.contains(&name)
    })
}

/// Value of the first of `names` in `args`, as `--flag value` or `--flag=value`.
/// A following token that looks like another flag is not a value.
pub fn flag_value(args: &[String], names: &[&str]) -> Option<String> {
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if names.contains(&arg.as_str()) {
            return iter
                .next()
                .filter(|value| !value.is_empty() && !value.starts_with('-'))
                .cloned();
        }
        for name in names.iter().filter(|name| name.starts_with("--")) {
            if let Some(value) = arg.strip_prefix(name).and_then(|rest| rest.strip_prefix('=')) {
                if !value.is_empty() {
                    return Some(value.to_string());
                }
            }
        }
    }
    None
}

/// Positional argument after `codex ... resume`, skipping option values.
pub fn codex_resume_arg(args: &[String]) -> Option<String> {
    let start = args.iter().position(|arg| arg == "resume")? + 1;
    let mut iter = args[start..].iter();
    while let Some(arg) = iter.next() {
        if CODEX_VALUE_FLAGS.contains(&arg.as_str()) {
            iter.next();
            continue;
        }
        if arg.starts_with('-') {
            continue;
        }
        return Some(arg.clone());
    }
    None
}

/// Session id from the command line, per tool.
pub fn session_from_args(tool: Tool, argv: &[String]) -> Option<String> {
    let args = tool_args(tool, argv);
    match tool {
        Tool::Claude => flag_value(args, &["--resume", "-r"])
            .or_else(|| flag_value(args, &["--session-id"])),
        Tool::OpenCode => flag_value(args, &["--session", "-s"]),
        Tool::Codex => codex_resume_arg(args),
    }
}

/// Launch flags to pass again on resume, in canonical `--flag [value]` form.
pub fn replay_args(tool: Tool, argv: &[String]) -> Vec<String> {
    let table = match tool {
        Tool::Claude => CLAUDE_REPLAY,
        Tool::OpenCode => OPENCODE_REPLAY,
        Tool::Codex => CODEX_REPLAY,
    };
    let args = tool_args(tool, argv);

    let mut replay = Vec::new();
    for flag in table {
        let canonical = flag.names[0];
        if flag.takes_value {
            if let Some(value) = flag_value(args, flag.names) {
                replay.push(canonical.to_string());
                replay.push(value);
            }
        } else if args.iter().any(|arg| flag.names.contains(&arg.as_str())) {
            replay.push(canonical.to_string());
        }
    }
    replay
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(line: &str) -> Vec<String> {
        line.split_whitespace().map(str::to_string).collect()
    }

    #[test]
    fn claude_resume_forms() {
        for line in [
            "claude --resume abc",
            "claude -r abc",
            "claude --resume=abc",
            "node /usr/local/bin/claude --resume abc",
            "claude --session-id abc",
        ] {
            assert_eq!(
                session_from_args(Tool::Claude, &argv(line)).as_deref(),
                Some("abc"),
                "{line}"
            );
        }
    }

    #[test]
    fn resume_prefers_resume_over_session_id() {
        let args = argv("claude --session-id old --resume new");
        assert_eq!(session_from_args(Tool::Claude, &args).as_deref(), Some("new"));
    }

    #[test]
    fn bare_resume_picker_has_no_id() {
        assert_eq!(session_from_args(Tool::Claude, &argv("claude --resume")), None);
        assert_eq!(
            session_from_args(Tool::Claude, &argv("claude --resume --verbose")),
            None
        );
    }

    #[test]
    fn wrapper_flags_are_not_tool_flags() {
        // `-r` belongs to node here, not claude.
        let args = argv("node -r preload.js /usr/bin/claude");
        assert_eq!(session_from_args(Tool::Claude, &args), None);
    }

    #[test]
    fn opencode_session_forms() {
        assert_eq!(
            session_from_args(Tool::OpenCode, &argv("opencode -s ses_1")).as_deref(),
            Some("ses_1")
        );
        assert_eq!(
            session_from_args(Tool::OpenCode, &argv("opencode --session=ses_2")).as_deref(),
            Some("ses_2")
        );
        assert_eq!(session_from_args(Tool::OpenCode, &argv("opencode")), None);
    }

    #[test]
    fn codex_resume_positional() {
        assert_eq!(
            session_from_args(Tool::Codex, &argv("codex resume 0199-aa")).as_deref(),
            Some("0199-aa")
        );
        assert_eq!(
            session_from_args(Tool::Codex, &argv("codex -m o3 resume --full-auto -c k=v 0199-bb"))
                .as_deref(),
            Some("0199-bb")
        );
        assert_eq!(session_from_args(Tool::Codex, &argv("codex resume --last")), None);
        assert_eq!(session_from_args(Tool::Codex, &argv("codex exec hi")), None);
    }

    #[test]
    fn replay_collects_known_flags_only() {
        let args = argv(
            "claude --dangerously-skip-permissions --model=opus --verbose --resume abc",
        );
        assert_eq!(
            replay_args(Tool::Claude, &args),
            vec!["--dangerously-skip-permissions", "--model", "opus"]
        );
    }

    #[test]
    fn replay_canonicalizes_short_names() {
        let args = argv("opencode -m anthropic/claude-sonnet -s ses_1");
        assert_eq!(
            replay_args(Tool::OpenCode, &args),
            vec!["--model", "anthropic/claude-sonnet"]
        );
        let args = argv("codex --full-auto -m gpt-5 resume xyz");
        assert_eq!(
            replay_args(Tool::Codex, &args),
            vec!["--model", "gpt-5", "--full-auto"]
        );
    }

    #[test]
    fn missing_binary_yields_nothing() {
        assert!(tool_args(Tool::Codex, &argv("python script.py")).is_empty());
        assert!(replay_args(Tool::Codex, &argv("python script.py")).is_empty());
    }
}
