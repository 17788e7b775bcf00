//! Resume command construction.

use crate::escape::shell_quote;
use crate::patterns::RE_ENV_NAME;
use crate::record::SessionRecord;

use super::Tool;

/// The bare resume invocation for `tool`, with replayed flags in the position
/// the tool accepts them.
pub fn resume_command(tool: Tool, session_id: &str, cli_args: &[String]) -> String {
    let flags: Vec<String> = cli_args.iter().map(|arg| shell_quote(arg)).collect();
    let id = shell_quote(session_id);

    let mut parts: Vec<String> = vec![tool.id().to_string()];
    parts.extend(flags);
    match tool {
        Tool::Claude => {
            parts.push("--resume".to_string());
            parts.push(id);
        }
        Tool::OpenCode => {
            parts.push("-s".to_string());
            parts.push(id);
        }
        Tool::Codex => {
            parts.push("resume".to_string());
            parts.push(id);
        }
    }
    parts.join(" ")
}

/// Full line typed into the pane: optional `cd`, replayed env assignments,
/// then the resume command.
pub fn build_resume_line(tool: Tool, record: &SessionRecord) -> String {
    let mut line = String::new();

    if !record.cwd.is_empty() {
        line.push_str("cd ");
        line.push_str(&shell_quote(&record.cwd));
        line.push_str(" && ");
    }

    for (name, value) in &record.env {
        if !RE_ENV_NAME.is_match(name) {
            tracing::warn!(pane = %record.pane, name = %name, "Skipping invalid env name");
            continue;
        }
        line.push_str(name);
        line.push('=');
        line.push_str(&shell_quote(value));
        line.push(' ');
    }

    line.push_str(&resume_command(tool, &record.session_id, &record.cli_args));
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn record(tool: Tool) -> SessionRecord {
        SessionRecord {
            pane: "main:0.0".to_string(),
            tool: tool.id().to_string(),
            session_id: "ses-1".to_string(),
            cwd: "/home/u/proj".to_string(),
            pid: 100,
            model: None,
            cli_args: vec![],
            env: BTreeMap::new(),
        }
    }

    #[test]
    fn per_tool_resume_shapes() {
        assert_eq!(resume_command(Tool::Claude, "a", &[]), "claude --resume 'a'");
        assert_eq!(resume_command(Tool::OpenCode, "a", &[]), "opencode -s 'a'");
        assert_eq!(resume_command(Tool::Codex, "a", &[]), "codex resume 'a'");
    }

    #[test]
    fn replayed_flags_precede_resume_arguments() {
        let args = vec!["--model".to_string(), "o3".to_string()];
        assert_eq!(
            resume_command(Tool::Codex, "x", &args),
            "codex '--model' 'o3' resume 'x'"
        );
    }

    #[test]
    fn line_changes_directory_first() {
        let line = build_resume_line(Tool::Claude, &record(Tool::Claude));
        assert_eq!(line, "cd '/home/u/proj' && claude --resume 'ses-1'");
    }

    #[test]
    fn empty_cwd_skips_cd() {
        let mut rec = record(Tool::OpenCode);
        rec.cwd.clear();
        assert_eq!(build_resume_line(Tool::OpenCode, &rec), "opencode -s 'ses-1'");
    }

    #[test]
    fn env_assignments_are_quoted_and_invalid_names_dropped() {
        let mut rec = record(Tool::Claude);
        rec.env.insert("CLAUDE_CONFIG_DIR".to_string(), "/home/u/.claude work".to_string());
        rec.env.insert("BAD-NAME".to_string(), "x".to_string());
        assert_eq!(
            build_resume_line(Tool::Claude, &rec),
            "cd '/home/u/proj' && CLAUDE_CONFIG_DIR='/home/u/.claude work' claude --resume 'ses-1'"
        );
    }

    #[test]
    fn hostile_cwd_is_quoted() {
        let mut rec = record(Tool::Claude);
        rec.cwd = "/tmp/it's $(rm -rf ~)".to_string();
        let line = build_resume_line(Tool::Claude, &rec);
        assert!(line.starts_with("cd '/tmp/it'\\''s $(rm -rf ~)' && "));
    }
}
