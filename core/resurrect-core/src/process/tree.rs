//! Descendant and ancestor walks over a [`ProcessSnapshot`].

use std::collections::{HashSet, VecDeque};

use crate::tools::{classify, Tool};

use super::snapshot::{ProcessRecord, ProcessSnapshot};

/// An assistant process found under a pane.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Detection {
    pub tool: Tool,
    /// The assistant process itself, not the pane shell above it.
    pub process: ProcessRecord,
}

impl ProcessSnapshot {
    /// Find the assistant running under `root`.
    ///
    /// The root is checked first, which covers a pane whose shell was replaced
    /// by `exec claude`. Otherwise every descendant is visited breadth-first
    /// through the child index, so wrapper chains of any depth
    /// (`npx → sh → node → claude`) are reached regardless of the order in
    /// which the process table listed them. The hit is then narrowed to the
    /// tool process itself with [`ProcessSnapshot::innermost`].
    pub fn find_assistant(&self, root: u32) -> Option<Detection> {
        let mut queue = VecDeque::from([root]);
        let mut seen = HashSet::from([root]);

        while let Some(pid) = queue.pop_front() {
            if let Some(process) = self.get(pid) {
                if let Some(tool) = classify(&process.command_line()) {
                    return Some(Detection {
                        tool,
                        process: self.innermost(process, tool).clone(),
                    });
                }
            }
            for &child in self.children(pid) {
                if seen.insert(child) {
                    queue.push_back(child);
                }
            }
        }

        None
    }

    /// Walk from `start` up through its parents to the first process
    /// classified as `tool` (including `start` itself), narrowed with
    /// [`ProcessSnapshot::innermost`].
    ///
    /// Hooks run under an intermediate `sh -c`, so their parent pid is not the
    /// assistant; this finds the assistant's own pid above it. Both walks end
    /// on the same process, so a document keyed by a hook is found by save.
    pub fn find_ancestor(&self, start: u32, tool: Tool) -> Option<&ProcessRecord> {
        let mut seen = HashSet::new();
        let mut pid = start;

        while pid != 0 && seen.insert(pid) {
            let process = self.get(pid)?;
            if classify(&process.command_line()) == Some(tool) {
                return Some(self.innermost(process, tool));
            }
            pid = process.parent_pid;
        }

        None
    }

    /// Follow `process` down through direct children classified as the same
    /// tool. npm-style installs run a launcher (`node …/bin/opencode`) whose
    /// child is the native binary; the binary is the process that hooks and
    /// PID logs identify. Helpers (`opencode x …`) do not classify and stop
    /// the descent, and so does any process behind a shell.
    pub fn innermost<'a>(&'a self, mut process: &'a ProcessRecord, tool: Tool) -> &'a ProcessRecord {
        let mut seen = HashSet::from([process.pid]);
        while let Some(child) = self
            .children(process.pid)
            .iter()
            .filter_map(|&pid| self.get(pid))
            .find(|child| classify(&child.command_line()) == Some(tool))
        {
            if !seen.insert(child.pid) {
                break;
            }
            process = child;
        }
        process
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(rows: &[(u32, u32, &str)]) -> ProcessSnapshot {
        ProcessSnapshot::from_records(
            rows.iter()
                .map(|(pid, ppid, cmd)| ProcessRecord::new(*pid, *ppid, cmd)),
        )
    }

    #[test]
    fn root_replaced_by_tool_is_detected() {
        let snap = snapshot(&[(100, 1, "claude --resume abc")]);
        let found = snap.find_assistant(100).unwrap();
        assert_eq!(found.tool, Tool::Claude);
        assert_eq!(found.process.pid, 100);
    }

    #[test]
    fn direct_child_is_detected() {
        let snap = snapshot(&[(100, 1, "-zsh"), (101, 100, "/usr/bin/codex")]);
        let found = snap.find_assistant(100).unwrap();
        assert_eq!(found.tool, Tool::Codex);
        assert_eq!(found.process.pid, 101);
    }

    #[test]
    fn deep_wrapper_chain_is_detected() {
        // pane shell → npx → sh → node → claude binary
        let snap = snapshot(&[
            (100, 1, "bash"),
            (110, 100, "npm exec @anthropic-ai/claude-code"),
            (120, 110, "sh -c claude"),
            (130, 120, "node /home/u/.npm/_npx/1/node_modules/.bin/claude"),
        ]);
        let found = snap.find_assistant(100).unwrap();
        assert_eq!(found.tool, Tool::Claude);
        assert_eq!(found.process.pid, 130);
    }

    /// pane shell → npm exec → sh → node launcher → native binary → hook
    fn launcher_chain() -> ProcessSnapshot {
        snapshot(&[
            (100, 1, "-zsh"),
            (101, 100, "npm exec opencode-ai"),
            (102, 101, "sh -c opencode"),
            (103, 102, "node /home/u/node_modules/.bin/opencode"),
            (104, 103, "/home/u/node_modules/opencode-linux-x64/bin/opencode -s ses_launch"),
            (105, 104, "sh -c resurrect-hook record --tool opencode --session-id ses_now"),
            (106, 104, "opencode x typescript-language-server --stdio"),
        ])
    }

    #[test]
    fn launcher_resolves_to_native_binary() {
        let snap = launcher_chain();
        let found = snap.find_assistant(100).unwrap();
        assert_eq!(found.tool, Tool::OpenCode);
        assert_eq!(found.process.pid, 104);
    }

    #[test]
    fn pane_walk_and_hook_walk_agree() {
        let snap = launcher_chain();
        let from_pane = snap.find_assistant(100).unwrap().process.pid;
        let from_hook = snap.find_ancestor(105, Tool::OpenCode).unwrap().pid;
        assert_eq!(from_pane, from_hook);

        // A hook spawned by the launcher itself still keys the binary.
        assert_eq!(snap.find_ancestor(103, Tool::OpenCode).unwrap().pid, 104);
    }

    #[test]
    fn nested_tool_behind_a_shell_is_not_followed() {
        // claude running `claude -p` through its Bash tool
        let snap = snapshot(&[
            (100, 1, "zsh"),
            (200, 100, "claude"),
            (300, 200, "bash -c claude -p summarize"),
            (301, 300, "claude -p summarize"),
        ]);
        assert_eq!(snap.find_assistant(100).unwrap().process.pid, 200);
    }

    #[test]
    fn children_listed_before_parents_are_still_reached() {
        // Table order places descendants first; the child index makes order irrelevant.
        let snap = snapshot(&[
            (400, 300, "/opt/opencode/bin/opencode"),
            (300, 200, "node wrapper.js"),
            (200, 100, "sh"),
            (100, 1, "fish"),
        ]);
        assert_eq!(snap.find_assistant(100).unwrap().process.pid, 400);
    }

    #[test]
    fn helper_processes_are_skipped() {
        let snap = snapshot(&[
            (100, 1, "zsh"),
            (101, 100, "opencode x typescript-language-server --stdio"),
        ]);
        assert!(snap.find_assistant(100).is_none());
    }

    #[test]
    fn other_panes_do_not_leak_in() {
        let snap = snapshot(&[
            (100, 1, "zsh"),
            (200, 1, "zsh"),
            (201, 200, "claude"),
        ]);
        assert!(snap.find_assistant(100).is_none());
    }

    #[test]
    fn unknown_root_finds_nothing() {
        let snap = snapshot(&[(100, 1, "zsh")]);
        assert!(snap.find_assistant(999).is_none());
    }

    #[test]
    fn ancestor_walk_skips_intermediate_shell() {
        let snap = snapshot(&[
            (100, 1, "zsh"),
            (200, 100, "node /usr/local/bin/claude"),
            (300, 200, "/bin/sh -c resurrect-hook claude"),
            (301, 300, "resurrect-hook claude"),
        ]);
        let owner = snap.find_ancestor(300, Tool::Claude).unwrap();
        assert_eq!(owner.pid, 200);
    }

    #[test]
    fn ancestor_walk_gives_up_at_root() {
        let snap = snapshot(&[(100, 1, "zsh"), (300, 100, "sh -c hook")]);
        assert!(snap.find_ancestor(300, Tool::Claude).is_none());
    }

    #[test]
    fn ancestor_cycle_terminates() {
        let snap = snapshot(&[(10, 20, "sh"), (20, 10, "sh")]);
        assert!(snap.find_ancestor(10, Tool::Codex).is_none());
    }
}
