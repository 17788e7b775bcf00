//! Shell literal escaping for text typed into a pane.
//!
//! The pane may run bash, zsh, dash or fish, so the literal must mean the same
//! thing to all of them. Single quotes are nearly universal; the two places
//! where shells disagree are handled outside the quotes:
//!
//! - `'` cannot appear inside single quotes anywhere, so it becomes `'\''`.
//! - fish treats `\\` inside single quotes as one backslash, POSIX shells do
//!   not, so each backslash is emitted unquoted as `\\`.

/// Quote `value` so that an interactive shell evaluates it back to `value`.
pub fn shell_quote(value: &str) -> String {
    if value.is_empty() {
        return "''".to_string();
    }

    let mut out = String::with_capacity(value.len() + 2);
    let mut quoted = false;

    for ch in value.chars() {
        match ch {
            '\'' | '\\' => {
                if quoted {
                    out.push('\'');
                    quoted = false;
                }
                out.push('\\');
                out.push(ch);
            }
            _ => {
                if !quoted {
                    out.push('\'');
                    quoted = true;
                }
                out.push(ch);
            }
        }
    }

    if quoted {
        out.push('\'');
    }
    out
}
