use std::io;
use std::path::{Path, PathBuf};
use std::process::{Child, Command};

use tracing::{info, warn};

use crate::config::ToolSettings;
use crate::orthodox::{OrthodoxAction, WindowAgent};

const FILE_SCHEME: &str = "file://";

/// Local path of a `file://` URI, percent-decoded.
pub fn file_uri_to_path(uri: &str) -> Option<PathBuf> {
    let rest = uri.strip_prefix(FILE_SCHEME)?;
    let decoded = urlencoding::decode(rest).ok()?;
    Some(PathBuf::from(decoded.into_owned()))
}

/// Split a configured tool like `"gnome-terminal --maximize"` into a command.
fn tool_command(tool: &str) -> Command {
    let mut parts = tool.split_whitespace();
    let mut cmd = Command::new(parts.next().unwrap_or(tool));
    cmd.args(parts);
    cmd
}

/// Builds and starts the external programs behind the shortcuts.
pub struct Launcher {
    tools: ToolSettings,
}

impl Launcher {
    pub fn new(tools: ToolSettings) -> Self {
        Self { tools }
    }

    /// Editor opened on the selected URIs (F3/F4).
    pub fn edit_command(&self, selection: &[String]) -> Command {
        let mut cmd = tool_command(&self.tools.editor);
        cmd.args(selection);
        cmd
    }

    pub fn terminal_command(&self, dir: &Path) -> Command {
        let mut cmd = tool_command(&self.tools.terminal);
        cmd.current_dir(dir);
        cmd
    }

    pub fn git_command(&self, dir: &Path) -> Command {
        let mut cmd = tool_command(&self.tools.git_client);
        cmd.current_dir(dir);
        cmd
    }

    /// Diff tool for the "Compare..." context item. Offered only for exactly
    /// two local files.
    pub fn compare_command(&self, uris: &[&str]) -> Option<Command> {
        let [a, b] = uris else {
            return None;
        };
        let left = file_uri_to_path(a)?;
        let right = file_uri_to_path(b)?;
        let mut cmd = tool_command(&self.tools.diff);
        cmd.arg(left).arg(right);
        Some(cmd)
    }

    /// Command for an orthodox action that runs outside the host.
    /// Menu-backed actions return `None`; the host performs those.
    pub fn command_for(
        &self,
        action: OrthodoxAction,
        agent: &WindowAgent,
        selection: &[String],
    ) -> Option<Command> {
        match action {
            OrthodoxAction::View | OrthodoxAction::Edit => Some(self.edit_command(selection)),
            OrthodoxAction::Terminal => {
                let dir = agent.current_location()?;
                Some(self.terminal_command(Path::new(&dir)))
            }
            OrthodoxAction::Git => {
                let dir = agent.current_location()?;
                Some(self.git_command(Path::new(&dir)))
            }
            _ => None,
        }
    }

    pub fn spawn(mut cmd: Command) -> io::Result<Child> {
        let program = cmd.get_program().to_string_lossy().into_owned();
        match cmd.spawn() {
            Ok(child) => {
                info!(%program, pid = child.id(), "started external tool");
                Ok(child)
            }
            Err(e) => {
                warn!(%program, error = %e, "failed to start external tool");
                Err(e)
            }
        }
    }
}
