//! Invocation des outils externes SUMO
//!
//! Chaque étape construit une `ToolInvocation` (pure, testable) puis la
//! délègue à un `ToolRunner`. L'exécution est bloquante et sans timeout.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Instant;

use tracing::{debug, error, info};

use crate::error::PipelineError;

/// Chemins de la suite d'outils SUMO
#[derive(Debug, Clone)]
pub struct ToolSuite {
    pub netconvert: PathBuf,
    pub sumo: PathBuf,
    pub random_trips: PathBuf,
    pub python: PathBuf,
}

impl ToolSuite {
    /// Résout les outils depuis `SUMO_HOME`
    pub fn from_sumo_home(sumo_home: &Path, python: impl Into<PathBuf>) -> Self {
        Self {
            netconvert: sumo_home.join("bin").join(executable("netconvert")),
            sumo: sumo_home.join("bin").join(executable("sumo")),
            random_trips: sumo_home.join("tools").join("randomTrips.py"),
            python: python.into(),
        }
    }

    /// Variante utilisée par le pipeline : `SUMO_HOME` absent est une précondition manquante
    pub fn require(sumo_home: Option<&Path>, python: &str) -> Result<Self, PipelineError> {
        match sumo_home {
            Some(home) => Ok(Self::from_sumo_home(home, python)),
            None => Err(PipelineError::PreconditionMissing(
                "SUMO_HOME not set. Please install SUMO and set SUMO_HOME environment variable."
                    .into(),
            )),
        }
    }
}

fn executable(name: &str) -> String {
    if cfg!(windows) {
        format!("{}.exe", name)
    } else {
        name.to_string()
    }
}

/// Ligne de commande d'un outil
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolInvocation {
    /// Nom logique (netconvert, randomTrips, sumo)
    pub tool: &'static str,
    pub program: PathBuf,
    pub args: Vec<OsString>,
}

impl ToolInvocation {
    pub fn new(tool: &'static str, program: impl Into<PathBuf>) -> Self {
        Self {
            tool,
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Ajoute un argument
    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Ajoute une option suivie de sa valeur
    pub fn opt(self, flag: &str, value: impl Into<OsString>) -> Self {
        self.arg(flag).arg(value)
    }

    /// Arguments en chaînes (affichage, tests)
    pub fn args_lossy(&self) -> Vec<String> {
        self.args
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    /// Valeur suivant `flag`
    pub fn value_of(&self, flag: &str) -> Option<&Path> {
        self.args
            .iter()
            .position(|a| a == flag)
            .and_then(|i| self.args.get(i + 1))
            .map(Path::new)
    }
}

/// Exécute une invocation et attend la fin du processus
pub trait ToolRunner: Send + Sync {
    fn run(&self, invocation: &ToolInvocation) -> Result<(), PipelineError>;
}

/// Exécution réelle via `std::process::Command`
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessRunner;

impl ToolRunner for ProcessRunner {
    fn run(&self, invocation: &ToolInvocation) -> Result<(), PipelineError> {
        debug!(
            tool = invocation.tool,
            program = %invocation.program.display(),
            args = ?invocation.args_lossy(),
            "Spawning external tool"
        );
        let started_at = Instant::now();

        let status = Command::new(&invocation.program)
            .args(&invocation.args)
            .status()
            .map_err(|e| {
                error!(
                    tool = invocation.tool,
                    program = %invocation.program.display(),
                    "Failed to spawn: {}",
                    e
                );
                PipelineError::ExternalTool {
                    tool: invocation.tool,
                    status: None,
                }
            })?;

        if !status.success() {
            error!(tool = invocation.tool, status = ?status.code(), "External tool failed");
            return Err(PipelineError::ExternalTool {
                tool: invocation.tool,
                status: status.code(),
            });
        }

        info!(
            tool = invocation.tool,
            elapsed = ?started_at.elapsed(),
            "External tool finished"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_suite_layout() {
        let suite = ToolSuite::from_sumo_home(Path::new("/opt/sumo"), "python3");
        assert!(suite.netconvert.starts_with("/opt/sumo/bin"));
        assert!(suite.sumo.starts_with("/opt/sumo/bin"));
        assert_eq!(suite.random_trips, Path::new("/opt/sumo/tools/randomTrips.py"));
        assert_eq!(suite.python, Path::new("python3"));
    }

    #[test]
    fn test_require_without_sumo_home() {
        let err = ToolSuite::require(None, "python3").unwrap_err();
        assert!(matches!(err, PipelineError::PreconditionMissing(_)));
        assert_eq!(err.http_status(), 400);
    }

    #[test]
    fn test_invocation_builder() {
        let inv = ToolInvocation::new("netconvert", "/opt/sumo/bin/netconvert")
            .opt("-o", "/tmp/base.net.xml")
            .arg("--ramps.guess");
        assert_eq!(inv.args_lossy(), vec!["-o", "/tmp/base.net.xml", "--ramps.guess"]);
        assert_eq!(inv.value_of("-o"), Some(Path::new("/tmp/base.net.xml")));
        assert_eq!(inv.value_of("--missing"), None);
    }

    #[cfg(unix)]
    #[test]
    fn test_process_runner_exit_status() {
        assert!(ProcessRunner
            .run(&ToolInvocation::new("true", "true"))
            .is_ok());

        let err = ProcessRunner
            .run(&ToolInvocation::new("false", "false"))
            .unwrap_err();
        assert!(matches!(
            err,
            PipelineError::ExternalTool {
                tool: "false",
                status: Some(1)
            }
        ));
    }

    #[test]
    fn test_process_runner_missing_binary() {
        let err = ProcessRunner
            .run(&ToolInvocation::new("netconvert", "/nonexistent/bin/netconvert"))
            .unwrap_err();
        assert!(matches!(
            err,
            PipelineError::ExternalTool { status: None, .. }
        ));
    }
}
