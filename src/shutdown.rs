// Hands the machine off to the OS shutdown command. Fire and forget:
// the child is spawned and never awaited or retried.

use std::process::{Command, Stdio};

use crate::error::Error;

/// Something that can power the device off.
pub trait ShutdownInvoker {
    fn invoke(&mut self) -> Result<(), Error>;
}

/// Platform default shutdown command line.
pub fn default_command() -> Vec<String> {
    let argv: &[&str] = if cfg!(target_os = "windows") {
        &["shutdown", "/s", "/t", "0"]
    } else {
        &["sudo", "shutdown", "-h", "now"]
    };
    argv.iter().map(|s| s.to_string()).collect()
}

/// Runs an external command such as `sudo shutdown -h now`.
#[derive(Debug, Clone)]
pub struct SystemShutdown {
    argv: Vec<String>,
}

impl SystemShutdown {
    pub fn new(argv: Vec<String>) -> Self {
        Self { argv }
    }

    pub fn command_line(&self) -> String {
        self.argv.join(" ")
    }
}

impl ShutdownInvoker for SystemShutdown {
    fn invoke(&mut self) -> Result<(), Error> {
        let fail = |reason: String| Error::ShutdownInvocation {
            command: self.command_line(),
            reason,
        };

        let (program, args) = self
            .argv
            .split_first()
            .ok_or_else(|| fail("empty command".to_string()))?;

        log::info!("invoking shutdown: {}", self.command_line());
        Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .spawn()
            .map_err(|e| fail(e.to_string()))?;
        Ok(())
    }
}
