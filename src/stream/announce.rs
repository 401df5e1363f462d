//! Text-to-speech announcements

use std::io::Write;
use std::process::{Child, Command, ExitStatus, Stdio};

use crate::config::AnnouncerConfig;
use crate::error::ProcessError;
use crate::stream::Announcer;

/// Pipes the text into a speech program and waits for it to finish
pub struct CommandAnnouncer {
    program: String,
    args: Vec<String>,
}

impl CommandAnnouncer {
    pub fn new(config: &AnnouncerConfig) -> Self {
        Self {
            program: config.program.clone(),
            args: config.args.clone(),
        }
    }
}

impl Announcer for CommandAnnouncer {
    fn announce(&mut self, text: &str) -> Result<(), ProcessError> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .spawn()
            .map_err(|source| ProcessError::SpawnFailed {
                program: self.program.clone(),
                source,
            })?;

        let status = speak(&mut child, text)?;
        if status.success() {
            Ok(())
        } else {
            Err(ProcessError::ExitStatus {
                program: self.program.clone(),
                status: status.to_string(),
            })
        }
    }
}

/// Feed `text` to the child and wait for it, reaping it even when the
/// write fails because the program exited early
fn speak(child: &mut Child, text: &str) -> Result<ExitStatus, ProcessError> {
    let written = match child.stdin.take() {
        // stdin is dropped at the end of the arm so the program sees EOF
        Some(mut stdin) => stdin
            .write_all(text.as_bytes())
            .and_then(|()| stdin.write_all(b"\n")),
        None => Ok(()),
    };

    let status = child.wait()?;
    if let Err(e) = written {
        tracing::debug!("Speech program {} stopped reading: {}", child.id(), e);
        return Err(ProcessError::Io(e));
    }
    Ok(status)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn announcer(program: &str, args: &[&str]) -> CommandAnnouncer {
        CommandAnnouncer::new(&AnnouncerConfig {
            program: program.into(),
            args: args.iter().map(|s| s.to_string()).collect(),
        })
    }

    #[test]
    fn test_text_reaches_stdin() {
        let mut tts = announcer("sh", &["-c", "read line && test \"$line\" = 'Studio Brussel'"]);
        tts.announce("Studio Brussel").unwrap();
    }

    #[test]
    fn test_early_exit_is_reaped() {
        let mut child = Command::new("true")
            .stdin(Stdio::piped())
            .spawn()
            .unwrap();
        let pid = child.id();
        let text = "x".repeat(1 << 20);

        match speak(&mut child, &text) {
            Err(ProcessError::Io(e)) => assert_eq!(e.kind(), std::io::ErrorKind::BrokenPipe),
            other => panic!("expected broken pipe, got {:?}", other),
        }
        // A zombie would still have a /proc entry
        assert!(!std::path::Path::new(&format!("/proc/{}", pid)).exists());
    }

    #[test]
    fn test_announce_into_early_exit_fails() {
        let mut tts = announcer("true", &[]);
        assert!(matches!(
            tts.announce(&"x".repeat(1 << 20)),
            Err(ProcessError::Io(_))
        ));
    }

    #[test]
    fn test_failure_status_reported() {
        let mut tts = announcer("false", &[]);
        assert!(matches!(
            tts.announce("MNM"),
            Err(ProcessError::ExitStatus { .. }) | Err(ProcessError::Io(_))
        ));
    }
}
