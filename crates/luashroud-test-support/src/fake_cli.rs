//! A throwaway tool installation backed by a POSIX shell script.
//!
//! The script accepts the same argument shape as the real CLI
//! (`[--preset NAME | --config FILE] INPUT --out OUTPUT`) and is launched with
//! `sh` as the runtime. Every run records its arguments in `invocation.txt`
//! and copies any config file to `last_config.lua` inside the install dir.

use std::fs;
use std::io;
use std::path::Path;

use tempfile::TempDir;

/// Runtime used to launch the fake script.
pub const FAKE_RUNTIME: &str = "sh";
/// Script name inside the install directory.
pub const FAKE_CLI: &str = "cli.lua";

const PRELUDE: &str = r#"#!/bin/sh
preset=""
config=""
input=""
out=""
while [ $# -gt 0 ]; do
  case "$1" in
    --preset) preset="$2"; shift 2 ;;
    --config) config="$2"; shift 2 ;;
    --out) out="$2"; shift 2 ;;
    *) input="$1"; shift ;;
  esac
done
printf '%s\n' "preset=$preset" "config=$config" "input=$input" "out=$out" > invocation.txt
if [ -n "$config" ]; then cp "$config" last_config.lua; fi
"#;

/// Scripted outcome of the fake tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FakeBehaviour {
    /// Write a marker line followed by the input.
    Echo,
    /// Write the input followed by a comment padded with `n` filler characters.
    Inflate(usize),
    /// Print a diagnostic to stderr and exit 1.
    Fail,
    /// Exit 1 without printing anything.
    FailQuietly,
    /// Exit 0 without writing output.
    Silent,
    /// Sleep far longer than any test timeout.
    Hang,
    /// Flood stderr with `n` bytes and exit 1.
    Noisy(usize),
}

/// Diagnostic printed by [`FakeBehaviour::Fail`].
pub const FAKE_DIAGNOSTIC: &str = "cli.lua:1: unexpected symbol near 'end'";
/// First output line written by [`FakeBehaviour::Echo`].
pub const ECHO_MARKER: &str = "-- obfuscated";

impl FakeBehaviour {
    fn body(self) -> String {
        match self {
            Self::Echo => {
                format!("{{ printf '%s\\n' '{ECHO_MARKER}'; cat \"$input\"; }} > \"$out\"\n")
            }
            Self::Inflate(filler) => format!(
                "{{ cat \"$input\"; printf '\\n--'; head -c {filler} /dev/zero | tr '\\0' 'x'; }} > \"$out\"\n"
            ),
            Self::Fail => format!("echo \"{FAKE_DIAGNOSTIC}\" >&2\nexit 1\n"),
            Self::FailQuietly => "exit 1\n".to_string(),
            Self::Silent => "exit 0\n".to_string(),
            Self::Hang => "exec sleep 30\n".to_string(),
            Self::Noisy(bytes) => format!("head -c {bytes} /dev/zero | tr '\\0' 'e' >&2\nexit 1\n"),
        }
    }
}

/// Arguments seen by the most recent run of the fake script.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FakeInvocation {
    /// Value passed to `--preset`, if any.
    pub preset: Option<String>,
    /// Value passed to `--config`, if any.
    pub config: Option<String>,
    /// Positional input path.
    pub input: String,
    /// Value passed to `--out`.
    pub out: String,
}

/// Temporary install directory plus a separate job work directory.
#[derive(Debug)]
pub struct FakePrometheus {
    install: TempDir,
    work: TempDir,
}

impl FakePrometheus {
    /// Create the install directory and script.
    ///
    /// # Errors
    ///
    /// Returns any IO error raised while creating the directories or script.
    pub fn install(behaviour: FakeBehaviour) -> io::Result<Self> {
        let install = tempfile::tempdir()?;
        let work = tempfile::tempdir()?;
        fs::write(
            install.path().join(FAKE_CLI),
            format!("{PRELUDE}{}", behaviour.body()),
        )?;
        Ok(Self { install, work })
    }

    /// Install directory to pass as the tool path.
    #[must_use]
    pub fn install_path(&self) -> &Path {
        self.install.path()
    }

    /// Directory for job files.
    #[must_use]
    pub fn work_dir(&self) -> &Path {
        self.work.path()
    }

    /// Whether the work directory holds no files.
    ///
    /// # Errors
    ///
    /// Returns any IO error raised while listing the directory.
    pub fn work_dir_is_empty(&self) -> io::Result<bool> {
        Ok(fs::read_dir(self.work.path())?.next().is_none())
    }

    /// Arguments recorded by the last run, if the script ran.
    #[must_use]
    pub fn last_invocation(&self) -> Option<FakeInvocation> {
        let text = fs::read_to_string(self.install.path().join("invocation.txt")).ok()?;
        let mut invocation = FakeInvocation::default();
        for line in text.lines() {
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let value = value.to_string();
            match key {
                "preset" if !value.is_empty() => invocation.preset = Some(value),
                "config" if !value.is_empty() => invocation.config = Some(value),
                "input" => invocation.input = value,
                "out" => invocation.out = value,
                _ => {}
            }
        }
        Some(invocation)
    }

    /// Config file contents seen by the last run that used `--config`.
    #[must_use]
    pub fn last_config(&self) -> Option<String> {
        fs::read_to_string(self.install.path().join("last_config.lua")).ok()
    }
}
