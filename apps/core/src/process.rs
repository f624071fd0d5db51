use std::fmt::{Display, Formatter};
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStderr, Command, Stdio};

/// Runs an external program and returns its trimmed stdout lines.
pub trait ProcessRunner: Send + Sync {
    fn execute(&self, program: &str, args: &str) -> Result<Vec<String>, ProcessError>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemProcessRunner;

impl ProcessRunner for SystemProcessRunner {
    fn execute(&self, program: &str, args: &str) -> Result<Vec<String>, ProcessError> {
        execute(program, args)
    }
}

#[derive(Debug)]
pub enum ProcessErrorKind {
    Launch(std::io::Error),
    Read(std::io::Error),
    Wait(std::io::Error),
    Stderr(String),
    Exit(Option<i32>),
}

impl Display for ProcessErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Launch(_) => write!(f, "failed to start process"),
            Self::Read(_) => write!(f, "failed to read process output"),
            Self::Wait(_) => write!(f, "failed to wait for process exit"),
            Self::Stderr(text) => write!(f, "process exited with error \"{}\"", text.trim()),
            Self::Exit(Some(code)) => write!(f, "process exited with code {code}"),
            Self::Exit(None) => write!(f, "process was terminated by a signal"),
        }
    }
}

impl std::error::Error for ProcessErrorKind {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Launch(error) | Self::Read(error) | Self::Wait(error) => Some(error),
            Self::Stderr(_) | Self::Exit(_) => None,
        }
    }
}

/// A process failure with the program and arguments it was started with.
#[derive(Debug)]
pub struct ProcessError {
    pub program: String,
    pub args: String,
    pub kind: ProcessErrorKind,
}

impl ProcessError {
    pub fn new(program: &str, args: &str, kind: ProcessErrorKind) -> Self {
        Self {
            program: program.to_string(),
            args: args.to_string(),
            kind,
        }
    }

    pub fn command_line(&self) -> String {
        if self.args.is_empty() {
            self.program.clone()
        } else {
            format!("{} {}", self.program, self.args)
        }
    }
}

impl Display for ProcessError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "error running process \"{}\"", self.command_line())
    }
}

impl std::error::Error for ProcessError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.kind)
    }
}

/// Starts `program`, reads stdout on the calling thread and drains stderr on
/// a dedicated worker. Any stderr text is a failure, even with exit code 0.
pub fn execute(program: &str, args: &str) -> Result<Vec<String>, ProcessError> {
    run_captured(program, args).map_err(|kind| ProcessError::new(program, args, kind))
}

fn run_captured(program: &str, args: &str) -> Result<Vec<String>, ProcessErrorKind> {
    let mut command = build_command(program, args);
    command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    let mut child = command.spawn().map_err(ProcessErrorKind::Launch)?;

    let stderr = child.stderr.take();
    let stderr_worker = match std::thread::Builder::new()
        .name("quickcuts-stderr".to_string())
        .spawn(move || drain_stderr(stderr))
    {
        Ok(handle) => handle,
        Err(error) => {
            let _ = child.kill();
            let _ = child.wait();
            return Err(ProcessErrorKind::Launch(error));
        }
    };

    let lines = match child.stdout.take() {
        Some(stdout) => read_stdout_or_kill(&mut child, stdout),
        None => Ok(Vec::new()),
    };

    let status = child.wait();
    let stderr_text = stderr_worker
        .join()
        .unwrap_or_else(|_| "stderr reader panicked".to_string());

    let lines = lines.map_err(ProcessErrorKind::Read)?;
    let status = status.map_err(ProcessErrorKind::Wait)?;

    if !stderr_text.is_empty() {
        return Err(ProcessErrorKind::Stderr(stderr_text));
    }
    if !status.success() {
        return Err(ProcessErrorKind::Exit(status.code()));
    }

    Ok(lines)
}

fn drain_stderr(stderr: Option<ChildStderr>) -> String {
    let Some(mut stderr) = stderr else {
        return String::new();
    };
    let mut raw = Vec::new();
    if let Err(error) = stderr.read_to_end(&mut raw) {
        return format!("failed to read stderr: {error}");
    }
    String::from_utf8_lossy(&raw).into_owned()
}

/// Nobody drains stdout after a read error, so a child still writing would
/// never exit; it is killed before the caller waits on it.
fn read_stdout_or_kill(
    child: &mut Child,
    stdout: impl Read,
) -> Result<Vec<String>, std::io::Error> {
    let lines = read_trimmed_lines(stdout);
    if lines.is_err() {
        let _ = child.kill();
    }
    lines
}

fn read_trimmed_lines(stdout: impl Read) -> Result<Vec<String>, std::io::Error> {
    let mut reader = BufReader::new(stdout);
    let mut lines = Vec::new();
    let mut buf = Vec::new();

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        lines.push(String::from_utf8_lossy(&buf).trim().to_string());
    }

    Ok(lines)
}

/// Rooted programs are used as-is; otherwise a file of that name in the
/// current directory wins over the OS search path.
pub fn resolve_program_path(program: &str) -> PathBuf {
    let path = Path::new(program);
    if path.has_root() {
        return path.to_path_buf();
    }

    if let Ok(cwd) = std::env::current_dir() {
        let candidate = cwd.join(path);
        if candidate.is_file() {
            return candidate;
        }
    }

    path.to_path_buf()
}

fn build_command(program: &str, args: &str) -> Command {
    let resolved = resolve_program_path(program);
    let mut command = Command::new(&resolved);

    if resolved.is_absolute() {
        if let Some(dir) = resolved.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            command.current_dir(dir);
        }
    }

    #[cfg(target_os = "windows")]
    {
        use std::os::windows::process::CommandExt;
        use windows_sys::Win32::System::Threading::CREATE_NO_WINDOW;

        if !args.trim().is_empty() {
            command.raw_arg(args);
        }
        command.creation_flags(CREATE_NO_WINDOW);
    }

    #[cfg(not(target_os = "windows"))]
    {
        command.args(split_args(args));
    }

    command
}

/// Splits an argument string on whitespace, grouping double-quoted runs.
/// Quotes are removed; nothing else is interpreted.
pub fn split_args(args: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut in_quotes = false;

    for ch in args.chars() {
        match ch {
            '"' => {
                in_quotes = !in_quotes;
                in_token = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if in_token {
                    out.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            c => {
                current.push(c);
                in_token = true;
            }
        }
    }

    if in_token {
        out.push(current);
    }
    out
}
