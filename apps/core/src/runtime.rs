use std::io::BufRead;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::Duration;

use crate::config::{self, ConfigError};
use crate::core_service::{CoreService, ServiceError};
use crate::dispatcher::{DispatchError, Dispatcher};
use crate::logging;
use crate::resolver::ExecuteResult;
use crate::session::{error_chain_message, ConsoleSession, ExecuteOutcome};
use crate::transport;

const POLL_INTERVAL: Duration = Duration::from_millis(50);
const SHUTDOWN_GRACE: Duration = Duration::from_secs(30);

#[derive(Debug)]
pub enum RuntimeError {
    Config(ConfigError),
    Service(ServiceError),
    Dispatch(DispatchError),
    Io(std::io::Error),
    Command(String),
    NotFound(String),
}

impl std::fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(error) => write!(f, "config error: {error}"),
            Self::Service(error) => write!(f, "service error: {error}"),
            Self::Dispatch(error) => write!(f, "dispatch error: {error}"),
            Self::Io(error) => write!(f, "io error: {error}"),
            Self::Command(message) => write!(f, "{message}"),
            Self::NotFound(text) => write!(f, "no command or path matches '{text}'"),
        }
    }
}

impl std::error::Error for RuntimeError {}

impl From<ConfigError> for RuntimeError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<ServiceError> for RuntimeError {
    fn from(value: ServiceError) -> Self {
        Self::Service(value)
    }
}

impl From<DispatchError> for RuntimeError {
    fn from(value: DispatchError) -> Self {
        Self::Dispatch(value)
    }
}

impl From<std::io::Error> for RuntimeError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeMode {
    Console,
    List,
    Complete(String),
    Run(String),
    Serve,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeOptions {
    pub config_path: Option<PathBuf>,
    pub reset: bool,
    pub log: bool,
    pub mode: RuntimeMode,
}

impl Default for RuntimeOptions {
    fn default() -> Self {
        Self {
            config_path: None,
            reset: false,
            log: false,
            mode: RuntimeMode::Console,
        }
    }
}

pub fn parse_cli_args(args: &[String]) -> Result<RuntimeOptions, String> {
    let mut options = RuntimeOptions::default();
    let mut mode: Option<RuntimeMode> = None;
    let mut iter = args.iter();

    while let Some(arg) = iter.next() {
        let next_mode = match arg.as_str() {
            "-r" | "--reset" => {
                options.reset = true;
                None
            }
            "--log" => {
                options.log = true;
                None
            }
            "--config" => {
                let path = iter.next().ok_or("--config requires a path")?;
                options.config_path = Some(PathBuf::from(path));
                None
            }
            "--list" => Some(RuntimeMode::List),
            "--serve" => Some(RuntimeMode::Serve),
            "--complete" => {
                let text = iter.next().ok_or("--complete requires text")?;
                Some(RuntimeMode::Complete(text.clone()))
            }
            "--run" => {
                let text = iter.next().ok_or("--run requires text")?;
                Some(RuntimeMode::Run(text.clone()))
            }
            other => return Err(format!("unknown argument '{other}'")),
        };

        if let Some(next_mode) = next_mode {
            if mode.is_some() {
                return Err("only one of --list, --serve, --complete, --run may be given".into());
            }
            mode = Some(next_mode);
        }
    }

    options.mode = mode.unwrap_or(RuntimeMode::Console);
    Ok(options)
}

pub fn run_with_options(options: RuntimeOptions) -> Result<(), RuntimeError> {
    let config_path = options.config_path.as_deref();
    let config = if options.reset {
        let config = config::reset(config_path)?;
        println!(
            "[quickcuts-core] settings reset at {}",
            config.config_path.display()
        );
        config
    } else {
        config::load(config_path)?
    };

    if options.log || config.log_to_file {
        if let Err(error) = logging::init() {
            eprintln!("[quickcuts-core] file logging unavailable: {error}");
        }
    }
    logging::info(&format!(
        "startup mode={:?} config_path={} history_db_path={}",
        options.mode,
        config.config_path.display(),
        config.history_db_path.display(),
    ));

    let mut service = CoreService::new(config)?;
    if options.reset {
        service.clear_history()?;
    }

    let outcome = match options.mode {
        RuntimeMode::Console => {
            let (returned, outcome) = run_console(service);
            service = returned;
            outcome
        }
        RuntimeMode::List => run_list(&service),
        RuntimeMode::Complete(text) => {
            println!("{}", service.complete(&text).output_text);
            Ok(())
        }
        RuntimeMode::Run(text) => run_once(&mut service, &text),
        RuntimeMode::Serve => run_serve(&mut service),
    };

    service.save_history()?;
    logging::info("shutdown");
    outcome
}

fn run_list(service: &CoreService) -> Result<(), RuntimeError> {
    let catalog = service
        .list_commands()
        .map_err(|error| RuntimeError::Command(error_chain_message(&error)))?;
    for name in catalog.names() {
        println!("{name}");
    }
    Ok(())
}

fn run_once(service: &mut CoreService, text: &str) -> Result<(), RuntimeError> {
    match service.execute(text) {
        Ok(true) => Ok(()),
        Ok(false) => Err(RuntimeError::NotFound(text.trim().to_string())),
        Err(error) => Err(RuntimeError::Command(error_chain_message(&error))),
    }
}

/// Line-delimited JSON: one request per stdin line, one response per line.
fn run_serve(service: &mut CoreService) -> Result<(), RuntimeError> {
    let stdin = std::io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        println!("{}", transport::handle_json(service, &line));
    }
    Ok(())
}

struct Console {
    service: CoreService,
    session: ConsoleSession,
}

/// Interactive loop: stdin lines are executed, `?text` asks for a
/// completion, a bare `?` (or tab) accepts the suggestion and completes
/// again, an empty line closes the session. Blocking work runs on the
/// dispatcher; results are applied between input lines.
fn run_console(service: CoreService) -> (CoreService, Result<(), RuntimeError>) {
    let mut console = Console {
        service,
        session: ConsoleSession::default(),
    };
    let outcome = drive_console(&mut console);
    (console.service, outcome)
}

fn drive_console(console: &mut Console) -> Result<(), RuntimeError> {
    let lines = spawn_stdin_reader()?;
    let mut dispatcher: Dispatcher<Console> = Dispatcher::new();

    println!(
        "[quickcuts-core] type a command or path, '?text' to complete, '?' to accept, \
         empty line to close"
    );

    loop {
        dispatcher.pump(console);
        if console.session.is_closed() {
            break;
        }

        match lines.recv_timeout(POLL_INTERVAL) {
            Ok(line) => handle_console_line(console, &mut dispatcher, &line)?,
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => {
                dispatcher.wait_idle(console, SHUTDOWN_GRACE);
                console.session.escape();
                break;
            }
        }
    }

    Ok(())
}

fn handle_console_line(
    console: &mut Console,
    dispatcher: &mut Dispatcher<Console>,
    line: &str,
) -> Result<(), RuntimeError> {
    // Tab: take the highlighted suggestion and complete again from there.
    if line == "?" || line == "\t" {
        console.session.accept_suggestion();
        let typed = console.session.typed_text().to_string();
        return request_completion(console, dispatcher, typed);
    }

    if let Some(partial) = line.strip_prefix('?') {
        console.session.set_input(partial);
        return request_completion(console, dispatcher, partial.to_string());
    }

    console.session.set_input(line.trim_end_matches(['\r', '\n']));
    let Some(text) = console.session.submit() else {
        if !console.session.is_closed() {
            println!("[quickcuts-core] still executing the previous command");
        }
        return Ok(());
    };

    let worker = console.service.worker();
    dispatcher.submit(
        move || {
            let outcome = worker.execute(&text);
            ExecuteResult::from_outcome(&text, outcome)
        },
        |console: &mut Console, result| match console.session.finish_execute(result) {
            ExecuteOutcome::Executed(text) => {
                console.service.record_history(&text);
                logging::info(&format!("executed '{text}'"));
            }
            ExecuteOutcome::NotFound => {
                println!("[quickcuts-core] not found");
            }
            ExecuteOutcome::Failed(message) => {
                logging::error(&message);
                eprintln!("[quickcuts-core] error:\n{message}");
            }
        },
    )?;
    Ok(())
}

fn request_completion(
    console: &Console,
    dispatcher: &mut Dispatcher<Console>,
    input_text: String,
) -> Result<(), RuntimeError> {
    let worker = console.service.worker();
    let history = console.service.history().clone();
    dispatcher.submit(
        move || worker.complete(&history, &input_text),
        |console: &mut Console, result| {
            if console.session.apply_completion(&result) {
                println!("{}", console.session.display_text());
            } else if !result.has_suggestion() {
                println!("[quickcuts-core] no completion for '{}'", result.input_text);
            }
        },
    )?;
    Ok(())
}

fn spawn_stdin_reader() -> Result<Receiver<String>, RuntimeError> {
    let (sender, receiver) = mpsc::channel();
    std::thread::Builder::new()
        .name("quickcuts-stdin".to_string())
        .spawn(move || {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                let Ok(line) = line else {
                    break;
                };
                if sender.send(line).is_err() {
                    break;
                }
            }
        })?;
    Ok(receiver)
}

#[cfg(test)]
mod tests {
    use super::{parse_cli_args, RuntimeMode};
    use std::path::PathBuf;

    fn args(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn defaults_to_console_mode() {
        let options = parse_cli_args(&[]).unwrap();
        assert_eq!(options.mode, RuntimeMode::Console);
        assert!(!options.reset);
        assert!(!options.log);
    }

    #[test]
    fn parses_flags_and_mode() {
        let options =
            parse_cli_args(&args(&["-r", "--log", "--config", "qc.toml", "--run", "build x"]))
                .unwrap();
        assert!(options.reset);
        assert!(options.log);
        assert_eq!(options.config_path, Some(PathBuf::from("qc.toml")));
        assert_eq!(options.mode, RuntimeMode::Run("build x".to_string()));
    }

    #[test]
    fn rejects_two_modes() {
        assert!(parse_cli_args(&args(&["--list", "--serve"])).is_err());
    }

    #[test]
    fn rejects_missing_values_and_unknown_flags() {
        assert!(parse_cli_args(&args(&["--complete"])).is_err());
        assert!(parse_cli_args(&args(&["--bogus"])).is_err());
    }
}
