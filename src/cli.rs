use crate::object::Value;
use crate::script::Interpreter;
use std::env;
use std::fs;
use std::io::{self, BufRead, Read, Write};
#[cfg(unix)]
use std::mem::MaybeUninit;
use tracing::{debug, Level};
use tracing_subscriber::FmtSubscriber;

const BANNER: &str = include_str!("banner.txt");

/// Environment variable selecting the log level.
pub const LOG_ENV: &str = "PROTOCHAIN_LOG";

/// Installs the stderr log subscriber. The level comes from `PROTOCHAIN_LOG`
/// (error, warn, info, debug, trace) and defaults to warn.
pub fn init_logging() {
    let level = log_level(env::var(LOG_ENV).ok().as_deref());
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(io::stderr)
        .finish();
    // A subscriber may already be installed when embedded; keep that one.
    let _ = tracing::subscriber::set_global_default(subscriber);
}

pub fn log_level(setting: Option<&str>) -> Level {
    setting
        .and_then(|value| value.trim().parse::<Level>().ok())
        .unwrap_or(Level::WARN)
}

pub fn run_main() -> Result<(), i32> {
    let args: Vec<String> = env::args().skip(1).collect();
    run_main_with_args(&args)
}

pub fn run_main_with_args(args: &[String]) -> Result<(), i32> {
    handle_args(args)
}

pub fn handle_args(args: &[String]) -> Result<(), i32> {
    handle_args_with_prompt(args, run_prompt)
}

pub fn handle_args_with_prompt<F>(args: &[String], prompt: F) -> Result<(), i32>
where
    F: FnOnce(),
{
    match args.len() {
        0 => {
            prompt();
            Ok(())
        }
        1 => run_file(&args[0]),
        _ => {
            eprintln!("Usage: protochain [script]");
            Err(64) // Standard exit code for command-line usage error
        }
    }
}

pub fn run_file(path: &str) -> Result<(), i32> {
    let stdout = io::stdout();
    let mut writer = stdout.lock();
    run_file_with_writer(path, &mut writer)
}

/// Runs the script at `path`, writing its printed lines to `writer`.
pub fn run_file_with_writer<W: Write>(path: &str, writer: &mut W) -> Result<(), i32> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) => {
            eprintln!("Error reading file '{}': {}", path, e);
            return Err(74); // Standard exit code for I/O error
        }
    };

    debug!(path, "running script");
    let mut interpreter = Interpreter::new();
    let result = interpreter.run(&contents);

    for line in interpreter.take_output() {
        if let Err(e) = writeln!(writer, "{}", line).and_then(|_| writer.flush()) {
            eprintln!("Error writing output: {}", e);
            return Err(74);
        }
    }

    match result {
        Ok(_) => Ok(()),
        Err(err) if err.is_syntax_error() => {
            eprintln!("{}", err);
            Err(65) // Standard exit code for data format error
        }
        Err(err) => {
            eprintln!("Runtime error: {}", err);
            Err(70) // Standard exit code for internal software error
        }
    }
}

pub fn run_prompt() {
    #[cfg(unix)]
    {
        if unsafe { libc::isatty(libc::STDIN_FILENO) } != 0 {
            if let Err(err) = run_prompt_interactive() {
                eprintln!("Error: {}", err);
            }
            return;
        }
    }

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut reader = stdin.lock();
    let mut writer = stdout.lock();
    let _ = run_prompt_with_io(&mut reader, &mut writer);
}

pub fn run_prompt_with_streams<R, W>(mut reader: R, mut writer: W) -> io::Result<W>
where
    R: BufRead,
    W: Write,
{
    run_prompt_with_io(&mut reader, &mut writer)?;
    Ok(writer)
}

pub fn run_prompt_with_io<R, W>(reader: &mut R, writer: &mut W) -> io::Result<()>
where
    R: BufRead,
    W: Write,
{
    let mut interpreter = Interpreter::new();
    write_welcome(writer)?;
    loop {
        write!(writer, "> ")?;
        writer.flush()?;

        let mut line = String::new();
        if reader.read_line(&mut line)? == 0 {
            break;
        }
        execute_line(&mut interpreter, &line, writer)?;
    }
    Ok(())
}

fn write_welcome<W: Write>(writer: &mut W) -> io::Result<()> {
    writeln!(writer, "{}", BANNER.trim_end())?;
    writeln!(writer)?;
    writeln!(writer, "Welcome to the protochain REPL! (Ctrl+D to exit)")
}

fn execute_line<W: Write>(interpreter: &mut Interpreter, line: &str, writer: &mut W) -> io::Result<()> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Ok(());
    }

    let result = interpreter.run(trimmed);
    for printed in interpreter.take_output() {
        writeln!(writer, "{}", printed)?;
    }

    match result {
        Ok(Some(value)) => {
            if !matches!(value, Value::Nil) {
                writeln!(writer, "{}", interpreter.describe(&value))?;
            }
        }
        Ok(None) => {}
        Err(err) if err.is_syntax_error() => {
            writeln!(writer, "Syntax error: {}", err)?;
        }
        Err(err) => {
            writeln!(writer, "Runtime error: {}", err)?;
        }
    }

    Ok(())
}

#[cfg(unix)]
fn run_prompt_interactive() -> io::Result<()> {
    let _raw = RawMode::new()?;

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let stdout = io::stdout();
    let mut output = stdout.lock();

    write_welcome(&mut output)?;

    let mut interpreter = Interpreter::new();
    let mut history: Vec<String> = Vec::new();
    let mut history_pos: Option<usize> = None;
    let mut saved_input = String::new();
    let mut current_input = String::new();

    redraw_prompt(&mut output, &current_input)?;

    let mut buffer = [0u8; 1];
    loop {
        let read = input.read(&mut buffer)?;
        if read == 0 {
            writeln!(output)?;
            break;
        }

        match buffer[0] {
            b'\n' | b'\r' => {
                writeln!(output)?;
                let command = current_input.trim().to_string();
                if !command.is_empty() {
                    if history.last() != Some(&command) {
                        history.push(command.clone());
                    }
                    execute_line(&mut interpreter, &command, &mut output)?;
                }
                current_input.clear();
                history_pos = None;
                saved_input.clear();
                redraw_prompt(&mut output, &current_input)?;
            }
            0x7f | 0x08 => {
                if !current_input.is_empty() {
                    current_input.pop();
                    history_pos = None;
                    saved_input.clear();
                    redraw_prompt(&mut output, &current_input)?;
                }
            }
            0x1b => {
                let mut seq = [0u8; 2];
                if input.read_exact(&mut seq).is_err() {
                    continue;
                }
                match seq {
                    [b'[', b'A'] => {
                        if history.is_empty() {
                            continue;
                        }
                        if history_pos.is_none() {
                            saved_input = current_input.clone();
                            history_pos = Some(history.len() - 1);
                        } else if let Some(pos) = history_pos {
                            if pos > 0 {
                                history_pos = Some(pos - 1);
                            }
                        }
                        if let Some(pos) = history_pos {
                            current_input = history[pos].clone();
                            redraw_prompt(&mut output, &current_input)?;
                        }
                    }
                    [b'[', b'B'] => {
                        if let Some(pos) = history_pos {
                            if pos + 1 < history.len() {
                                history_pos = Some(pos + 1);
                                current_input = history[pos + 1].clone();
                            } else {
                                history_pos = None;
                                current_input = saved_input.clone();
                            }
                            redraw_prompt(&mut output, &current_input)?;
                        }
                    }
                    _ => {}
                }
            }
            3 | 4 => {
                writeln!(output)?;
                break;
            }
            byte if byte.is_ascii_control() => {}
            byte => {
                current_input.push(byte as char);
                history_pos = None;
                saved_input.clear();
                redraw_prompt(&mut output, &current_input)?;
            }
        }
    }

    Ok(())
}

#[cfg(unix)]
fn redraw_prompt<W: Write>(writer: &mut W, buffer: &str) -> io::Result<()> {
    write!(writer, "\r> {}\x1b[K", buffer)?;
    writer.flush()
}

#[cfg(unix)]
struct RawMode {
    original: libc::termios,
}

#[cfg(unix)]
impl RawMode {
    fn new() -> io::Result<Self> {
        unsafe {
            let mut original = MaybeUninit::<libc::termios>::uninit();
            if libc::tcgetattr(libc::STDIN_FILENO, original.as_mut_ptr()) == -1 {
                return Err(io::Error::last_os_error());
            }
            let original = original.assume_init();

            let mut raw = original;
            raw.c_lflag &= !(libc::ICANON | libc::ECHO);
            raw.c_iflag &= !(libc::IXON | libc::ICRNL);
            raw.c_cc[libc::VMIN] = 1;
            raw.c_cc[libc::VTIME] = 0;

            if libc::tcsetattr(libc::STDIN_FILENO, libc::TCSAFLUSH, &raw) == -1 {
                return Err(io::Error::last_os_error());
            }

            Ok(Self { original })
        }
    }
}

#[cfg(unix)]
impl Drop for RawMode {
    fn drop(&mut self) {
        unsafe {
            libc::tcsetattr(libc::STDIN_FILENO, libc::TCSAFLUSH, &self.original);
        }
    }
}
