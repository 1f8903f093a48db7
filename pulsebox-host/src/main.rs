use std::fs::File;
use std::io::{self, BufRead};

use pulsebox_core::app::App;
use pulsebox_core::apps::{ClockSourceApp, PatternSequencer};
use pulsebox_core::clock::ClockEngine;
use pulsebox_core::config::{AppKind, Config};
use pulsebox_core::engine::EngineHandle;
use pulsebox_core::host::Host;
use pulsebox_core::midi::ports::{list_input_ports, list_output_ports};
use pulsebox_core::midi::{MidiInputLink, MidiOutputSink, MidiSink, NullSink};
use pulsebox_core::note_stack::NoteStack;
use pulsebox_core::PulseError;

fn init_logging(verbose: bool) {
    use simplelog::*;

    let log_level = if verbose { LevelFilter::Debug } else { LevelFilter::Warn };

    let log_path = dirs::config_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("pulsebox")
        .join("pulsebox.log");

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let log_file = match File::create(&log_path) {
        Ok(file) => file,
        Err(_) => match File::create(std::env::temp_dir().join("pulsebox.log")) {
            Ok(file) => file,
            Err(e) => {
                eprintln!("pulsebox: cannot create log file: {}", e);
                return;
            }
        },
    };

    if let Err(e) = WriteLogger::init(log_level, Config::default(), log_file) {
        eprintln!("pulsebox: logger init failed: {}", e);
        return;
    }

    log::info!("pulsebox starting (log level: {:?})", log_level);
}

/// Output port, or nowhere when the machine has none.
enum Output {
    Port(MidiOutputSink),
    Null(NullSink),
}

impl MidiSink for Output {
    fn send_now(&mut self, byte: u8) {
        match self {
            Output::Port(port) => port.send_now(byte),
            Output::Null(null) => null.send_now(byte),
        }
    }

    fn send(&mut self, status: u8, data: &[u8]) {
        match self {
            Output::Port(port) => port.send(status, data),
            Output::Null(null) => null.send(status, data),
        }
    }
}

fn open_output(pattern: Option<&str>) -> Result<Output, PulseError> {
    if let Some(pattern) = pattern {
        let port = MidiOutputSink::connect_matching(pattern)?;
        println!("output: {}", port.port_name());
        return Ok(Output::Port(port));
    }
    if list_output_ports()?.is_empty() {
        println!("output: none");
        return Ok(Output::Null(NullSink));
    }
    let port = MidiOutputSink::connect(0)?;
    println!("output: {}", port.port_name());
    Ok(Output::Port(port))
}

fn print_ports() -> Result<(), PulseError> {
    println!("inputs:");
    for port in list_input_ports()? {
        println!("  {}: {}", port.index, port.name);
    }
    println!("outputs:");
    for port in list_output_ports()? {
        println!("  {}: {}", port.index, port.name);
    }
    Ok(())
}

fn print_params<A: App>(app: &A) {
    for spec in app.params() {
        println!("  {:>2} {:<18} {}..={}", spec.key, spec.name, spec.min, spec.max);
    }
}

fn run<A>(
    app: A,
    settings: &[u8],
    config: &Config,
    input: Option<&str>,
    output: Option<&str>,
) -> Result<(), PulseError>
where
    A: App + Send + 'static,
{
    println!("app: {}", app.name());
    print_params(&app);
    println!(
        "clock: {} {} bpm, groove {} {}",
        config.clock_source().name(),
        config.bpm(),
        config.groove_template().name(),
        config.groove_amount()
    );

    let clock = ClockEngine::new(config.clock_source(), config.timer_rate_hz());
    let notes = NoteStack::with_capacity(config.note_stack_capacity());
    let mut host = Host::new(app, clock, notes, open_output(output)?);
    host.activate(settings);

    let engine = EngineHandle::spawn(host)?;

    let input_link = match input {
        Some(pattern) => Some(MidiInputLink::connect_matching(pattern, engine.sender())?),
        None if !list_input_ports()?.is_empty() => Some(MidiInputLink::connect(0, engine.sender())?),
        None => None,
    };
    if let Some(link) = &input_link {
        println!("input: {}", link.port_name());
    }

    println!("commands: <key> <value> | get <key> | settings | q");
    for line in io::stdin().lock().lines() {
        let line = line?;
        let words: Vec<&str> = line.split_whitespace().collect();
        match words.as_slice() {
            [] => {}
            ["q"] | ["quit"] => break,
            ["settings"] => println!("{:?}", engine.settings()?),
            ["get", key] => match key.parse::<u8>() {
                Ok(key) => println!("{}", engine.get_parameter(key)?),
                Err(_) => println!("bad key: {}", key),
            },
            [key, value] => match (key.parse::<u8>(), value.parse::<u8>()) {
                (Ok(key), Ok(value)) => engine.set_parameter(key, value)?,
                _ => println!("expected two numbers"),
            },
            _ => println!("unknown command"),
        }
    }

    engine.shutdown()?;
    Ok(())
}

fn main() -> Result<(), PulseError> {
    let args: Vec<String> = std::env::args().collect();
    let verbose = args.iter().any(|a| a == "--verbose" || a == "-v");
    init_logging(verbose);

    if args.iter().any(|a| a == "--list") {
        return print_ports();
    }

    let flag_value = |flag: &str| {
        args.iter()
            .position(|a| a == flag)
            .and_then(|i| args.get(i + 1))
            .cloned()
    };

    let config = Config::load();
    let app_kind = flag_value("--app")
        .and_then(|name| AppKind::parse(&name))
        .unwrap_or_else(|| config.app());
    let input = flag_value("--in").or_else(|| config.input_port().map(str::to_string));
    let output = flag_value("--out").or_else(|| config.output_port().map(str::to_string));

    let result = match app_kind {
        AppKind::Drums => run(
            PatternSequencer::new(),
            &config.drum_settings(),
            &config,
            input.as_deref(),
            output.as_deref(),
        ),
        AppKind::Clock => run(
            ClockSourceApp::new(),
            &config.clock_settings(),
            &config,
            input.as_deref(),
            output.as_deref(),
        ),
    };

    if let Err(e) = &result {
        log::error!("pulsebox: {}", e);
    }
    result
}
