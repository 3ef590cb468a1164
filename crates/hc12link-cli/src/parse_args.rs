const HELP: &str = "\
hc12link - Configure and talk through an HC-12 transceiver

USAGE:
  hc12link [OPTIONS] <COMMAND>

COMMANDS:
  ports                 List serial ports
  detect                Find the baud rate the module is set to
  reset-defaults        Send AT+DEFAULT at every baud rate
  set-baud <rate>       Change the module's baud rate safely
  send <text>           Send one framed message
  listen                Print received messages until interrupted

OPTIONS:
  -h, --help            Prints help information
  -p, --port <name>     Serial port (e.g. /dev/ttyUSB0)
  -b, --baud <rate>     Baud rate to open the port at (default: 9600)
  -c, --config <file>   Load link settings from a JSON file
  --capacity <bytes>    Message capacity
  --checksum            Append and verify checksums
  -v, --verbose         Show AT command traffic
  -vv, --trace          Show every frame
";

/// Verbosity level for log output
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum Verbosity {
    /// Diagnostics only
    #[default]
    Quiet = 0,
    /// AT command traffic
    Verbose = 1,
    /// Every frame
    Trace = 2,
}

impl Verbosity {
    pub fn filter(self) -> &'static str {
        match self {
            Verbosity::Quiet => "info",
            Verbosity::Verbose => "debug",
            Verbosity::Trace => "trace",
        }
    }
}

/// Commands that talk to the module through an open link
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkCommand {
    Detect,
    ResetDefaults,
    SetBaud(u32),
    Send(String),
    Listen,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Ports,
    Link(LinkCommand),
}

#[derive(Debug)]
pub struct AppArgs {
    pub command: Command,
    pub port: Option<String>,
    pub baud_rate: Option<u32>,
    pub config_file: Option<String>,
    pub capacity: Option<usize>,
    pub checksum: bool,
    pub verbosity: Verbosity,
}

pub fn parse_args() -> Result<AppArgs, pico_args::Error> {
    parse_from(pico_args::Arguments::from_env())
}

fn parse_from(mut pargs: pico_args::Arguments) -> Result<AppArgs, pico_args::Error> {
    if pargs.contains(["-h", "--help"]) {
        print!("{}", HELP);
        std::process::exit(0);
    }

    let verbosity = if pargs.contains("--trace") || pargs.contains("-vv") {
        Verbosity::Trace
    } else if pargs.contains(["-v", "--verbose"]) {
        Verbosity::Verbose
    } else {
        Verbosity::Quiet
    };

    let port = pargs.opt_value_from_str(["-p", "--port"])?;
    let baud_rate = pargs.opt_value_from_str(["-b", "--baud"])?;
    let config_file = pargs.opt_value_from_str(["-c", "--config"])?;
    let capacity = pargs.opt_value_from_str("--capacity")?;
    let checksum = pargs.contains("--checksum");

    let name: String = pargs.free_from_str()?;
    let command = match name.as_str() {
        "ports" => Command::Ports,
        "detect" => Command::Link(LinkCommand::Detect),
        "reset-defaults" => Command::Link(LinkCommand::ResetDefaults),
        "set-baud" => Command::Link(LinkCommand::SetBaud(pargs.free_from_str()?)),
        "send" => Command::Link(LinkCommand::Send(pargs.free_from_str()?)),
        "listen" => Command::Link(LinkCommand::Listen),
        other => {
            eprintln!("Unknown command: {}\n\n{}", other, HELP);
            std::process::exit(2);
        }
    };

    let args = AppArgs {
        command,
        port,
        baud_rate,
        config_file,
        capacity,
        checksum,
        verbosity,
    };

    let remaining = pargs.finish();
    if !remaining.is_empty() {
        eprintln!("Warning: unused arguments left: {:?}.", remaining);
    }

    Ok(args)
}
