mod parse_args;

use anyhow::{bail, Context};
use hc12link_core::hal::{list_ports, RtsModeLine};
use hc12link_core::prelude::*;
use hc12link_core::protocol::{ReceivedFrame, SharedDecoder};
use std::thread;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use parse_args::{AppArgs, Command, LinkCommand, Verbosity};

type SerialLink = Hc12Link<SerialTransport, RtsModeLine, SystemClock>;

fn init_tracing(verbosity: Verbosity) {
    // RUST_LOG wins over -v
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("hc12link={}", verbosity.filter())));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn load_config(args: &AppArgs) -> anyhow::Result<LinkConfig> {
    let mut config = match &args.config_file {
        Some(path) => LinkConfig::load(path)
            .with_context(|| format!("failed to load config from {}", path))?,
        None => LinkConfig::default(),
    };

    if let Some(port) = &args.port {
        config.port_name = port.clone();
    }
    if let Some(baud_rate) = args.baud_rate {
        config.baud_rate = baud_rate;
    }
    if let Some(capacity) = args.capacity {
        config.message_capacity = capacity;
    }
    if args.checksum {
        config.use_checksum = true;
    }

    if config.port_name.is_empty() {
        bail!("no serial port given; use --port or set port_name in the config file");
    }
    Ok(config)
}

fn open_link(config: LinkConfig) -> anyhow::Result<SerialLink> {
    let transport = SerialTransport::new(config.port_name.clone());
    let mode_line = transport.mode_line();
    let mut link = Hc12Link::new(transport, mode_line, SystemClock::new(), config)?;
    link.begin().context("failed to open serial port")?;
    Ok(link)
}

fn print_ports() {
    let ports = list_ports();
    if ports.is_empty() {
        println!("No serial ports found");
    }
    for port in ports {
        match port.usb {
            Some(usb) => println!(
                "{}  {:04x}:{:04x}  {}",
                port.name,
                usb.vid,
                usb.pid,
                usb.product.unwrap_or_default()
            ),
            None => println!("{}", port.name),
        }
    }
}

fn print_frame(frame: &ReceivedFrame, use_checksum: bool) {
    let verdict = match (use_checksum, frame.checksum_ok) {
        (false, _) => "",
        (true, true) => "  [checksum ok]",
        (true, false) => "  [checksum MISMATCH]",
    };
    let truncated = if frame.truncated { "  [truncated]" } else { "" };
    println!(
        "{}{}{}",
        String::from_utf8_lossy(&frame.payload),
        verdict,
        truncated
    );
}

/// Print frames until the port fails. A reader thread owns the transport and
/// delivers bytes into a shared decoder; this thread drains completed frames.
fn listen(link: SerialLink) -> anyhow::Result<()> {
    let config = link.config().clone();
    let decoder = SharedDecoder::new(FrameDecoder::new(
        config.markers(),
        config.message_capacity,
        config.use_checksum,
    ));

    let (mut transport, _mode_line, _clock) = link.into_parts();
    let producer = decoder.clone();
    let reader = thread::spawn(move || -> Result<(), LinkError> {
        loop {
            match transport.read_byte()? {
                Some(byte) => {
                    producer.push(byte);
                }
                None => thread::sleep(Duration::from_millis(5)),
            }
        }
    });

    loop {
        if let Some(frame) = decoder.take_frame() {
            print_frame(&frame, config.use_checksum);
        } else if reader.is_finished() {
            return match reader.join() {
                Ok(result) => result.context("serial reader stopped"),
                Err(_) => bail!("serial reader panicked"),
            };
        } else {
            thread::sleep(Duration::from_millis(1));
        }
    }
}

fn run_on_link(command: LinkCommand, mut link: SerialLink) -> anyhow::Result<()> {
    match command {
        LinkCommand::Detect => match BaudProber::new(&mut link).detect_speed()? {
            DetectOutcome::Detected(baud) => println!("{}", baud),
            DetectOutcome::BufferFault => bail!("response buffer overflowed while probing"),
            DetectOutcome::NotFound => bail!("module did not answer at any baud rate"),
        },
        LinkCommand::ResetDefaults => {
            // Leaves the link closed
            BaudProber::new(&mut link).force_default_across_all_speeds()?;
            return Ok(());
        }
        LinkCommand::SetBaud(target) => match BaudProber::new(&mut link).set_speed_safely(target)? {
            SetSpeedOutcome::Acknowledged { response } => println!("{}", response),
            SetSpeedOutcome::BufferFault => bail!("response buffer overflowed while probing"),
            SetSpeedOutcome::NotAcknowledged(DetectOutcome::Detected(actual)) => {
                bail!("module did not accept {} baud; it is set to {}", target, actual)
            }
            SetSpeedOutcome::NotAcknowledged(_) => {
                bail!("module did not accept {} baud and could not be detected", target)
            }
        },
        LinkCommand::Send(text) => {
            while !link.is_ready_to_send() {
                thread::sleep(Duration::from_millis(1));
            }
            link.send(text.as_str())?;
        }
        LinkCommand::Listen => return listen(link),
    }

    link.end()?;
    Ok(())
}

fn run(args: AppArgs) -> anyhow::Result<()> {
    match args.command.clone() {
        Command::Ports => {
            print_ports();
            Ok(())
        }
        Command::Link(command) => {
            let link = open_link(load_config(&args)?)?;
            run_on_link(command, link)
        }
    }
}

fn main() -> anyhow::Result<()> {
    let args = parse_args::parse_args()?;
    init_tracing(args.verbosity);
    run(args)
}
