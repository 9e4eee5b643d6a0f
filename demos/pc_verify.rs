use std::cell::RefCell;
use std::env;
use std::time::{Duration, Instant};

use serialport::{available_ports, open, prelude::*};
use zfm20::{Command, Reply, Zfm20, DEFAULT_ADDRESS, DEFAULT_PASSWORD};

mod pc_utils;
use pc_utils::{SerialReader, SerialWriter, WallClock};

const DEFAULT_BAUD_RATE: u32 = 57600;

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    match args.len() {
        1 => print_ports(),
        2 => run_verify(args[1].as_str()),
        _ => panic!("Usage: pc_verify [port_name]"),
    };
}

fn print_ports() {
    let ports = available_ports().unwrap();
    for port in ports {
        println!("Available port: {} ({:#?})", port.port_name, port.port_type);
    }
}

fn run_verify(port_name: &str) {
    println!("Using port {}", port_name);
    let mut port = open(port_name).unwrap();
    port.set_baud_rate(DEFAULT_BAUD_RATE).unwrap();
    port.set_timeout(Duration::from_millis(50)).unwrap();

    let port_cell = RefCell::new(port);

    let reader = SerialReader(&port_cell);
    let writer = SerialWriter(&port_cell);
    let clock = WallClock(Instant::now());
    let mut sensor = Zfm20::new(writer, reader, clock, DEFAULT_ADDRESS, DEFAULT_PASSWORD);
    sensor.set_verbose(true);

    println!("1. Verifying password");
    match sensor.send_command(Command::VerifyPassword) {
        Ok(reply) => println!("   {}", reply.status()),
        Err(e) => panic!("Error: {}", e),
    };

    println!("2. Reading system parameters");
    match sensor.send_command(Command::ReadSysPara) {
        Ok(Reply::ReadSysPara(result)) => {
            println!("   Library size: {}", result.params.finger_library_size);
            println!("   Security level: {}", result.params.security_level);
            println!("   Address: {:08x}", result.params.device_address);
            println!("   Password verified: {}", result.params.password_ok());
        }
        Ok(other) => println!("   Unexpected reply: {:?}", other),
        Err(e) => panic!("Error: {}", e),
    };

    println!("3. Reading template count");
    match sensor.send_command(Command::ReadTemplateNumber) {
        Ok(Reply::ReadTemplateNumber(result)) => {
            println!("   Templates stored: {}", result.count)
        }
        Ok(other) => println!("   Unexpected reply: {:?}", other),
        Err(e) => panic!("Error: {}", e),
    };
}
