use std::cell::RefCell;
use std::env;
use std::thread::sleep;
use std::time::{Duration, Instant};

use serialport::{available_ports, open, prelude::*};
use zfm20::{Command, Reply, Status, Zfm20, DEFAULT_ADDRESS, DEFAULT_PASSWORD};

mod pc_utils;
use pc_utils::{SerialReader, SerialWriter, WallClock};

const DEFAULT_BAUD_RATE: u32 = 57600;

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    match args.len() {
        1 => print_ports(),
        2 => search(args[1].as_str()),
        _ => panic!("Usage: pc_search [port_name]"),
    };
}

fn print_ports() {
    let ports = available_ports().unwrap();
    for port in ports {
        println!("Available port: {} ({:#?})", port.port_name, port.port_type);
    }
}

fn search(port_name: &str) {
    println!("Using port {}", port_name);
    let mut port = open(port_name).unwrap();
    port.set_baud_rate(DEFAULT_BAUD_RATE).unwrap();
    port.set_timeout(Duration::from_millis(50)).unwrap();

    let port_cell = RefCell::new(port);

    let reader = SerialReader(&port_cell);
    let writer = SerialWriter(&port_cell);
    let clock = WallClock(Instant::now());
    let mut sensor = Zfm20::new(writer, reader, clock, DEFAULT_ADDRESS, DEFAULT_PASSWORD);

    match sensor.send_command(Command::VerifyPassword) {
        Ok(reply) if reply.status().is_ok() => {}
        Ok(reply) => panic!("Device reported: {}", reply.status()),
        Err(e) => panic!("Error: {}", e),
    }

    let capacity = match sensor.send_command(Command::ReadSysPara) {
        Ok(Reply::ReadSysPara(result)) => result.params.finger_library_size,
        _ => 162,
    };

    println!("Place a finger on the sensor");
    loop {
        match sensor.send_command(Command::GenImage) {
            Ok(reply) if reply.status() == Status::Ok => break,
            Ok(reply) if reply.status() == Status::NoFinger => {
                sleep(Duration::from_millis(100));
            }
            Ok(reply) => panic!("Capture failed: {}", reply.status()),
            Err(e) => panic!("Error: {}", e),
        }
    }

    match sensor.send_command(Command::Img2Tz { buffer: 1 }) {
        Ok(reply) if reply.status().is_ok() => {}
        Ok(reply) => panic!("Conversion failed: {}", reply.status()),
        Err(e) => panic!("Error: {}", e),
    }

    match sensor.send_command(Command::Search {
        buffer: 1,
        page: 0,
        count: capacity,
    }) {
        Ok(Reply::Search(hit)) if hit.status.is_ok() => {
            println!("Match at position {} (score {})", hit.position, hit.score)
        }
        Ok(Reply::Search(hit)) if hit.status == Status::SearchFailed => {
            println!("No matching finger on file")
        }
        Ok(reply) => println!("Device reported: {}", reply.status()),
        Err(e) => panic!("Error: {}", e),
    }
}
