use std::cell::RefCell;
use std::env;
use std::thread::sleep;
use std::time::{Duration, Instant};

use serialport::{available_ports, open, prelude::*};
use zfm20::{Command, Error, Reply, Status, Zfm20, DEFAULT_ADDRESS, DEFAULT_PASSWORD};

mod pc_utils;
use pc_utils::{SerialReader, SerialWriter, WallClock};

const DEFAULT_BAUD_RATE: u32 = 57600;

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    match args.len() {
        1 => print_ports(),
        3 => enroll_to_position(args[1].as_str(), args[2].parse::<u16>().unwrap()),
        _ => panic!("Usage: pc_enroll [port_name] [position]"),
    };
}

fn print_ports() {
    let ports = available_ports().unwrap();
    for port in ports {
        println!("Available port: {} ({:#?})", port.port_name, port.port_type);
    }
}

fn enroll_to_position(port_name: &str, position: u16) {
    println!("Using port {}", port_name);
    let mut port = open(port_name).unwrap();
    port.set_baud_rate(DEFAULT_BAUD_RATE).unwrap();
    port.set_timeout(Duration::from_millis(50)).unwrap();

    let port_cell = RefCell::new(port);

    let reader = SerialReader(&port_cell);
    let writer = SerialWriter(&port_cell);
    let clock = WallClock(Instant::now());
    let mut sensor = Zfm20::new(writer, reader, clock, DEFAULT_ADDRESS, DEFAULT_PASSWORD);

    expect_ok(sensor.send_command(Command::VerifyPassword));

    println!("Place a finger on the sensor");
    capture_to_buffer(&mut sensor, 1);

    println!("Lift your finger, then place it again");
    sleep(Duration::from_secs(2));
    capture_to_buffer(&mut sensor, 2);

    println!("Merging captures into a template");
    expect_ok(sensor.send_command(Command::RegModel));

    println!("Storing template at position {}", position);
    expect_ok(sensor.send_command(Command::StoreModel {
        buffer: 1,
        position,
    }));

    println!("Done");
}

fn capture_to_buffer(
    sensor: &mut Zfm20<SerialWriter<'_>, SerialReader<'_>, WallClock>,
    buffer: u8,
) {
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
    expect_ok(sensor.send_command(Command::Img2Tz { buffer }));
}

fn expect_ok(result: Result<Reply, Error>) {
    match result {
        Ok(reply) if reply.status().is_ok() => {}
        Ok(reply) => panic!("Device reported: {}", reply.status()),
        Err(e) => panic!("Error: {}", e),
    }
}
