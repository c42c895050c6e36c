use device_reader::{LineSource, SerialDeviceReader, SerialSettings};
use std::thread;
use std::time::Duration;

/*
 * Prints every line the device sends. To try it without hardware, run
 *
 * socat -d -d pty,raw,echo=0 pty,raw,echo=0
 *
 * and write JSON lines into one end, e.g. `echo '{"v": 3.21, "s": 1}' > /dev/pts/2`.
 */

fn main() {
    let port = std::env::args().nth(1).unwrap_or_else(|| "/dev/pts/3".to_string());

    let settings = SerialSettings {
        port,
        baud_rate: 115200,
        read_timeout: Duration::from_secs(1),
    };

    let mut reader = SerialDeviceReader::open(&settings).expect("Failed to open serial port");

    // Give the board time to finish its reset.
    thread::sleep(Duration::from_secs(2));
    println!("Listening on {}", settings.port);

    loop {
        match reader.read_line() {
            Ok(Some(line)) if line.is_empty() => {}
            Ok(Some(line)) => println!("Line: {}", line),
            Ok(None) => thread::sleep(Duration::from_millis(10)),
            Err(e) => eprintln!("Failed to read line: {}", e),
        }
    }
}
