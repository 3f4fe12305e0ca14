//! Shared test helpers.

use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::thread;
use std::time::Duration;

/// Serves a single HTTP response on an ephemeral port and returns its URL.
pub(crate) fn serve_once(status: u16, body: Vec<u8>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind listener");
    let address = listener.local_addr().expect("local address");
    thread::spawn(move || {
        let Ok((socket, _)) = listener.accept() else {
            return;
        };
        let mut reader = BufReader::new(socket);
        let mut line = String::new();
        while reader.read_line(&mut line).is_ok_and(|read| read > 2) {
            line.clear();
        }
        let mut stream = reader.into_inner();
        let head = format!(
            "HTTP/1.1 {status} Test\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            body.len()
        );
        let written = stream
            .write_all(head.as_bytes())
            .and_then(|()| stream.write_all(&body));
        drop(written);
    });
    format!("http://{address}/artifact")
}

/// Accepts one connection and never answers it, returning the URL.
pub(crate) fn serve_silently() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind listener");
    let address = listener.local_addr().expect("local address");
    thread::spawn(move || {
        let Ok((socket, _)) = listener.accept() else {
            return;
        };
        thread::sleep(Duration::from_secs(60));
        drop(socket);
    });
    format!("http://{address}/artifact")
}
