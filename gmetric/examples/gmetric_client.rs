use std::{thread::sleep, time::Duration};

use gmetric::{Client, Metric, Slope, ValueType};
use tracing::{error, info};

fn main() {
    tracing_subscriber::fmt::init();

    let mut client = Client::builder()
        .with_remote_address("udp://127.0.0.1:8649")
        .expect("failed to parse remote address")
        .with_host("web0.app.com")
        .with_tick_interval(Duration::from_secs(20))
        .with_lifetime(Duration::from_secs(24 * 60 * 60))
        .build();

    client.open().expect("failed to open client");

    let requests = Metric::new("web_requests", ValueType::Uint32)
        .with_title("Number of Web Requests")
        .with_group("web")
        .with_units("count")
        .with_slope(Slope::Both);
    let load = Metric::new("web_load", ValueType::Float32)
        .with_title("Web Load")
        .with_group("web")
        .with_units("load");

    // Pretend to serve some requests, re-announcing metadata every few rounds.
    for round in 0u32..30 {
        if round % 10 == 0 {
            for metric in [&requests, &load] {
                if let Err(e) = client.write_meta(metric) {
                    error!(error = %e, metric = %metric.name, "Failed to send metadata.");
                }
            }
        }

        if let Err(e) = client.write_value(&requests, round * 7) {
            error!(error = %e, "Failed to send request count.");
        }
        if let Err(e) = client.write_value(&load, f64::from(round % 5) * 0.25) {
            error!(error = %e, "Failed to send load.");
        }

        info!(round, "Reported metrics.");
        sleep(Duration::from_secs(1));
    }

    client.close().expect("failed to close client");
}
